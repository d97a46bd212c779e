//! Type-string parsing.
//!
//! Documentation metadata carries types as free text (`?Product[]`,
//! `PaginatedResult<User>`, `int|string`). This module turns such strings into
//! a [`TypeExpr`] tree so that renderers can decide, leaf by leaf, whether a
//! name refers to a documented type.
//!
//! The recognised forms are tried in a fixed order:
//!
//! 1. nullable prefix `?T`
//! 2. array suffix `T[]`
//! 3. generic `Name<A, B<C>>` (inner arguments split on top-level commas)
//! 4. union `A|B` and intersection `A&B` (split outside of `<...>` only)
//! 5. a bare name
//!
//! Parsing never fails. Anything that does not match a composite form ends up
//! as a [`TypeExpr::Named`] leaf.

use std::fmt;

/// Keywords that refer to the declaring class.
const SELF_KEYWORDS: [&str; 2] = ["self", "static"];

/// Keyword that refers to the declaring class's parent.
const PARENT_KEYWORD: &str = "parent";

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A single type name, e.g. `int` or `Examples\Models\User`
    Named(String),
    /// `?T`
    Nullable(Box<TypeExpr>),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `Name<A, B>`. The base name is never a link target.
    Generic { base: String, args: Vec<TypeExpr> },
    /// `A|B|C`
    Union(Vec<TypeExpr>),
    /// `A&B`
    Intersection(Vec<TypeExpr>),
}

/// The declaring class a type string was written in.
///
/// Used to turn `self`, `static` and `parent` into concrete names.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    /// Fully-qualified name of the declaring class
    pub class: &'a str,
    /// Fully-qualified name of its superclass, if any
    pub parent: Option<&'a str>,
}

impl TypeExpr {
    /// Parses a raw type string.
    ///
    /// An empty string parses to `mixed`.
    pub fn parse(input: &str) -> TypeExpr {
        let s = input.trim();

        if s.is_empty() {
            return TypeExpr::Named("mixed".to_string());
        }

        if let Some(rest) = s.strip_prefix('?') {
            return TypeExpr::Nullable(Box::new(Self::parse(rest)));
        }

        if let Some(rest) = s.strip_suffix("[]") {
            if !rest.trim().is_empty() {
                return TypeExpr::Array(Box::new(Self::parse(rest)));
            }
        }

        if let Some((base, inner)) = split_generic(s) {
            let args = split_top_level(inner, ',')
                .into_iter()
                .map(Self::parse)
                .collect();
            return TypeExpr::Generic {
                base: clean_name(base),
                args,
            };
        }

        let parts = split_top_level(s, '|');
        if parts.len() > 1 {
            return TypeExpr::Union(parts.into_iter().map(Self::parse).collect());
        }

        let parts = split_top_level(s, '&');
        if parts.len() > 1 {
            return TypeExpr::Intersection(parts.into_iter().map(Self::parse).collect());
        }

        TypeExpr::Named(clean_name(s))
    }

    /// Replaces `self`/`static` with the declaring class and `parent` with its
    /// superclass. `parent` stays literal when the class has no superclass.
    pub fn resolve_keywords(&self, ctx: &TypeContext<'_>) -> TypeExpr {
        match self {
            TypeExpr::Named(name) => {
                let lower = name.to_ascii_lowercase();
                if SELF_KEYWORDS.contains(&lower.as_str()) {
                    TypeExpr::Named(clean_name(ctx.class))
                } else if lower == PARENT_KEYWORD {
                    match ctx.parent {
                        Some(parent) => TypeExpr::Named(clean_name(parent)),
                        None => self.clone(),
                    }
                } else {
                    self.clone()
                }
            }
            TypeExpr::Nullable(inner) => TypeExpr::Nullable(Box::new(inner.resolve_keywords(ctx))),
            TypeExpr::Array(inner) => TypeExpr::Array(Box::new(inner.resolve_keywords(ctx))),
            TypeExpr::Generic { base, args } => TypeExpr::Generic {
                base: base.clone(),
                args: args.iter().map(|a| a.resolve_keywords(ctx)).collect(),
            },
            TypeExpr::Union(parts) => {
                TypeExpr::Union(parts.iter().map(|p| p.resolve_keywords(ctx)).collect())
            }
            TypeExpr::Intersection(parts) => {
                TypeExpr::Intersection(parts.iter().map(|p| p.resolve_keywords(ctx)).collect())
            }
        }
    }

    /// Whether any named leaf is `self`, `static` or `parent`.
    pub fn has_keywords(&self) -> bool {
        self.leaf_names().iter().any(|name| {
            let lower = name.to_ascii_lowercase();
            SELF_KEYWORDS.contains(&lower.as_str()) || lower == PARENT_KEYWORD
        })
    }

    /// Names of all leaves that are candidates for linking, in source order.
    ///
    /// Generic base names are not included.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Named(name) => out.push(name),
            TypeExpr::Nullable(inner) | TypeExpr::Array(inner) => inner.collect_leaves(out),
            TypeExpr::Generic { args, .. } => args.iter().for_each(|a| a.collect_leaves(out)),
            TypeExpr::Union(parts) | TypeExpr::Intersection(parts) => {
                parts.iter().for_each(|p| p.collect_leaves(out))
            }
        }
    }

    /// True for `?T` and for unions that contain `null`.
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeExpr::Nullable(_) => true,
            TypeExpr::Union(parts) => parts.iter().any(TypeExpr::is_null),
            _ => false,
        }
    }

    /// True for the `null` leaf.
    pub fn is_null(&self) -> bool {
        matches!(self, TypeExpr::Named(name) if name.eq_ignore_ascii_case("null"))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{}", name),
            TypeExpr::Nullable(inner) => write!(f, "?{}", inner),
            TypeExpr::Array(inner) => write!(f, "{}[]", inner),
            TypeExpr::Generic { base, args } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeExpr::Union(parts) => write_joined(f, parts, "|"),
            TypeExpr::Intersection(parts) => write_joined(f, parts, "&"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[TypeExpr], sep: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", part)?;
    }
    Ok(())
}

/// Resolves `self`/`static`/`parent` inside a raw type string.
///
/// The raw text is returned untouched (only trimmed) when it contains no
/// keyword, so declared spelling survives into the output.
pub fn resolve_type_string(raw: &str, ctx: &TypeContext<'_>) -> String {
    let expr = TypeExpr::parse(raw);
    if expr.has_keywords() {
        expr.resolve_keywords(ctx).to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Splits `Name<inner>` when the `<` after the name is closed by the final `>`.
fn split_generic(s: &str) -> Option<(&str, &str)> {
    if !s.ends_with('>') {
        return None;
    }

    let open = s.find('<')?;
    let base = s[..open].trim();
    if base.is_empty() || !base.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '\\') {
        return None;
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    // The first `<` closes before the end: `A<B>|C<D>` is not a generic.
                    if i != s.len() - 1 {
                        return None;
                    }
                }
            }
            _ => {}
        }
    }

    let inner = s[open + 1..s.len() - 1].trim();
    if inner.is_empty() {
        return None;
    }

    Some((base, inner))
}

/// Splits on `sep` outside of any `<...>` nesting.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());

    parts
}

fn clean_name(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> TypeExpr {
        TypeExpr::Named(name.to_string())
    }

    #[test]
    fn test_parse_bare_name() {
        assert_eq!(TypeExpr::parse("Product"), named("Product"));
        assert_eq!(TypeExpr::parse("  int "), named("int"));
    }

    #[test]
    fn test_parse_strips_leading_backslash() {
        assert_eq!(
            TypeExpr::parse("\\Examples\\Models\\User"),
            named("Examples\\Models\\User")
        );
    }

    #[test]
    fn test_parse_empty_is_mixed() {
        assert_eq!(TypeExpr::parse(""), named("mixed"));
        assert_eq!(TypeExpr::parse("   "), named("mixed"));
    }

    #[test]
    fn test_parse_nullable_array() {
        let expected = TypeExpr::Nullable(Box::new(TypeExpr::Array(Box::new(named("Product")))));
        assert_eq!(TypeExpr::parse("?Product[]"), expected);
    }

    #[test]
    fn test_parse_nested_array() {
        let expected = TypeExpr::Array(Box::new(TypeExpr::Array(Box::new(named("int")))));
        assert_eq!(TypeExpr::parse("int[][]"), expected);
    }

    #[test]
    fn test_parse_simple_generic() {
        let expected = TypeExpr::Generic {
            base: "Collection".to_string(),
            args: vec![named("User")],
        };
        assert_eq!(TypeExpr::parse("Collection<User>"), expected);
    }

    #[test]
    fn test_parse_generic_splits_top_level_commas_only() {
        let parsed = TypeExpr::parse("array<string, Collection<User>>");
        let expected = TypeExpr::Generic {
            base: "array".to_string(),
            args: vec![
                named("string"),
                TypeExpr::Generic {
                    base: "Collection".to_string(),
                    args: vec![named("User")],
                },
            ],
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_generic_with_nested_multi_arg() {
        let parsed = TypeExpr::parse("Map<string, Pair<int, User>>");
        match parsed {
            TypeExpr::Generic { base, args } => {
                assert_eq!(base, "Map");
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].leaf_names(), vec!["int", "User"]);
            }
            other => panic!("expected generic, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_union() {
        let expected = TypeExpr::Union(vec![named("string"), named("null")]);
        assert_eq!(TypeExpr::parse("string|null"), expected);
    }

    #[test]
    fn test_parse_union_of_generics_is_not_a_generic() {
        let parsed = TypeExpr::parse("Box<A>|Box<B>");
        let expected = TypeExpr::Union(vec![
            TypeExpr::Generic {
                base: "Box".to_string(),
                args: vec![named("A")],
            },
            TypeExpr::Generic {
                base: "Box".to_string(),
                args: vec![named("B")],
            },
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_union_inside_generic_stays_nested() {
        let parsed = TypeExpr::parse("array<int|string>");
        let expected = TypeExpr::Generic {
            base: "array".to_string(),
            args: vec![TypeExpr::Union(vec![named("int"), named("string")])],
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_intersection() {
        let expected = TypeExpr::Intersection(vec![named("Countable"), named("Traversable")]);
        assert_eq!(TypeExpr::parse("Countable&Traversable"), expected);
    }

    #[test]
    fn test_array_suffix_binds_before_union() {
        let expected = TypeExpr::Array(Box::new(TypeExpr::Union(vec![named("A"), named("B")])));
        assert_eq!(TypeExpr::parse("A|B[]"), expected);
    }

    #[test]
    fn test_parse_is_idempotent_on_canonical_form() {
        let inputs = [
            "?Product[]",
            "Collection<User>",
            "array<string, Collection<User>>",
            "int|string|null",
            "Countable&Traversable",
            "A|B[]",
            "array<int|string>",
            "Collection<User>[]",
            "Box<A>|Box<B>",
            "\\App\\Models\\User",
        ];

        for input in inputs {
            let first = TypeExpr::parse(input);
            let second = TypeExpr::parse(&first.to_string());
            assert_eq!(first, second, "round trip failed for {}", input);
        }
    }

    #[test]
    fn test_display_canonical_generic_spacing() {
        assert_eq!(
            TypeExpr::parse("array<string,int>").to_string(),
            "array<string, int>"
        );
    }

    #[test]
    fn test_resolve_self_and_static() {
        let ctx = TypeContext {
            class: "Examples\\Models\\Category",
            parent: None,
        };
        assert_eq!(
            TypeExpr::parse("self").resolve_keywords(&ctx),
            named("Examples\\Models\\Category")
        );
        assert_eq!(
            TypeExpr::parse("?static[]").resolve_keywords(&ctx).to_string(),
            "?Examples\\Models\\Category[]"
        );
    }

    #[test]
    fn test_resolve_parent_with_and_without_superclass() {
        let with_parent = TypeContext {
            class: "App\\Admin",
            parent: Some("App\\User"),
        };
        let without_parent = TypeContext {
            class: "App\\Admin",
            parent: None,
        };

        assert_eq!(TypeExpr::parse("parent").resolve_keywords(&with_parent), named("App\\User"));
        assert_eq!(TypeExpr::parse("parent").resolve_keywords(&without_parent), named("parent"));
    }

    #[test]
    fn test_resolve_type_string_keeps_raw_text_without_keywords() {
        let ctx = TypeContext {
            class: "App\\Node",
            parent: None,
        };
        assert_eq!(resolve_type_string("array<string,int>", &ctx), "array<string,int>");
        assert_eq!(resolve_type_string("Collection<self>", &ctx), "Collection<App\\Node>");
    }

    #[test]
    fn test_generic_base_is_not_a_leaf() {
        let parsed = TypeExpr::parse("Collection<User, Role>");
        assert_eq!(parsed.leaf_names(), vec!["User", "Role"]);
    }

    #[test]
    fn test_is_nullable() {
        assert!(TypeExpr::parse("?int").is_nullable());
        assert!(TypeExpr::parse("int|null").is_nullable());
        assert!(!TypeExpr::parse("int[]").is_nullable());
    }
}
