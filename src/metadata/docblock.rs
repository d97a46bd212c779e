//! Docblock tag parsing.
//!
//! Handles `/** ... */` comments in the conventional layout: free-text
//! description first, then one `@tag` per line.
//!
//! Recognised tags:
//!
//! | Declaration | Tags |
//! |---|---|
//! | controller class | `@api-doc`, `@version`, `@tags`, `@deprecated` |
//! | documentable class | `@group` or `@documentable`, `@slug` |
//! | endpoint method | `@endpoint VERB /path [summary]`, `@param`, `@returns`/`@return`, `@status`, `@response`, `@deprecated` |
//! | property | `@var`, `@example`, `@deprecated` |
//! | type method | `@return`, `@example`, `@deprecated` |
//!
//! `@param` lines accept bracket directives after the description:
//! `[in:path]`, `[required]`, `[optional]`, `[example:42]`. They are removed
//! from the description text. When both `[required]` and `[optional]` appear,
//! the one written last wins.
//!
//! A tag that is present but incomplete (an `@endpoint` without a verb, a
//! `@response` without a status code) is ignored as if it were missing.

use crate::declaration::{ClassDecl, MethodDecl, ParamDecl, PropertyDecl};
use crate::metadata::{
    ClassMeta, EndpointMeta, MetadataSource, MethodMeta, ParamMeta, PropertyMeta, ResponseMeta,
    ReturnsMeta, TypeMeta,
};
use crate::model::{HttpMethod, ParamLocation};
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// `@param Type $name rest`, `@param $name rest`, variadics as `...$name`
static RE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\S+)\s+)?(?:\.\.\.)?\$(\w+)(.*)$").unwrap());

// `VERB /path summary`, any whitespace between the parts
static RE_ENDPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s*(.*)$").unwrap());

static RE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:(in|example|type):((?:[^\[\]]|\[[^\[\]]*\])*)|(required|optional))\]").unwrap()
});

static RE_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@status\s+(\d{3})\b").unwrap());

static RE_RESPONSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})\b\s*(.*)$").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reads metadata from doc comments.
pub struct DocblockSource;

/// A parsed doc comment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Docblock {
    /// Text before the first tag line
    pub description: String,
    /// `(tag, rest)` pairs in source order, tag without the `@`
    pub tags: Vec<(String, String)>,
}

impl Docblock {
    /// Parses a raw comment, delimiters included.
    pub fn parse(raw: &str) -> Self {
        let mut description = Vec::new();
        let mut tags = Vec::new();
        let mut in_description = true;

        for line in comment_lines(raw) {
            let trimmed = line.trim();
            if let Some(tag_line) = trimmed.strip_prefix('@') {
                in_description = false;
                let (tag, rest) = match tag_line.find(char::is_whitespace) {
                    Some(pos) => (&tag_line[..pos], tag_line[pos..].trim()),
                    None => (tag_line, ""),
                };
                if !tag.is_empty() {
                    tags.push((tag.to_ascii_lowercase(), rest.to_string()));
                }
            } else if in_description {
                description.push(line);
            }
        }

        Docblock {
            description: description.join("\n").trim().to_string(),
            tags,
        }
    }

    /// Whether the tag occurs at least once.
    pub fn has(&self, tag: &str) -> bool {
        self.tags.iter().any(|(t, _)| t == tag)
    }

    /// Text of the first occurrence of `tag`.
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, rest)| rest.as_str())
    }

    /// Text of every occurrence of `tag`.
    pub fn all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |(t, _)| t == tag)
            .map(|(_, rest)| rest.as_str())
    }

    fn is_empty(&self) -> bool {
        self.description.is_empty() && self.tags.is_empty()
    }
}

/// Strips comment delimiters and leading `*` markers.
///
/// Each line loses its leading whitespace, one `*` and one following space.
fn comment_lines(raw: &str) -> Vec<&str> {
    let inner = raw.trim();
    let inner = inner.strip_prefix("/**").or_else(|| inner.strip_prefix("/*")).unwrap_or(inner);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            let line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end()
        })
        .collect()
}

fn docblock(raw: &Option<String>) -> Option<Docblock> {
    raw.as_deref().map(Docblock::parse)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Decodes a directive or `@example` value: JSON when it parses, else text.
fn example_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Collapses whitespace left behind by removed directives.
fn tidy(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").to_string()
}

/// Parses the text after `$name` on a `@param` line.
fn param_directives(type_name: Option<&str>, rest: &str) -> ParamMeta {
    let mut meta = ParamMeta {
        type_name: type_name.map(str::to_string),
        ..Default::default()
    };

    for caps in RE_DIRECTIVE.captures_iter(rest) {
        if let Some(flag) = caps.get(3) {
            meta.required = Some(flag.as_str() == "required");
            continue;
        }
        let value = caps.get(2).map(|v| v.as_str().trim()).unwrap_or_default();
        match caps.get(1).map(|k| k.as_str()) {
            Some("in") => {
                meta.location = ParamLocation::parse(value);
                if meta.location.is_none() {
                    debug!("Unknown parameter location directive: {}", value);
                }
            }
            Some("example") => meta.example = Some(example_value(value)),
            _ => {}
        }
    }

    meta.description = tidy(&RE_DIRECTIVE.replace_all(rest, ""));
    meta
}

/// Splits `Type description @status 201` into its parts.
fn returns_line(rest: &str, status_tag: Option<&str>) -> Option<ReturnsMeta> {
    let type_name = first_token(rest)?;
    if type_name.starts_with('@') {
        return None;
    }
    let remainder = rest[rest.find(type_name).unwrap_or(0) + type_name.len()..].trim();

    let inline_status = RE_STATUS
        .captures(remainder)
        .and_then(|caps| caps[1].parse::<u16>().ok());
    let tagged_status = status_tag
        .and_then(first_token)
        .and_then(|code| code.parse::<u16>().ok());

    Some(ReturnsMeta {
        type_name: type_name.to_string(),
        description: tidy(&RE_STATUS.replace_all(remainder, "")),
        status_code: inline_status.or(tagged_status).unwrap_or(200),
    })
}

impl MetadataSource for DocblockSource {
    fn name(&self) -> &'static str {
        "docblock"
    }

    fn class_meta(&self, class: &ClassDecl) -> Option<ClassMeta> {
        let doc = docblock(&class.doc_comment)?;
        if !doc.has("api-doc") {
            return None;
        }

        let tags = doc
            .all("tags")
            .flat_map(|list| list.split(|c: char| c == ',' || c.is_whitespace()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Some(ClassMeta {
            description: doc.description.clone(),
            version: doc.first("version").and_then(first_token).map(str::to_string),
            tags,
            deprecated: doc.has("deprecated"),
        })
    }

    fn type_meta(&self, class: &ClassDecl) -> Option<TypeMeta> {
        let doc = docblock(&class.doc_comment)?;
        if !doc.has("group") && !doc.has("documentable") {
            return None;
        }

        Some(TypeMeta {
            description: doc.description.clone(),
            slug: doc.first("slug").and_then(first_token).map(str::to_string),
            group: doc.first("group").and_then(non_empty),
        })
    }

    fn endpoint_meta(&self, method: &MethodDecl) -> Option<EndpointMeta> {
        let doc = docblock(&method.doc_comment)?;
        let line = doc.first("endpoint")?;

        let Some(caps) = RE_ENDPOINT.captures(line) else {
            debug!("Malformed @endpoint on {}: '{}'", method.name, line);
            return None;
        };
        let verb = caps.get(1).map_or("", |m| m.as_str());
        let path = caps.get(2).map_or("", |m| m.as_str());
        let summary = caps.get(3).map_or("", |m| m.as_str());

        let Some(http_method) = HttpMethod::parse(verb) else {
            debug!("Malformed @endpoint on {}: bad verb in '{}'", method.name, line);
            return None;
        };
        if !path.starts_with('/') {
            debug!("Malformed @endpoint on {}: bad path in '{}'", method.name, line);
            return None;
        }

        let description = non_empty(&doc.description);
        let summary = match non_empty(summary) {
            Some(summary) => summary,
            None => description
                .as_deref()
                .and_then(|d| d.lines().next())
                .unwrap_or_default()
                .to_string(),
        };

        Some(EndpointMeta {
            method: http_method,
            path: path.to_string(),
            summary,
            description,
            deprecated: doc.has("deprecated"),
        })
    }

    fn param_meta(&self, method: &MethodDecl, param: &ParamDecl) -> Option<ParamMeta> {
        let doc = docblock(&method.doc_comment)?;

        let meta = doc.all("param").find_map(|line| {
            let caps = RE_PARAM.captures(line)?;
            if caps[2] != param.name {
                return None;
            }
            let type_name = caps.get(1).map(|m| m.as_str());
            Some(param_directives(type_name, &caps[3]))
        });
        meta
    }

    fn returns_meta(&self, method: &MethodDecl) -> Option<ReturnsMeta> {
        let doc = docblock(&method.doc_comment)?;
        let line = doc.first("returns").or_else(|| doc.first("return"))?;
        returns_line(line, doc.first("status"))
    }

    fn responses_meta(&self, method: &MethodDecl) -> Vec<ResponseMeta> {
        let Some(doc) = docblock(&method.doc_comment) else {
            return Vec::new();
        };

        doc.all("response")
            .filter_map(|line| {
                let Some(caps) = RE_RESPONSE.captures(line) else {
                    debug!("Malformed @response on {}: '{}'", method.name, line);
                    return None;
                };
                let status_code = caps[1].parse::<u16>().ok()?;
                let rest = &caps[2];

                let type_name = RE_DIRECTIVE.captures_iter(rest).find_map(|c| {
                    (c.get(1)?.as_str() == "type").then(|| c[2].trim().to_string())
                });

                Some(ResponseMeta {
                    status_code,
                    description: tidy(&RE_DIRECTIVE.replace_all(rest, "")),
                    type_name: type_name.filter(|t| !t.is_empty()),
                })
            })
            .collect()
    }

    fn property_meta(&self, property: &PropertyDecl) -> Option<PropertyMeta> {
        let doc = docblock(&property.doc_comment)?;
        if doc.is_empty() {
            return None;
        }

        Some(PropertyMeta {
            type_name: doc.first("var").and_then(first_token).map(str::to_string),
            description: doc.description.clone(),
            example: doc.first("example").map(example_value),
            deprecated: doc.has("deprecated"),
        })
    }

    fn method_meta(&self, method: &MethodDecl) -> Option<MethodMeta> {
        let doc = docblock(&method.doc_comment)?;
        if doc.is_empty() {
            return None;
        }

        let returns = doc
            .first("return")
            .or_else(|| doc.first("returns"))
            .and_then(|line| returns_line(line, None));

        Some(MethodMeta {
            description: doc.description.clone(),
            return_type: returns.as_ref().map(|r| r.type_name.clone()),
            return_description: returns.and_then(|r| non_empty(&r.description)),
            example: doc.first("example").and_then(non_empty),
            deprecated: doc.has("deprecated"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn method(doc: &str) -> MethodDecl {
        MethodDecl {
            name: "show".to_string(),
            doc_comment: Some(doc.to_string()),
            ..Default::default()
        }
    }

    fn param(name: &str) -> ParamDecl {
        ParamDecl {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_description_stops_at_first_tag() {
        let doc = Docblock::parse(
            "/**\n * Represents a registered user\n * in the system\n *\n * @group Core\n * trailing text\n */",
        );
        assert_eq!(doc.description, "Represents a registered user\nin the system");
        assert_eq!(doc.first("group"), Some("Core"));
        assert_eq!(doc.tags.len(), 1);
    }

    #[test]
    fn test_single_line_docblock() {
        let doc = Docblock::parse("/** @var Roles[] */");
        assert_eq!(doc.description, "");
        assert_eq!(doc.first("var"), Some("Roles[]"));
    }

    #[test]
    fn test_class_meta_requires_marker() {
        let unmarked = ClassDecl {
            name: "App\\Thing".to_string(),
            doc_comment: Some("/** Just a class */".to_string()),
            ..Default::default()
        };
        assert!(DocblockSource.class_meta(&unmarked).is_none());

        let marked = ClassDecl {
            name: "App\\OrderController".to_string(),
            doc_comment: Some(
                "/**\n * Order management\n *\n * @api-doc\n * @version 2.1\n * @tags orders, shop\n * @deprecated\n */"
                    .to_string(),
            ),
            ..Default::default()
        };
        let meta = DocblockSource.class_meta(&marked).unwrap();
        assert_eq!(meta.description, "Order management");
        assert_eq!(meta.version.as_deref(), Some("2.1"));
        assert_eq!(meta.tags, vec!["orders", "shop"]);
        assert!(meta.deprecated);
    }

    #[test]
    fn test_type_meta_from_group_tag() {
        let class = ClassDecl {
            name: "Examples\\Models\\Product".to_string(),
            doc_comment: Some("/**\n * A product in the catalog\n *\n * @group Shop\n */".to_string()),
            ..Default::default()
        };
        let meta = DocblockSource.type_meta(&class).unwrap();
        assert_eq!(meta.description, "A product in the catalog");
        assert_eq!(meta.group.as_deref(), Some("Shop"));
        assert_eq!(meta.slug, None);
    }

    #[test]
    fn test_type_meta_without_marker_is_absent() {
        let class = ClassDecl {
            name: "App\\Helper".to_string(),
            doc_comment: Some("/** Internal helper */".to_string()),
            ..Default::default()
        };
        assert!(DocblockSource.type_meta(&class).is_none());
    }

    #[test]
    fn test_endpoint_tag() {
        let meta = DocblockSource
            .endpoint_meta(&method(
                "/**\n * Fetch one product.\n *\n * @endpoint get /products/{id} Get product details\n */",
            ))
            .unwrap();

        assert_eq!(meta.method, HttpMethod::Get);
        assert_eq!(meta.path, "/products/{id}");
        assert_eq!(meta.summary, "Get product details");
        assert_eq!(meta.description.as_deref(), Some("Fetch one product."));
    }

    #[test]
    fn test_endpoint_summary_falls_back_to_description() {
        let meta = DocblockSource
            .endpoint_meta(&method("/**\n * List products\n * @endpoint GET /products\n */"))
            .unwrap();
        assert_eq!(meta.summary, "List products");
    }

    #[test]
    fn test_malformed_endpoint_is_absent() {
        assert!(DocblockSource
            .endpoint_meta(&method("/** @endpoint /products */"))
            .is_none());
        assert!(DocblockSource
            .endpoint_meta(&method("/** @endpoint GET */"))
            .is_none());
        assert!(DocblockSource.endpoint_meta(&method("/** @endpoint */")).is_none());
    }

    #[test]
    fn test_endpoint_tag_with_aligned_columns() {
        let meta = DocblockSource
            .endpoint_meta(&method("/** @endpoint GET   /products    List all */"))
            .unwrap();
        assert_eq!(meta.path, "/products");
        assert_eq!(meta.summary, "List all");

        let meta = DocblockSource
            .endpoint_meta(&method("/**\n * @endpoint DELETE\t/products/{id}\n */"))
            .unwrap();
        assert_eq!(meta.method, HttpMethod::Delete);
        assert_eq!(meta.path, "/products/{id}");
    }

    #[test]
    fn test_param_directives() {
        let m = method(
            "/**\n * @param int $id The product [in:path] [required] [example:101] identifier\n */",
        );
        let meta = DocblockSource.param_meta(&m, &param("id")).unwrap();

        assert_eq!(meta.type_name.as_deref(), Some("int"));
        assert_eq!(meta.description, "The product identifier");
        assert_eq!(meta.location, Some(ParamLocation::Path));
        assert_eq!(meta.required, Some(true));
        assert_eq!(meta.example, Some(json!(101)));
    }

    #[test]
    fn test_param_required_then_optional_last_wins() {
        let m = method("/**\n * @param string $q Search [required] [optional]\n */");
        let meta = DocblockSource.param_meta(&m, &param("q")).unwrap();
        assert_eq!(meta.required, Some(false));

        let m = method("/**\n * @param string $q Search [optional] [required]\n */");
        let meta = DocblockSource.param_meta(&m, &param("q")).unwrap();
        assert_eq!(meta.required, Some(true));
    }

    #[test]
    fn test_param_without_directives_leaves_required_unset() {
        let m = method("/**\n * @param ?string $name Display name\n */");
        let meta = DocblockSource.param_meta(&m, &param("name")).unwrap();
        assert_eq!(meta.required, None);
        assert_eq!(meta.location, None);
        assert_eq!(meta.type_name.as_deref(), Some("?string"));
    }

    #[test]
    fn test_param_matches_exact_name() {
        let m = method("/**\n * @param int $idx Index\n * @param int $id Identifier\n */");
        let meta = DocblockSource.param_meta(&m, &param("id")).unwrap();
        assert_eq!(meta.description, "Identifier");
        assert!(DocblockSource.param_meta(&m, &param("missing")).is_none());
    }

    #[test]
    fn test_param_example_array_value() {
        let m = method("/**\n * @param int[] $ids Ids [example:[1,2]] to load\n */");
        let meta = DocblockSource.param_meta(&m, &param("ids")).unwrap();
        assert_eq!(meta.example, Some(json!([1, 2])));
        assert_eq!(meta.description, "Ids to load");
    }

    #[test]
    fn test_variadic_param() {
        let m = method("/**\n * @param int ...$ids Identifiers [in:query]\n */");
        let meta = DocblockSource.param_meta(&m, &param("ids")).unwrap();
        assert_eq!(meta.type_name.as_deref(), Some("int"));
        assert_eq!(meta.description, "Identifiers");
        assert_eq!(meta.location, Some(ParamLocation::Query));
    }

    #[test]
    fn test_param_example_string_value() {
        let m = method("/**\n * @param string $email Email [example:jane@example.com]\n */");
        let meta = DocblockSource.param_meta(&m, &param("email")).unwrap();
        assert_eq!(meta.example, Some(json!("jane@example.com")));
    }

    #[test]
    fn test_returns_with_inline_status() {
        let meta = DocblockSource
            .returns_meta(&method("/**\n * @returns User The created user @status 201\n */"))
            .unwrap();
        assert_eq!(meta.type_name, "User");
        assert_eq!(meta.description, "The created user");
        assert_eq!(meta.status_code, 201);
    }

    #[test]
    fn test_return_tag_defaults_to_200() {
        let meta = DocblockSource
            .returns_meta(&method("/**\n * @return PaginatedResult<User>\n */"))
            .unwrap();
        assert_eq!(meta.type_name, "PaginatedResult<User>");
        assert_eq!(meta.description, "");
        assert_eq!(meta.status_code, 200);
    }

    #[test]
    fn test_returns_with_separate_status_tag() {
        let meta = DocblockSource
            .returns_meta(&method("/**\n * @returns Product\n * @status 202\n */"))
            .unwrap();
        assert_eq!(meta.status_code, 202);
    }

    #[test]
    fn test_responses() {
        let responses = DocblockSource.responses_meta(&method(
            "/**\n * @response 404 Product not found\n * @response 422 Validation failed [type:ValidationError]\n * @response oops\n */",
        ));

        assert_eq!(
            responses,
            vec![
                ResponseMeta {
                    status_code: 404,
                    description: "Product not found".to_string(),
                    type_name: None,
                },
                ResponseMeta {
                    status_code: 422,
                    description: "Validation failed".to_string(),
                    type_name: Some("ValidationError".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_property_meta() {
        let property = PropertyDecl {
            name: "price".to_string(),
            doc_comment: Some(
                "/**\n * Old field, use priceInCents instead\n * @var float|null\n * @example 49.99\n * @deprecated Use priceInCents instead\n */"
                    .to_string(),
            ),
            ..Default::default()
        };

        let meta = DocblockSource.property_meta(&property).unwrap();
        assert_eq!(meta.description, "Old field, use priceInCents instead");
        assert_eq!(meta.type_name.as_deref(), Some("float|null"));
        assert_eq!(meta.example, Some(json!(49.99)));
        assert!(meta.deprecated);
    }

    #[test]
    fn test_property_example_quoted_string() {
        let property = PropertyDecl {
            name: "name".to_string(),
            doc_comment: Some("/**\n * Name\n * @example \"Wireless Keyboard\"\n */".to_string()),
            ..Default::default()
        };
        let meta = DocblockSource.property_meta(&property).unwrap();
        assert_eq!(meta.example, Some(json!("Wireless Keyboard")));
    }

    #[test]
    fn test_empty_property_comment_is_absent() {
        let property = PropertyDecl {
            name: "x".to_string(),
            doc_comment: Some("/** */".to_string()),
            ..Default::default()
        };
        assert!(DocblockSource.property_meta(&property).is_none());
    }

    #[test]
    fn test_method_meta() {
        let meta = DocblockSource
            .method_meta(&method(
                "/**\n * Get the category itself\n *\n * @return Category The same instance\n * @example $category->getCategory()\n */",
            ))
            .unwrap();

        assert_eq!(meta.description, "Get the category itself");
        assert_eq!(meta.return_type.as_deref(), Some("Category"));
        assert_eq!(meta.return_description.as_deref(), Some("The same instance"));
        assert_eq!(meta.example.as_deref(), Some("$category->getCategory()"));
        assert!(!meta.deprecated);
    }
}
