//! Type rendering and cross-linking.
//!
//! [`TypeRenderer`] walks a [`TypeExpr`] and turns it into a flat
//! [`TypeToken`] stream. Every named leaf is checked against the
//! [`TypeRegistry`] exactly once, in [`TypeRenderer::link_target`]; output
//! formats only decide how a link, a plain name or a symbol looks.
//!
//! ```
//! use apidoc_from_source::type_registry::TypeRegistry;
//! use apidoc_from_source::type_renderer::{PlainFormat, TypeRenderer};
//!
//! let registry = TypeRegistry::new();
//! let renderer = TypeRenderer::new(&registry);
//! assert_eq!(renderer.render_str("?array<string, int>", &PlainFormat), "?array<string, int>");
//! ```

use crate::type_expr::TypeExpr;
use crate::type_registry::{TypeInfo, TypeRegistry};

/// One piece of a rendered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeToken<'r> {
    /// A named leaf that resolves to a registered type
    Link(&'r TypeInfo),
    /// A named leaf that does not resolve (builtins, unknown classes)
    Name(String),
    /// The outer name of a generic, never linked
    GenericBase(String),
    /// Punctuation: `?`, `[]`, `<`, `>`, `, `, `|`, `&`
    Symbol(&'static str),
}

/// How tokens are written out for one output format.
pub trait TypeFormat {
    fn link(&self, info: &TypeInfo) -> String;
    fn name(&self, name: &str) -> String;
    fn symbol(&self, symbol: &str) -> String;

    fn generic_base(&self, base: &str) -> String {
        self.symbol(base)
    }
}

/// HTML: links become anchors, other names `type-builtin` spans.
pub struct HtmlFormat;

/// Markdown: names in backticks, links to the type's anchor. Pipes are
/// escaped so the result can sit inside a table cell.
pub struct MarkdownFormat;

/// Plain text, identical to the canonical type string with names shortened
/// for linked types.
pub struct PlainFormat;

impl TypeFormat for HtmlFormat {
    fn link(&self, info: &TypeInfo) -> String {
        format!(
            "<a href=\"{}\" class=\"type-link\" title=\"{}\">{}</a>",
            escape_html(&info.anchor()),
            escape_html(&info.description),
            escape_html(&info.short_name)
        )
    }

    fn name(&self, name: &str) -> String {
        format!("<span class=\"type-builtin\">{}</span>", escape_html(name))
    }

    fn symbol(&self, symbol: &str) -> String {
        escape_html(symbol)
    }
}

impl TypeFormat for MarkdownFormat {
    fn link(&self, info: &TypeInfo) -> String {
        format!("[`{}`]({})", info.short_name, info.anchor())
    }

    fn name(&self, name: &str) -> String {
        format!("`{}`", name)
    }

    fn symbol(&self, symbol: &str) -> String {
        match symbol {
            "|" => "\\|".to_string(),
            "<" => "&lt;".to_string(),
            ">" => "&gt;".to_string(),
            other => other.to_string(),
        }
    }

    fn generic_base(&self, base: &str) -> String {
        format!("`{}`", base)
    }
}

impl TypeFormat for PlainFormat {
    fn link(&self, info: &TypeInfo) -> String {
        info.short_name.clone()
    }

    fn name(&self, name: &str) -> String {
        name.to_string()
    }

    fn symbol(&self, symbol: &str) -> String {
        symbol.to_string()
    }
}

/// Renders type expressions against a registry.
#[derive(Clone, Copy)]
pub struct TypeRenderer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> TypeRenderer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// The link-or-plain decision for a single type name.
    ///
    /// Every output path (HTML, Markdown, OpenAPI schemas) goes through here.
    pub fn link_target(&self, name: &str) -> Option<&'r TypeInfo> {
        self.registry.resolve(name)
    }

    /// Flatten a type expression into tokens.
    pub fn tokens(&self, expr: &TypeExpr) -> Vec<TypeToken<'r>> {
        let mut tokens = Vec::new();
        self.push_tokens(expr, &mut tokens);
        tokens
    }

    fn push_tokens(&self, expr: &TypeExpr, out: &mut Vec<TypeToken<'r>>) {
        match expr {
            TypeExpr::Named(name) => out.push(match self.link_target(name) {
                Some(info) => TypeToken::Link(info),
                None => TypeToken::Name(name.clone()),
            }),
            TypeExpr::Nullable(inner) => {
                out.push(TypeToken::Symbol("?"));
                self.push_tokens(inner, out);
            }
            TypeExpr::Array(inner) => {
                self.push_tokens(inner, out);
                out.push(TypeToken::Symbol("[]"));
            }
            TypeExpr::Generic { base, args } => {
                out.push(TypeToken::GenericBase(base.clone()));
                out.push(TypeToken::Symbol("<"));
                self.push_joined(args, ", ", out);
                out.push(TypeToken::Symbol(">"));
            }
            TypeExpr::Union(parts) => self.push_joined(parts, "|", out),
            TypeExpr::Intersection(parts) => self.push_joined(parts, "&", out),
        }
    }

    fn push_joined(&self, parts: &[TypeExpr], sep: &'static str, out: &mut Vec<TypeToken<'r>>) {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push(TypeToken::Symbol(sep));
            }
            self.push_tokens(part, out);
        }
    }

    /// Render a parsed type in the given format.
    pub fn render(&self, expr: &TypeExpr, format: &dyn TypeFormat) -> String {
        self.tokens(expr)
            .iter()
            .map(|token| match token {
                TypeToken::Link(info) => format.link(info),
                TypeToken::Name(name) => format.name(name),
                TypeToken::GenericBase(base) => format.generic_base(base),
                TypeToken::Symbol(symbol) => format.symbol(symbol),
            })
            .collect()
    }

    /// Parse and render a raw type string.
    pub fn render_str(&self, raw: &str, format: &dyn TypeFormat) -> String {
        self.render(&TypeExpr::parse(raw), format)
    }

    pub fn html(&self, raw: &str) -> String {
        self.render_str(raw, &HtmlFormat)
    }

    pub fn markdown(&self, raw: &str) -> String {
        self.render_str(raw, &MarkdownFormat)
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
