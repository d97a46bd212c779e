//! Documentation metadata extraction.
//!
//! A declaration can be documented in two ways: with structured attributes
//! (typed fields) or with docblock tags (free text). Both are read through the
//! [`MetadataSource`] trait and produce the same record types, so the
//! generator and the registry never care which one was used.
//!
//! # Sources
//!
//! - **Attributes**: See [`attribute::AttributeSource`]
//! - **Docblocks**: See [`docblock::DocblockSource`]
//!
//! [`MetadataReader`] queries the sources in precedence order (attributes
//! first) and merges type refinements from later sources.
//!
//! # Example
//!
//! ```
//! use apidoc_from_source::declaration::ClassDecl;
//! use apidoc_from_source::metadata::MetadataReader;
//!
//! let class = ClassDecl {
//!     name: "App\\Controllers\\UserController".to_string(),
//!     doc_comment: Some("/**\n * Manage users\n * @api-doc\n */".to_string()),
//!     ..Default::default()
//! };
//! let meta = MetadataReader::new().class_meta(&class).unwrap();
//! assert_eq!(meta.description, "Manage users");
//! ```

pub mod attribute;
pub mod docblock;

use crate::declaration::{ClassDecl, MethodDecl, ParamDecl, PropertyDecl};
use crate::model::{HttpMethod, ParamLocation};
use log::debug;
use serde_json::Value;

/// Something that can read documentation metadata off declarations.
///
/// Every method returns `None` (or an empty list) when the declaration
/// carries nothing this source recognises, including malformed entries.
pub trait MetadataSource {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Controller-level metadata. Requires an API surface marker.
    fn class_meta(&self, class: &ClassDecl) -> Option<ClassMeta>;

    /// Documentable-type metadata. Requires a documentable marker.
    fn type_meta(&self, class: &ClassDecl) -> Option<TypeMeta>;

    /// HTTP method and path of an endpoint.
    fn endpoint_meta(&self, method: &MethodDecl) -> Option<EndpointMeta>;

    /// Documentation of one parameter of `method`.
    fn param_meta(&self, method: &MethodDecl, param: &ParamDecl) -> Option<ParamMeta>;

    /// The documented successful return value.
    fn returns_meta(&self, method: &MethodDecl) -> Option<ReturnsMeta>;

    /// Additional documented responses, in declaration order.
    fn responses_meta(&self, method: &MethodDecl) -> Vec<ResponseMeta>;

    /// Documentation of a property of a documentable type.
    fn property_meta(&self, property: &PropertyDecl) -> Option<PropertyMeta>;

    /// Documentation of a method of a documentable type.
    fn method_meta(&self, method: &MethodDecl) -> Option<MethodMeta>;
}

/// Controller-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMeta {
    pub description: String,
    pub version: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
}

/// Documentable-type metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMeta {
    pub description: String,
    pub slug: Option<String>,
    pub group: Option<String>,
}

/// Endpoint metadata. Only produced when both verb and path are valid.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMeta {
    pub method: HttpMethod,
    pub path: String,
    pub summary: String,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// Parameter metadata.
///
/// `required` and `location` stay `None` unless set explicitly; the caller
/// applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMeta {
    pub type_name: Option<String>,
    pub description: String,
    pub required: Option<bool>,
    pub example: Option<Value>,
    pub location: Option<ParamLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsMeta {
    pub type_name: String,
    pub description: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status_code: u16,
    pub description: String,
    pub type_name: Option<String>,
}

/// Property metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMeta {
    pub type_name: Option<String>,
    pub description: String,
    pub example: Option<Value>,
    pub deprecated: bool,
}

/// Method metadata (documentable types, not endpoints).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodMeta {
    pub description: String,
    pub return_type: Option<String>,
    pub return_description: Option<String>,
    pub example: Option<String>,
    pub deprecated: bool,
}

/// Reads metadata through an ordered list of sources.
///
/// The first source that recognises a declaration supplies the record.
/// Type strings are the exception: when the winning record has no type,
/// the next source that has one fills it in (a docblock `@param`/`@var`
/// refining an attribute-documented declaration).
pub struct MetadataReader {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl MetadataReader {
    /// Attributes first, docblocks second.
    pub fn new() -> Self {
        Self::with_sources(vec![
            Box::new(attribute::AttributeSource),
            Box::new(docblock::DocblockSource),
        ])
    }

    /// Uses the given sources, highest precedence first.
    pub fn with_sources(sources: Vec<Box<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    fn first<T>(&self, what: &str, read: impl Fn(&dyn MetadataSource) -> Option<T>) -> Option<T> {
        for source in &self.sources {
            if let Some(found) = read(source.as_ref()) {
                debug!("{} metadata read from {}", what, source.name());
                return Some(found);
            }
        }
        None
    }

    pub fn class_meta(&self, class: &ClassDecl) -> Option<ClassMeta> {
        self.first("Class", |s| s.class_meta(class))
    }

    pub fn type_meta(&self, class: &ClassDecl) -> Option<TypeMeta> {
        self.first("Type", |s| s.type_meta(class))
    }

    pub fn endpoint_meta(&self, method: &MethodDecl) -> Option<EndpointMeta> {
        self.first("Endpoint", |s| s.endpoint_meta(method))
    }

    pub fn param_meta(&self, method: &MethodDecl, param: &ParamDecl) -> Option<ParamMeta> {
        let mut found = self.sources.iter().filter_map(|s| s.param_meta(method, param));
        let mut meta = found.next()?;
        if meta.type_name.is_none() {
            meta.type_name = found.find_map(|m| m.type_name);
        }
        Some(meta)
    }

    pub fn returns_meta(&self, method: &MethodDecl) -> Option<ReturnsMeta> {
        self.first("Returns", |s| s.returns_meta(method))
    }

    pub fn responses_meta(&self, method: &MethodDecl) -> Vec<ResponseMeta> {
        self.sources
            .iter()
            .map(|s| s.responses_meta(method))
            .find(|responses| !responses.is_empty())
            .unwrap_or_default()
    }

    pub fn property_meta(&self, property: &PropertyDecl) -> Option<PropertyMeta> {
        let mut found = self.sources.iter().filter_map(|s| s.property_meta(property));
        let mut meta = found.next()?;
        if meta.type_name.is_none() {
            meta.type_name = found.find_map(|m| m.type_name);
        }
        Some(meta)
    }

    pub fn method_meta(&self, method: &MethodDecl) -> Option<MethodMeta> {
        let mut found = self.sources.iter().filter_map(|s| s.method_meta(method));
        let mut meta = found.next()?;
        if meta.return_type.is_none() {
            if let Some(later) = found.find(|m| m.return_type.is_some()) {
                meta.return_type = later.return_type;
                if meta.return_description.is_none() {
                    meta.return_description = later.return_description;
                }
            }
        }
        Some(meta)
    }
}

impl Default for MetadataReader {
    fn default() -> Self {
        Self::new()
    }
}
