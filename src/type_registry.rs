use crate::declaration::{short_name, Accessibility, ClassDecl, MethodDecl, PropertyDecl};
use crate::metadata::MetadataReader;
use crate::model::slugify;
use crate::type_expr::{resolve_type_string, TypeContext};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Group assigned to documentable types that do not name one
pub const DEFAULT_GROUP: &str = "Models";

/// Type registry - the documentable types that type strings may link to
pub struct TypeRegistry {
    /// Reads documentation metadata off class members
    reader: MetadataReader,
    /// Registered types in registration order
    types: Vec<TypeInfo>,
    /// Fully-qualified name -> position in `types`
    index: HashMap<String, usize>,
}

/// A registered documentable type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInfo {
    /// Fully-qualified name, the registry key
    pub fqcn: String,
    /// Name without namespace
    pub short_name: String,
    /// URL-safe anchor key
    pub slug: String,
    /// Category label used to group types in the output
    pub group: String,
    pub description: String,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
}

/// A documented property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyInfo {
    pub name: String,
    /// Raw type string
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub description: String,
    pub example: Option<Value>,
    pub deprecated: bool,
    pub accessibility: Accessibility,
}

/// A documented method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub description: String,
    pub parameters: Vec<MethodParamInfo>,
    pub return_type: Option<String>,
    pub return_description: Option<String>,
    pub example: Option<String>,
    pub deprecated: bool,
    pub is_static: bool,
    pub accessibility: Accessibility,
}

/// A parameter of a documented method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodParamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub has_default: bool,
    pub default: Value,
}

impl TypeInfo {
    /// In-page anchor, e.g. `#type-paginated-result`
    pub fn anchor(&self) -> String {
        format!("#type-{}", self.slug)
    }

    /// Standalone documentation URL
    pub fn url(&self) -> String {
        format!("/docs/types/{}", self.slug)
    }
}

impl TypeRegistry {
    /// Create an empty registry reading attributes first, then docblocks
    pub fn new() -> Self {
        Self::with_reader(MetadataReader::new())
    }

    /// Create an empty registry with a custom metadata reader
    pub fn with_reader(reader: MetadataReader) -> Self {
        debug!("Initializing TypeRegistry");
        Self {
            reader,
            types: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a class as a documentable type.
    ///
    /// Classes without a documentable marker are skipped and `None` is
    /// returned. Registering the same fully-qualified name again replaces the
    /// earlier entry but keeps its position.
    pub fn register(&mut self, class: &ClassDecl) -> Option<&TypeInfo> {
        let fqcn = class.name.trim_start_matches('\\').to_string();
        debug!("Registering type: {}", fqcn);

        let Some(meta) = self.reader.type_meta(class) else {
            debug!("{} has no documentable marker, skipping", fqcn);
            return None;
        };

        let short = short_name(&fqcn).to_string();
        let slug = meta.slug.unwrap_or_else(|| slugify(&short));

        for existing in self.types.iter().filter(|t| t.fqcn != fqcn) {
            if existing.short_name == short {
                warn!(
                    "Short name {} is ambiguous ({} and {}), resolving to the first registration",
                    short, existing.fqcn, fqcn
                );
            }
            if existing.slug == slug {
                warn!("Slug '{}' of {} is already used by {}", slug, fqcn, existing.fqcn);
            }
        }

        let info = TypeInfo {
            properties: self.extract_properties(class),
            methods: self.extract_methods(class),
            fqcn: fqcn.clone(),
            short_name: short,
            slug,
            group: meta.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            description: meta.description,
        };

        debug!(
            "Registered {} with {} properties and {} methods",
            fqcn,
            info.properties.len(),
            info.methods.len()
        );

        let pos = match self.index.get(&fqcn) {
            Some(&pos) => {
                debug!("Replacing previous registration of {}", fqcn);
                self.types[pos] = info;
                pos
            }
            None => {
                self.index.insert(fqcn, self.types.len());
                self.types.push(info);
                self.types.len() - 1
            }
        };

        self.types.get(pos)
    }

    /// Resolve a type name to its registration.
    ///
    /// An exact fully-qualified match wins; otherwise the first registered
    /// type with that short name is returned.
    pub fn resolve(&self, name: &str) -> Option<&TypeInfo> {
        let name = name.trim().trim_start_matches('\\');
        if let Some(&pos) = self.index.get(name) {
            return self.types.get(pos);
        }
        self.types.iter().find(|t| t.short_name == name)
    }

    /// Find a type by its slug
    pub fn resolve_slug(&self, slug: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.slug == slug)
    }

    /// Whether `name` refers to a registered type
    pub fn is_linkable(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// All registered types in registration order
    pub fn all(&self) -> &[TypeInfo] {
        &self.types
    }

    /// Registered types by group, groups sorted ascending
    pub fn all_grouped(&self) -> BTreeMap<&str, Vec<&TypeInfo>> {
        let mut grouped: BTreeMap<&str, Vec<&TypeInfo>> = BTreeMap::new();
        for info in &self.types {
            grouped.entry(info.group.as_str()).or_default().push(info);
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Extract non-static properties with their documentation
    fn extract_properties(&self, class: &ClassDecl) -> Vec<PropertyInfo> {
        let ctx = context_of(class);
        class
            .properties
            .iter()
            .filter(|p| !p.is_static)
            .map(|p| self.extract_property(p, &ctx))
            .collect()
    }

    fn extract_property(&self, property: &PropertyDecl, ctx: &TypeContext<'_>) -> PropertyInfo {
        debug!("Extracting property: {}", property.name);
        let meta = self.reader.property_meta(property).unwrap_or_default();

        let raw_type = meta
            .type_name
            .as_deref()
            .or(property.declared_type.as_deref())
            .unwrap_or("mixed");

        PropertyInfo {
            name: property.name.clone(),
            type_name: resolve_type_string(raw_type, ctx),
            nullable: property.declared_type.is_none() || property.nullable,
            description: meta.description,
            example: meta.example,
            deprecated: meta.deprecated,
            accessibility: property.visibility,
        }
    }

    /// Extract methods, skipping constructors and other magic methods
    fn extract_methods(&self, class: &ClassDecl) -> Vec<MethodInfo> {
        let ctx = context_of(class);
        class
            .methods
            .iter()
            .filter(|m| {
                if m.is_magic() {
                    debug!("Skipping magic method {}", m.name);
                    return false;
                }
                true
            })
            .map(|m| self.extract_method(m, &ctx))
            .collect()
    }

    fn extract_method(&self, method: &MethodDecl, ctx: &TypeContext<'_>) -> MethodInfo {
        debug!("Extracting method: {}", method.name);
        let meta = self.reader.method_meta(method).unwrap_or_default();

        let parameters = method
            .parameters
            .iter()
            .map(|p| {
                let doc_type = self
                    .reader
                    .param_meta(method, p)
                    .and_then(|m| m.type_name);
                let raw_type = doc_type
                    .as_deref()
                    .or(p.declared_type.as_deref())
                    .unwrap_or("mixed");

                MethodParamInfo {
                    name: p.name.clone(),
                    type_name: resolve_type_string(raw_type, ctx),
                    nullable: p.declared_type.is_none() || p.nullable,
                    has_default: p.has_default,
                    default: p.default.clone(),
                }
            })
            .collect();

        let return_type = meta
            .return_type
            .as_deref()
            .or(method.return_type.as_deref())
            .map(|t| resolve_type_string(t, ctx));

        MethodInfo {
            name: method.name.clone(),
            description: meta.description,
            parameters,
            return_type,
            return_description: meta.return_description,
            example: meta.example,
            deprecated: meta.deprecated,
            is_static: method.is_static,
            accessibility: method.visibility,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn context_of(class: &ClassDecl) -> TypeContext<'_> {
    TypeContext {
        class: &class.name,
        parent: class.parent.as_deref(),
    }
}
