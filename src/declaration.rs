//! Declarations the documentation pipeline reads from.
//!
//! The generator never inspects source code itself. It is handed class
//! declarations (as produced by some external introspection step and stored
//! in a manifest) through the [`DeclarationSource`] trait. Each declaration
//! carries its raw doc comment and its structured attributes side by side so
//! that the metadata reader can pick either one.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Visibility of a property or method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Accessibility {
    /// Lowercase keyword, e.g. `public`
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Protected => "protected",
            Accessibility::Private => "private",
        }
    }

    /// Capitalized label, e.g. `Public`
    pub fn label(&self) -> &'static str {
        match self {
            Accessibility::Public => "Public",
            Accessibility::Protected => "Protected",
            Accessibility::Private => "Private",
        }
    }
}

/// A structured attribute attached to a declaration.
///
/// These are the typed counterparts of docblock tags. Field defaults follow
/// the attribute constructors they mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// Marks a class as an API controller
    ApiDoc {
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        deprecated: bool,
    },
    /// Marks a class as a documentable type
    Documentable {
        #[serde(default)]
        description: String,
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        group: Option<String>,
    },
    /// Describes an endpoint on a controller method
    Endpoint {
        #[serde(default)]
        method: String,
        #[serde(default)]
        path: String,
        #[serde(default)]
        summary: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        deprecated: bool,
    },
    /// Describes a method parameter
    Param {
        #[serde(default)]
        description: String,
        #[serde(default)]
        required: Option<bool>,
        #[serde(default)]
        example: Option<Value>,
        #[serde(rename = "in", default)]
        location: Option<String>,
    },
    /// Describes the successful return value of an endpoint
    Returns {
        #[serde(rename = "type", default)]
        type_name: String,
        #[serde(default)]
        description: String,
        #[serde(default = "default_status_code")]
        status_code: u16,
    },
    /// An additional response of an endpoint (repeatable)
    Response {
        #[serde(default)]
        status_code: u16,
        #[serde(default)]
        description: String,
        #[serde(rename = "type", default)]
        type_name: Option<String>,
    },
    /// Describes a property of a documentable type
    Property {
        #[serde(default)]
        description: String,
        #[serde(default)]
        example: Option<Value>,
        #[serde(default)]
        deprecated: bool,
    },
    /// Describes a method of a documentable type
    Method {
        #[serde(default)]
        description: String,
        #[serde(default)]
        example: Option<String>,
        #[serde(default)]
        deprecated: bool,
    },
}

fn default_status_code() -> u16 {
    200
}

/// A declared class (controller, model or DTO).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Fully-qualified name, `\`-separated
    pub name: String,
    /// Fully-qualified name of the superclass
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

/// A declared property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    /// Native type declaration, if any
    #[serde(rename = "type", default)]
    pub declared_type: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub visibility: Accessibility,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    /// Declared on a superclass rather than on this class
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A declared method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub visibility: Accessibility,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    /// Declared on a superclass rather than on this class
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A declared method parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub declared_type: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    /// Has a default value (or is variadic)
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl ClassDecl {
    /// Class name without its namespace.
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Methods declared on this class itself.
    pub fn own_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter().filter(|m| !m.inherited)
    }
}

impl MethodDecl {
    /// Constructors, destructors and other `__`-prefixed methods.
    pub fn is_magic(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// Strips the namespace from a fully-qualified name.
pub fn short_name(name: &str) -> &str {
    let trimmed = name.trim_start_matches('\\');
    trimmed.rsplit('\\').next().unwrap_or(trimmed)
}

/// Source of class declarations, looked up by fully-qualified name.
pub trait DeclarationSource {
    /// Returns the declaration of `name`, or `None` when it is unknown.
    fn class(&self, name: &str) -> Option<&ClassDecl>;
}

/// An in-memory set of declarations.
///
/// Built from manifests by the CLI, or by hand in tests.
#[derive(Debug, Default)]
pub struct DeclarationSet {
    classes: Vec<ClassDecl>,
    index: HashMap<String, usize>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration. A later declaration with the same name replaces
    /// the earlier one.
    pub fn insert(&mut self, class: ClassDecl) {
        let key = class.name.trim_start_matches('\\').to_string();
        if let Some(&pos) = self.index.get(&key) {
            warn!("Duplicate declaration for {}, keeping the last one", key);
            self.classes[pos] = class;
        } else {
            debug!("Adding declaration: {}", key);
            self.index.insert(key, self.classes.len());
            self.classes.push(class);
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.iter()
    }
}

impl FromIterator<ClassDecl> for DeclarationSet {
    fn from_iter<I: IntoIterator<Item = ClassDecl>>(iter: I) -> Self {
        let mut set = DeclarationSet::new();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl DeclarationSource for DeclarationSet {
    fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.index
            .get(name.trim_start_matches('\\'))
            .map(|&pos| &self.classes[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Examples\\Models\\User"), "User");
        assert_eq!(short_name("\\User"), "User");
        assert_eq!(short_name("User"), "User");
    }

    #[test]
    fn test_magic_methods() {
        let ctor = MethodDecl {
            name: "__construct".to_string(),
            ..Default::default()
        };
        let regular = MethodDecl {
            name: "getName".to_string(),
            ..Default::default()
        };
        assert!(ctor.is_magic());
        assert!(!regular.is_magic());
    }

    #[test]
    fn test_own_methods_excludes_inherited() {
        let class = ClassDecl {
            name: "App\\Child".to_string(),
            methods: vec![
                MethodDecl {
                    name: "own".to_string(),
                    ..Default::default()
                },
                MethodDecl {
                    name: "fromParent".to_string(),
                    inherited: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let names: Vec<_> = class.own_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["own"]);
    }

    #[test]
    fn test_declaration_set_lookup_ignores_leading_backslash() {
        let set: DeclarationSet = vec![ClassDecl {
            name: "App\\User".to_string(),
            ..Default::default()
        }]
        .into_iter()
        .collect();

        assert!(set.class("App\\User").is_some());
        assert!(set.class("\\App\\User").is_some());
        assert!(set.class("User").is_none());
    }

    #[test]
    fn test_declaration_set_replaces_duplicates_in_place() {
        let mut set = DeclarationSet::new();
        set.insert(ClassDecl {
            name: "A".to_string(),
            ..Default::default()
        });
        set.insert(ClassDecl {
            name: "B".to_string(),
            ..Default::default()
        });
        set.insert(ClassDecl {
            name: "A".to_string(),
            parent: Some("Base".to_string()),
            ..Default::default()
        });

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(set.class("A").unwrap().parent.as_deref(), Some("Base"));
    }

    #[test]
    fn test_deserialize_attributes_from_json() {
        let json = r#"[
            {"kind": "endpoint", "method": "GET", "path": "/users", "summary": "List"},
            {"kind": "param", "description": "Page", "required": false, "example": 1, "in": "query"},
            {"kind": "returns", "type": "User[]"},
            {"kind": "response", "status_code": 404, "description": "Not found"}
        ]"#;
        let attrs: Vec<Attribute> = serde_json::from_str(json).unwrap();

        assert_eq!(attrs.len(), 4);
        match &attrs[2] {
            Attribute::Returns { type_name, status_code, .. } => {
                assert_eq!(type_name, "User[]");
                assert_eq!(*status_code, 200);
            }
            other => panic!("unexpected attribute {:?}", other),
        }
        match &attrs[1] {
            Attribute::Param { location, example, .. } => {
                assert_eq!(location.as_deref(), Some("query"));
                assert_eq!(example, &Some(serde_json::json!(1)));
            }
            other => panic!("unexpected attribute {:?}", other),
        }
    }

    #[test]
    fn test_accessibility_defaults_to_public() {
        let prop: PropertyDecl = serde_json::from_str(r#"{"name": "id"}"#).unwrap();
        assert_eq!(prop.visibility, Accessibility::Public);
    }
}
