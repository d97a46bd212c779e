use crate::type_expr::TypeExpr;
use crate::type_registry::{TypeInfo, TypeRegistry};
use crate::type_renderer::TypeRenderer;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema generator - converts type strings and registered types to OpenAPI schemas
pub struct SchemaGenerator<'r> {
    /// Registry holding the types that become component schemas
    registry: &'r TypeRegistry,
    /// Link decisions for named leaves
    renderer: TypeRenderer<'r>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for string-keyed maps
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Alternatives of a union
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    /// Parts of an intersection, or a wrapped reference
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    fn of_type(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    fn array_of(items: Schema) -> Self {
        Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    fn reference_to(name: &str) -> Self {
        Schema {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Default::default()
        }
    }

    /// Mark as nullable. A `$ref` cannot carry siblings, so it gets wrapped.
    fn into_nullable(self) -> Self {
        if self.reference.is_some() {
            Schema {
                all_of: Some(vec![self]),
                nullable: Some(true),
                ..Default::default()
            }
        } else {
            Schema {
                nullable: Some(true),
                ..self
            }
        }
    }
}

impl<'r> SchemaGenerator<'r> {
    /// Create a new SchemaGenerator over a registry
    pub fn new(registry: &'r TypeRegistry) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            registry,
            renderer: TypeRenderer::new(registry),
        }
    }

    /// Generate a schema for a raw type string
    pub fn schema_for_str(&self, raw: &str) -> Schema {
        self.schema_for(&TypeExpr::parse(raw))
    }

    /// Generate a schema for a parsed type
    pub fn schema_for(&self, expr: &TypeExpr) -> Schema {
        match expr {
            TypeExpr::Named(name) => self.named_schema(name),
            TypeExpr::Nullable(inner) => self.schema_for(inner).into_nullable(),
            TypeExpr::Array(inner) => Schema::array_of(self.schema_for(inner)),
            TypeExpr::Generic { base, args } => self.generic_schema(base, args),
            TypeExpr::Union(parts) => {
                let mut alternatives: Vec<Schema> = parts
                    .iter()
                    .filter(|p| !p.is_null())
                    .map(|p| self.schema_for(p))
                    .collect();
                let nullable = alternatives.len() < parts.len();

                let schema = if alternatives.len() == 1 {
                    alternatives.remove(0)
                } else if alternatives.is_empty() {
                    Schema::of_type("object")
                } else {
                    Schema {
                        one_of: Some(alternatives),
                        ..Default::default()
                    }
                };

                if nullable {
                    schema.into_nullable()
                } else {
                    schema
                }
            }
            TypeExpr::Intersection(parts) => Schema {
                all_of: Some(parts.iter().map(|p| self.schema_for(p)).collect()),
                ..Default::default()
            },
        }
    }

    fn named_schema(&self, name: &str) -> Schema {
        if let Some(info) = self.renderer.link_target(name) {
            return Schema::reference_to(&self.component_name(info));
        }

        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => Schema::of_type("integer"),
            "float" | "double" => Schema::of_type("number"),
            "bool" | "boolean" | "true" | "false" => Schema::of_type("boolean"),
            "string" => Schema::of_type("string"),
            "array" | "list" | "iterable" => Schema::array_of(Schema::default()),
            _ => {
                debug!("Unknown type: {}, using object placeholder", name);
                Schema::of_type("object")
            }
        }
    }

    /// `array<T>`/`list<T>` are arrays, `array<string, T>` is a map. Other
    /// generic containers have no schema of their own and become objects.
    fn generic_schema(&self, base: &str, args: &[TypeExpr]) -> Schema {
        let is_list = matches!(
            base.to_ascii_lowercase().as_str(),
            "array" | "list" | "iterable"
        );

        match (is_list, args) {
            (true, [value]) => Schema::array_of(self.schema_for(value)),
            (true, [TypeExpr::Named(key), value]) if key == "string" => Schema {
                schema_type: Some("object".to_string()),
                additional_properties: Some(Box::new(self.schema_for(value))),
                ..Default::default()
            },
            (true, [_, value]) => Schema::array_of(self.schema_for(value)),
            _ => Schema::of_type("object"),
        }
    }

    /// Generate the component schema of a registered type.
    ///
    /// Non-nullable properties are listed as required.
    pub fn type_schema(&self, info: &TypeInfo) -> Schema {
        debug!("Generating component schema for: {}", info.fqcn);

        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for prop in &info.properties {
            let mut schema = self.schema_for_str(&prop.type_name);
            if !prop.description.is_empty() {
                schema.description = Some(prop.description.clone());
            }
            schema.example = prop.example.clone();
            if prop.deprecated {
                schema.deprecated = Some(true);
            }

            if !prop.nullable {
                required.push(prop.name.clone());
            }
            properties.insert(prop.name.clone(), schema);
        }

        Schema {
            schema_type: Some("object".to_string()),
            description: Some(info.description.clone()).filter(|d| !d.is_empty()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..Default::default()
        }
    }

    /// Name of the component schema of a registered type.
    ///
    /// The short name belongs to the type it resolves to. Other types sharing
    /// that short name use their fully-qualified name with `\` replaced by `.`.
    pub fn component_name(&self, info: &TypeInfo) -> String {
        match self.registry.resolve(&info.short_name) {
            Some(owner) if owner.fqcn == info.fqcn => info.short_name.clone(),
            _ => info.fqcn.replace('\\', "."),
        }
    }

    /// Component schemas for every registered type
    pub fn component_schemas(&self) -> BTreeMap<String, Schema> {
        let mut schemas = BTreeMap::new();
        for info in self.registry.all() {
            let name = self.component_name(info);
            if name != info.short_name {
                warn!(
                    "Short name {} is shared, listing {} as {}",
                    info.short_name, info.fqcn, name
                );
            }
            schemas.insert(name, self.type_schema(info));
        }
        schemas
    }
}
