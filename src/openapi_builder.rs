use crate::model::{ControllerDoc, EndpointDoc, HttpMethod, ParamLocation, ParameterDoc};
use crate::schema_generator::{Schema, SchemaGenerator};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.3";

const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID (the controller method name)
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Controller tags, or the controller name when it has none
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Path and query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body built from body parameters
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location (path or query)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Serialize)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "API Documentation".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: BTreeMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Add every endpoint of a controller
    pub fn add_controller(&mut self, controller: &ControllerDoc, schemas: &SchemaGenerator<'_>) {
        debug!("Adding controller: {}", controller.fqcn);

        let tags = if controller.tags.is_empty() {
            vec![controller.name.clone()]
        } else {
            controller.tags.clone()
        };

        for endpoint in &controller.endpoints {
            self.add_endpoint(endpoint, &tags, schemas);
        }
    }

    /// Add a single endpoint to the OpenAPI document
    pub fn add_endpoint(&mut self, endpoint: &EndpointDoc, tags: &[String], schemas: &SchemaGenerator<'_>) {
        debug!("Adding endpoint: {} {}", endpoint.http_method.as_str(), endpoint.path);

        let (body_params, other_params): (Vec<&ParameterDoc>, Vec<&ParameterDoc>) = endpoint
            .parameters
            .iter()
            .partition(|p| p.location == ParamLocation::Body);

        let parameters: Vec<Parameter> = other_params
            .into_iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                location: p.location.as_str().to_string(),
                required: p.required,
                description: Some(p.description.clone()).filter(|d| !d.is_empty()),
                schema: schemas.schema_for_str(&p.type_name),
                example: p.example.clone(),
            })
            .collect();

        let operation = Operation {
            summary: Some(endpoint.summary.clone()).filter(|s| !s.is_empty()),
            description: endpoint.description.clone(),
            operation_id: endpoint.name.clone(),
            tags: tags.to_vec(),
            deprecated: endpoint.deprecated,
            parameters: if parameters.is_empty() { None } else { Some(parameters) },
            request_body: Self::request_body(&body_params, schemas),
            responses: Self::responses(endpoint, schemas),
        };

        let path_item = self.paths.entry(endpoint.path.clone()).or_default();
        let slot = match endpoint.http_method {
            HttpMethod::Get => &mut path_item.get,
            HttpMethod::Post => &mut path_item.post,
            HttpMethod::Put => &mut path_item.put,
            HttpMethod::Delete => &mut path_item.delete,
            HttpMethod::Patch => &mut path_item.patch,
            HttpMethod::Options => &mut path_item.options,
            HttpMethod::Head => &mut path_item.head,
        };
        if slot.is_some() {
            warn!(
                "Duplicate operation {} {}, keeping {}",
                endpoint.http_method.as_str(),
                endpoint.path,
                endpoint.name
            );
        }
        *slot = Some(operation);
    }

    /// A single body parameter is the body; several become the properties
    /// of an object.
    fn request_body(params: &[&ParameterDoc], schemas: &SchemaGenerator<'_>) -> Option<RequestBody> {
        let (schema, description, required) = match params {
            [] => return None,
            [param] => {
                let mut schema = schemas.schema_for_str(&param.type_name);
                if schema.example.is_none() {
                    schema.example = param.example.clone();
                }
                (
                    schema,
                    Some(param.description.clone()).filter(|d| !d.is_empty()),
                    param.required,
                )
            }
            many => {
                let properties = many
                    .iter()
                    .map(|p| {
                        let mut schema = schemas.schema_for_str(&p.type_name);
                        schema.description = Some(p.description.clone()).filter(|d| !d.is_empty());
                        schema.example = p.example.clone();
                        (p.name.clone(), schema)
                    })
                    .collect();
                let required: Vec<String> = many
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| p.name.clone())
                    .collect();
                let any_required = !required.is_empty();
                let schema = Schema {
                    schema_type: Some("object".to_string()),
                    properties: Some(properties),
                    required: if any_required { Some(required) } else { None },
                    ..Default::default()
                };
                (schema, None, any_required)
            }
        };

        Some(RequestBody {
            description,
            required,
            content: json_content(schema),
        })
    }

    /// The returns record under its status code, then every additional
    /// response. Without either a bare `200 Success` is documented.
    fn responses(endpoint: &EndpointDoc, schemas: &SchemaGenerator<'_>) -> BTreeMap<String, Response> {
        let mut responses = BTreeMap::new();

        if let Some(returns) = &endpoint.returns {
            let description = if returns.description.is_empty() {
                "Success".to_string()
            } else {
                returns.description.clone()
            };
            responses.insert(
                returns.status_code.to_string(),
                Response {
                    description,
                    content: Some(json_content(schemas.schema_for_str(&returns.type_name))),
                },
            );
        }

        for response in &endpoint.responses {
            responses.insert(
                response.status_code.to_string(),
                Response {
                    description: response.description.clone(),
                    content: response
                        .type_name
                        .as_deref()
                        .map(|t| json_content(schemas.schema_for_str(t))),
                },
            );
        }

        if responses.is_empty() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Success".to_string(),
                    content: None,
                },
            );
        }

        responses
    }

    /// Build the final OpenAPI document
    pub fn build(self, schemas: &SchemaGenerator<'_>) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let component_schemas = schemas.component_schemas();
        let components = if component_schemas.is_empty() {
            None
        } else {
            Some(Components {
                schemas: component_schemas,
            })
        };

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
            components,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}
