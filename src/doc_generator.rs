use crate::declaration::{Accessibility, ClassDecl, MethodDecl, ParamDecl};
use crate::metadata::{EndpointMeta, MetadataReader};
use crate::model::{
    slugify, ControllerDoc, EndpointDoc, HttpMethod, ParamLocation, ParameterDoc, ResponseDoc,
    ReturnsDoc,
};
use crate::type_expr::{resolve_type_string, TypeContext};
use log::{debug, info};

/// Version reported for controllers that do not declare one
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Return types that never produce a response body
const NO_CONTENT_TYPES: [&str; 2] = ["void", "never"];

/// Doc generator - builds controller documents from controller declarations
pub struct DocGenerator {
    reader: MetadataReader,
}

impl DocGenerator {
    /// Create a generator reading attributes first, then docblocks
    pub fn new() -> Self {
        Self::with_reader(MetadataReader::new())
    }

    pub fn with_reader(reader: MetadataReader) -> Self {
        Self { reader }
    }

    /// Generate controller documents.
    ///
    /// # Arguments
    ///
    /// * `controllers` - Controller declarations in output order
    ///
    /// # Returns
    ///
    /// One document per controller that carries an API surface marker, in the
    /// order given. Unmarked controllers are skipped.
    pub fn generate<'a, I>(&self, controllers: I) -> Vec<ControllerDoc>
    where
        I: IntoIterator<Item = &'a ClassDecl>,
    {
        let docs: Vec<ControllerDoc> = controllers
            .into_iter()
            .filter_map(|class| self.generate_controller(class))
            .collect();

        info!(
            "Generated {} controller documents with {} endpoints",
            docs.len(),
            docs.iter().map(|d| d.endpoints.len()).sum::<usize>()
        );
        docs
    }

    /// Generate the document of a single controller.
    ///
    /// Returns `None` if the class is not marked as an API surface.
    pub fn generate_controller(&self, class: &ClassDecl) -> Option<ControllerDoc> {
        let Some(meta) = self.reader.class_meta(class) else {
            debug!("{} has no API documentation marker, skipping", class.name);
            return None;
        };

        debug!("Generating documentation for controller {}", class.name);

        let endpoints = class
            .own_methods()
            .filter(|m| m.visibility == Accessibility::Public && !m.is_magic())
            .filter_map(|m| self.extract_endpoint(class, m))
            .collect();

        Some(ControllerDoc {
            name: class.short_name().to_string(),
            fqcn: class.name.trim_start_matches('\\').to_string(),
            description: meta.description,
            version: meta.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            tags: meta.tags,
            deprecated: meta.deprecated,
            endpoints,
        })
    }

    fn extract_endpoint(&self, class: &ClassDecl, method: &MethodDecl) -> Option<EndpointDoc> {
        let Some(endpoint) = self.reader.endpoint_meta(method) else {
            debug!("{}::{} is not an endpoint", class.short_name(), method.name);
            return None;
        };

        debug!(
            "Found endpoint {} {} ({}::{})",
            endpoint.method.as_str(),
            endpoint.path,
            class.short_name(),
            method.name
        );

        let ctx = TypeContext {
            class: &class.name,
            parent: class.parent.as_deref(),
        };

        Some(EndpointDoc {
            name: method.name.clone(),
            slug: slugify(&method.name),
            parameters: self.extract_parameters(method, &endpoint, &ctx),
            returns: self.extract_returns(method, &ctx),
            responses: self.extract_responses(method, &ctx),
            http_method: endpoint.method,
            path: endpoint.path,
            summary: endpoint.summary,
            description: endpoint.description,
            deprecated: endpoint.deprecated,
        })
    }

    /// Extract parameters in declaration order.
    ///
    /// The documented type wins over the declared one; parameters with
    /// neither are `mixed`. Without an explicit location the location is
    /// guessed from the path and the HTTP method.
    fn extract_parameters(
        &self,
        method: &MethodDecl,
        endpoint: &EndpointMeta,
        ctx: &TypeContext<'_>,
    ) -> Vec<ParameterDoc> {
        method
            .parameters
            .iter()
            .map(|param| {
                let meta = self.reader.param_meta(method, param).unwrap_or_default();

                let raw_type = meta
                    .type_name
                    .as_deref()
                    .or(param.declared_type.as_deref())
                    .unwrap_or("mixed");

                let location = meta.location.unwrap_or_else(|| {
                    guess_param_location(&param.name, &endpoint.path, endpoint.method)
                });

                ParameterDoc {
                    name: param.name.clone(),
                    type_name: resolve_type_string(raw_type, ctx),
                    nullable: param.declared_type.is_none() || param.nullable,
                    required: meta
                        .required
                        .unwrap_or_else(|| default_required(param, location)),
                    default: param.default.clone(),
                    has_default: param.has_default,
                    description: meta.description,
                    example: meta.example,
                    location,
                }
            })
            .collect()
    }

    /// Documented returns, else the declared return type with status 200.
    fn extract_returns(&self, method: &MethodDecl, ctx: &TypeContext<'_>) -> Option<ReturnsDoc> {
        if let Some(meta) = self.reader.returns_meta(method) {
            return Some(ReturnsDoc {
                type_name: resolve_type_string(&meta.type_name, ctx),
                description: meta.description,
                status_code: meta.status_code,
            });
        }

        let declared = method.return_type.as_deref()?.trim();
        if declared.is_empty() || NO_CONTENT_TYPES.contains(&declared.to_ascii_lowercase().as_str()) {
            return None;
        }

        Some(ReturnsDoc {
            type_name: resolve_type_string(declared, ctx),
            description: String::new(),
            status_code: 200,
        })
    }

    fn extract_responses(&self, method: &MethodDecl, ctx: &TypeContext<'_>) -> Vec<ResponseDoc> {
        self.reader
            .responses_meta(method)
            .into_iter()
            .map(|r| ResponseDoc {
                status_code: r.status_code,
                description: r.description,
                type_name: r.type_name.map(|t| resolve_type_string(&t, ctx)),
            })
            .collect()
    }
}

impl Default for DocGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Guess where a parameter without an explicit location travels.
///
/// A `{name}` placeholder in the path means path, a POST/PUT/PATCH endpoint
/// means body, anything else is a query parameter.
pub fn guess_param_location(name: &str, path: &str, method: HttpMethod) -> ParamLocation {
    if path.contains(&format!("{{{}}}", name)) {
        ParamLocation::Path
    } else if method.has_body() {
        ParamLocation::Body
    } else {
        ParamLocation::Query
    }
}

fn default_required(param: &ParamDecl, location: ParamLocation) -> bool {
    location == ParamLocation::Path || !(param.optional || param.has_default)
}
