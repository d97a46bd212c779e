use crate::declaration::{Attribute, ClassDecl, MethodDecl, ParamDecl, PropertyDecl};
use crate::metadata::{
    ClassMeta, EndpointMeta, MetadataSource, MethodMeta, ParamMeta, PropertyMeta, ResponseMeta,
    ReturnsMeta, TypeMeta,
};
use crate::model::{HttpMethod, ParamLocation};
use log::debug;

/// Reads metadata from structured attributes.
pub struct AttributeSource;

impl MetadataSource for AttributeSource {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn class_meta(&self, class: &ClassDecl) -> Option<ClassMeta> {
        class.attributes.iter().find_map(|attr| match attr {
            Attribute::ApiDoc {
                description,
                tags,
                version,
                deprecated,
            } => Some(ClassMeta {
                description: description.clone(),
                version: version.clone().filter(|v| !v.trim().is_empty()),
                tags: tags.clone(),
                deprecated: *deprecated,
            }),
            _ => None,
        })
    }

    fn type_meta(&self, class: &ClassDecl) -> Option<TypeMeta> {
        class.attributes.iter().find_map(|attr| match attr {
            Attribute::Documentable {
                description,
                slug,
                group,
            } => Some(TypeMeta {
                description: description.clone(),
                slug: slug.clone().filter(|s| !s.trim().is_empty()),
                group: group.clone().filter(|g| !g.trim().is_empty()),
            }),
            _ => None,
        })
    }

    fn endpoint_meta(&self, method: &MethodDecl) -> Option<EndpointMeta> {
        let (verb, path, summary, description, deprecated) =
            method.attributes.iter().find_map(|attr| match attr {
                Attribute::Endpoint {
                    method,
                    path,
                    summary,
                    description,
                    deprecated,
                } => Some((method, path, summary, description, *deprecated)),
                _ => None,
            })?;

        let Some(http_method) = HttpMethod::parse(verb) else {
            debug!(
                "Ignoring endpoint attribute on {}: invalid HTTP method '{}'",
                method.name, verb
            );
            return None;
        };

        let path = path.trim();
        if !path.starts_with('/') {
            debug!(
                "Ignoring endpoint attribute on {}: path '{}' must start with '/'",
                method.name, path
            );
            return None;
        }

        Some(EndpointMeta {
            method: http_method,
            path: path.to_string(),
            summary: summary.clone(),
            description: description.clone().filter(|d| !d.trim().is_empty()),
            deprecated,
        })
    }

    fn param_meta(&self, _method: &MethodDecl, param: &ParamDecl) -> Option<ParamMeta> {
        param.attributes.iter().find_map(|attr| match attr {
            Attribute::Param {
                description,
                required,
                example,
                location,
            } => Some(ParamMeta {
                type_name: None,
                description: description.clone(),
                required: *required,
                example: example.clone(),
                location: location.as_deref().and_then(|loc| {
                    let parsed = ParamLocation::parse(loc);
                    if parsed.is_none() {
                        debug!("Unknown location '{}' for parameter {}", loc, param.name);
                    }
                    parsed
                }),
            }),
            _ => None,
        })
    }

    fn returns_meta(&self, method: &MethodDecl) -> Option<ReturnsMeta> {
        method.attributes.iter().find_map(|attr| match attr {
            Attribute::Returns {
                type_name,
                description,
                status_code,
            } if !type_name.trim().is_empty() => Some(ReturnsMeta {
                type_name: type_name.trim().to_string(),
                description: description.clone(),
                status_code: *status_code,
            }),
            _ => None,
        })
    }

    fn responses_meta(&self, method: &MethodDecl) -> Vec<ResponseMeta> {
        method
            .attributes
            .iter()
            .filter_map(|attr| match attr {
                Attribute::Response {
                    status_code,
                    description,
                    type_name,
                } => {
                    if !(100..=599).contains(status_code) {
                        debug!(
                            "Ignoring response attribute on {}: invalid status {}",
                            method.name, status_code
                        );
                        return None;
                    }
                    Some(ResponseMeta {
                        status_code: *status_code,
                        description: description.clone(),
                        type_name: type_name.clone().filter(|t| !t.trim().is_empty()),
                    })
                }
                _ => None,
            })
            .collect()
    }

    fn property_meta(&self, property: &PropertyDecl) -> Option<PropertyMeta> {
        property.attributes.iter().find_map(|attr| match attr {
            Attribute::Property {
                description,
                example,
                deprecated,
            } => Some(PropertyMeta {
                type_name: None,
                description: description.clone(),
                example: example.clone(),
                deprecated: *deprecated,
            }),
            _ => None,
        })
    }

    fn method_meta(&self, method: &MethodDecl) -> Option<MethodMeta> {
        method.attributes.iter().find_map(|attr| match attr {
            Attribute::Method {
                description,
                example,
                deprecated,
            } => Some(MethodMeta {
                description: description.clone(),
                return_type: None,
                return_description: None,
                example: example.clone(),
                deprecated: *deprecated,
            }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoint(method: &str, path: &str) -> Attribute {
        Attribute::Endpoint {
            method: method.to_string(),
            path: path.to_string(),
            summary: "Summary".to_string(),
            description: Some("   ".to_string()),
            deprecated: true,
        }
    }

    fn method_with(attributes: Vec<Attribute>) -> MethodDecl {
        MethodDecl {
            name: "show".to_string(),
            attributes,
            ..Default::default()
        }
    }

    #[test]
    fn test_class_meta_requires_api_doc() {
        let plain = ClassDecl {
            name: "App\\Plain".to_string(),
            ..Default::default()
        };
        assert!(AttributeSource.class_meta(&plain).is_none());

        let controller = ClassDecl {
            name: "App\\ProductController".to_string(),
            attributes: vec![Attribute::ApiDoc {
                description: "Products".to_string(),
                tags: vec!["shop".to_string()],
                version: Some("1.5".to_string()),
                deprecated: false,
            }],
            ..Default::default()
        };
        let meta = AttributeSource.class_meta(&controller).unwrap();
        assert_eq!(meta.description, "Products");
        assert_eq!(meta.version.as_deref(), Some("1.5"));
        assert_eq!(meta.tags, vec!["shop"]);
    }

    #[test]
    fn test_endpoint_meta() {
        let meta = AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("delete", "/products/{id}")]))
            .unwrap();

        assert_eq!(meta.method, HttpMethod::Delete);
        assert_eq!(meta.path, "/products/{id}");
        assert_eq!(meta.summary, "Summary");
        assert!(meta.description.is_none());
        assert!(meta.deprecated);
    }

    #[test]
    fn test_endpoint_meta_missing_verb_is_absent() {
        assert!(AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("", "/products")]))
            .is_none());
        assert!(AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("GET", "")]))
            .is_none());
        assert!(AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("TELEPORT", "/x")]))
            .is_none());
    }

    #[test]
    fn test_endpoint_meta_relative_path_is_absent() {
        assert!(AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("GET", "products")]))
            .is_none());

        let meta = AttributeSource
            .endpoint_meta(&method_with(vec![endpoint("GET", "  /products ")]))
            .unwrap();
        assert_eq!(meta.path, "/products");
    }

    #[test]
    fn test_param_meta_keeps_required_unset() {
        let param = ParamDecl {
            name: "id".to_string(),
            attributes: vec![Attribute::Param {
                description: "Product ID".to_string(),
                required: None,
                example: Some(json!(101)),
                location: Some("PATH".to_string()),
            }],
            ..Default::default()
        };

        let meta = AttributeSource.param_meta(&method_with(vec![]), &param).unwrap();
        assert_eq!(meta.required, None);
        assert_eq!(meta.location, Some(ParamLocation::Path));
        assert_eq!(meta.example, Some(json!(101)));
    }

    #[test]
    fn test_param_meta_unknown_location_is_unset() {
        let param = ParamDecl {
            name: "token".to_string(),
            attributes: vec![Attribute::Param {
                description: String::new(),
                required: Some(true),
                example: None,
                location: Some("header".to_string()),
            }],
            ..Default::default()
        };

        let meta = AttributeSource.param_meta(&method_with(vec![]), &param).unwrap();
        assert_eq!(meta.location, None);
    }

    #[test]
    fn test_returns_without_type_is_absent() {
        let method = method_with(vec![Attribute::Returns {
            type_name: " ".to_string(),
            description: String::new(),
            status_code: 200,
        }]);
        assert!(AttributeSource.returns_meta(&method).is_none());
    }

    #[test]
    fn test_responses_skip_invalid_status_codes() {
        let method = method_with(vec![
            Attribute::Response {
                status_code: 404,
                description: "Not found".to_string(),
                type_name: None,
            },
            Attribute::Response {
                status_code: 0,
                description: "Broken".to_string(),
                type_name: None,
            },
            Attribute::Response {
                status_code: 422,
                description: "Validation error".to_string(),
                type_name: Some("ValidationError".to_string()),
            },
        ]);

        let responses = AttributeSource.responses_meta(&method);
        let codes: Vec<u16> = responses.iter().map(|r| r.status_code).collect();
        assert_eq!(codes, vec![404, 422]);
        assert_eq!(responses[1].type_name.as_deref(), Some("ValidationError"));
    }
}
