//! The normalized document model produced by the doc generator.
//!
//! Controllers contain endpoints, endpoints contain parameters, a returns
//! record and additional responses. Renderers consume this model together
//! with the type registry; nothing here knows about an output format.

use serde::Serialize;
use serde_json::Value;

/// HTTP methods an endpoint can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parses a verb case-insensitively. Unknown verbs yield `None`.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Uppercase verb, e.g. `GET`
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Methods whose parameters travel in the request body by default.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Path,
    Body,
}

impl ParamLocation {
    pub fn parse(location: &str) -> Option<Self> {
        match location.trim().to_ascii_lowercase().as_str() {
            "query" => Some(ParamLocation::Query),
            "path" => Some(ParamLocation::Path),
            "body" => Some(ParamLocation::Body),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Path => "path",
            ParamLocation::Body => "body",
        }
    }
}

/// A documented controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerDoc {
    /// Short class name
    pub name: String,
    /// Fully-qualified class name
    pub fqcn: String,
    pub description: String,
    pub version: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub endpoints: Vec<EndpointDoc>,
}

/// A documented endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDoc {
    /// Method name on the controller
    pub name: String,
    pub slug: String,
    pub http_method: HttpMethod,
    /// Path with `{param}` placeholders
    pub path: String,
    pub summary: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<ParameterDoc>,
    pub returns: Option<ReturnsDoc>,
    pub responses: Vec<ResponseDoc>,
}

/// A documented endpoint parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub required: bool,
    pub default: Value,
    pub has_default: bool,
    pub description: String,
    pub example: Option<Value>,
    #[serde(rename = "in")]
    pub location: ParamLocation,
}

/// The successful return value of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    pub status_code: u16,
}

/// An additional documented response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDoc {
    pub status_code: u16,
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
}

/// Document-level information shown by the OpenAPI and Markdown renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        }
    }
}

/// Derives a slug from a camelCase name: `updateStock` -> `update-stock`.
///
/// A `-` is inserted before every uppercase letter except the first
/// character, then the whole string is lowercased.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            slug.push('-');
        }
        slug.extend(c.to_lowercase());
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("camelCase"), "camel-case");
        assert_eq!(slugify("updateStock"), "update-stock");
        assert_eq!(slugify("PaginatedResult"), "paginated-result");
        assert_eq!(slugify("index"), "index");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_consecutive_capitals() {
        assert_eq!(slugify("getURL"), "get-u-r-l");
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse(" PATCH "), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("FETCH"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn test_http_method_has_body() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(HttpMethod::Patch.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn test_param_location_serializes_lowercase() {
        let json = serde_json::to_string(&ParamLocation::Path).unwrap();
        assert_eq!(json, "\"path\"");
        assert_eq!(ParamLocation::parse("BODY"), Some(ParamLocation::Body));
        assert_eq!(ParamLocation::parse("header"), None);
    }
}
