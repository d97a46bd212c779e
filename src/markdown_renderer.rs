//! Markdown renderer.

use crate::model::{ApiInfo, ControllerDoc, EndpointDoc, ParameterDoc, ResponseDoc, ReturnsDoc};
use crate::type_expr::TypeExpr;
use crate::type_registry::{TypeInfo, TypeRegistry};
use crate::type_renderer::TypeRenderer;
use regex::Regex;
use std::sync::LazyLock;

static RE_NON_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub struct MarkdownRenderer<'r> {
    registry: &'r TypeRegistry,
    types: TypeRenderer<'r>,
}

impl<'r> MarkdownRenderer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            types: TypeRenderer::new(registry),
        }
    }

    pub fn render(&self, docs: &[ControllerDoc], info: &ApiInfo) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", info.title));
        if let Some(ref description) = info.description {
            out.push_str(&format!("{}\n\n", description));
        }
        if !info.version.is_empty() {
            out.push_str(&format!("**Version:** {}\n\n", info.version));
        }

        out.push_str(&self.render_toc(docs));

        if !docs.is_empty() {
            out.push_str("---\n\n## Endpoints\n\n");
            for controller in docs {
                out.push_str(&self.render_controller(controller));
            }
        }

        if !self.registry.is_empty() {
            out.push_str("---\n\n## Type Reference\n\n");
            for info in self.registry.all() {
                out.push_str(&self.render_type(info));
            }
        }

        out
    }

    fn render_toc(&self, docs: &[ControllerDoc]) -> String {
        let mut out = String::from("## Table of Contents\n\n");

        if !docs.is_empty() {
            out.push_str("### Endpoints\n\n");
            for controller in docs {
                out.push_str(&format!(
                    "- [{}](#{})\n",
                    controller.name,
                    anchor(&controller.name)
                ));
                for endpoint in &controller.endpoints {
                    out.push_str(&format!(
                        "  - [`{}` {}](#{})\n",
                        endpoint.http_method.as_str(),
                        endpoint.path,
                        endpoint_anchor(controller, endpoint)
                    ));
                }
            }
            out.push('\n');
        }

        let grouped = self.registry.all_grouped();
        if !grouped.is_empty() {
            out.push_str("### Types\n\n");
            for (group, types) in grouped {
                out.push_str(&format!("- **{}**\n", group));
                for info in types {
                    out.push_str(&format!("  - [{}]({})\n", info.short_name, info.anchor()));
                }
            }
            out.push('\n');
        }

        out
    }

    fn render_controller(&self, controller: &ControllerDoc) -> String {
        let mut out = format!("### {} {{#{}}}\n\n", controller.name, anchor(&controller.name));

        if controller.deprecated {
            out.push_str("> ⚠️ **Deprecated**\n\n");
        }
        if !controller.description.is_empty() {
            out.push_str(&format!("{}\n\n", controller.description));
        }
        if !controller.tags.is_empty() {
            out.push_str(&format!("**Tags:** `{}`\n\n", controller.tags.join("`, `")));
        }
        out.push_str(&format!("**Version:** {}\n\n", controller.version));

        for endpoint in &controller.endpoints {
            out.push_str(&self.render_endpoint(controller, endpoint));
        }

        out
    }

    fn render_endpoint(&self, controller: &ControllerDoc, endpoint: &EndpointDoc) -> String {
        let mut out = format!(
            "#### `{}` {} {{#{}}}\n\n",
            endpoint.http_method.as_str(),
            endpoint.path,
            endpoint_anchor(controller, endpoint)
        );

        if endpoint.deprecated {
            out.push_str("> ⚠️ **Deprecated**\n\n");
        }
        if !endpoint.summary.is_empty() {
            out.push_str(&format!("**{}**\n\n", endpoint.summary));
        }
        if let Some(ref description) = endpoint.description {
            out.push_str(&format!("{}\n\n", description));
        }

        if !endpoint.parameters.is_empty() {
            out.push_str(&self.render_parameters(&endpoint.parameters));
        }
        if let Some(ref returns) = endpoint.returns {
            out.push_str(&self.render_returns(returns));
        }
        if !endpoint.responses.is_empty() {
            out.push_str(&self.render_responses(&endpoint.responses));
        }

        out.push_str("---\n\n");
        out
    }

    fn render_parameters(&self, parameters: &[ParameterDoc]) -> String {
        let mut out = String::from("**Parameters:**\n\n");
        out.push_str("| Name | Type | In | Required | Description |\n");
        out.push_str("|------|------|----|----------|-------------|\n");

        for param in parameters {
            let mut description = escape_table_cell(&param.description);
            if let Some(ref example) = param.example {
                description.push_str(&format!(" Example: `{}`", escape_table_cell(&example.to_string())));
            }
            if param.has_default {
                description.push_str(&format!(" Default: `{}`", escape_table_cell(&param.default.to_string())));
            }

            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                param.name,
                self.types.markdown(&param.type_name),
                param.location.as_str(),
                if param.required { "✅ Yes" } else { "❌ No" },
                description.trim()
            ));
        }

        out.push('\n');
        out
    }

    fn render_returns(&self, returns: &ReturnsDoc) -> String {
        let mut out = format!(
            "**Returns:** `{}` - {}",
            returns.status_code,
            self.types.markdown(&returns.type_name)
        );
        if !returns.description.is_empty() {
            out.push_str(&format!(" - {}", returns.description));
        }
        out.push_str("\n\n");
        out
    }

    fn render_responses(&self, responses: &[ResponseDoc]) -> String {
        let mut out = String::from("**Responses:**\n\n");
        out.push_str("| Status | Type | Description |\n");
        out.push_str("|--------|------|-------------|\n");

        for response in responses {
            let type_md = match response.type_name {
                Some(ref t) => self.types.markdown(t),
                None => "-".to_string(),
            };
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                response.status_code,
                type_md,
                escape_table_cell(&response.description)
            ));
        }

        out.push('\n');
        out
    }

    fn render_type(&self, info: &TypeInfo) -> String {
        let mut out = format!("### {} {{#type-{}}}\n\n", info.short_name, info.slug);

        if !info.description.is_empty() {
            out.push_str(&format!("{}\n\n", info.description));
        }
        out.push_str(&format!("**Fully Qualified Name:** `{}`\n\n", info.fqcn));

        if !info.properties.is_empty() {
            out.push_str("**Properties:**\n\n");
            out.push_str("| Visibility | Property | Type | Description |\n");
            out.push_str("|------------|----------|------|-------------|\n");

            for prop in &info.properties {
                let mut type_md = self.types.markdown(&prop.type_name);
                if prop.nullable
                    && prop.type_name != "mixed"
                    && !TypeExpr::parse(&prop.type_name).is_nullable()
                {
                    type_md.insert(0, '?');
                }

                let mut description = escape_table_cell(&prop.description);
                if prop.deprecated {
                    description.insert_str(0, "⚠️ Deprecated. ");
                }
                if let Some(ref example) = prop.example {
                    description.push_str(&format!(" Example: `{}`", escape_table_cell(&example.to_string())));
                }

                out.push_str(&format!(
                    "| {} | `{}` | {} | {} |\n",
                    prop.accessibility.label(),
                    prop.name,
                    type_md,
                    description.trim()
                ));
            }
            out.push('\n');
        }

        if !info.methods.is_empty() {
            out.push_str("**Methods:**\n\n");
            out.push_str("| Visibility | Method | Description | Returns |\n");
            out.push_str("|------------|--------|-------------|---------|\n");

            for method in &info.methods {
                let mut description = escape_table_cell(&method.description);
                if method.deprecated {
                    description.insert_str(0, "⚠️ Deprecated. ");
                }
                let returns = match method.return_type {
                    Some(ref t) => self.types.markdown(t),
                    None => "-".to_string(),
                };

                out.push_str(&format!(
                    "| {} | `{}{}()` | {} | {} |\n",
                    method.accessibility.label(),
                    if method.is_static { "static " } else { "" },
                    method.name,
                    description.trim(),
                    returns
                ));
            }
            out.push('\n');
        }

        out.push_str("---\n\n");
        out
    }
}

/// Lowercase, runs of anything but `a-z0-9` collapsed into `-`
fn anchor(text: &str) -> String {
    RE_NON_ANCHOR
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

fn endpoint_anchor(controller: &ControllerDoc, endpoint: &EndpointDoc) -> String {
    anchor(&format!("{}-{}", controller.name, endpoint.slug))
}

/// Make text safe inside a table cell
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\r', "").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{Accessibility, ClassDecl, MethodDecl, PropertyDecl};
    use crate::model::{HttpMethod, ParamLocation};
    use serde_json::{json, Value};

    fn create_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(&ClassDecl {
            name: "Examples\\Models\\User".to_string(),
            doc_comment: Some("/**\n * A user\n * @group Core\n */".to_string()),
            properties: vec![PropertyDecl {
                name: "email".to_string(),
                declared_type: Some("string".to_string()),
                visibility: Accessibility::Protected,
                doc_comment: Some("/**\n * Login | contact address\n * @deprecated\n */".to_string()),
                ..Default::default()
            }],
            methods: vec![MethodDecl {
                name: "find".to_string(),
                is_static: true,
                return_type: Some("?self".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        registry
    }

    fn create_docs() -> Vec<ControllerDoc> {
        vec![ControllerDoc {
            name: "UserController".to_string(),
            fqcn: "Examples\\Controllers\\UserController".to_string(),
            description: "Manage users".to_string(),
            version: "1.0.0".to_string(),
            tags: vec!["users".to_string(), "admin".to_string()],
            deprecated: false,
            endpoints: vec![EndpointDoc {
                name: "listUsers".to_string(),
                slug: "list-users".to_string(),
                http_method: HttpMethod::Get,
                path: "/users".to_string(),
                summary: "List users".to_string(),
                description: None,
                deprecated: false,
                parameters: vec![ParameterDoc {
                    name: "page".to_string(),
                    type_name: "int".to_string(),
                    nullable: false,
                    required: false,
                    default: json!(1),
                    has_default: true,
                    description: "Page\nnumber".to_string(),
                    example: None,
                    location: ParamLocation::Query,
                }],
                returns: Some(ReturnsDoc {
                    type_name: "User[]|null".to_string(),
                    description: "Matching users".to_string(),
                    status_code: 200,
                }),
                responses: vec![ResponseDoc {
                    status_code: 401,
                    description: "Unauthorized".to_string(),
                    type_name: None,
                }],
            }],
        }]
    }

    #[test]
    fn test_render_document() {
        let registry = create_registry();
        let info = ApiInfo {
            title: "User API".to_string(),
            version: "3.0".to_string(),
            description: Some("Accounts and sessions".to_string()),
        };
        let md = MarkdownRenderer::new(&registry).render(&create_docs(), &info);

        assert!(md.starts_with("# User API\n\nAccounts and sessions\n\n**Version:** 3.0\n\n"));
        assert!(md.contains("  - [`GET` /users](#usercontroller-list-users)\n"));
        assert!(md.contains("#### `GET` /users {#usercontroller-list-users}"));
        assert!(md.contains("**Tags:** `users`, `admin`"));
        assert!(md.contains("| `page` | `int` | query | ❌ No | Page number Default: `1` |"));
        assert!(md.contains("**Returns:** `200` - [`User`](#type-user)[]\\|`null` - Matching users"));
        assert!(md.contains("| `401` | - | Unauthorized |"));
    }

    #[test]
    fn test_type_reference() {
        let registry = create_registry();
        let md = MarkdownRenderer::new(&registry).render(&[], &ApiInfo::default());

        assert!(md.contains("- **Core**\n  - [User](#type-user)\n"));
        assert!(md.contains("### User {#type-user}"));
        assert!(md.contains("**Fully Qualified Name:** `Examples\\Models\\User`"));
        assert!(md.contains("| Protected | `email` | `string` | ⚠️ Deprecated. Login \\| contact address |"));
        assert!(md.contains("| Public | `static find()` |  | ?[`User`](#type-user) |"));
        assert!(!md.contains("## Endpoints"));
    }

    #[test]
    fn test_escape_table_cell() {
        assert_eq!(escape_table_cell("a|b\r\nc"), "a\\|b c");
        assert_eq!(escape_table_cell(&Value::Null.to_string()), "null");
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("UserController-list-users"), "usercontroller-list-users");
        assert_eq!(anchor("  Odd  Name! "), "odd-name");
    }
}
