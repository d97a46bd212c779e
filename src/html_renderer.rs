//! HTML renderer - a single self-contained page with a navigation sidebar.

use crate::model::{ApiInfo, ControllerDoc, EndpointDoc, ParameterDoc, ResponseDoc, ReturnsDoc};
use crate::type_expr::TypeExpr;
use crate::type_registry::{PropertyInfo, TypeInfo, TypeRegistry};
use crate::type_renderer::{escape_html, TypeRenderer};
use serde_json::Value;

const STYLE: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; line-height: 1.6; color: #333; background: #f5f5f5; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 280px; background: #1a1a2e; color: #eee; padding: 20px 0; position: fixed; height: 100vh; overflow-y: auto; }
.sidebar-header { padding: 0 20px 20px; border-bottom: 1px solid #333; }
.sidebar-section { padding: 20px; }
.sidebar-section h2 { font-size: 0.75rem; text-transform: uppercase; color: #888; margin-bottom: 10px; }
.nav-list, .nav-sublist { list-style: none; }
.nav-sublist { padding-left: 10px; }
.nav-group-title { display: block; font-weight: 600; padding: 8px 0; color: #ccc; }
.nav-sublist a { display: flex; gap: 8px; padding: 6px 0; color: #aaa; text-decoration: none; font-size: 0.9rem; }
.nav-sublist a:hover { color: #fff; }
.content { flex: 1; margin-left: 280px; padding: 40px; max-width: 1000px; }
.controller-section, .types-section { background: #fff; border-radius: 8px; padding: 30px; margin-bottom: 30px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.controller-header { border-bottom: 1px solid #eee; padding-bottom: 20px; margin-bottom: 20px; }
.endpoint, .type-definition { padding: 20px 0; border-bottom: 1px solid #eee; }
.endpoint-header { display: flex; align-items: center; gap: 12px; margin-bottom: 10px; }
.method-badge { padding: 4px 10px; border-radius: 4px; font-size: 0.75rem; font-weight: 700; }
.method-get { background: #61affe; color: #fff; }
.method-post { background: #49cc90; color: #fff; }
.method-put { background: #fca130; color: #fff; }
.method-patch { background: #50e3c2; color: #fff; }
.method-delete { background: #f93e3e; color: #fff; }
.method-options, .method-head { background: #9012fe; color: #fff; }
.path, .fqcn { background: #f5f5f5; padding: 4px 8px; border-radius: 4px; }
.badge { display: inline-block; padding: 2px 8px; border-radius: 4px; font-size: 0.7rem; font-weight: 600; text-transform: uppercase; }
.badge-deprecated { background: #f93e3e; color: #fff; }
.badge-tag, .badge-in { background: #e0e0e0; color: #666; }
.badge-version { background: #1a1a2e; color: #fff; }
.badge-required { background: #fca130; color: #fff; }
.badge-optional { background: #e0e0e0; color: #666; }
.badge-public { background: #49cc90; color: #fff; }
.badge-protected { background: #fca130; color: #fff; }
.badge-private { background: #f93e3e; color: #fff; }
table { width: 100%; border-collapse: collapse; margin: 10px 0 20px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #eee; vertical-align: top; }
th { background: #fafafa; font-size: 0.8rem; text-transform: uppercase; color: #666; }
h4 { margin: 15px 0 5px; }
.type-link { color: #2a6cb0; text-decoration: none; font-family: monospace; }
.type-link:hover { text-decoration: underline; }
.type-builtin { color: #8a3ea8; font-family: monospace; }
.status-code, .status-badge { display: inline-block; padding: 2px 8px; border-radius: 4px; font-size: 0.8rem; font-weight: 700; }
.status-success { background: #49cc90; color: #fff; }
.status-redirect { background: #61affe; color: #fff; }
.status-client-error { background: #fca130; color: #fff; }
.status-server-error { background: #f93e3e; color: #fff; }
.status-info { background: #e0e0e0; color: #666; }
"#;

/// Renders controller documents and the type reference as HTML
pub struct HtmlRenderer<'r> {
    registry: &'r TypeRegistry,
    types: TypeRenderer<'r>,
}

impl<'r> HtmlRenderer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            types: TypeRenderer::new(registry),
        }
    }

    pub fn render(&self, docs: &[ControllerDoc], info: &ApiInfo) -> String {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"UTF-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(&info.title)));
        out.push_str(&format!("<style>{}</style>\n", STYLE));
        out.push_str("</head>\n<body>\n<div class=\"layout\">\n");

        out.push_str("<nav class=\"sidebar\">\n");
        out.push_str(&format!(
            "<div class=\"sidebar-header\"><h1>{}</h1><small>v{}</small></div>\n",
            escape_html(&info.title),
            escape_html(&info.version)
        ));
        out.push_str(&self.render_sidebar(docs));
        out.push_str("</nav>\n");

        out.push_str("<main class=\"content\">\n");
        if let Some(ref description) = info.description {
            out.push_str(&format!("<p class=\"description\">{}</p>\n", escape_html(description)));
        }
        for controller in docs {
            out.push_str(&self.render_controller(controller));
        }
        if !self.registry.is_empty() {
            out.push_str("<section class=\"types-section\">\n<h2>Type Reference</h2>\n");
            for info in self.registry.all() {
                out.push_str(&self.render_type(info));
            }
            out.push_str("</section>\n");
        }
        out.push_str("</main>\n</div>\n</body>\n</html>\n");

        out
    }

    fn render_sidebar(&self, docs: &[ControllerDoc]) -> String {
        let mut out = String::new();

        if !docs.is_empty() {
            out.push_str("<div class=\"sidebar-section\">\n<h2>Endpoints</h2>\n<ul class=\"nav-list\">\n");
            for controller in docs {
                out.push_str(&format!(
                    "<li class=\"nav-group\"><span class=\"nav-group-title\">{}</span>\n<ul class=\"nav-sublist\">\n",
                    escape_html(&controller.name)
                ));
                for endpoint in &controller.endpoints {
                    out.push_str(&format!(
                        "<li><a href=\"#{}\"><span class=\"method-badge {}\">{}</span> {}</a></li>\n",
                        escape_html(&endpoint_anchor(controller, endpoint)),
                        method_class(endpoint),
                        endpoint.http_method.as_str(),
                        escape_html(&endpoint.path)
                    ));
                }
                out.push_str("</ul></li>\n");
            }
            out.push_str("</ul>\n</div>\n");
        }

        let grouped = self.registry.all_grouped();
        if !grouped.is_empty() {
            out.push_str("<div class=\"sidebar-section\">\n<h2>Types</h2>\n<ul class=\"nav-list\">\n");
            for (group, types) in grouped {
                out.push_str(&format!(
                    "<li class=\"nav-group\"><span class=\"nav-group-title\">{}</span>\n<ul class=\"nav-sublist\">\n",
                    escape_html(group)
                ));
                for info in types {
                    out.push_str(&format!(
                        "<li><a href=\"{}\">{}</a></li>\n",
                        escape_html(&info.anchor()),
                        escape_html(&info.short_name)
                    ));
                }
                out.push_str("</ul></li>\n");
            }
            out.push_str("</ul>\n</div>\n");
        }

        out
    }

    fn render_controller(&self, controller: &ControllerDoc) -> String {
        let mut out = String::new();

        out.push_str("<section class=\"controller-section\">\n<div class=\"controller-header\">\n");
        out.push_str(&format!(
            "<h2>{}{}</h2>\n",
            escape_html(&controller.name),
            deprecated_badge(controller.deprecated)
        ));
        if !controller.description.is_empty() {
            out.push_str(&format!(
                "<p class=\"description\">{}</p>\n",
                escape_html(&controller.description)
            ));
        }
        out.push_str("<div class=\"tags\">");
        for tag in &controller.tags {
            out.push_str(&format!("<span class=\"badge badge-tag\">{}</span> ", escape_html(tag)));
        }
        out.push_str(&format!(
            "<span class=\"badge badge-version\">v{}</span></div>\n</div>\n",
            escape_html(&controller.version)
        ));

        for endpoint in &controller.endpoints {
            out.push_str(&self.render_endpoint(controller, endpoint));
        }

        out.push_str("</section>\n");
        out
    }

    fn render_endpoint(&self, controller: &ControllerDoc, endpoint: &EndpointDoc) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "<div class=\"endpoint\" id=\"{}\">\n",
            escape_html(&endpoint_anchor(controller, endpoint))
        ));
        out.push_str(&format!(
            "<div class=\"endpoint-header\"><span class=\"method-badge {}\">{}</span><code class=\"path\">{}</code>{}</div>\n",
            method_class(endpoint),
            endpoint.http_method.as_str(),
            escape_html(&endpoint.path),
            deprecated_badge(endpoint.deprecated)
        ));
        if !endpoint.summary.is_empty() {
            out.push_str(&format!("<h3>{}</h3>\n", escape_html(&endpoint.summary)));
        }
        if let Some(ref description) = endpoint.description {
            out.push_str(&format!("<p class=\"description\">{}</p>\n", escape_html(description)));
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

        out.push_str("</div>\n");
        out
    }

    fn render_parameters(&self, parameters: &[ParameterDoc]) -> String {
        let mut out = String::from("<div class=\"params-section\">\n<h4>Parameters</h4>\n<table class=\"params-table\">\n");
        out.push_str("<thead><tr><th>Name</th><th>Type</th><th>In</th><th>Required</th><th>Description</th></tr></thead>\n<tbody>\n");

        for param in parameters {
            let required = if param.required {
                "<span class=\"badge badge-required\">Required</span>"
            } else {
                "<span class=\"badge badge-optional\">Optional</span>"
            };

            let mut description = escape_html(&param.description);
            if let Some(ref example) = param.example {
                description.push_str(&value_note("example", "Example", example));
            }
            if param.has_default {
                description.push_str(&value_note("default", "Default", &param.default));
            }

            out.push_str(&format!(
                "<tr><td><code>{}</code></td><td>{}</td><td><span class=\"badge badge-in\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&param.name),
                self.types.html(&param.type_name),
                param.location.as_str(),
                required,
                description
            ));
        }

        out.push_str("</tbody>\n</table>\n</div>\n");
        out
    }

    fn render_returns(&self, returns: &ReturnsDoc) -> String {
        let mut out = format!(
            "<div class=\"returns-section\">\n<h4>Returns <span class=\"status-code {}\">{}</span></h4>\n<p>{}",
            status_class(returns.status_code),
            returns.status_code,
            self.types.html(&returns.type_name)
        );
        if !returns.description.is_empty() {
            out.push_str(&format!(" - {}", escape_html(&returns.description)));
        }
        out.push_str("</p>\n</div>\n");
        out
    }

    fn render_responses(&self, responses: &[ResponseDoc]) -> String {
        let mut out = String::from("<div class=\"responses-section\">\n<h4>Responses</h4>\n<table class=\"responses-table\">\n");
        out.push_str("<thead><tr><th>Status</th><th>Type</th><th>Description</th></tr></thead>\n<tbody>\n");

        for response in responses {
            let type_html = match response.type_name {
                Some(ref t) => self.types.html(t),
                None => "<span class=\"type-builtin\">-</span>".to_string(),
            };
            out.push_str(&format!(
                "<tr><td><span class=\"status-badge {}\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
                status_class(response.status_code),
                response.status_code,
                type_html,
                escape_html(&response.description)
            ));
        }

        out.push_str("</tbody>\n</table>\n</div>\n");
        out
    }

    fn render_type(&self, info: &TypeInfo) -> String {
        let mut out = format!(
            "<div class=\"type-definition\" id=\"type-{}\">\n<h3>{}</h3>\n",
            escape_html(&info.slug),
            escape_html(&info.short_name)
        );
        if !info.description.is_empty() {
            out.push_str(&format!("<p class=\"description\">{}</p>\n", escape_html(&info.description)));
        }
        out.push_str(&format!("<code class=\"fqcn\">{}</code>\n", escape_html(&info.fqcn)));

        if !info.properties.is_empty() {
            out.push_str("<table class=\"properties-table\">\n<thead><tr><th>Accessibility</th><th>Property</th><th>Type</th><th>Description</th></tr></thead>\n<tbody>\n");
            for prop in &info.properties {
                let mut description = escape_html(&prop.description);
                if let Some(ref example) = prop.example {
                    description.push_str(&value_note("example", "Example", example));
                }
                out.push_str(&format!(
                    "<tr><td><span class=\"badge badge-{0}\">{0}</span></td><td><code>{1}</code>{2}</td><td>{3}</td><td>{4}</td></tr>\n",
                    prop.accessibility.as_str(),
                    escape_html(&prop.name),
                    deprecated_badge(prop.deprecated),
                    self.property_type(prop),
                    description
                ));
            }
            out.push_str("</tbody>\n</table>\n");
        }

        if !info.methods.is_empty() {
            out.push_str("<table class=\"methods-table\">\n<thead><tr><th>Accessibility</th><th>Method</th><th>Returns</th><th>Description</th></tr></thead>\n<tbody>\n");
            for method in &info.methods {
                let params = method
                    .parameters
                    .iter()
                    .map(|p| format!("{} ${}", self.types.html(&p.type_name), escape_html(&p.name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let returns = match method.return_type {
                    Some(ref t) => self.types.html(t),
                    None => "<span class=\"type-builtin\">-</span>".to_string(),
                };
                let mut description = escape_html(&method.description);
                if let Some(ref rd) = method.return_description {
                    description.push_str(&format!("<br><small>Returns: {}</small>", escape_html(rd)));
                }
                out.push_str(&format!(
                    "<tr><td><span class=\"badge badge-{0}\">{0}</span></td><td><code>{1}{2}({3})</code>{4}</td><td>{5}</td><td>{6}</td></tr>\n",
                    method.accessibility.as_str(),
                    if method.is_static { "static " } else { "" },
                    escape_html(&method.name),
                    params,
                    deprecated_badge(method.deprecated),
                    returns,
                    description
                ));
            }
            out.push_str("</tbody>\n</table>\n");
        }

        out.push_str("</div>\n");
        out
    }

    fn property_type(&self, prop: &PropertyInfo) -> String {
        let rendered = self.types.html(&prop.type_name);
        if prop.nullable && !TypeExpr::parse(&prop.type_name).is_nullable() && prop.type_name != "mixed" {
            format!("?{}", rendered)
        } else {
            rendered
        }
    }
}

fn endpoint_anchor(controller: &ControllerDoc, endpoint: &EndpointDoc) -> String {
    format!("{}-{}", controller.name, endpoint.slug)
}

fn method_class(endpoint: &EndpointDoc) -> String {
    format!("method-{}", endpoint.http_method.as_str().to_ascii_lowercase())
}

fn deprecated_badge(deprecated: bool) -> &'static str {
    if deprecated {
        " <span class=\"badge badge-deprecated\">Deprecated</span>"
    } else {
        ""
    }
}

fn value_note(class: &str, label: &str, value: &Value) -> String {
    format!(
        "<br><small class=\"{}\">{}: <code>{}</code></small>",
        class,
        label,
        escape_html(&value.to_string())
    )
}

/// CSS class for a status code badge
pub fn status_class(code: u16) -> &'static str {
    match code {
        200..=299 => "status-success",
        300..=399 => "status-redirect",
        400..=499 => "status-client-error",
        500..=u16::MAX => "status-server-error",
        _ => "status-info",
    }
}
