//! A documentation run.
//!
//! [`DocSession`] owns the type registry while types and controllers are
//! registered. [`DocSession::freeze`] generates the controller documents and
//! hands back a read-only [`FrozenSession`] that every renderer works from.
//! Sessions share nothing, so independent runs never see each other's types.
//!
//! ```
//! use apidoc_from_source::declaration::{ClassDecl, DeclarationSet};
//! use apidoc_from_source::model::ApiInfo;
//! use apidoc_from_source::session::DocSession;
//!
//! let declarations: DeclarationSet = vec![ClassDecl {
//!     name: "App\\Models\\User".to_string(),
//!     doc_comment: Some("/** A user\n * @group Core */".to_string()),
//!     ..Default::default()
//! }]
//! .into_iter()
//! .collect();
//!
//! let mut session = DocSession::new(&declarations);
//! session.register_types(["App\\Models\\User"]);
//! let frozen = session.freeze();
//! assert!(frozen.registry().is_linkable("User"));
//! assert!(frozen.to_markdown(&ApiInfo::default()).contains("### User"));
//! ```

use crate::declaration::{ClassDecl, DeclarationSource};
use crate::doc_generator::DocGenerator;
use crate::error::Result;
use crate::html_renderer::HtmlRenderer;
use crate::markdown_renderer::MarkdownRenderer;
use crate::model::{ApiInfo, ControllerDoc};
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_registry::TypeRegistry;
use log::{debug, info, warn};
use std::path::Path;

/// Registration phase of a documentation run
pub struct DocSession<'s, S: DeclarationSource> {
    source: &'s S,
    registry: TypeRegistry,
    controllers: Vec<&'s ClassDecl>,
}

/// Generation result: controller documents plus the type registry
pub struct FrozenSession {
    registry: TypeRegistry,
    documents: Vec<ControllerDoc>,
}

impl<'s, S: DeclarationSource> DocSession<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            registry: TypeRegistry::new(),
            controllers: Vec::new(),
        }
    }

    /// Register documentable types by fully-qualified name.
    ///
    /// Unknown names and classes without a documentable marker are skipped.
    pub fn register_types<I, N>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            match self.source.class(name) {
                Some(class) => {
                    self.registry.register(class);
                }
                None => warn!("Type {} is not declared, skipping", name),
            }
        }
        self
    }

    /// Queue controllers by fully-qualified name, in output order
    pub fn register_controllers<I, N>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            match self.source.class(name) {
                Some(class) => {
                    debug!("Queued controller {}", name);
                    self.controllers.push(class);
                }
                None => warn!("Controller {} is not declared, skipping", name),
            }
        }
        self
    }

    /// End registration and generate the controller documents
    pub fn freeze(self) -> FrozenSession {
        let documents = DocGenerator::new().generate(self.controllers);
        info!(
            "Documentation ready: {} controllers, {} types",
            documents.len(),
            self.registry.len()
        );
        FrozenSession {
            registry: self.registry,
            documents,
        }
    }
}

impl FrozenSession {
    pub fn documents(&self) -> &[ControllerDoc] {
        &self.documents
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn to_html(&self, info: &ApiInfo) -> String {
        HtmlRenderer::new(&self.registry).render(&self.documents, info)
    }

    pub fn to_markdown(&self, info: &ApiInfo) -> String {
        MarkdownRenderer::new(&self.registry).render(&self.documents, info)
    }

    /// Build the OpenAPI document
    pub fn to_openapi(&self, info: &ApiInfo) -> OpenApiDocument {
        let schemas = SchemaGenerator::new(&self.registry);
        let mut builder = OpenApiBuilder::new().with_info(
            info.title.clone(),
            info.version.clone(),
            info.description.clone(),
        );
        for controller in &self.documents {
            builder.add_controller(controller, &schemas);
        }
        builder.build(&schemas)
    }

    pub fn to_openapi_json(&self, info: &ApiInfo) -> Result<String> {
        serialize_json(&self.to_openapi(info))
    }

    pub fn to_openapi_yaml(&self, info: &ApiInfo) -> Result<String> {
        serialize_yaml(&self.to_openapi(info))
    }

    pub fn save_html(&self, path: &Path, info: &ApiInfo) -> Result<()> {
        write_to_file(&self.to_html(info), path)
    }

    pub fn save_markdown(&self, path: &Path, info: &ApiInfo) -> Result<()> {
        write_to_file(&self.to_markdown(info), path)
    }

    /// Save the OpenAPI document as JSON
    pub fn save_openapi(&self, path: &Path, info: &ApiInfo) -> Result<()> {
        write_to_file(&self.to_openapi_json(info)?, path)
    }
}
