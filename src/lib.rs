//! API documentation generator.
//!
//! Turns annotated controller and model declarations into browsable API
//! documentation. Metadata is read from structured attributes or, failing
//! that, from doc comments. Every type name found in a signature or tag is
//! parsed, linked to its registered model when there is one, and rendered as
//! HTML, OpenAPI 3.0.3 or Markdown.
//!
//! # Architecture
//!
//! 1. [`type_expr`] - Parses type strings such as `?array<string, User>|null`
//! 2. [`declaration`] - Class, property, method and parameter declarations
//! 3. [`metadata`] - Reads documentation metadata from attributes and docblocks
//! 4. [`type_registry`] - Registry of documentable types
//! 5. [`type_renderer`] - Decides which type names link and renders them
//! 6. [`doc_generator`] - Builds controller and endpoint documents
//! 7. [`schema_generator`] / [`openapi_builder`] - OpenAPI schemas and document
//! 8. [`html_renderer`] / [`markdown_renderer`] - Human-readable references
//! 9. [`session`] - Register, freeze, render and save in one run
//! 10. [`manifest`] / [`scanner`] - Load declarations from JSON or YAML files
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_source::{
//!     declaration::DeclarationSet,
//!     manifest::ManifestParser,
//!     model::ApiInfo,
//!     scanner::FileScanner,
//!     session::DocSession,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let scan = FileScanner::new(PathBuf::from("./declarations")).scan().unwrap();
//! let manifests: Vec<_> = ManifestParser::parse_files(&scan.manifest_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .map(|parsed| parsed.manifest)
//!     .collect();
//!
//! let declarations = DeclarationSet::from_manifests(&manifests);
//! let mut session = DocSession::new(&declarations);
//! for manifest in &manifests {
//!     session
//!         .register_types(manifest.type_names())
//!         .register_controllers(manifest.controller_names());
//! }
//!
//! let docs = session.freeze();
//! docs.save_html(Path::new("docs/index.html"), &ApiInfo::default()).unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod declaration;
pub mod doc_generator;
pub mod error;
pub mod html_renderer;
pub mod manifest;
pub mod markdown_renderer;
pub mod metadata;
pub mod model;
pub mod openapi_builder;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod session;
pub mod type_expr;
pub mod type_registry;
pub mod type_renderer;
