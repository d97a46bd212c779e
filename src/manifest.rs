use crate::declaration::{ClassDecl, DeclarationSet};
use crate::error::{Error, Result as CrateResult};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Declaration manifest loader.
///
/// A manifest lists the classes an external introspection step found,
/// split into documentable types and API controllers:
///
/// ```yaml
/// types:
///   - name: App\Models\User
///     doc_comment: "/** A user\n * @group Core */"
/// controllers:
///   - name: App\Controllers\UserController
///     attributes:
///       - kind: api_doc
///         description: Users
/// ```
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::manifest::ManifestParser;
/// use std::path::Path;
///
/// let parsed = ManifestParser::parse_file(Path::new("declarations.yaml")).unwrap();
/// println!("{} controllers", parsed.manifest.controllers.len());
/// ```
pub struct ManifestParser;

/// Encoding of a manifest file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// `.json` is JSON, `.yaml` and `.yml` are YAML, anything else is unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ManifestFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(ManifestFormat::Yaml)
            }
            _ => None,
        }
    }
}

/// Contents of one manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationManifest {
    #[serde(default)]
    pub types: Vec<ClassDecl>,
    #[serde(default)]
    pub controllers: Vec<ClassDecl>,
}

/// A successfully parsed manifest with the file it came from.
#[derive(Debug)]
pub struct ParsedManifest {
    pub path: PathBuf,
    pub manifest: DeclarationManifest,
}

impl DeclarationManifest {
    /// Decodes manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestError`] naming `file` when the text does not
    /// decode as a manifest.
    pub fn decode(content: &str, format: ManifestFormat, file: &Path) -> CrateResult<Self> {
        let decoded = match format {
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };

        decoded.map_err(|message| Error::ManifestError {
            file: file.to_path_buf(),
            message,
        })
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|c| c.name.as_str())
    }

    pub fn controller_names(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(|c| c.name.as_str())
    }
}

impl ManifestParser {
    /// Reads and decodes a single manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The extension is not `.json`, `.yaml` or `.yml`
    /// - The file cannot be read
    /// - The content is not a valid manifest
    pub fn parse_file(path: &Path) -> Result<ParsedManifest> {
        debug!("Parsing manifest: {}", path.display());

        let format = ManifestFormat::from_path(path)
            .with_context(|| format!("Unsupported manifest extension: {}", path.display()))?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let manifest = DeclarationManifest::decode(&content, format, path)
            .with_context(|| format!("Failed to decode manifest: {}", path.display()))?;

        debug!(
            "Manifest {} declares {} types and {} controllers",
            path.display(),
            manifest.types.len(),
            manifest.controllers.len()
        );

        Ok(ParsedManifest {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Parses multiple manifests, continuing past failures.
    ///
    /// Failures are logged as warnings and returned in place, one result per
    /// input path, so a single broken manifest still leaves partial output.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedManifest>> {
        debug!("Parsing {} manifests", paths.len());

        let results: Vec<Result<ParsedManifest>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Manifest parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

impl DeclarationSet {
    /// Merges the declarations of several manifests in the order given.
    ///
    /// Types come before controllers within each manifest. A class declared
    /// twice keeps its last declaration.
    pub fn from_manifests<'a, I>(manifests: I) -> Self
    where
        I: IntoIterator<Item = &'a DeclarationManifest>,
    {
        let mut set = DeclarationSet::new();
        for manifest in manifests {
            for class in manifest.types.iter().chain(&manifest.controllers) {
                set.insert(class.clone());
            }
        }
        set
    }
}
