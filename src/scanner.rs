use crate::manifest::ManifestFormat;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for locating declaration manifests.
///
/// The `FileScanner` recursively walks a directory and collects every
/// `.json`, `.yaml` and `.yml` file, in a stable (sorted) order. `target`
/// and hidden directories (those starting with `.`) are skipped. A root that
/// is a single file is returned as-is.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./declarations"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered manifest files
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects manifest files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and
    /// added to the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Failed to access path: {}", self.root_path.display()))?;

        if metadata.is_file() {
            debug!("Scanning single manifest {}", self.root_path.display());
            return Ok(ScanResult {
                manifest_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && ManifestFormat::from_path(path).is_some() {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Found {} manifests under {}", manifest_files.len(), self.root_path.display());

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
