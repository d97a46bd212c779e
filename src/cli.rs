use crate::model::ApiInfo;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// API documentation generator - renders HTML, OpenAPI and Markdown docs from declaration manifests
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or a directory searched for .json/.yaml/.yml manifests
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "html")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Document title
    #[arg(long = "title", default_value = "API Documentation")]
    pub title: String,

    /// API version shown in the document
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Free-text API description
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single-page HTML reference
    Html,
    /// OpenAPI 3.0.3 as JSON
    Json,
    /// Markdown reference
    Markdown,
    /// OpenAPI 3.0.3 as YAML
    Yaml,
}

impl CliArgs {
    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            title: self.title.clone(),
            version: self.api_version.clone(),
            description: self.description.clone(),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    if args.title.trim().is_empty() {
        anyhow::bail!("Document title must not be empty");
    }

    info!("Input: {}", args.input_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::declaration::DeclarationSet;
    use crate::manifest::{DeclarationManifest, ManifestParser};
    use crate::scanner::FileScanner;
    use crate::serializer::write_to_file;
    use crate::session::DocSession;

    info!("Starting documentation generation...");

    // Step 1: Locate manifests
    let scan_result = FileScanner::new(args.input_path.clone()).scan()?;
    info!("Found {} manifest files", scan_result.manifest_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    if scan_result.manifest_files.is_empty() {
        anyhow::bail!("No manifest files found under {}", args.input_path.display());
    }

    // Step 2: Parse manifests, keeping whatever decodes
    let manifests: Vec<DeclarationManifest> = ManifestParser::parse_files(&scan_result.manifest_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed.manifest),
            Err(e) => {
                debug!("Skipping manifest: {:#}", e);
                None
            }
        })
        .collect();

    if manifests.is_empty() {
        anyhow::bail!("No manifest could be parsed successfully");
    }
    info!("Successfully parsed {} manifests", manifests.len());

    // Step 3: Register and generate
    let declarations = DeclarationSet::from_manifests(&manifests);
    let mut session = DocSession::new(&declarations);
    for manifest in &manifests {
        session
            .register_types(manifest.type_names())
            .register_controllers(manifest.controller_names());
    }
    let frozen = session.freeze();

    if frozen.documents().is_empty() {
        warn!("No documented controllers found");
    }

    // Step 4: Render
    let info = args.api_info();
    let content = match args.output_format {
        OutputFormat::Html => frozen.to_html(&info),
        OutputFormat::Markdown => frozen.to_markdown(&info),
        OutputFormat::Json => frozen.to_openapi_json(&info)?,
        OutputFormat::Yaml => frozen.to_openapi_yaml(&info)?,
    };

    // Step 5: Output to file or stdout
    match &args.output_path {
        Some(output_path) => write_to_file(&content, output_path)
            .with_context(|| format!("Failed to write {}", output_path.display()))?,
        None => println!("{}", content),
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Manifests parsed: {}", manifests.len());
    info!("  - Controllers: {}", frozen.documents().len());
    info!(
        "  - Endpoints: {}",
        frozen.documents().iter().map(|d| d.endpoints.len()).sum::<usize>()
    );
    info!("  - Types: {}", frozen.registry().len());

    Ok(())
}
