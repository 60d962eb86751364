//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing::{debug, Level};

use docwiki_core::{
    ConversionDiagnostics, ConversionSettings, Converter, MappedStyle, MarkupRenderer, NameMapper,
    WikiRenderer,
};
use docwiki_ooxml::{read_docx, DocxSource, StyleType};

/// Output format for conversion reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "docwiki")]
#[command(author, version, about = "DOCX to MediaWiki markup", long_about = None)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert DOCX files to wikitext
    Convert {
        /// Input DOCX files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file (single input only; defaults to <input>.wiki.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings file (defaults to docwiki.toml beside each input)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Overwrite existing output files
        #[arg(long)]
        force: bool,

        /// Do not add unmapped styles to the settings file
        #[arg(long)]
        no_save_settings: bool,

        /// Report format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the source model extracted from a DOCX file as JSON
    Inspect {
        /// Input DOCX file
        input: PathBuf,
    },

    /// List the styles of a DOCX file with their wiki mapping
    Styles {
        /// Input DOCX file
        input: PathBuf,

        /// Settings file (defaults to docwiki.toml beside the input)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

/// Options of the convert command
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub output: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub force: bool,
    pub save_settings: bool,
    pub format: OutputFormat,
}

/// Result of converting one file
#[derive(Debug)]
pub struct ConvertOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: PathBuf,
    pub diagnostics: ConversionDiagnostics,
    /// Whether unmapped styles were added to the settings file
    pub settings_updated: bool,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            settings,
            force,
            no_save_settings,
            format,
        } => {
            let options = ConvertOptions {
                output,
                settings,
                force,
                save_settings: !no_save_settings,
                format,
            };
            convert_command(&inputs, &options)?;
        }
        Commands::Inspect { input } => {
            inspect_command(&input)?;
        }
        Commands::Styles { input, settings } => {
            styles_command(&input, settings.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Expand glob patterns; plain paths are taken as they are
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            inputs.push(PathBuf::from(pattern));
            continue;
        }
        let before = inputs.len();
        for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            let path = entry.with_context(|| format!("Cannot read match of {}", pattern))?;
            if path.is_file() {
                inputs.push(path);
            }
        }
        if inputs.len() == before {
            anyhow::bail!("No files match: {}", pattern);
        }
    }
    Ok(inputs)
}

/// Default output path: `report.docx` becomes `report.wiki.txt`
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(WikiRenderer.file_extension())
}

/// Execute the convert command
pub fn convert_command(
    patterns: &[String],
    options: &ConvertOptions,
) -> Result<Vec<ConvertOutcome>> {
    let inputs = expand_inputs(patterns)?;
    if options.output.is_some() && inputs.len() > 1 {
        anyhow::bail!("--output can only be used with a single input file");
    }

    if options.format == OutputFormat::Text {
        println!("docwiki v{}", docwiki_core::VERSION);
    }

    let mut outcomes = Vec::new();
    for input in &inputs {
        if options.format == OutputFormat::Text {
            println!("Converting: {}", input.display());
        }
        let outcome = convert_file(input, options)?;
        match options.format {
            OutputFormat::Text => print!("{}", outcome_report(&outcome)),
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "input": outcome.input.display().to_string(),
                    "output": outcome.output.display().to_string(),
                    "settings_updated": outcome.settings_updated,
                    "diagnostics": outcome.diagnostics,
                });
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize diagnostics to JSON")?;
                println!("{}", json);
            }
        }
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Convert one DOCX file and write its wikitext
pub fn convert_file(input: &Path, options: &ConvertOptions) -> Result<ConvertOutcome> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    if output.exists() && !options.force {
        anyhow::bail!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        );
    }

    let settings_path = options
        .settings
        .clone()
        .unwrap_or_else(|| ConversionSettings::path_for(input));
    let mut settings = ConversionSettings::load(&settings_path)
        .with_context(|| format!("Failed to load settings: {}", settings_path.display()))?;

    let source = read_docx(input)
        .with_context(|| format!("Failed to read DOCX file: {}", input.display()))?;

    let names = settings.name_map();
    let result = Converter::new(&source.styles, &names, &WikiRenderer)
        .with_options(settings.resolver_options())
        .convert(&source.document);

    fs::write(&output, &result.text)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    debug!(output = %output.display(), bytes = result.text.len(), "wrote wikitext");

    let missing = result.diagnostics.missing_styles();
    let settings_updated = if options.save_settings && !missing.is_empty() {
        let source_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        settings
            .save_missing_styles(&settings_path, missing, &source_name)
            .with_context(|| format!("Failed to update settings: {}", settings_path.display()))?
    } else {
        false
    };

    Ok(ConvertOutcome {
        input: input.to_path_buf(),
        output,
        settings: settings_path,
        diagnostics: result.diagnostics,
        settings_updated,
    })
}

/// Human-readable report of one conversion
pub fn outcome_report(outcome: &ConvertOutcome) -> String {
    let diagnostics = &outcome.diagnostics;
    let mut report = String::new();
    for diag in diagnostics.iter() {
        let _ = writeln!(report, "{}\n", diag);
    }

    let _ = writeln!(report, "✓ Written: {}", outcome.output.display());
    if diagnostics.skipped_elements() > 0 {
        let _ = writeln!(
            report,
            "  {} element(s) could not be converted",
            diagnostics.skipped_elements()
        );
    }
    if let Some(summary) = diagnostics.missing_styles_summary(5) {
        let _ = writeln!(report, "  Styles without a wiki mapping: {}", summary);
        if outcome.settings_updated {
            let _ = writeln!(
                report,
                "  They were added to {}; edit the mappings there and convert again.",
                outcome.settings.display()
            );
        }
    }
    let _ = writeln!(report, "  {} warning(s)", diagnostics.warning_count());
    report
}

/// Execute the inspect command
pub fn inspect_command(input: &Path) -> Result<()> {
    let source = load_source(input)?;
    let json = serde_json::to_string_pretty(&source.document)
        .context("Failed to serialize document to JSON")?;
    println!("{}", json);
    Ok(())
}

/// One line of the styles listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub style_type: StyleType,
    pub name: String,
    pub mapping: MappedStyle,
}

/// Paragraph and character styles of a document with their mapping,
/// sorted by type then name
pub fn style_listing(source: &DocxSource, names: &dyn NameMapper) -> Vec<StyleEntry> {
    let mut entries: Vec<StyleEntry> = source
        .styles
        .paragraph_styles()
        .chain(source.styles.character_styles())
        .map(|style| StyleEntry {
            style_type: style.style_type,
            name: style.name.clone(),
            mapping: names.map_style(&style.name),
        })
        .collect();
    entries.sort_by(|a, b| {
        let rank = |t: StyleType| (t != StyleType::Paragraph) as u8;
        (rank(a.style_type), &a.name).cmp(&(rank(b.style_type), &b.name))
    });
    entries
}

/// Execute the styles command
pub fn styles_command(input: &Path, settings: Option<&Path>) -> Result<()> {
    let source = load_source(input)?;
    let settings_path = settings
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ConversionSettings::path_for(input));
    let settings = ConversionSettings::load(&settings_path)
        .with_context(|| format!("Failed to load settings: {}", settings_path.display()))?;
    let names = settings.name_map();

    for entry in style_listing(&source, &names) {
        let kind = match entry.style_type {
            StyleType::Paragraph => "paragraph",
            _ => "character",
        };
        let target = match &entry.mapping {
            MappedStyle::Unstyled => "(default, not wrapped)".to_string(),
            MappedStyle::Suppressed => "(dropped)".to_string(),
            MappedStyle::Mapped(target) => format!("{{{{{}}}}}", target),
            MappedStyle::Unmapped(name) => format!("{{{{{}}}}} (no mapping)", name),
        };
        println!("{:<10} {:<32} {}", kind, entry.name, target);
    }
    Ok(())
}

fn load_source(input: &Path) -> Result<DocxSource> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    read_docx(input).with_context(|| format!("Failed to read DOCX file: {}", input.display()))
}
