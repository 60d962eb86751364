//! docwiki CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docwiki:
//! - Convert: DOCX to MediaWiki markup, collecting unmapped styles into
//!   the folder's `docwiki.toml`
//! - Inspect: dump the extracted source model as JSON
//! - Styles: list a document's styles with their wiki mapping
//!
//! # Library Usage
//!
//! ```ignore
//! use docwiki_cli::{convert_command, ConvertOptions};
//!
//! let options = ConvertOptions { save_settings: true, ..Default::default() };
//! convert_command(&["reports/*.docx".to_string()], &options)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert a document next to itself (report.wiki.txt)
//! docwiki convert report.docx
//!
//! # Convert many, overwriting earlier output
//! docwiki convert 'reports/*.docx' --force
//!
//! # See which styles need a mapping
//! docwiki styles report.docx
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{
    convert_command, convert_file, default_output_path, expand_inputs, inspect_command,
    outcome_report, style_listing, styles_command,
};
pub use app::{run_cli, ConvertOptions, ConvertOutcome, OutputFormat, StyleEntry};
