//! Per-folder conversion settings
//!
//! Settings live in a `docwiki.toml` next to the converted documents. The
//! file carries document-wide options and the style name mappings. Styles
//! that a conversion found without a mapping are appended to it as identity
//! mappings, so users can edit them for the next run.
//!
//! ```toml
//! [options]
//! ignore_font_color = false
//! default_styles = ["Standard", "Normal"]
//!
//! [styles]
//! "my-title" = "my-wiki-namespace:big-title"
//! "my-ignored-style" = ""
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::resolver::ResolverOptions;
use crate::style_names::{StyleNameMap, DEFAULT_STYLE_NAMES};

/// Name of the settings file looked up next to a document
pub const SETTINGS_FILE_NAME: &str = "docwiki.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConversionSettings {
    /// Document-wide options
    pub options: ConversionOptions,
    /// Source style name to target template name; blank drops the style
    pub styles: BTreeMap<String, String>,
}

/// Document-wide options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Drop font colors from the output
    pub ignore_font_color: bool,
    /// Style names that mean "no style"
    pub default_styles: Vec<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            ignore_font_color: false,
            default_styles: default_style_names(),
        }
    }
}

fn default_style_names() -> Vec<String> {
    DEFAULT_STYLE_NAMES.iter().map(|s| s.to_string()).collect()
}

impl ConversionSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            styles = settings.styles.len(),
            "loaded settings"
        );
        Ok(settings)
    }

    /// Settings file path for a document: `docwiki.toml` in its folder
    pub fn path_for(document: &Path) -> std::path::PathBuf {
        document
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SETTINGS_FILE_NAME)
    }

    /// Name mapper built from the `[styles]` table
    pub fn name_map(&self) -> StyleNameMap {
        self.styles.iter().fold(
            StyleNameMap::new().with_default_names(self.options.default_styles.iter().cloned()),
            |map, (source, target)| map.with_mapping(source.clone(), target.clone()),
        )
    }

    /// Resolver switches derived from `[options]`
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            ignore_font_color: self.options.ignore_font_color,
        }
    }

    /// Serialize the settings as TOML (comments are not preserved)
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Record `missing` styles in the settings file at `path` as identity
    /// mappings.
    ///
    /// A new file is created with a commented introduction. An existing file
    /// keeps its content and comments; the mappings are appended to its
    /// `[styles]` table. Returns `false` when there was nothing to write.
    pub fn save_missing_styles(
        &mut self,
        path: &Path,
        missing: &BTreeSet<String>,
        source_name: &str,
    ) -> Result<bool> {
        let new_styles: Vec<&String> = missing
            .iter()
            .filter(|name| !self.styles.contains_key(name.as_str()))
            .collect();
        if new_styles.is_empty() {
            return Ok(false);
        }

        let mappings: String = new_styles
            .iter()
            .map(|name| format!("{} = {}\n", toml_string(name), toml_string(name)))
            .collect();

        if !path.exists() {
            let mut content = new_file_intro(&self.options);
            content.push_str(&mappings);
            fs::write(path, content)?;
            info!(path = %path.display(), styles = new_styles.len(), "created settings file");
        } else {
            let existing = fs::read_to_string(path)?;
            match last_table_header(&existing) {
                Some("styles") | None => {
                    let mut file = fs::OpenOptions::new().append(true).open(path)?;
                    let mut block = format!(
                        "\n# styles added from '{}', change them as you see fit\n",
                        source_name
                    );
                    if last_table_header(&existing).is_none() {
                        block.push_str("[styles]\n");
                    }
                    block.push_str(&mappings);
                    file.write_all(block.as_bytes())?;
                    info!(
                        path = %path.display(),
                        styles = new_styles.len(),
                        "appended styles to settings file"
                    );
                }
                Some(other) => {
                    warn!(
                        path = %path.display(),
                        last_table = other,
                        "[styles] is not the last table, rewriting settings file without comments"
                    );
                    let mut merged = self.clone();
                    for name in &new_styles {
                        merged.styles.insert((*name).clone(), (*name).clone());
                    }
                    fs::write(path, merged.to_toml_string()?)?;
                }
            }
        }

        for name in new_styles {
            self.styles.insert(name.clone(), name.clone());
        }
        Ok(true)
    }
}

/// Quote a string as a TOML basic string
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

/// Name of the last `[table]` header in a TOML document
fn last_table_header(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('[') && !line.starts_with("[["))
        .filter_map(|line| line.strip_prefix('[')?.split(']').next())
        .map(str::trim)
        .last()
}

fn new_file_intro(options: &ConversionOptions) -> String {
    let defaults: Vec<String> = options
        .default_styles
        .iter()
        .map(|s| toml_string(s))
        .collect();
    format!(
        r#"# docwiki conversion settings
#
# Applied when converting any document in the same folder as this file.
# Lines starting with `#` are comments.

[options]
# Leave font colors out of the converted wiki text
ignore_font_color = {ignore}
# Style names that mean "no style"; their content is not wrapped
default_styles = [{defaults}]

# Mappings of document styles to wiki templates.
#
# A paragraph with text `Introduction` and style `my-title`, with the line
#     "my-title" = "my-wiki-namespace:big-title"
# is converted to
#     {{{{my-wiki-namespace:big-title|Introduction}}}}
#
# To drop a style, map it to an empty string:
#     "my-ignored-style" = ""
#
# Keep this table last: styles found without a mapping are appended below.
[styles]
"#,
        ignore = options.ignore_font_color,
        defaults = defaults.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style_names::{MappedStyle, NameMapper};
    use tempfile::TempDir;

    fn missing(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_settings() {
        let settings = ConversionSettings::from_toml_str(
            r#"
[options]
ignore_font_color = true

[styles]
"quote" = "myns:quote"
"Comment" = ""
"#,
        )
        .unwrap();

        assert!(settings.options.ignore_font_color);
        assert_eq!(settings.options.default_styles, default_style_names());
        assert!(settings.resolver_options().ignore_font_color);

        let names = settings.name_map();
        assert_eq!(names.map_style("quote"), MappedStyle::Mapped("myns:quote".into()));
        assert_eq!(names.map_style("Comment"), MappedStyle::Suppressed);
        assert_eq!(names.map_style("Standard"), MappedStyle::Unstyled);
    }

    #[test]
    fn test_empty_settings() {
        let settings = ConversionSettings::from_toml_str("").unwrap();
        assert_eq!(settings, ConversionSettings::default());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(ConversionSettings::from_toml_str("[options]\nignore_font_color = \"maybe\"").is_err());
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = ConversionSettings::load(&dir.path().join(SETTINGS_FILE_NAME)).unwrap();
        assert_eq!(settings, ConversionSettings::default());
    }

    #[test]
    fn test_path_for_document() {
        let path = ConversionSettings::path_for(Path::new("docs/report.docx"));
        assert_eq!(path, Path::new("docs").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn test_create_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let mut settings = ConversionSettings::default();

        let written = settings
            .save_missing_styles(&path, &missing(&["Code Block", "Aside"]), "report.docx")
            .unwrap();
        assert!(written);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# docwiki conversion settings"));
        assert!(content.find("[options]").unwrap() < content.find("[styles]").unwrap());
        assert!(content.contains("{{my-wiki-namespace:big-title|Introduction}}"));

        let reloaded = ConversionSettings::load(&path).unwrap();
        assert_eq!(reloaded.styles.get("Code Block").map(String::as_str), Some("Code Block"));
        assert_eq!(reloaded.styles.get("Aside").map(String::as_str), Some("Aside"));
        assert_eq!(reloaded.options, ConversionOptions::default());
    }

    #[test]
    fn test_append_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "# my notes\n[styles]\n\"quote\" = \"myns:quote\"\n").unwrap();

        let mut settings = ConversionSettings::load(&path).unwrap();
        settings
            .save_missing_styles(&path, &missing(&["quote", "Aside"]), "report.docx")
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# my notes\n"));
        assert!(content.contains("# styles added from 'report.docx'"));
        assert_eq!(content.matches("\"quote\"").count(), 1);

        let reloaded = ConversionSettings::load(&path).unwrap();
        assert_eq!(reloaded.styles.len(), 2);
        assert_eq!(reloaded.styles["quote"], "myns:quote");
    }

    #[test]
    fn test_append_adds_styles_table_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "[options]\nignore_font_color = true\n").unwrap();

        let mut settings = ConversionSettings::load(&path).unwrap();
        settings
            .save_missing_styles(&path, &missing(&["Aside"]), "a.docx")
            .unwrap();

        let reloaded = ConversionSettings::load(&path).unwrap();
        assert!(reloaded.options.ignore_font_color);
        assert_eq!(reloaded.styles["Aside"], "Aside");
    }

    #[test]
    fn test_rewrite_when_styles_not_last() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            "[styles]\n\"quote\" = \"q\"\n\n[options]\nignore_font_color = true\n",
        )
        .unwrap();

        let mut settings = ConversionSettings::load(&path).unwrap();
        settings
            .save_missing_styles(&path, &missing(&["Aside"]), "a.docx")
            .unwrap();

        let reloaded = ConversionSettings::load(&path).unwrap();
        assert!(reloaded.options.ignore_font_color);
        assert_eq!(reloaded.styles["quote"], "q");
        assert_eq!(reloaded.styles["Aside"], "Aside");
    }

    #[test]
    fn test_nothing_missing_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let mut settings = ConversionSettings::default();
        assert!(!settings
            .save_missing_styles(&path, &BTreeSet::new(), "a.docx")
            .unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_last_table_header() {
        assert_eq!(last_table_header("[options]\na = 1\n[styles]\n"), Some("styles"));
        assert_eq!(last_table_header("a = 1\n"), None);
        assert_eq!(last_table_header("[styles]\n[ options ]\n"), Some("options"));
    }
}
