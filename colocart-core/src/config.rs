//! `colocart.cfg` reader.
//!
//! The file is INI-style, read the way Python's `configparser` reads it:
//! sections are case-sensitive, keys are not, values may follow either `=` or
//! `:`, indented lines continue the previous value, duplicates are rejected,
//! and `[DEFAULT]` entries act as a fallback for every section.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ColocartError;

pub const CONFIG_FILE_NAME: &str = "colocart.cfg";

pub const DEFAULT_BUILD_DIRECTORY: &str = "build";
pub const DEFAULT_BUILD_COMMAND: &str = "yarn build";
pub const DEFAULT_SUCCESS_MARKER: &str = "Compiled";
pub const DEFAULT_BUILD_INFO_PATH: &str = "src/_build_info.js";

const DEFAULT_SECTION: &str = "DEFAULT";

/// Parsed INI document: section name -> (lowercased key -> value).
#[derive(Debug, Default, Clone)]
pub struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    /// Parse INI text. `origin` is only used in error messages.
    ///
    /// A line indented deeper than the key that precedes it continues that
    /// key's value; blank lines inside such a value are kept, trailing ones
    /// dropped. Repeating a section or a key within a section is an error.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ColocartError> {
        let config_error = |line_no: usize, message: String| ColocartError::Config {
            path: origin.to_path_buf(),
            message: format!("line {line_no}: {message}"),
        };

        let mut doc = IniDocument::default();
        let mut current_section: Option<String> = None;
        // Key whose value is open for continuation, with the indentation of its line.
        let mut cursor: Option<(String, usize)> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.is_empty() {
                if let (Some(section), Some((key, _))) = (&current_section, &cursor) {
                    if let Some(value) = doc.value_mut(section, key) {
                        value.push('\n');
                    }
                }
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();
            if let (Some(section), Some((key, key_indent))) = (&current_section, &cursor) {
                if indent > *key_indent {
                    if let Some(value) = doc.value_mut(section, key) {
                        value.push('\n');
                        value.push_str(line);
                    }
                    continue;
                }
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim().to_string();
                if doc.sections.contains_key(&name) {
                    return Err(config_error(
                        line_no,
                        format!("section [{name}] already defined"),
                    ));
                }
                doc.sections.insert(name.clone(), HashMap::new());
                current_section = Some(name);
                cursor = None;
                continue;
            }

            let Some((key, value)) = split_key_value(line) else {
                return Err(config_error(
                    line_no,
                    format!("expected `key = value`, got {raw:?}"),
                ));
            };

            let Some(section) = current_section.as_ref() else {
                return Err(config_error(
                    line_no,
                    format!("key {key:?} appears before any [section]"),
                ));
            };

            let key = key.to_ascii_lowercase();
            let entries = doc.sections.entry(section.clone()).or_default();
            if entries.contains_key(&key) {
                return Err(config_error(
                    line_no,
                    format!("key {key:?} already set in section [{section}]"),
                ));
            }
            entries.insert(key.clone(), value.to_string());
            cursor = Some((key, indent));
        }

        for value in doc.sections.values_mut().flat_map(|s| s.values_mut()) {
            let len = value.trim_end().len();
            value.truncate(len);
        }

        debug!(sections = doc.sections.len(), "Parsed INI document");
        Ok(doc)
    }

    fn value_mut(&mut self, section: &str, key: &str) -> Option<&mut String> {
        self.sections.get_mut(section).and_then(|s| s.get_mut(key))
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Look up `key` in `section`, falling back to `[DEFAULT]`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.sections
            .get(section)
            .and_then(|s| s.get(&key))
            .or_else(|| {
                self.sections
                    .get(DEFAULT_SECTION)
                    .and_then(|s| s.get(&key))
            })
            .map(String::as_str)
    }
}

/// Splits on whichever of `=` or `:` comes first.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

/// Settings for the `build` subcommand, all read from `[BUILD]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub command: String,
    pub success_marker: String,
    pub build_info_path: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_BUILD_COMMAND.to_string(),
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            build_info_path: PathBuf::from(DEFAULT_BUILD_INFO_PATH),
        }
    }
}

impl BuildSettings {
    pub fn from_ini(doc: &IniDocument) -> Self {
        let defaults = BuildSettings::default();
        Self {
            command: doc
                .get("BUILD", "BuildCommand")
                .map(str::to_string)
                .unwrap_or(defaults.command),
            success_marker: doc
                .get("BUILD", "SuccessMarker")
                .map(str::to_string)
                .unwrap_or(defaults.success_marker),
            build_info_path: doc
                .get("BUILD", "BuildInfoPath")
                .map(PathBuf::from)
                .unwrap_or(defaults.build_info_path),
        }
    }

    /// Reads `<project>/colocart.cfg` if present; otherwise returns defaults.
    pub fn load_optional(project: &Path) -> Result<Self, ColocartError> {
        let path = project.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!(config_path = %path.display(), "No config file, using default build settings");
            return Ok(BuildSettings::default());
        }
        let doc = read_ini(&path)?;
        Ok(BuildSettings::from_ini(&doc))
    }
}

/// Everything `deploy` needs from `colocart.cfg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub build_directory: String,
    pub bucket_name: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

impl ProjectConfig {
    pub fn from_ini(doc: &IniDocument, origin: &Path) -> Result<Self, ColocartError> {
        let bucket_name = match doc.get("UPLOAD", "BucketName") {
            Some(name) if !name.is_empty() => name.to_string(),
            Some(_) => {
                return Err(ColocartError::Config {
                    path: origin.to_path_buf(),
                    message: "UPLOAD.BucketName must not be empty".to_string(),
                })
            }
            None => {
                return Err(ColocartError::Config {
                    path: origin.to_path_buf(),
                    message: "missing required key UPLOAD.BucketName".to_string(),
                })
            }
        };

        let build_directory = doc
            .get("BUILD", "BuildDirectory")
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_BUILD_DIRECTORY)
            .to_string();

        let optional = |key: &str| {
            doc.get("UPLOAD", key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            build_directory,
            bucket_name,
            region: optional("Region"),
            endpoint_url: optional("EndpointUrl"),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ColocartError> {
        let doc = read_ini(path)?;
        let config = ProjectConfig::from_ini(&doc, path)?;
        info!(
            config_path = %path.display(),
            bucket = %config.bucket_name,
            build_directory = %config.build_directory,
            "Loaded project config"
        );
        Ok(config)
    }
}

fn read_ini(path: &Path) -> Result<IniDocument, ColocartError> {
    let content = std::fs::read_to_string(path).map_err(|e| ColocartError::Config {
        path: path.to_path_buf(),
        message: format!("failed to read: {e}"),
    })?;
    IniDocument::parse(&content, path)
}
