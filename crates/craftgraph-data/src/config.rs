//! Engine-config file loading with extension-based format detection.
//!
//! The config is optional: a pipeline without a config file runs on
//! [`EngineConfig::default`]. When present, `engine.ron` / `engine.toml` /
//! `engine.json` are all accepted, but only one of them may exist.

use craftgraph_core::config::EngineConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file has an extension we don't support.
    #[error("unsupported config format: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two config files with different formats exist side by side.
    #[error("conflicting config files: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Scan a directory for `{base_name}.{ron,toml,json}`. Returns `Ok(None)`
/// when no config exists, or an error when more than one format does.
pub fn find_config_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, ConfigError> {
    let mut found: Option<PathBuf> = None;
    for extension in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{extension}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(ConfigError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

/// Read and deserialize one config file according to its extension.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let parse_error = |detail: String| ConfigError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Load `{base_name}` config from a directory, falling back to defaults
/// when no file exists.
pub fn load_config_dir(dir: &Path, base_name: &str) -> Result<EngineConfig, ConfigError> {
    match find_config_file(dir, base_name)? {
        Some(path) => load_config(&path),
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftgraph_core::id::ObjectId;
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "craftgraph_config_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn detect_format_variants() {
        assert_eq!(detect_format(Path::new("engine.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("engine.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("engine.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("engine.yaml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_json_config() {
        let dir = make_test_dir("json");
        let path = dir.join("engine.json");
        fs::write(&path, r#"{"food_bonus": 2, "grave_id": 87}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.food_bonus, 2);
        assert_eq!(config.decay_collapse_limit, 10);
        cleanup(&dir);
    }

    #[test]
    fn load_toml_config() {
        let dir = make_test_dir("toml");
        let path = dir.join("engine.toml");
        fs::write(&path, "food_bonus = 1\ntool_search_limit = 6\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.food_bonus, 1);
        assert_eq!(config.tool_search_limit, 6);
        cleanup(&dir);
    }

    #[test]
    fn load_ron_config() {
        let dir = make_test_dir("ron");
        let path = dir.join("engine.ron");
        fs::write(&path, "(grave_id: 88)").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.grave_id, ObjectId(88));
        cleanup(&dir);
    }

    #[test]
    fn parse_error_reports_the_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("engine.json");
        fs::write(&path, "{{{not json").unwrap();
        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        cleanup(&dir);
    }

    #[test]
    fn conflicting_formats_rejected() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("engine.json"), "{}").unwrap();
        fs::write(dir.join("engine.toml"), "").unwrap();
        assert!(matches!(
            find_config_file(&dir, "engine"),
            Err(ConfigError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = make_test_dir("missing");
        let config = load_config_dir(&dir, "engine").unwrap();
        assert_eq!(config, EngineConfig::default());
        cleanup(&dir);
    }
}
