use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process-wide settings. Loaded once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substrings searched in column names, most specific first.
    pub priority_keywords: Vec<String>,
    /// Name of the canonical column placed first in the output.
    pub output_column: String,
    /// Appended to the source file stem to name the output file.
    pub output_suffix: String,
    /// File extension picked up by bulk mode.
    pub extension: String,
    pub preview_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priority_keywords: ["timestamp", "@timestamp", "time", "datetime", "date"]
                .into_iter()
                .map(String::from)
                .collect(),
            output_column: "timestamp".to_string(),
            output_suffix: "_processed".to_string(),
            extension: "csv".to_string(),
            preview_samples: 5,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"priority_keywords": ["date"]}"#).unwrap();
        assert_eq!(cfg.priority_keywords, vec!["date".to_string()]);
        assert_eq!(cfg.output_column, "timestamp");
        assert_eq!(cfg.output_suffix, "_processed");
        assert_eq!(cfg.preview_samples, 5);
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsnorm.json");
        std::fs::write(&path, r#"{"output_suffix": "_utc", "extension": "tsv"}"#).unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.output_suffix, "_utc");
        assert_eq!(cfg.extension, "tsv");
        assert_eq!(cfg.priority_keywords.len(), 5);
    }

    #[test]
    fn load_missing_file_mentions_path() {
        let err = Config::load(Path::new("/nonexistent/tsnorm.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/tsnorm.json"));
    }
}
