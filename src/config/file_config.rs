use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration file. Every value present here overrides the
/// corresponding CLI argument.
///
/// ```toml
/// input_path = "exports/road-trip.json"
/// owner_user_id = 1
/// on_error = "continue"
///
/// [database]
/// path = "library.db"
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub input_path: Option<String>,
    pub owner_user_id: Option<i64>,
    pub on_error: Option<String>,
    pub dry_run: Option<bool>,

    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
