use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub wage: WageConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// FLAG all-industries wage export.
    pub all_industries_csv: PathBuf,
    /// FLAG ACWIA (education/research) wage export.
    pub education_csv: PathBuf,
    /// US counties FeatureCollection with STATE/COUNTY/NAME properties.
    pub counties_geojson: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WageConfig {
    #[serde(default = "default_wage_year")]
    pub wage_year: String,
    #[serde(default = "default_source")]
    pub source: String,
    /// OFLC standard annualization factor.
    #[serde(default = "default_hours")]
    pub hours_per_year: f64,
}

impl Default for WageConfig {
    fn default() -> Self {
        WageConfig {
            wage_year: default_wage_year(),
            source: default_source(),
            hours_per_year: default_hours(),
        }
    }
}

fn default_wage_year() -> String {
    "2025-2026".to_string()
}

fn default_source() -> String {
    "U.S. DOL OFLC (FLAG wage data)".to_string()
}

fn default_hours() -> f64 {
    2080.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory served at the root (frontend bundle and /geo assets).
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
