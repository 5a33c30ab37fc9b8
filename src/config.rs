use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Azure Retail Prices endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Region codes tried in order until one yields a price.
    /// Region-agnostic catalog entries ("Global", "Zone 1") go last.
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Pause between rows, throttling outbound request rate
    #[serde(default = "default_row_delay_ms")]
    pub row_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Optional directory for a second copy of the generated estimate
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://prices.azure.com/api/retail/prices".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_regions() -> Vec<String> {
    [
        "brazilsouth",
        "eastus2",
        "Global",
        "Intercontinental",
        "Zone 1",
        "Zone 3",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

fn default_row_delay_ms() -> u64 {
    50
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            regions: default_regions(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            row_delay_ms: default_row_delay_ms(),
        }
    }
}

/// Load configuration from an optional TOML file plus environment overrides
/// (`AZURE_ESTIMATOR__API__TIMEOUT_SECONDS` style)
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(config::Environment::with_prefix("AZURE_ESTIMATOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.api.base_url.is_empty() {
        anyhow::bail!("API base URL cannot be empty");
    }

    if !cfg.api.base_url.starts_with("http://") && !cfg.api.base_url.starts_with("https://") {
        anyhow::bail!("API base URL must be an http(s) URL: {}", cfg.api.base_url);
    }

    if cfg.api.regions.is_empty() {
        anyhow::bail!("At least one region must be configured");
    }

    for region in &cfg.api.regions {
        if region.trim().is_empty() {
            anyhow::bail!("Region names cannot be empty");
        }
    }

    if cfg.api.timeout_seconds == 0 {
        anyhow::bail!("API timeout must be greater than zero");
    }

    Ok(())
}
