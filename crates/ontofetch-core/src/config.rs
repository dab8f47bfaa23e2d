use crate::source::{default_sources, validate_sources, ImportSource};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the configured conversion-tool location.
pub const CONVERTER_ENV: &str = "ONTOFETCH_CONVERTER";

/// Global configuration loaded from `~/.config/ontofetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Directory that receives the canonical `.ttl` files.
    #[serde(default = "default_import_dir")]
    pub import_dir: PathBuf,
    /// Conversion tool: an executable, or a `.jar` run via `java -jar`.
    /// Overridable at runtime through `ONTOFETCH_CONVERTER`.
    #[serde(default = "default_converter")]
    pub converter: PathBuf,
    /// Ordered list of sources to refresh.
    #[serde(default = "default_sources")]
    pub sources: Vec<ImportSource>,
}

fn default_import_dir() -> PathBuf {
    PathBuf::from("imports")
}

fn default_converter() -> PathBuf {
    PathBuf::from("tools/rdf-convert.jar")
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            import_dir: default_import_dir(),
            converter: default_converter(),
            sources: default_sources(),
        }
    }
}

impl RefreshConfig {
    /// Effective conversion-tool location: the `ONTOFETCH_CONVERTER`
    /// environment variable wins over the configured path.
    pub fn converter_path(&self) -> PathBuf {
        env::var_os(CONVERTER_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.converter.clone())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ontofetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// The source list is validated either way.
pub fn load_or_init() -> Result<RefreshConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RefreshConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RefreshConfig = toml::from_str(&data)?;
    validate_sources(&cfg.sources)?;
    Ok(cfg)
}
