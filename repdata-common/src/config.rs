use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub sidebar_width: Option<u16>, // falls back to 34 when None
    #[serde(default = "default_grid_page")]
    pub grid_page_size: usize,
}

fn default_theme() -> String {
    "lux".into()
}
fn default_grid_page() -> usize {
    20
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            sidebar_width: None,
            grid_page_size: default_grid_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub dataset_path: Option<String>,
    #[serde(default)]
    pub vocabulary_path: Option<String>,
    #[serde(default = "default_theme_delimiter")]
    pub theme_delimiter: String,
}

fn default_theme_delimiter() -> String {
    ";".into()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            vocabulary_path: None,
            theme_delimiter: default_theme_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_placeholder")]
    pub text_placeholder: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_placeholder() -> String {
    "Enter text...".into()
}
fn default_top_n() -> usize {
    10
}
fn default_parallel_threshold() -> usize {
    50_000 // rows; smaller tables are scanned on the calling thread
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            text_placeholder: default_placeholder(),
            top_n: default_top_n(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_file_name() -> String {
    "resources.csv".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_name: default_file_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        if let Ok(env_path) = std::env::var("REPDATA_CONFIG") {
            return PathBuf::from(env_path); // $REPDATA_CONFIG overrides default config path
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repdata")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::RepDataError::Other(e.to_string()))?;
        Ok(cfg)
    }

    pub fn save(&self) -> crate::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::RepDataError::Other(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    pub fn export_path(&self) -> PathBuf {
        std::path::Path::new(&self.export.output_dir).join(&self.export.file_name)
    }
}
