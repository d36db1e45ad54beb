use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::data::table_view::PAGE_SIZES;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show absolute row numbers in the first column
    pub show_row_numbers: bool,

    /// Truncate cells longer than this many characters (0 = no limit)
    pub max_cell_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Initial page size; must be one of 5, 10, 20, 50
    pub default_page_size: usize,

    /// Field holding each record's unique identifier
    pub id_field: String,

    /// Primary free-text search field
    pub search_field: String,

    /// Extra fields the free-text search also reaches
    pub additional_search_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exports are written into
    pub directory: String,

    /// Base name for exported files; a timestamp is appended
    pub file_base_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: false,
            max_cell_width: 40,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            id_field: "id".to_string(),
            search_field: "name".to_string(),
            additional_search_fields: Vec::new(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_base_name: "records".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            behavior: BehaviorConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the default location, writing a fresh default
    /// file on first run. A page size outside the allowed set is reset
    /// to the default rather than carried into the view.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !PAGE_SIZES.contains(&config.behavior.default_page_size) {
            warn!(
                "config default_page_size {} not in {:?}; using 10",
                config.behavior.default_page_size, PAGE_SIZES
            );
            config.behavior.default_page_size = 10;
        }

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tableview").join("config.toml"))
    }
}
