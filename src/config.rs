use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{LoadOptions, ViewOptions};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "rusty-estate.toml";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "RUSTY_ESTATE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Dashboard settings. Every field has a default, so an empty (or absent)
/// config file is valid.
///
/// ```toml
/// data_path = "data_house_price.csv"
/// default_cities = ["Seattle", "Renton", "Bellevue"]
///
/// [load]
/// min_price = 1000.0
/// on_invalid_row = "skip"
///
/// [view]
/// top_n = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub load: LoadOptions,
    pub view: ViewOptions,
    /// Cities pre-selected when a dataset is opened (those absent from the
    /// data are ignored).
    pub default_cities: Vec<String>,
    /// Initial upper price bound as a fraction of the dataset maximum.
    pub price_ceiling_ratio: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data_house_price.csv"),
            load: LoadOptions::default(),
            view: ViewOptions::default(),
            default_cities: vec!["Seattle".into(), "Renton".into(), "Bellevue".into()],
            price_ceiling_ratio: 0.5,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Resolve the effective configuration.
    ///
    /// `$RUSTY_ESTATE_CONFIG` must point at an existing file; otherwise
    /// `rusty-estate.toml` is read when present. `data_path_arg` (the first
    /// command-line argument) wins over `data_path` from the file.
    pub fn discover(data_path_arg: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => {
                log::debug!("No {CONFIG_FILE} found, using defaults");
                Self::default()
            }
        };
        if let Some(path) = data_path_arg {
            config.data_path = path;
        }
        Ok(config)
    }
}
