//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Compiled platform defaults, used when no other configuration source
/// provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        let data_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/rollcall (or /var/lib/rollcall system-wide)
            dirs::data_local_dir()
                .map(|d| d.join("rollcall"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/rollcall"))
        } else if cfg!(target_os = "macos") {
            // ~/Library/Application Support/rollcall
            dirs::data_dir()
                .map(|d| d.join("rollcall"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/rollcall"))
        } else if cfg!(target_os = "windows") {
            // %LOCALAPPDATA%\rollcall
            dirs::data_local_dir()
                .map(|d| d.join("rollcall"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\rollcall"))
        } else {
            PathBuf::from("./rollcall_data")
        };

        Self {
            data_folder,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Logging section of the TOML configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// TOML configuration file schema
///
/// All fields are optional so old config files keep loading as the
/// schema grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data folder resolution, in priority order:
/// 1. Explicit path from the caller (command line or embedding app)
/// 2. Environment variable (`ROLLCALL_DATA_FOLDER`, then `ROLLCALL_DATA`)
/// 3. TOML config file `data_folder` key
/// 4. Compiled platform default
///
/// Resolution never fails: a missing or unreadable config file degrades
/// to the next source with a warning.
pub struct DataFolderResolver {
    module_name: String,
    explicit: Option<PathBuf>,
}

impl DataFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            explicit: None,
        }
    }

    /// Supply an explicit path (highest priority); None leaves the
    /// remaining sources in effect
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Resolve the data folder
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.explicit {
            debug!(path = %path.display(), "Data folder from explicit argument");
            return path.clone();
        }

        for var in ["ROLLCALL_DATA_FOLDER", "ROLLCALL_DATA"] {
            if let Ok(path) = std::env::var(var) {
                debug!(var, path = %path, "Data folder from environment");
                return PathBuf::from(path);
            }
        }

        match self.load_toml_config() {
            Ok(config) => {
                if let Some(path) = config.data_folder {
                    debug!(path = %path.display(), "Data folder from config file");
                    return path;
                }
            }
            Err(Error::Config(_)) => {
                // No config file is a normal first-run condition
            }
            Err(e) => {
                warn!(module = %self.module_name, error = %e, "Config file unreadable, using defaults");
            }
        }

        CompiledDefaults::for_current_platform().data_folder
    }

    /// Load and parse this module's TOML config file
    pub fn load_toml_config(&self) -> Result<TomlConfig> {
        let path = self
            .config_file_path()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if !path.exists() {
            return Err(Error::Config(format!("Config file not found: {}", path.display())));
        }

        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Per-module config file path, e.g. `~/.config/rollcall/<module>.toml`
    fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rollcall").join(format!("{}.toml", self.module_name)))
    }
}

/// Prepares a resolved data folder for use
pub struct DataFolderInitializer {
    data_folder: PathBuf,
}

impl DataFolderInitializer {
    pub fn new(data_folder: PathBuf) -> Self {
        Self { data_folder }
    }

    /// Create the data folder (and any missing parents); safe to call
    /// repeatedly
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_folder)?;
        Ok(())
    }

    /// Path of the shared database inside the data folder
    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join("rollcall.db")
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
