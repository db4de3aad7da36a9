//! Configuration file handling

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use prime_calc::{ProtocolOptions, ScreenshotFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub protocol: ProtocolOptions,
    pub screenshot: ScreenshotConfig,
    pub backup: BackupConfig,
}

impl Config {
    /// Get the config file path for this platform
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "prime-sync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load config from `path` (or the platform default), creating a default file if missing
    pub fn load_or_create(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path().ok_or("could not determine config directory")?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_with_header(&path)?;
            println!("created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config with header comments for new files
    pub fn save_with_header(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = r#"# prime-sync configuration file
# checksum = "strict" rejects packets whose embedded CRC does not match

"#;
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Encoding requested when none is given on the command line
    pub format: ScreenshotFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Root directory for backups (current directory when unset)
    pub directory: Option<PathBuf>,
    /// Write each backup into a `backup-YYYYmmdd-HHMMSS` subdirectory
    pub timestamped: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: None,
            timestamped: true,
        }
    }
}
