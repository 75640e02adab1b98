//! Configuration loading and root folder resolution
//!
//! Root folder priority [MB-CFG]:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "ANICOLLE_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "anicolle.db";

/// Config file name looked up in the platform config directory
pub const CONFIG_FILE: &str = "anicolle.toml";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_ANIME_API_BASE_URL: &str = "http://api.moemoe.tokyo/anime/v1/master";
pub const DEFAULT_ANIME_API_TIMEOUT_SECS: u64 = 10;
/// Two weeks, matching the usual browser session cookie age
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 336;

/// Server settings read from `anicolle.toml`
///
/// Every key is optional; absent keys fall back to the compiled defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    pub anime_api_base_url: String,
    pub anime_api_timeout_secs: u64,
    pub session_ttl_hours: i64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            anime_api_base_url: DEFAULT_ANIME_API_BASE_URL.to_string(),
            anime_api_timeout_secs: DEFAULT_ANIME_API_TIMEOUT_SECS,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServerConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from an explicit path or the platform default location
    ///
    /// Missing or broken files never abort startup: a warning is logged and
    /// defaults are returned.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let path = match explicit_path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if self.session_ttl_hours <= 0 {
            return Err(Error::Config("session_ttl_hours must be positive".to_string()));
        }
        if self.anime_api_timeout_secs == 0 {
            return Err(Error::Config("anime_api_timeout_secs must be positive".to_string()));
        }
        if !self.anime_api_base_url.starts_with("http://")
            && !self.anime_api_base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "anime_api_base_url is not an http(s) URL: {}",
                self.anime_api_base_url
            )));
        }
        Ok(())
    }
}

/// Resolve the root folder holding the database
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &ServerConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("anicolle").join(CONFIG_FILE));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/anicolle").join(CONFIG_FILE);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/anicolle (or /var/lib/anicolle for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("anicolle"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/anicolle"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("anicolle"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/anicolle"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("anicolle"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\anicolle"))
    } else {
        PathBuf::from("./anicolle_data")
    }
}
