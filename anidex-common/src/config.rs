//! Configuration loading and storage root resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together in [`ConfigOverrides`]
//! (the binary's argument parser reads both); this module merges them with the
//! TOML file and the compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default upper bound for a multipart request body (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 << 20;

/// Directory under the storage root holding uploaded media
pub const UPLOAD_DIR_NAME: &str = "uploaded_images";

/// Database file name under the storage root
pub const DATABASE_FILE_NAME: &str = "anidex.db";

/// How stored media files are named inside the upload directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// `<uuid>.<original extension>`; concurrent or repeated uploads never collide
    #[default]
    Unique,
    /// Sanitized original base name; a later upload with the same name overwrites
    OriginalName,
}

impl FromStr for NamingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unique" => Ok(NamingPolicy::Unique),
            "original" | "original-name" => Ok(NamingPolicy::OriginalName),
            other => Err(format!(
                "unknown naming policy '{}' (expected 'unique' or 'original')",
                other
            )),
        }
    }
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingPolicy::Unique => write!(f, "unique"),
            NamingPolicy::OriginalName => write!(f, "original"),
        }
    }
}

/// Order of the media and validation stages of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageOrder {
    /// Map form values first; media is only written for a valid payload
    #[default]
    ValidateFirst,
    /// Write media first, then map form values. A rejected payload leaves
    /// its uploaded files on disk.
    UploadFirst,
}

impl FromStr for StageOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validate-first" => Ok(StageOrder::ValidateFirst),
            "upload-first" => Ok(StageOrder::UploadFirst),
            other => Err(format!(
                "unknown stage order '{}' (expected 'validate-first' or 'upload-first')",
                other
            )),
        }
    }
}

impl fmt::Display for StageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOrder::ValidateFirst => write!(f, "validate-first"),
            StageOrder::UploadFirst => write!(f, "upload-first"),
        }
    }
}

/// Contents of the optional TOML config file
///
/// Every key is optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub storage_root: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub salt: Option<String>,
    pub naming_policy: Option<NamingPolicy>,
    pub stage_order: Option<StageOrder>,
    pub max_body_bytes: Option<usize>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load a config file from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        Self::parse(&content)
    }

    /// Load the platform config file, degrading to defaults
    ///
    /// A missing file is normal. An unreadable or malformed file is logged
    /// and ignored so the service still starts.
    pub fn load_or_default() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub storage_root: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub salt: Option<String>,
    pub naming_policy: Option<NamingPolicy>,
    pub stage_order: Option<StageOrder>,
    pub max_body_bytes: Option<usize>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub storage_root: PathBuf,
    pub database_path: PathBuf,
    /// Token signing salt; `None` disables the capability check
    pub salt: Option<String>,
    pub naming_policy: NamingPolicy,
    pub stage_order: StageOrder,
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    /// Merge overrides, file values and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let storage_root = overrides
            .storage_root
            .or(file.storage_root)
            .unwrap_or_else(default_storage_root);

        let database_path = overrides
            .database
            .or(file.database)
            .unwrap_or_else(|| storage_root.join(DATABASE_FILE_NAME));

        let max_body_bytes = overrides
            .max_body_bytes
            .or(file.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        if max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be greater than 0".to_string()));
        }

        // Empty salt is treated as "not configured"
        let salt = overrides
            .salt
            .or(file.salt)
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            storage_root,
            database_path,
            salt,
            naming_policy: overrides
                .naming_policy
                .or(file.naming_policy)
                .unwrap_or_default(),
            stage_order: overrides.stage_order.or(file.stage_order).unwrap_or_default(),
            max_body_bytes,
        })
    }

    /// Flat directory holding every uploaded media file
    pub fn upload_dir(&self) -> PathBuf {
        self.storage_root.join(UPLOAD_DIR_NAME)
    }
}

/// Platform config file location, if one exists
///
/// Linux checks `~/.config/anidex/config.toml` then `/etc/anidex/config.toml`;
/// other platforms check the user config directory only.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("anidex").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/anidex/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default storage root
pub fn default_storage_root() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/anidex (or /var/lib/anidex for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("anidex"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/anidex"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("anidex"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/anidex"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("anidex"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\anidex"))
    } else {
        PathBuf::from("./anidex_data")
    }
}
