//! Configuration loading and management
//!
//! Handles parsing of `.tick.toml` configuration files. A config file at
//! the vault root tunes scanning and the browser UI; a global file under
//! the platform config directory can point at the vault so `tick` works
//! from anywhere.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the per-vault configuration file.
pub const CONFIG_FILE: &str = ".tick.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vault scanning configuration
    #[serde(default)]
    pub vault: VaultConfig,

    /// Interactive browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Vault-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault directory. Only meaningful in the global config file; the
    /// per-vault file's location already is the vault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Glob patterns (relative to the vault root) excluded from scanning
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Browser-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Seconds a staged completion stays undoable before it commits
    #[serde(default = "default_undo_grace_seconds")]
    pub undo_grace_seconds: u64,
}

fn default_undo_grace_seconds() -> u64 {
    3
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            undo_grace_seconds: default_undo_grace_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a vault root, or return defaults
    pub fn load_from_vault(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Path of the global configuration file, if the platform provides a
    /// config directory.
    pub fn global_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "tick")?;
        Some(dirs.config_dir().join("config.toml"))
    }

    /// Load the global configuration, or defaults when absent.
    pub fn load_global() -> Self {
        match Self::global_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for pattern in &self.vault.ignore {
            glob::Pattern::new(pattern).map_err(|err| {
                Error::InvalidConfig(format!("invalid ignore pattern '{pattern}': {err}"))
            })?;
        }
        if self.browser.undo_grace_seconds > 60 {
            return Err(Error::InvalidConfig(
                "browser.undo_grace_seconds must be at most 60".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the vault root and its configuration.
///
/// Priority: an explicit `--dir`/`TICK_DIR` override, then the directory
/// named by the global config, then the current directory. The per-vault
/// `.tick.toml` of the resolved root supplies the remaining settings.
pub fn resolve_vault(dir: Option<PathBuf>) -> Result<(PathBuf, Config)> {
    let root = match dir {
        Some(dir) => dir,
        None => match Config::load_global().vault.directory {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        },
    };

    if !root.is_dir() {
        return Err(Error::VaultNotFound(root));
    }

    let config = Config::load_from_vault(&root);
    Ok((root, config))
}
