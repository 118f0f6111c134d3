//! Configuration file loading for modwire.
//!
//! Discovers and loads `modwire.toml` from the backend root. The config is
//! the sole input surface: the module registry and the backup naming mode
//! both live here. Missing file means built-in defaults (the stock
//! six-module registry).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use modwire_rewrite::BackupMode;
use modwire_types::spec::{default_modules, ModuleRegistry, ModuleSpec};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "modwire.toml";

/// Top-level configuration from modwire.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModwireConfig {
    /// Module registry; empty means the built-in default registry.
    pub modules: Vec<ModuleSpec>,

    /// Backup settings for aggregator rewrites.
    pub backups: BackupsConfig,
}

/// Backups section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// `fixed` (single sentinel backup, overwritten each run; the default)
    /// or `timestamped` (one backup per run).
    pub mode: BackupMode,
}

impl ModwireConfig {
    /// The validated registry: configured modules, or the stock registry
    /// when the config names none.
    pub fn registry(&self) -> anyhow::Result<ModuleRegistry> {
        let modules = if self.modules.is_empty() {
            default_modules()
        } else {
            self.modules.clone()
        };
        ModuleRegistry::new(modules).context("invalid module registry")
    }
}

/// Discover the modwire.toml config file in the backend root.
pub fn discover_config(backend_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = backend_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a modwire.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ModwireConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ModwireConfig> {
    let config: ModwireConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the backend root, or return defaults if not found.
pub fn load_or_default(backend_root: &Utf8Path) -> anyhow::Result<ModwireConfig> {
    match discover_config(backend_root) {
        Some(path) => load_config(&path),
        None => Ok(ModwireConfig::default()),
    }
}
