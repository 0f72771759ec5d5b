use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorContextExt, NotifyError, NotifyResult};
use crate::types::Params;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "NOTIFY_ROUTER_CONFIG";

const CONFIG_DIR: &str = "notify-router";
const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`
///
/// ```toml
/// [services]
/// alerts = "ntfy://ntfy.sh/alerts"
///
/// [params]
/// title = "Backup"
///
/// [logging]
/// level = "info"
/// file = "/var/log/notify-router.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Named service URLs, usable as `send -s NAME`
    pub services: BTreeMap<String, String>,
    /// Params applied to every send unless overridden on the command line
    pub params: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Also write logs to this file (rotated daily)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn default_params(&self) -> Params {
        self.params.iter().collect()
    }
}

/// Loads and persists the TOML configuration
///
/// The location is, in order of precedence: the explicit path, the
/// `NOTIFY_ROUTER_CONFIG` environment variable, then
/// `<config dir>/notify-router/config.toml`. A missing file is not an error;
/// defaults are used until `init` or `save` writes one.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    pub fn load(path: Option<PathBuf>) -> NotifyResult<Self> {
        let config_path = Self::resolve_path(path)?;
        let config = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).io_context(&config_path, "read config file")?;
            toml::from_str(&content).config_context("Failed to parse config file")?
        } else {
            Config::default()
        };
        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn resolve_path(path: Option<PathBuf>) -> NotifyResult<PathBuf> {
        if let Some(path) = path {
            return Ok(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Self::default_path()
    }

    pub fn default_path() -> NotifyResult<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| NotifyError::config("Failed to get base directories"))?;
        Ok(base_dirs.config_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Write a default config file; returns `false` when one exists and `force` is unset
    pub fn init(&mut self, force: bool) -> NotifyResult<bool> {
        if self.exists() && !force {
            return Ok(false);
        }
        self.config = Config::default();
        self.save()?;
        Ok(true)
    }

    pub fn save(&self) -> NotifyResult<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).io_context(parent, "create config directory")?;
        }
        let content =
            toml::to_string_pretty(&self.config).config_context("Failed to serialize config")?;
        fs::write(&self.config_path, content).io_context(&self.config_path, "write config file")?;
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// URL of the named service from `[services]`
    pub fn service_url(&self, name: &str) -> NotifyResult<&str> {
        self.config
            .services
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| NotifyError::config(format!("no service named '{name}' in config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::load(Some(dir.path().join("nested").join(CONFIG_FILE))).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        assert!(!manager.exists());
        assert_eq!(manager.config(), &Config::default());
        assert_eq!(manager.config().logging.level, "info");
    }

    #[test]
    fn test_init_respects_force() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        assert!(manager.init(false).unwrap());
        assert!(manager.exists());

        manager
            .config_mut()
            .services
            .insert("log".into(), "logger://".into());
        manager.save().unwrap();
        assert!(!manager.init(false).unwrap());
        let reloaded = ConfigManager::load(Some(manager.config_path().to_path_buf())).unwrap();
        assert_eq!(reloaded.config().services.len(), 1);

        assert!(manager.init(true).unwrap());
        assert!(manager.config().services.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let config = manager.config_mut();
        config
            .services
            .insert("alerts".into(), "ntfy://ntfy.sh/alerts".into());
        config.params.insert("title".into(), "Backup".into());
        config.logging.file = Some(dir.path().join("router.log"));
        manager.save().unwrap();

        let reloaded = ConfigManager::load(Some(manager.config_path().to_path_buf())).unwrap();
        assert_eq!(reloaded.config(), manager.config());
        assert_eq!(reloaded.service_url("alerts").unwrap(), "ntfy://ntfy.sh/alerts");
        assert_eq!(reloaded.config().default_params().get("title"), Some("Backup"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[services]\nlog = \"logger://\"\n").unwrap();
        let manager = ConfigManager::load(Some(path)).unwrap();
        assert_eq!(manager.config().logging.level, "info");
        assert!(manager.service_url("missing").unwrap_err().is_config_error());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[services\n").unwrap();
        assert!(ConfigManager::load(Some(path)).unwrap_err().is_config_error());
    }
}
