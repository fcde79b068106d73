use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `CADENZA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENZA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.status_interval_ms == 0 {
            return Err("audio.status_interval_ms must be >= 1".to_string());
        }
        if self.audio.skip_ms == 0 {
            return Err("audio.skip_ms must be >= 1".to_string());
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Store file path: `storage.path` or `<data dir>/storage.json`.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| default_data_dir().map(|d| d.join("storage.json")))
    }

    /// Log file path: `log.path` or `<data dir>/cadenza.log`.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log
            .path
            .clone()
            .or_else(|| default_data_dir().map(|d| d.join("cadenza.log")))
    }
}

/// Resolve the config path from `CADENZA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENZA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadenza/config.toml`
/// or `~/.config/cadenza/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_home("XDG_CONFIG_HOME", ".config").map(|d| d.join("cadenza").join("config.toml"))
}

/// `$XDG_DATA_HOME/cadenza` or `~/.local/share/cadenza`.
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_home("XDG_DATA_HOME", ".local/share").map(|d| d.join("cadenza"))
}

fn xdg_home(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
