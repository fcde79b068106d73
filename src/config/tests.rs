use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_cadenza_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", "/tmp/cadenza-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadenza-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn data_dir_and_storage_path_follow_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");

    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/cadenza")
    );

    let s = Settings::default();
    assert_eq!(
        s.storage_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/cadenza/storage.json")
    );
    assert_eq!(
        s.log_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/cadenza/cadenza.log")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
skip_ms = 5000
status_interval_ms = 250
autoplay = false

[library]
root = "/music"
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false
max_file_size_mb = 20

[storage]
path = "/tmp/cadenza-store.json"

[ui]
header_text = "hello"
toast_ms = 900

[log]
filter = "cadenza=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CADENZA__AUDIO__SKIP_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.skip_ms, 5000);
    assert_eq!(s.audio.status_interval_ms, 250);
    assert!(!s.audio.autoplay);
    assert_eq!(s.library.root, Some(std::path::PathBuf::from("/music")));
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_file_size_bytes(), 20 * 1024 * 1024);
    assert_eq!(
        s.storage_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadenza-store.json")
    );
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.toast_ms, 900);
    assert_eq!(s.log.filter, "cadenza=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
skip_ms = 15000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CADENZA__AUDIO__SKIP_MS", "3000");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.skip_ms, 3000);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "CADENZA_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.skip_ms, 10_000);
    assert_eq!(s.library.max_file_size_mb, 100);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_intervals() {
    let mut s = Settings::default();
    s.audio.status_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.skip_ms = 0;
    assert!(s.validate().is_err());
}

#[test]
fn to_toml_round_trips_through_loader_shape() {
    let s = Settings::default();
    let text = s.to_toml().unwrap();
    assert!(text.contains("[audio]"));
    assert!(text.contains("skip_ms = 10000"));
    assert!(text.contains("[library]"));
}
