use std::path::PathBuf;

/// Environment variable that relocates the config directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "BARBERBOOK_CONFIG_DIR";

/// Get the home directory, with fallback to "/"
pub fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Get the config directory path (~/.config/barberbook regardless of OS,
/// unless `BARBERBOOK_CONFIG_DIR` is set)
pub fn get_config_dir() -> PathBuf {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => get_home_dir().join(".config").join("barberbook"),
    }
}

/// Get the config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Get the persisted session path
pub fn get_session_path() -> PathBuf {
    get_config_dir().join("session.json")
}

/// Directory holding the log file: `<cache_dir>/barberbook`
pub fn get_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| get_home_dir().join(".cache"))
        .join("barberbook")
}

/// Full path of the log file
pub fn get_log_path() -> PathBuf {
    get_log_dir().join("barberbook.log")
}
