//! Platform-appropriate locations for config, stored drawings and logs.
//!
//! In development mode (cargo run), everything resolves to the current directory.
//! Installed builds use:
//! - Windows: `%APPDATA%\Mapscribe\`
//! - macOS: `~/Library/Application Support/Mapscribe/`
//! - Linux: `~/.config/mapscribe/` (config), `~/.local/share/mapscribe/` (data)

use std::path::PathBuf;

const APP_DIR_NAME: &str = "mapscribe";

/// Returns true when running in development mode.
///
/// Either `CARGO` is set (cargo run) or debug assertions are enabled.
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

pub fn config_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

pub fn data_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    dirs::data_dir().map(|p| p.join(APP_DIR_NAME))
}

/// `config.json` inside [`config_dir`].
pub fn config_file() -> PathBuf {
    config_dir()
        .map(|p| p.join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// The key-value store holding drawings, marker notes and history.
pub fn storage_file() -> PathBuf {
    data_dir()
        .map(|p| p.join("storage.json"))
        .unwrap_or_else(|| PathBuf::from("storage.json"))
}

pub fn logs_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Create config and data directories for installed builds.
pub fn ensure_directories() -> std::io::Result<()> {
    if is_dev_mode() {
        return Ok(());
    }

    if let Some(config) = config_dir() {
        std::fs::create_dir_all(&config)?;
    }
    if let Some(data) = data_dir() {
        std::fs::create_dir_all(&data)?;
    }
    std::fs::create_dir_all(logs_dir())?;
    Ok(())
}
