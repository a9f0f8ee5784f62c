//! Configuration loading and root folder resolution
//!
//! The root folder holds the service database (`vendio.db`) and any files the
//! service writes. Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable consulted during root folder resolution
pub const ROOT_FOLDER_ENV: &str = "VENDIO_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "vendio.db";

/// Resolve the root folder following the 4-tier priority order
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Ensure the root folder exists, creating it if necessary
pub fn ensure_root_folder(root: &PathBuf) -> Result<()> {
    if !root.exists() {
        std::fs::create_dir_all(root)?;
    }
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "Root folder is not a directory: {}",
            root.display()
        )));
    }
    Ok(())
}

/// Path of the service database inside the root folder
pub fn database_path(root: &PathBuf) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Locate the configuration file for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/vendio/config.toml first, then /etc/vendio/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("vendio").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/vendio/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("vendio").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("vendio"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/vendio"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("vendio"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vendio"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("vendio"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vendio"))
    } else {
        PathBuf::from("./vendio_data")
    }
}
