mod config;

pub use config::{AlertsConfig, Config, DurationsConfig, OverlayConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/restnow[-dev]/` based on RESTNOW_ENV.
///
/// Set RESTNOW_ENV=dev to use the development directory, or
/// RESTNOW_CONFIG_DIR to point somewhere else entirely (used by tests).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("RESTNOW_CONFIG_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RESTNOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("restnow-dev")
            } else {
                base_dir.join("restnow")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DirUnavailable {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
