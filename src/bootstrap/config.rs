//! Config file selection.
//!
//! `LEASEMARKET_CONFIG` (from the environment or `.env`) names the file;
//! otherwise `leasemarket.toml` in the working directory is used. A missing
//! file means defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lm_core::AppConfig;
use tracing::info;

pub const CONFIG_ENV_VAR: &str = "LEASEMARKET_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "leasemarket.toml";

pub fn resolve_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads `path`, or defaults when it does not exist.
pub fn load_app_config(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    lm_infra::load_config(path.to_path_buf())
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn env_var_overrides_default_path() {
        std::env::set_var(CONFIG_ENV_VAR, "/etc/leasemarket/custom.toml");
        assert_eq!(
            resolve_config_path(),
            PathBuf::from("/etc/leasemarket/custom.toml")
        );

        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(resolve_config_path(), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_app_config(Path::new("/this/path/does/not/exist.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn existing_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[identity]\nprincipal = \"aaaaa-aa\"\n").unwrap();

        let config = load_app_config(file.path()).unwrap();
        assert_eq!(config.principal, "aaaaa-aa");
    }
}
