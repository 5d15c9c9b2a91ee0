//! Service settings loaded from `RECIPES_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// HTTP server and file storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Load settings from the environment
    ///
    /// # Environment Variables
    /// - `RECIPES_HOST` (default: "0.0.0.0")
    /// - `RECIPES_PORT` (default: 8000)
    /// - `RECIPES_STATIC_DIR` (default: "static")
    /// - `RECIPES_MAX_UPLOAD_BYTES` (default: 10 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000_i64)?
            .set_default("static_dir", "static")?
            .set_default("max_upload_bytes", 10_i64 * 1024 * 1024)?
            .add_source(Environment::with_prefix("RECIPES").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory receiving normalized uploads
    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join("uploads")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("RECIPES_HOST");
            std::env::remove_var("RECIPES_PORT");
            std::env::remove_var("RECIPES_STATIC_DIR");
            std::env::remove_var("RECIPES_MAX_UPLOAD_BYTES");
        }
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        clear_env();

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.static_dir, PathBuf::from("static"));
        assert_eq!(settings.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.upload_dir(), PathBuf::from("static").join("uploads"));
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("RECIPES_HOST", "127.0.0.1");
            std::env::set_var("RECIPES_PORT", "9090");
            std::env::set_var("RECIPES_STATIC_DIR", "/srv/recipes");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
        assert_eq!(settings.upload_dir(), PathBuf::from("/srv/recipes/uploads"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("RECIPES_PORT", "not-a-port");
        }

        assert!(Settings::from_env().is_err());

        clear_env();
    }
}
