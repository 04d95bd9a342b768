use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub catalog_url: Option<Url>,
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("catalog_path", "storage/courses.json")?
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .add_source(File::with_name("config").required(false))
            // APP_CATALOG_PATH, APP_CATALOG_URL, APP_PORT, ...
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VARS: [&str; 5] = [
        "APP_CATALOG_PATH",
        "APP_CATALOG_URL",
        "APP_DEBUG",
        "APP_ENABLE_SWAGGER",
        "APP_PORT",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized with #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.catalog_path, PathBuf::from("storage/courses.json"));
        assert!(settings.catalog_url.is_none());
        assert!(!settings.debug);
        assert!(settings.enable_swagger);
        assert_eq!(settings.port, 8080);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        // SAFETY: see clear_env
        unsafe {
            std::env::set_var("APP_CATALOG_URL", "http://catalog.internal/courses.json");
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_DEBUG", "true");
        }

        let settings = Settings::from_env().unwrap();
        clear_env();

        assert_eq!(
            settings.catalog_url.map(String::from).as_deref(),
            Some("http://catalog.internal/courses.json")
        );
        assert_eq!(settings.port, 9090);
        assert!(settings.debug);
    }
}
