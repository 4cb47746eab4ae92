// Configuration module entry point
// Loads settings from an optional file and MNML_* environment variables

mod types;

pub use types::{Config, HttpConfig, LoggingConfig};

/// Config file looked up by [`Config::load`] (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "mnml";

impl Config {
    /// Load configuration from `mnml.{toml,yaml,json,...}` if present
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Environment variables such as `MNML_HTTP__MAX_BODY_SIZE` override the
    /// file, and built-in defaults fill whatever is left.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("MNML")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse configuration from TOML text layered over the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default(
                "http.max_body_size",
                i64::try_from(defaults.http.max_body_size).unwrap_or(i64::MAX),
            )?
            .set_default(
                "http.invalid_request_status",
                i64::from(defaults.http.invalid_request_status),
            )?
            .set_default("http.not_found_body", defaults.http.not_found_body)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.http.invalid_request_status, 400);
        assert_eq!(cfg.http.not_found_body, "<h1>Page Not Found</h1>");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("definitely/not/a/config/file").unwrap();
        assert_eq!(cfg.http.invalid_request_status, 400);
        assert_eq!(cfg.logging.access_log_format, "common");
    }

    #[test]
    fn test_toml_overrides() {
        let cfg = Config::from_toml_str(
            r#"
            [http]
            invalid_request_status = 422
            max_body_size = 1024

            [logging]
            level = "debug"
            access_log_format = "json"
            error_log_file = "logs/error.log"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.http.invalid_request_status, 422);
        assert_eq!(cfg.http.max_body_size, 1024);
        assert_eq!(cfg.http.not_found_body, "<h1>Page Not Found</h1>");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.logging.error_log_file.as_deref(), Some("logs/error.log"));
    }
}
