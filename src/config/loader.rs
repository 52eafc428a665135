//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.relay.bind_address, "0.0.0.0:3001");
        assert_eq!(config.content.bind_address, "0.0.0.0:8080");
        assert_eq!(config.content.designated_document, "mock-ecav.html");
        assert_eq!(config.content.entry_points.len(), 4);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [relay]
            bind_address = "127.0.0.1:4001"

            [content]
            root = "/srv/mock"

            [[content.entry_points]]
            path = "monitor.html"
            description = "Main monitor"
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.bind_address, "127.0.0.1:4001");
        assert_eq!(config.relay.connect_timeout_secs, 10);
        assert_eq!(config.content.root, std::path::PathBuf::from("/srv/mock"));
        assert_eq!(config.content.entry_points.len(), 1);
        assert_eq!(config.content.default_document, "monitor.html");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = parse_config("[relay]\nconnect_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("relay.connect_timeout_secs"));
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = parse_config("[relay\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
