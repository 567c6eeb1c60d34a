//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BronzeConfig, LogOutput};

/// Validates the entire configuration.
pub fn validate_config(config: &BronzeConfig) -> ConfigResult<()> {
    validate_prefix(&config.prefix)?;

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is \"file\" but logging.file_path is not set",
        ));
    }

    Ok(())
}

/// Messages are matched against the prefix verbatim, so surrounding
/// whitespace would make it unreachable.
fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.trim() != prefix {
        return Err(ConfigError::validation(format!(
            "Prefix {prefix:?} must not start or end with whitespace"
        )));
    }
    if prefix.starts_with("<@") {
        return Err(ConfigError::validation(format!(
            "Prefix {prefix:?} would shadow mention invocation"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BronzeConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_prefix_is_valid() {
        let config = BronzeConfig {
            prefix: String::new(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_padded_prefix() {
        let config = BronzeConfig {
            prefix: " !".into(),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = BronzeConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("bronze.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
