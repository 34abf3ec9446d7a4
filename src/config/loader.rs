//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::OccupancyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<OccupancyConfig, ConfigError> {
    let config: OccupancyConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<OccupancyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Load the file if it exists; otherwise fall back to validated defaults.
pub fn load_or_default(path: &Path) -> Result<OccupancyConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        let config = OccupancyConfig::default();
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(matches!(load_config(&dir.path().join("absent.toml")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_and_validation_errors() {
        assert!(matches!(parse_config("rooms = 3"), Err(ConfigError::Parse(_))));

        let err = parse_config("[[rooms]]\nname = \"Lab\"\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("rooms[0].capacity"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupancy.toml");
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:3100\"\n").unwrap();
        assert_eq!(load_config(&path).unwrap().listener.bind_address, "127.0.0.1:3100");
    }
}
