//! Configuration file management for certinfo.
//!
//! Settings are merged from three places, later ones winning:
//!
//! 1. Default values
//! 2. Configuration file (`certinfo.toml` or specified with `--config`)
//! 3. Command-line arguments
//!
//! # Example Configuration File
//!
//! ```toml
//! files = ["attestation/leaf.pem", "attestation/intermediate.pem"]
//! output = "summary"
//! exit_code = 1
//! log_level = "info"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Main configuration structure.
///
/// All fields are optional so partial configurations can be merged.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// PEM files to inspect
    pub files: Option<Vec<String>>,
    /// Output format: text, json, summary
    pub output: Option<String>,
    /// Exit code to use when a certificate is expired or cannot be read
    pub exit_code: Option<i32>,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use certinfo::config::Config;
    /// let config = Config::from_file("certinfo.toml")?;
    /// # Ok::<(), certinfo::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Merges this configuration with another, prioritizing the other's values.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.files.is_some() {
            self.files = other.files;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.exit_code.is_some() {
            self.exit_code = other.exit_code;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self
    }

    /// Creates a Config holding only the values given on the command line.
    pub fn from_cli_args(
        files: Option<Vec<String>>,
        output: Option<String>,
        exit_code: Option<i32>,
        log_level: Option<String>,
    ) -> Self {
        Config {
            files,
            output,
            exit_code,
            log_level,
        }
    }

    /// Parses the `output` setting, falling back to text.
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        match &self.output {
            None => Ok(OutputFormat::Text),
            Some(output) => OutputFormat::from_str(output).map_err(|_| {
                ConfigError::Validation(format!(
                    "unknown output format '{}', expected text, json or summary",
                    output
                ))
            }),
        }
    }

    /// Generates an example configuration file in TOML format.
    pub fn example_toml() -> String {
        let example = Config {
            files: Some(vec![
                "attestation/leaf.pem".to_string(),
                "attestation/intermediate.pem".to_string(),
            ]),
            output: Some("summary".to_string()),
            exit_code: Some(1),
            log_level: Some("info".to_string()),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

impl Default for Config {
    /// - `files`: None (must be provided)
    /// - `output`: "text"
    /// - `exit_code`: 0
    /// - `log_level`: "warn"
    fn default() -> Self {
        Config {
            files: None,
            output: Some("text".to_string()),
            exit_code: Some(0),
            log_level: Some("warn".to_string()),
        }
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (missing required fields, invalid values, etc.)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            files = ["leaf.pem", "root.pem"]
            output = "json"
            exit_code = 1
            log_level = "debug"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(
            config.files,
            Some(vec!["leaf.pem".to_string(), "root.pem".to_string()])
        );
        assert_eq!(config.output, Some("json".to_string()));
        assert_eq!(config.exit_code, Some(1));
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_config_merge() {
        let base_config = Config {
            files: Some(vec!["base.pem".to_string()]),
            output: Some("text".to_string()),
            exit_code: Some(0),
            log_level: Some("warn".to_string()),
        };

        let override_config = Config {
            files: Some(vec!["override.pem".to_string()]),
            output: None,
            exit_code: Some(1),
            log_level: None,
        };

        let merged = base_config.merge_with(override_config);

        assert_eq!(merged.files, Some(vec!["override.pem".to_string()]));
        assert_eq!(merged.output, Some("text".to_string())); // From base (not overridden)
        assert_eq!(merged.exit_code, Some(1));
        assert_eq!(merged.log_level, Some("warn".to_string()));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.files, None);
        assert_eq!(config.output, Some("text".to_string()));
        assert_eq!(config.exit_code, Some(0));
        assert_eq!(config.log_level, Some("warn".to_string()));
    }

    #[test]
    fn test_config_from_cli_args() {
        let config = Config::from_cli_args(
            Some(vec!["cli.pem".to_string()]),
            Some("summary".to_string()),
            Some(2),
            None,
        );

        assert_eq!(config.files, Some(vec!["cli.pem".to_string()]));
        assert_eq!(config.output, Some("summary".to_string()));
        assert_eq!(config.exit_code, Some(2));
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_invalid_toml() {
        let invalid_toml = "files = [invalid toml";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = Config::from_file(temp_file.path());
        assert!(result.is_err());

        match result.unwrap_err() {
            ConfigError::Parse(_) => {} // Expected
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/certinfo.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_output_format() {
        let mut config = Config::default();
        assert_eq!(config.output_format().unwrap(), OutputFormat::Text);

        config.output = Some("json".to_string());
        assert_eq!(config.output_format().unwrap(), OutputFormat::Json);

        config.output = Some("yaml".to_string());
        assert!(matches!(
            config.output_format(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_example_toml_generation() {
        let example = Config::example_toml();

        let parsed: Config = toml::from_str(&example).unwrap();

        assert!(parsed.files.is_some());
        assert_eq!(parsed.output, Some("summary".to_string()));
        assert_eq!(parsed.exit_code, Some(1));
    }
}
