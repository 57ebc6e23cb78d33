//! YAML configuration file.
//!
//! Precedence, lowest first: built-in defaults, the config file, the
//! `DATABASE_URL` environment variable, command-line flags (applied by the
//! command layer).

use crate::generate::{GenerateConfig, Strategy};
use crate::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `database.url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Commented example written by `sqldoc init`
pub const EXAMPLE_CONFIG: &str = include_str!("example.yaml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{0}")]
    InvalidStrategy(String),

    #[error("no database URL found, specify it in the configuration or set the DATABASE_URL environment variable")]
    DatabaseUrlRequired,
}

/// Which database to read and what to include
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...`)
    pub url: Option<String>,
    /// Schemas to document, in output order
    pub schemas: Vec<String>,
    /// Tables to leave out (exact names)
    pub exclude_tables: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            schemas: vec!["public".to_string()],
            exclude_tables: Vec::new(),
        }
    }
}

/// Where and how documentation is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// `unified` or `per_table`
    pub strategy: String,
    pub directory: PathBuf,
    /// Output file name for the unified strategy
    pub filename: String,
    /// Print a terminal preview of each table
    pub stdout: bool,
    /// Add a Mermaid erDiagram block per table
    pub mermaid: bool,
    /// Add a constraints section per table
    pub constraints: bool,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Unified.to_string(),
            directory: PathBuf::from("."),
            filename: "schema.md".to_string(),
            stdout: true,
            mermaid: false,
            constraints: true,
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub documentation: DocumentationConfig,
}

impl Config {
    /// Parse YAML; missing fields take their defaults
    pub fn parse(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        // An empty document deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    /// Load configuration from a YAML file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults or the given file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::var(DATABASE_URL_ENV).ok());
        Ok(config)
    }

    /// Let a non-empty `DATABASE_URL` value replace the configured URL
    pub fn apply_env(&mut self, database_url: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.database.url = Some(url);
        }
    }

    /// The database URL, required when documenting a live database
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::DatabaseUrlRequired)
    }

    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.documentation
            .strategy
            .parse()
            .map_err(ConfigError::InvalidStrategy)
    }

    /// Build the generator configuration
    pub fn generate_config(&self) -> Result<GenerateConfig, ConfigError> {
        Ok(GenerateConfig {
            schemas: self.database.schemas.clone(),
            exclude_tables: self.database.exclude_tables.iter().cloned().collect(),
            strategy: self.strategy()?,
            directory: self.documentation.directory.clone(),
            filename: self.documentation.filename.clone(),
            render: RenderOptions {
                include_constraints: self.documentation.constraints,
                include_diagram: self.documentation.mermaid,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.schemas, vec!["public"]);
        assert_eq!(config.documentation.filename, "schema.md");
        assert!(config.documentation.stdout);
        assert!(!config.documentation.mermaid);
        assert_eq!(config.strategy().unwrap(), Strategy::Unified);
        assert!(matches!(
            config.database_url(),
            Err(ConfigError::DatabaseUrlRequired)
        ));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
database:
  schemas: [public, billing]
  exclude_tables: [schema_migrations]
documentation:
  strategy: per_table
  mermaid: true
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.database.schemas, vec!["public", "billing"]);
        assert_eq!(config.documentation.directory, PathBuf::from("."));
        assert!(config.documentation.constraints);

        let generate = config.generate_config().unwrap();
        assert_eq!(generate.strategy, Strategy::PerTable);
        assert!(generate.exclude_tables.contains("schema_migrations"));
        assert!(generate.render.include_diagram);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_env_overrides_file_url() {
        let mut config =
            Config::parse("database:\n  url: postgres://file/db\n").unwrap();
        config.apply_env(None);
        assert_eq!(config.database_url().unwrap(), "postgres://file/db");
        config.apply_env(Some(String::new()));
        assert_eq!(config.database_url().unwrap(), "postgres://file/db");
        config.apply_env(Some("postgres://env/db".to_string()));
        assert_eq!(config.database_url().unwrap(), "postgres://env/db");
    }

    #[test]
    fn test_invalid_strategy() {
        let config = Config::parse("documentation:\n  strategy: split\n").unwrap();
        let err = config.generate_config().unwrap_err();
        assert!(err.to_string().contains("Unknown strategy: split"));
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        assert!(config.generate_config().is_ok());
        assert!(config.database.url.is_some());
    }
}
