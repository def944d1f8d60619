//! Configuration of the database connection

use crate::Vendor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::{
    fs,
    path::{Path, PathBuf},
};

fn default_connect_timeout() -> u64 {
    10
}

/// Which database to use and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    pub vendor: Vendor,
    /// Connection URL for the remote engines, or the database path for the
    /// embedded one
    pub url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Errors that could happen when loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {1}: {0}")]
    IoError(std::io::Error, PathBuf),
    #[error("Parse error in {1}: {0}")]
    ParseError(json5::Error, PathBuf),
}

impl DatabaseConfig {
    /// Load the database configuration from a given file path
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        let filename = filename.as_ref();
        let contents =
            fs::read_to_string(filename).map_err(|e| ConfigError::IoError(e, filename.to_owned()))?;
        json5::from_str(&contents).map_err(|e| ConfigError::ParseError(e, filename.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::Write;

    #[test]
    fn parse_with_default_timeout() {
        let config: DatabaseConfig = json5::from_str(
            r#"{
                // trailing commas and comments are fine
                vendor: "mariadb",
                url: "mysql://root@localhost/bans",
            }"#,
        )
        .unwrap();

        assert_eq!(config.vendor, Vendor::MariaDb);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn parse_explicit_timeout() {
        let config: DatabaseConfig = json5::from_str(
            r#"{ vendor: "cockroachdb", url: "postgres://root@db:26257/bans", "connect-timeout-secs": 3 }"#,
        )
        .unwrap();

        assert_eq!(config.vendor, Vendor::CockroachDb);
        assert_eq!(config.connect_timeout_secs, 3);
    }

    #[test]
    fn unknown_vendor_is_rejected() {
        let result: Result<DatabaseConfig, _> =
            json5::from_str(r#"{ vendor: "oracle", url: "" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ vendor: "postgresql", url: "postgres://localhost/bans" }}"#).unwrap();

        let config = DatabaseConfig::load_file(file.path()).unwrap();
        assert_eq!(config.vendor, Vendor::PostgreSql);
        assert_eq!(config.url, "postgres://localhost/bans");
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ vendor: \"mysql\", url: ").unwrap();

        match DatabaseConfig::load_file(file.path()) {
            Err(ConfigError::ParseError(_, path)) => assert_eq!(path, file.path()),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        match DatabaseConfig::load_file("/nonexistent/warden/database.json5") {
            Err(ConfigError::IoError(_, path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/warden/database.json5"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
