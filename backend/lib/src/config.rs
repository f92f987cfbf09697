use std::{io::IsTerminal, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    server::{ANY_ORIGIN, DEFAULT_HOST, DEFAULT_PORT},
    store::{
        DEFAULT_COLLECTION, DEFAULT_DATABASE_URL, DEFAULT_DATA_FILE, DEFAULT_MAX_CONNECTIONS,
        DEFAULT_TIMEOUT_SECS,
    },
};
use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    /// Origins allowed to call the API from a browser, `*` allows any
    pub cors_origins: Vec<String>,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// JSON file read by the `file` backend
    pub data_file: PathBuf,
    pub database_url: String,
    /// Table holding the shop documents
    pub collection: String,
    pub timeout_secs: u64,
    pub max_connections: u32,
    pub tls: TlsMode,
}

/// Which record store serves the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Postgres,
    #[cfg(any(test, feature = "mocks"))]
    Mock,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "postgres" => Ok(Self::Postgres),
            #[cfg(any(test, feature = "mocks"))]
            "mock" => Ok(Self::Mock),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// TLS settings for the database connection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TlsMode {
    /// Plain TCP
    #[default]
    Disabled,
    /// Verify the server against the platform trust store
    Platform,
    /// Verify the server against the PEM certificates in `path`
    CaFile { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON when stdout is not a terminal, text otherwise
    #[default]
    Auto,
    Json,
    Text,
}

impl LogFormat {
    /// Replace `Auto` with the concrete format for the current stdout
    pub fn resolve(self) -> Self {
        match self {
            LogFormat::Auto if std::io::stdout().is_terminal() => LogFormat::Text,
            LogFormat::Auto => LogFormat::Json,
            concrete => concrete,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            cors_origins: vec![ANY_ORIGIN.to_string()],
            store: StoreConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            tls: TlsMode::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), Error> {
        if self.port == 0 {
            return Err(Error::Config("port must not be 0".to_string()));
        }
        if self.cors_origins.is_empty() {
            return Err(Error::Config(
                "at least one CORS origin is required".to_string(),
            ));
        }
        self.store.validate()
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !is_sql_identifier(&self.collection) {
            return Err(Error::Config(format!(
                "collection name must be a plain identifier: {}",
                self.collection
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("store timeout must not be 0".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must not be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
