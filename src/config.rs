use std::io;
use std::net::{AddrParseError, SocketAddr};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "purchases", about = "In-memory purchases API")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "purchases.toml")]
    pub config: String,

    /// Port to listen on; falls back to $PORT, then the config file
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings file layout. Every section and key is optional.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    /// Installs the Prometheus recorder and serves `/metrics`.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Parses the settings file at `path`. A missing file yields `Ok(None)`.
    pub fn from_file(path: &str) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_string(),
                    source,
                })
            }
        };
        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })
    }

    /// File settings (or defaults) with command line and `$PORT` on top.
    ///
    /// Tracing is not initialized yet, so a broken file is reported on stderr.
    pub fn load(cli: &CliArgs) -> Self {
        let base = Self::from_file(&cli.config).unwrap_or_else(|e| {
            eprintln!("Warning: {}; using defaults", e);
            None
        });
        base.unwrap_or_default().overridden_by(cli)
    }

    fn overridden_by(mut self, cli: &CliArgs) -> Self {
        self.server.port = cli.port.unwrap_or(self.server.port);
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        self
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
