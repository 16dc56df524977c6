//! Process configuration.
//!
//! Only the listening port comes from the environment (`PORT`, default
//! `8082`). Everything else has a fixed default and can be overridden in code,
//! which is how the tests point the service at a throwaway scratch directory.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("could not resolve scratch directory {path}: {source}")]
    ScratchDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Directory for transient filtered images. Always absolute.
    pub scratch_dir: PathBuf,
    /// Upper bound on one upstream image fetch.
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            scratch_dir: absolute(&std::env::temp_dir())?,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }

    /// Replaces the scratch directory, resolving it against the current
    /// directory if it is relative.
    pub fn with_scratch_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        self.scratch_dir = absolute(dir.as_ref())?;
        Ok(self)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::ScratchDir {
        path: path.to_path_buf(),
        source,
    })
}
