use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub buffer_size: usize,

    pub max_header_size: usize,
    pub max_body_size: usize,

    /// Deadline for reading one request. `None` waits forever.
    #[serde(deserialize_with = "deserialize_opt_duration")]
    pub read_timeout: Option<Duration>,

    /// Document served for a request path of exactly `/`.
    pub default_document: String,
    pub static_files_root: PathBuf,

    pub server_name: String,

    pub session: SessionConfig,
    pub proxy: ProxyConfig,
}

/// Paths and credentials owned by the session gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub login_path: String,
    pub protected_path: String,
    pub unauthorized_path: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub vhost_file: PathBuf,

    #[serde(deserialize_with = "deserialize_opt_duration")]
    pub connect_timeout: Option<Duration>,

    /// Deadline for each read of the backend's reply.
    #[serde(deserialize_with = "deserialize_opt_duration")]
    pub backend_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            buffer_size: 4096,

            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB

            read_timeout: None,

            default_document: "/index.html".to_string(),
            static_files_root: PathBuf::from("./static"),

            server_name: "relaynet/0.1".to_string(),

            session: SessionConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            protected_path: "/index.html".to_string(),
            unauthorized_path: "/unauthorized.html".to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            vhost_file: PathBuf::from("config/proxy.conf"),
            connect_timeout: Some(Duration::from_secs(5)),
            backend_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ServerConfig {
    /// Reads and deserializes a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str::<ServerConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`ServerConfig::load`], but falls back to the default config on error.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default config");
                ServerConfig::default()
            }
        }
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    secs.map(Duration::try_from_secs_f64)
        .transpose()
        .map_err(|err| serde::de::Error::custom(format!("invalid duration in seconds: {err}")))
}
