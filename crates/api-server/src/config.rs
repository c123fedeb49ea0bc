//! Server configuration read from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".taskboard-data";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable lookup. Blank values count as unset;
    /// unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = get("TASKBOARD_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = get("TASKBOARD_HOST") {
            match raw.parse() {
                Ok(host) => config.host = host,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid TASKBOARD_HOST"),
            }
        }

        if let Some(raw) = get("TASKBOARD_PORT") {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid TASKBOARD_PORT"),
            }
        }

        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }
}
