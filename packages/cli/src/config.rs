use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

use tessera_core::{database_file, PolicyError, PolicyRegistry, DEFAULT_POLICY, DEFAULT_USER};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("Invalid store kind: {0} (expected memory or sqlite)")]
    InvalidStore(String),
    #[error("Invalid auth provider: {0} (expected static or header)")]
    InvalidAuthProvider(String),
    #[error("Invalid policies: {0}")]
    InvalidPolicies(#[from] PolicyError),
    #[error("Default policy '{0}' is not defined in TESSERA_POLICIES")]
    UnknownDefaultPolicy(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            _ => Err(ConfigError::InvalidStore(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Static,  // Every request acts as the default user
    Header,  // Trusted gateway supplies X-User-Id / X-Policy-Name
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(ProviderKind::Static),
            "header" => Ok(ProviderKind::Header),
            _ => Err(ConfigError::InvalidAuthProvider(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: IpAddr,
    pub cors_origin: String,
    pub store: StoreKind,
    pub database_path: PathBuf,
    pub auth_provider: ProviderKind,
    pub default_user: String,
    pub default_policy: String,
    pub policies: PolicyRegistry,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "4010".to_string());
        let port = port_str.parse::<u16>()?;

        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_str = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let host = host_str
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_str.clone()))?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
        if HeaderValue::from_str(&cors_origin).is_err() {
            return Err(ConfigError::InvalidCorsOrigin(cors_origin));
        }

        let store = env::var("TESSERA_STORE")
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StoreKind>()?;

        let database_path = env::var("TESSERA_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| database_file());

        let auth_provider = env::var("TESSERA_AUTH_PROVIDER")
            .unwrap_or_else(|_| "static".to_string())
            .parse::<ProviderKind>()?;

        let default_user =
            env::var("TESSERA_DEFAULT_USER").unwrap_or_else(|_| DEFAULT_USER.to_string());

        let default_policy =
            env::var("TESSERA_DEFAULT_POLICY").unwrap_or_else(|_| DEFAULT_POLICY.to_string());

        let policies = match env::var("TESSERA_POLICIES") {
            Ok(list) => list.parse::<PolicyRegistry>()?,
            Err(_) => PolicyRegistry::default(),
        };

        if !policies.contains(&default_policy) {
            return Err(ConfigError::UnknownDefaultPolicy(default_policy));
        }

        Ok(Config {
            port,
            host,
            cors_origin,
            store,
            database_path,
            auth_provider,
            default_user,
            default_policy,
            policies,
        })
    }

    /// Apply a `--port` flag, held to the same rule as `PORT`
    pub fn override_port(&mut self, port: Option<u16>) -> Result<(), ConfigError> {
        match port {
            Some(0) => Err(ConfigError::PortOutOfRange(0)),
            Some(port) => {
                self.port = port;
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
