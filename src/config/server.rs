use crate::config::settings::ServerSettings;
use crate::utils::error::{LeadError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub min_request_interval: Duration,
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_port(DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// All interfaces on `port`.
    pub fn with_port(port: u16) -> Self {
        let settings = ServerSettings::default();
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            min_request_interval: Duration::from_millis(settings.min_request_interval_ms),
            cache_capacity: settings.cache_capacity,
        }
    }

    /// Reads `PORT` from the process environment.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var(PORT_ENV).ok();
        Self::from_env_value(value.as_deref())
    }

    /// Unset or blank means [`DEFAULT_PORT`]; anything else must be a port in 1..=65535.
    pub fn from_env_value(value: Option<&str>) -> Result<Self> {
        let port = match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => DEFAULT_PORT,
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(LeadError::InvalidConfigValueError {
                        field: PORT_ENV.to_string(),
                        value: raw.to_string(),
                        reason: "PORT must be an integer between 1 and 65535".to_string(),
                    })
                }
            },
        };
        Ok(Self::with_port(port))
    }

    pub fn apply_settings(mut self, settings: &ServerSettings) -> Self {
        self.min_request_interval = Duration::from_millis(settings.min_request_interval_ms);
        self.cache_capacity = settings.cache_capacity;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
