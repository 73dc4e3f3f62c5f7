use super::ServerError;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Listener settings.
///
/// Defaults to `127.0.0.1:3000`; [`from_env`](ServerConfig::from_env) lets the
/// `HOST` and `PORT` environment variables override either part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST` and `PORT` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidPort`] when `PORT` is set but is not a
    /// valid port number.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST").filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().to_owned();
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|source| ServerError::InvalidPort { value: port, source })?;
        }

        Ok(config)
    }

    /// `host:port`, suitable for [`Server::bind`](super::Server::bind).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
