//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `userbook.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use userbook_adapter_http_axum::router::Mounts;
use userbook_domain::page::PageSize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub database: DatabaseConfig,
    /// Mount points and listing settings.
    pub http: HttpConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Which store backs the user service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `SQLite` through sqlx.
    #[default]
    Sqlite,
    /// Process-local map, lost on exit.
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Validation(format!(
                "unknown storage backend {other:?}"
            ))),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend selection.
    pub backend: Backend,
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Pool size for file-backed databases.
    pub max_connections: u32,
}

/// HTTP surface configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base path of the JSON API.
    pub api_base: String,
    /// Base path of the HTML pages.
    pub html_base: String,
    /// Users per listing page.
    pub page_size: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `userbook.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("userbook.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("USERBOOK_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("USERBOOK_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = lookup("USERBOOK_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("USERBOOK_STORAGE") {
            self.database.backend = val.parse()?;
        }
        if let Some(val) = lookup("USERBOOK_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("USERBOOK_PAGE_SIZE") {
            self.http.page_size = val.parse().map_err(|_| {
                ConfigError::Validation(format!("page size {val:?} is not a number"))
            })?;
        }
        if let Some(val) = lookup("USERBOOK_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.http.page_size == 0 {
            return Err(ConfigError::Validation(
                "page size must be non-zero".to_string(),
            ));
        }
        for base in [&self.http.api_base, &self.http.html_base] {
            if !base.starts_with('/') || base.len() < 2 || base.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "mount path {base:?} must start with '/' and not end with one"
                )));
            }
        }
        if self.http.api_base == self.http.html_base {
            return Err(ConfigError::Validation(
                "api and html mount paths must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Return the router mount points.
    #[must_use]
    pub fn mounts(&self) -> Mounts {
        Mounts {
            api: self.http.api_base.clone(),
            html: self.http.html_base.clone(),
        }
    }

    /// Return the listing page size.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is zero.
    pub fn page_size(&self) -> Result<PageSize, ConfigError> {
        PageSize::new(self.http.page_size)
            .map_err(|_| ConfigError::Validation("page size must be non-zero".to_string()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            url: "sqlite:userbook.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        let mounts = Mounts::default();
        Self {
            api_base: mounts.api,
            html_base: mounts.html,
            page_size: PageSize::DEFAULT.get(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "userbookd=info,userbook=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
