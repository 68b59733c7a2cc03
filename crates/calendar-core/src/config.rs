//! Configuration loading and typed config structures for the calendar service.
//!
//! The canonical configuration is a YAML file (by default
//! `/etc/calendar/config.yaml`). Every section and field has a default,
//! so a partial file (or none at all) still yields a runnable service
//! backed by the in-memory store.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// Log level and output format.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// JSON API listener.
    #[serde(default)]
    pub http: HttpConfig,

    /// gRPC listener.
    #[serde(default)]
    pub grpc: GrpcConfig,

    /// Backend selection and `PostgreSQL` connection settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Process lifecycle settings.
    #[serde(default)]
    pub server: LifecycleConfig,
}

impl CalendarConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `DATABASE_URL` overrides `storage.postgres.url`
    /// - `CALENDAR_HTTP_PORT` overrides `http.port`
    /// - `CALENDAR_GRPC_PORT` overrides `grpc.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `DATABASE_URL`, `CALENDAR_HTTP_PORT` and `CALENDAR_GRPC_PORT`.
    ///
    /// Unparseable port values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.storage.postgres.url = Some(url);
        }
        if let Some(port) = env_port("CALENDAR_HTTP_PORT") {
            self.http.port = port;
        }
        if let Some(port) = env_port("CALENDAR_GRPC_PORT") {
            self.grpc.port = port;
        }
    }
}

fn env_port(name: &str) -> Option<u16> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Generates a listener config struct with its own default port.
macro_rules! define_listener {
    (
        $(#[$meta:meta])*
        $name:ident, $port_default:literal, $port_fn:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
        pub struct $name {
            /// Host or IP to bind.
            #[serde(default = "default_host")]
            pub host: String,

            /// TCP port to bind.
            #[serde(default = $port_default)]
            pub port: u16,

            /// Deadline applied to every request's storage calls.
            #[serde(default = "default_request_timeout_ms")]
            pub request_timeout_ms: u64,
        }

        impl $name {
            /// `host:port` suitable for binding.
            pub fn address(&self) -> String {
                format!("{}:{}", self.host, self.port)
            }

            /// The request deadline as a [`Duration`].
            pub const fn request_timeout(&self) -> Duration {
                Duration::from_millis(self.request_timeout_ms)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    host: default_host(),
                    port: $port_fn(),
                    request_timeout_ms: default_request_timeout_ms(),
                }
            }
        }
    };
}

define_listener! {
    /// JSON API listener configuration.
    HttpConfig, "default_http_port", default_http_port
}

define_listener! {
    /// gRPC listener configuration.
    GrpcConfig, "default_grpc_port", default_grpc_port
}

/// Which [`Repository`](crate::Repository) backend to build at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// [`MemoryStore`](crate::MemoryStore).
    #[default]
    Memory,
    /// `PostgreSQL` via `calendar-db`.
    #[serde(alias = "postgres")]
    Sql,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default, rename = "type")]
    pub kind: StorageKind,

    /// Connection settings, used when `kind` is [`StorageKind::Sql`].
    #[serde(default)]
    pub postgres: PostgresSettings,
}

/// `PostgreSQL` connection settings.
///
/// Either `url` is set, or the URL is assembled from the individual
/// fields with the password read from the environment variable named by
/// `password_env`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgresSettings {
    /// Full connection URL; takes precedence over the individual fields.
    #[serde(default)]
    pub url: Option<String>,

    /// Database host.
    #[serde(default = "default_pg_host")]
    pub host: String,

    /// Database port.
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database user.
    #[serde(default = "default_pg_user")]
    pub user: String,

    /// Database name.
    #[serde(default = "default_pg_dbname")]
    pub dbname: String,

    /// Name of the environment variable holding the password.
    #[serde(default = "default_pg_password_env")]
    pub password_env: String,

    /// `sslmode` connection parameter.
    #[serde(default = "default_pg_sslmode")]
    pub sslmode: String,

    /// Upper bound on open connections.
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: u32,

    /// Connections older than this are recycled.
    #[serde(default = "default_pg_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
}

impl PostgresSettings {
    /// The connection URL to use.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let password = std::env::var(&self.password_env).unwrap_or_default();
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            self.user, password, self.host, self.port, self.dbname, self.sslmode
        )
    }

    /// `max_lifetime_secs` as a [`Duration`].
    pub const fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            dbname: default_pg_dbname(),
            password_env: default_pg_password_env(),
            sslmode: default_pg_sslmode(),
            max_connections: default_pg_max_connections(),
            max_lifetime_secs: default_pg_max_lifetime_secs(),
        }
    }
}

/// Process lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LifecycleConfig {
    /// How long the servers get to drain in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl LifecycleConfig {
    /// The drain budget as a [`Duration`].
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    String::from("info")
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_http_port() -> u16 {
    8080
}

const fn default_grpc_port() -> u16 {
    50051
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_pg_host() -> String {
    String::from("localhost")
}

const fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    String::from("calendar")
}

fn default_pg_dbname() -> String {
    String::from("calendar")
}

fn default_pg_password_env() -> String {
    String::from("CALENDAR_DB_PASSWORD")
}

fn default_pg_sslmode() -> String {
    String::from("disable")
}

const fn default_pg_max_connections() -> u32 {
    10
}

const fn default_pg_max_lifetime_secs() -> u64 {
    3600
}

const fn default_shutdown_timeout_ms() -> u64 {
    3000
}
