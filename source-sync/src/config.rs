//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for the sync jobs, the engine and the API.
//!
//! Every loader takes a lookup function so tests can feed a map instead of
//! mutating the process environment; [`AppConfig::from_env`] wraps `std::env::var`.

use std::path::PathBuf;
use std::time::Duration;

use search_engine::EngineConfig;
use tracing::warn;

use crate::errors::ConfigError;

pub const DEFAULT_INTERVAL_SECS: u64 = 60 * 60;
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "csv", "json"];
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_ELASTIC_URL: &str = "http://elasticsearch:9200";

/// PostgreSQL source settings. The pass runs only when user, password,
/// db name and table are all present.
#[derive(Clone, Default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub table: Option<String>,
}

/// Borrowed view of a complete set of database parameters.
#[derive(Debug, Clone, Copy)]
pub struct PgCredentials<'a> {
    pub user: &'a str,
    pub password: &'a str,
    pub dbname: &'a str,
    pub table: &'a str,
}

impl PostgresConfig {
    /// `None` when any of the four required parameters is missing.
    pub fn credentials(&self) -> Option<PgCredentials<'_>> {
        Some(PgCredentials {
            user: self.user.as_deref()?,
            password: self.password.as_deref()?,
            dbname: self.dbname.as_deref()?,
            table: self.table.as_deref()?,
        })
    }
}

impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("dbname", &self.dbname)
            .field("table", &self.table)
            .finish()
    }
}

/// Settings of the periodic sync jobs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between two sync cycles.
    pub interval: Duration,
    /// Root of the filesystem source; the pass is a no-op when `None`.
    pub file_root: Option<PathBuf>,
    /// Allowed file extensions (case-sensitive, without the dot).
    pub allowed_extensions: Vec<String>,
    /// Documents per bulk request.
    pub batch_size: usize,
    pub postgres: PostgresConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            file_root: Some(PathBuf::from("filestore")),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            postgres: PostgresConfig {
                host: "postgres".to_string(),
                port: 5432,
                ..PostgresConfig::default()
            },
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP bind address, e.g. `0.0.0.0:8000`.
    pub api_address: String,
    pub sync: SyncConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// Environment variables used:
    /// - `API_ADDRESS` (default: `0.0.0.0:8000`)
    /// - `INTERVAL` seconds between cycles (default: 3600; unparsable values fall back)
    /// - `FILE_PATH` (default: `./filestore`)
    /// - `FILE_EXTENSION_ALLOWED` comma-separated (default: `txt,csv,json`)
    /// - `SYNC_BATCH_SIZE` (default: 500)
    /// - `PSQL_HOST` (default: `postgres`), `PSQL_PORT` (default: 5432)
    /// - `PSQL_USER`, `PSQL_PASSWD`, `PSQL_DBNAME`, `PSQL_TABLE_NAME`
    /// - `ELASTIC_URL` (default: `http://elasticsearch:9200`)
    /// - `ELASTIC_USERNAME`, `ELASTIC_PASSWORD`
    /// - `ELASTIC_TIMEOUT_SECS` (default: 30)
    /// - `ELASTIC_FILE_INDEX` (default: `filestore`), `ELASTIC_DB_INDEX` (default: `postgres`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let interval = match get("INTERVAL") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(value = %raw, "INTERVAL is not a number, using default");
                DEFAULT_INTERVAL_SECS
            }),
            None => DEFAULT_INTERVAL_SECS,
        };

        let file_root = get("FILE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("filestore"));

        let allowed_extensions = match get("FILE_EXTENSION_ALLOWED") {
            Some(raw) => split_extensions(&raw),
            None => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };

        let batch_size = parse_num::<usize>(get("SYNC_BATCH_SIZE"), "SYNC_BATCH_SIZE", "expected usize")?
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ConfigError::InvalidNumber {
                var: "SYNC_BATCH_SIZE",
                reason: "must be > 0",
            });
        }

        let postgres = PostgresConfig {
            host: get("PSQL_HOST").unwrap_or_else(|| "postgres".to_string()),
            port: parse_num::<u16>(get("PSQL_PORT"), "PSQL_PORT", "expected u16")?.unwrap_or(5432),
            user: get("PSQL_USER"),
            password: get("PSQL_PASSWD"),
            dbname: get("PSQL_DBNAME"),
            table: get("PSQL_TABLE_NAME"),
        };

        let mut engine =
            EngineConfig::new(get("ELASTIC_URL").unwrap_or_else(|| DEFAULT_ELASTIC_URL.to_string()));
        engine.username = get("ELASTIC_USERNAME");
        engine.password = get("ELASTIC_PASSWORD");
        if let Some(secs) =
            parse_num::<u64>(get("ELASTIC_TIMEOUT_SECS"), "ELASTIC_TIMEOUT_SECS", "expected u64")?
        {
            engine.timeout = Duration::from_secs(secs);
        }
        if let Some(idx) = get("ELASTIC_FILE_INDEX") {
            engine.file_index = idx;
        }
        if let Some(idx) = get("ELASTIC_DB_INDEX") {
            engine.db_index = idx;
        }

        Ok(Self {
            api_address: get("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string()),
            sync: SyncConfig {
                interval: Duration::from_secs(interval),
                file_root: Some(file_root),
                allowed_extensions,
                batch_size,
                postgres,
            },
            engine,
        })
    }
}

/// Splits `txt, csv,,json` into `["txt", "csv", "json"]`.
pub fn split_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_num<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    reason: &'static str,
) -> Result<Option<T>, ConfigError> {
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, reason }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:8000");
        assert_eq!(cfg.sync.interval, Duration::from_secs(3600));
        assert_eq!(cfg.sync.file_root, Some(PathBuf::from("filestore")));
        assert_eq!(cfg.sync.allowed_extensions, vec!["txt", "csv", "json"]);
        assert_eq!(cfg.sync.batch_size, 500);
        assert_eq!(cfg.sync.postgres.host, "postgres");
        assert_eq!(cfg.sync.postgres.port, 5432);
        assert!(cfg.sync.postgres.credentials().is_none());
        assert_eq!(cfg.engine.url, "http://elasticsearch:9200");
        assert_eq!(cfg.engine.file_index, "filestore");
        assert_eq!(cfg.engine.db_index, "postgres");
        assert_eq!(cfg.engine.timeout, Duration::from_secs(30));
    }

    #[test]
    fn unparsable_interval_falls_back_to_default() {
        let cfg = load(&[("INTERVAL", "soon")]).unwrap();
        assert_eq!(cfg.sync.interval, Duration::from_secs(3600));

        let cfg = load(&[("INTERVAL", "15")]).unwrap();
        assert_eq!(cfg.sync.interval, Duration::from_secs(15));
    }

    #[test]
    fn extensions_are_split_on_commas() {
        let cfg = load(&[("FILE_EXTENSION_ALLOWED", "md, txt,,log")]).unwrap();
        assert_eq!(cfg.sync.allowed_extensions, vec!["md", "txt", "log"]);
    }

    #[test]
    fn empty_file_path_uses_default_root() {
        let cfg = load(&[("FILE_PATH", "  ")]).unwrap();
        assert_eq!(cfg.sync.file_root, Some(PathBuf::from("filestore")));
    }

    #[test]
    fn credentials_require_all_four_parameters() {
        let full = [
            ("PSQL_USER", "u"),
            ("PSQL_PASSWD", "p"),
            ("PSQL_DBNAME", "d"),
            ("PSQL_TABLE_NAME", "books"),
        ];
        assert!(load(&full).unwrap().sync.postgres.credentials().is_some());

        for skip in 0..full.len() {
            let partial: Vec<_> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, kv)| *kv)
                .collect();
            let cfg = load(&partial).unwrap();
            assert!(cfg.sync.postgres.credentials().is_none(), "missing #{skip}");
        }
    }

    #[test]
    fn invalid_numbers_are_errors() {
        assert!(matches!(
            load(&[("PSQL_PORT", "many")]),
            Err(ConfigError::InvalidNumber { var: "PSQL_PORT", .. })
        ));
        assert!(matches!(
            load(&[("SYNC_BATCH_SIZE", "0")]),
            Err(ConfigError::InvalidNumber { var: "SYNC_BATCH_SIZE", .. })
        ));
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let cfg = load(&[("PSQL_PASSWD", "hunter2")]).unwrap();
        let dbg = format!("{:?}", cfg.sync.postgres);
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn engine_settings_are_read() {
        let cfg = load(&[
            ("ELASTIC_URL", "https://es:9200"),
            ("ELASTIC_USERNAME", "elastic"),
            ("ELASTIC_PASSWORD", "changeme"),
            ("ELASTIC_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(cfg.engine.url, "https://es:9200");
        assert_eq!(cfg.engine.username.as_deref(), Some("elastic"));
        assert_eq!(cfg.engine.timeout, Duration::from_secs(5));
    }
}
