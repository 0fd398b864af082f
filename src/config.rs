//! Runtime configuration for the Quipboard server.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

#[derive(Debug)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub server_addr: String,
    /// Postgres pool size.
    pub db_max_connections: u32,
    /// HMAC secret used to validate editor bearer tokens.
    pub jwt_secret: Option<String>,
    /// How long a cached roster snapshot is served before refetching (seconds).
    pub snapshot_ttl: u64,
    /// Normalized edit-distance cutoff for username search.
    pub search_threshold: f64,
}

impl Settings {
    fn from_env() -> Self {
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        let snapshot_ttl = env::var("SNAPSHOT_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300); // 5 min, same stale time the web client used

        let search_threshold = env::var("SEARCH_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|t| (0.0..=1.0).contains(t))
            .unwrap_or(0.3);

        Settings {
            server_addr,
            db_max_connections,
            jwt_secret,
            snapshot_ttl,
            search_threshold,
        }
    }

    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl)
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
