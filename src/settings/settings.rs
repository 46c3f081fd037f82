use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEV_JWT_SECRET: &str = "squadhours-dev-secret-change-me";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    pub cache: Cache,
    pub auth: Auth,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Http {
    pub address: String,
    // TLS is enabled only when both are set
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

impl Default for Http {
    fn default() -> Self {
        Http {
            address: "127.0.0.1:3000".to_string(),
            cert_path: None,
            key_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Log {
    pub filter: String,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Store {
    pub backend: String, // "mysql" or "memory"
    pub dsn: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            backend: "memory".to_string(),
            dsn: String::new(),
            max_connections: 10,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
    pub backend: String, // "redis" or "memory"
    pub url: String,
    pub key_prefix: String,
    pub connect_timeout_ms: u64,
    pub response_timeout_ms: u64,
    // 0 disables reconnection attempts
    pub reconnect_interval_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            backend: "memory".to_string(),
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "squadhours:".to_string(),
            connect_timeout_ms: 2_000,
            response_timeout_ms: 1_000,
            reconnect_interval_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub reset_ttl_secs: u64,
    pub frontend_url: String,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            issuer: "squadhours".to_string(),
            audience: "squadhours-api".to_string(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            reset_ttl_secs: 60 * 60,
            frontend_url: "http://localhost:5173".to_string(),
            password_hash_memory_kib: 19 * 1024,
            password_hash_iterations: 2,
        }
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "SQUADHOURS";

/// File settings (an explicit `path` must exist, the default one may not),
/// overridden by `SQUADHOURS__SECTION__KEY` environment variables.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let file = match path {
        Some(path) => File::with_name(path),
        None => File::with_name(SETTINGS_PATH).required(false),
    };

    let settings: Settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
