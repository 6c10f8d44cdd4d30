//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_core::posts::PostSettings;
use quill_infra::JwtConfig;
use quill_infra::database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub posts: PostSettings,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        let defaults = PostSettings::default();
        let posts = PostSettings {
            create_excerpt_len: parsed("EXCERPT_CREATE_LEN", defaults.create_excerpt_len),
            update_excerpt_len: parsed("EXCERPT_UPDATE_LEN", defaults.update_excerpt_len),
            max_photo_bytes: parsed("MAX_PHOTO_BYTES", defaults.max_photo_bytes),
            read_cache_ttl: Duration::from_secs(parsed(
                "POST_CACHE_TTL_SECS",
                defaults.read_cache_ttl.as_secs(),
            )),
            ..defaults
        }
        .with_site_name(env::var("APP_NAME").unwrap_or_else(|_| "Quill".to_string()));

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8000),
            database,
            posts,
            jwt: jwt_from_env(),
        }
    }
}

fn jwt_from_env() -> JwtConfig {
    let defaults = JwtConfig::default();
    let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using the development secret");
        defaults.secret.clone()
    });

    JwtConfig {
        secret,
        issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
    }
}

/// Read and parse `key`, falling back to `default` when unset or malformed.
fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %raw, "Ignoring malformed setting");
            default
        }),
        Err(_) => default,
    }
}
