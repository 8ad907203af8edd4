/// Configuration management for Posts Service
///
/// Everything is read from environment variables (optionally seeded from a
/// `.env` file by `main`). Pool sizing lives in `db_pool::DbConfig`.
use crate::services::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum HS256 secret length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEV_JWT_SECRET: &str = "posts-service-development-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Post store selection
    pub store: StoreConfig,
    /// Bearer-token verification
    pub auth: AuthConfig,
    /// Attempts per mutation before giving up with a conflict
    pub mutation_max_attempts: u32,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        is_production(&self.env)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.trim() == "*"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!(
                "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Post store configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Required for the postgres backend
    pub database_url: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = is_production(&app_env);

        let store = {
            let backend = match std::env::var("STORE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::Postgres,
            };
            let database_url = std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty());

            if backend == StoreBackend::Postgres && database_url.is_none() {
                return Err("DATABASE_URL must be set when STORE_BACKEND=postgres".to_string());
            }

            StoreConfig {
                backend,
                database_url,
            }
        };

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("POSTS_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("POSTS_SERVICE_PORT", 5000)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            store,
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    Err(_) => {
                        tracing::warn!("JWT_SECRET not set; using the development secret");
                        DEV_JWT_SECRET.to_string()
                    }
                };

                if jwt_secret.len() < MIN_JWT_SECRET_LEN {
                    return Err(format!(
                        "JWT_SECRET must be at least {} bytes",
                        MIN_JWT_SECRET_LEN
                    ));
                }

                AuthConfig { jwt_secret }
            },
            mutation_max_attempts: {
                let attempts = parse_env_or_default("MUTATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
                if attempts == 0 {
                    return Err("MUTATION_MAX_ATTEMPTS must be at least 1".to_string());
                }
                attempts
            },
        })
    }
}

fn is_production(env: &str) -> bool {
    env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod")
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "POSTS_SERVICE_HOST",
        "POSTS_SERVICE_PORT",
        "STORE_BACKEND",
        "DATABASE_URL",
        "CORS_ALLOWED_ORIGINS",
        "JWT_SECRET",
        "MUTATION_MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn memory_backend_uses_defaults() {
        clear_env();
        std::env::set_var("STORE_BACKEND", "memory");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 5000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.database_url.is_none());
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.mutation_max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(!config.app.is_production());

        clear_env();
    }

    #[test]
    #[serial]
    fn postgres_backend_requires_database_url() {
        clear_env();

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("DATABASE_URL"));

        std::env::set_var("DATABASE_URL", "postgres://localhost/posts");
        let config = Config::from_env().unwrap();
        assert_eq!(config.store.backend, StoreBackend::Postgres);

        clear_env();
    }

    #[test]
    #[serial]
    fn production_requires_jwt_secret() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://example.com");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("JWT_SECRET"));

        std::env::set_var("JWT_SECRET", "short");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("at least"));

        std::env::set_var("JWT_SECRET", "a-production-secret-of-sufficient-length");
        assert!(Config::from_env().is_ok());

        clear_env();
    }

    #[test]
    #[serial]
    fn production_rejects_wildcard_cors() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("JWT_SECRET", "a-production-secret-of-sufficient-length");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("CORS_ALLOWED_ORIGINS"));

        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_bad_numbers_and_backends() {
        clear_env();
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("POSTS_SERVICE_PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        std::env::remove_var("POSTS_SERVICE_PORT");
        std::env::set_var("MUTATION_MAX_ATTEMPTS", "0");
        assert!(Config::from_env().is_err());

        std::env::remove_var("MUTATION_MAX_ATTEMPTS");
        std::env::set_var("STORE_BACKEND", "mongo");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let cors = CorsConfig {
            allowed_origins: "http://a.test, http://b.test,,".to_string(),
        };
        assert_eq!(
            cors.origins().collect::<Vec<_>>(),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(!cors.allows_any());
    }
}
