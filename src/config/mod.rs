use std::env;
use std::fmt;

/// One year. Token lifetimes beyond this are rejected at startup.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseBackend {
    MongoDB { uri: String, database: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: DatabaseBackend,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match get("DATABASE_BACKEND", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => DatabaseBackend::MongoDB {
                uri: lookup("MONGO_URI").ok_or(ConfigError::Missing("MONGO_URI"))?,
                database: get("MONGO_DATABASE", "dukaan"),
            },
            "memory" => DatabaseBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;

        let default_cost = bcrypt::DEFAULT_COST.to_string();
        let bcrypt_cost: u32 = parse("BCRYPT_COST", &get("BCRYPT_COST", &default_cost))?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let jwt_ttl_hours: i64 = parse("JWT_TTL_HOURS", &get("JWT_TTL_HOURS", "24"))?;
        if !(1..=MAX_JWT_TTL_HOURS).contains(&jwt_ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_HOURS",
                value: jwt_ttl_hours.to_string(),
            });
        }

        let allowed_origins = get("CORS_ALLOWED_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port: parse("PORT", &get("PORT", "5000"))?,
            backend,
            jwt_secret,
            jwt_ttl_hours,
            jwt_issuer: get("JWT_ISSUER", "achi-dukaan"),
            jwt_audience: get("JWT_AUDIENCE", "achi-dukaan-api"),
            bcrypt_cost,
            allowed_origins,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_mongodb() {
        let cfg = config(&[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("JWT_SECRET_KEY", "s3cret"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(
            cfg.backend,
            DatabaseBackend::MongoDB {
                uri: "mongodb://localhost:27017".into(),
                database: "dukaan".into()
            }
        );
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let cfg = config(&[("DATABASE_BACKEND", "memory"), ("JWT_SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(cfg.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn secret_is_required() {
        let err = config(&[("DATABASE_BACKEND", "memory")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET_KEY"));
    }

    #[test]
    fn rejects_bad_numbers() {
        let base = [("DATABASE_BACKEND", "memory"), ("JWT_SECRET_KEY", "k")];

        let err = config(&[base[0], base[1], ("PORT", "http")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "http".into() });

        let err = config(&[base[0], base[1], ("BCRYPT_COST", "2")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "BCRYPT_COST", value: "2".into() });
    }

    #[test]
    fn bounds_token_lifetime() {
        let base = [("DATABASE_BACKEND", "memory"), ("JWT_SECRET_KEY", "k")];

        let err = config(&[base[0], base[1], ("JWT_TTL_HOURS", "0")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "JWT_TTL_HOURS", value: "0".into() });

        let huge = i64::MAX.to_string();
        let err = config(&[base[0], base[1], ("JWT_TTL_HOURS", huge.as_str())]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "JWT_TTL_HOURS", value: huge.clone() });

        let cfg = config(&[base[0], base[1], ("JWT_TTL_HOURS", "8760")]).unwrap();
        assert_eq!(cfg.jwt_ttl_hours, MAX_JWT_TTL_HOURS);
    }

    #[test]
    fn splits_origins() {
        let cfg = config(&[
            ("DATABASE_BACKEND", "memory"),
            ("JWT_SECRET_KEY", "k"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();
        assert_eq!(
            cfg.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
