use anyhow::Context;
use serde::Deserialize;

const DEFAULT_TTL_MINUTES: i64 = 60;
/// One year.
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;
const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub jwt: JwtConfig,
    pub upload_max_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".into());
        let storage = match backend.trim().to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set for the postgres backend")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            },
            other => anyhow::bail!("unknown STORAGE_BACKEND '{}'", other),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "country-upload".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "country-upload-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_EXPIRATION_MINUTES").ok()),
        };

        let upload_max_bytes = std::env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES);

        Ok(Self {
            storage,
            jwt,
            upload_max_bytes,
        })
    }
}

/// Token lifetime in minutes; absent, unparseable, non-positive or
/// over-a-year values fall back to 60.
pub fn parse_ttl_minutes(raw: Option<String>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
        .unwrap_or(DEFAULT_TTL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_missing_or_garbage() {
        assert_eq!(parse_ttl_minutes(None), 60);
        assert_eq!(parse_ttl_minutes(Some("sixty".into())), 60);
        assert_eq!(parse_ttl_minutes(Some("".into())), 60);
        assert_eq!(parse_ttl_minutes(Some("0".into())), 60);
        assert_eq!(parse_ttl_minutes(Some("-5".into())), 60);
    }

    #[test]
    fn ttl_uses_configured_value() {
        assert_eq!(parse_ttl_minutes(Some("15".into())), 15);
        assert_eq!(parse_ttl_minutes(Some(" 120 ".into())), 120);
        assert_eq!(
            parse_ttl_minutes(Some(MAX_TTL_MINUTES.to_string())),
            MAX_TTL_MINUTES
        );
    }

    #[test]
    fn ttl_beyond_a_year_falls_back() {
        assert_eq!(parse_ttl_minutes(Some("100000000000000".into())), 60);
        assert_eq!(parse_ttl_minutes(Some((MAX_TTL_MINUTES + 1).to_string())), 60);
        assert_eq!(parse_ttl_minutes(Some(i64::MAX.to_string())), 60);
    }
}
