use serde::Deserialize;

pub const DEFAULT_SECRET_KEY: &str = "any key works";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| normalize_database_url(&v));
        let secret_key = lookup("FLASK_APP_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.into());
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid PORT {v:?}: {e}"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            database_url,
            secret_key,
            host,
            port,
        })
    }
}

/// Heroku-style `postgres://` URLs are rewritten to the `postgresql://` scheme.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.secret_key, "any key works");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    fn postgres_scheme_is_normalized() {
        let cfg = config_from(&[("DATABASE_URL", "postgres://u:p@db:5432/app")]).unwrap();
        assert_eq!(
            cfg.database_url.as_deref(),
            Some("postgresql://u:p@db:5432/app")
        );
    }

    #[test]
    fn postgresql_scheme_is_left_alone() {
        assert_eq!(
            normalize_database_url("postgresql://localhost/app"),
            "postgresql://localhost/app"
        );
    }

    #[test]
    fn blank_database_url_counts_as_unset() {
        let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = config_from(&[
            ("FLASK_APP_KEY", "s3cret"),
            ("PORT", "8081"),
            ("APP_HOST", "127.0.0.1"),
        ])
        .unwrap();
        assert_eq!(cfg.secret_key, "s3cret");
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
