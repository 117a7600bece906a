use crate::config::AppConfig;
use crate::store::{EntityStore, MemoryStore, PgStore};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.database_url.as_deref() {
            Some(url) => Arc::new(PgStore::connect(url).await?) as Arc<dyn EntityStore>,
            None => {
                warn!("DATABASE_URL not set; data lives in memory and is lost on exit");
                Arc::new(MemoryStore::new()) as Arc<dyn EntityStore>
            }
        };

        Ok(Self { store, config })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            secret_key: crate::config::DEFAULT_SECRET_KEY.into(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self {
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }
}
