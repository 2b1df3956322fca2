use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::{AppConfig, JwtConfig, StorageBackend};
use crate::countries::repo::{CountryStore, PgCountryStore};
use crate::db;
use crate::memory::{MemoryCountryStore, MemoryUserStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub countries: Arc<dyn CountryStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let (users, countries) = match &config.storage {
            StorageBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = db::connect(database_url, *max_connections).await?;
                db::migrate(&pool).await?;
                info!(max_connections, "using postgres storage");
                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgCountryStore::new(pool)) as Arc<dyn CountryStore>,
                )
            }
            StorageBackend::Memory => {
                warn!("using in-memory storage; data is lost on restart");
                (
                    Arc::new(MemoryUserStore::default()) as Arc<dyn UserStore>,
                    Arc::new(MemoryCountryStore::default()) as Arc<dyn CountryStore>,
                )
            }
        };

        Ok(Self::from_parts(Arc::new(config), users, countries))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        countries: Arc<dyn CountryStore>,
    ) -> Self {
        Self {
            config,
            users,
            countries,
        }
    }

    /// In-memory state with a fixed test signing key.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            storage: StorageBackend::Memory,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            upload_max_bytes: 10 * 1024 * 1024,
        });
        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryCountryStore::default()),
        )
    }
}
