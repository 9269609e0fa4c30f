use std::sync::Arc;

use anyhow::Context;
use tokio::sync::OnceCell;

use crate::config::AppConfig;
use crate::db::{schema, Database, DbError};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    schema_ready: Arc<OnceCell<()>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = Database::open(&config.database).context("prepare database")?;
        Ok(Self {
            db,
            config: Arc::new(config),
            schema_ready: Arc::new(OnceCell::new()),
        })
    }

    /// Creates the user table once per process. Failures are not cached, so
    /// the next caller retries.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        self.schema_ready
            .get_or_try_init(|| schema::ensure_schema(&self.db))
            .await
            .map(|_| ())
    }

    pub fn schema_ready(&self) -> bool {
        self.schema_ready.initialized()
    }
}
