use std::sync::Arc;

use axum::extract::FromRef;
use pinmark_dependencies::axum_flash;
use pinmark_models::Client;

use crate::activity::{ActivityFeed, MemoryActivityFeed, PgActivityFeed};
use crate::config::Configuration;
use crate::error::PinmarkResult;
use crate::session::{authenticator_from_config, Authenticator};

#[derive(Clone)]
pub struct PinmarkState {
    pub config: Configuration,
    pub client: Client,
    pub authenticator: Arc<dyn Authenticator>,
    pub activity: Arc<dyn ActivityFeed>,
    pub flash_config: axum_flash::Config,
}

impl FromRef<PinmarkState> for axum_flash::Config {
    fn from_ref(state: &PinmarkState) -> axum_flash::Config {
        state.flash_config.clone()
    }
}

impl PinmarkState {
    /// Connects to the configured database, or falls back to in-memory storage.
    pub async fn new(config: Configuration) -> PinmarkResult<Self> {
        debug!("Grabbing Database Pool for HTTP Stateful Requests");
        let window = config.activity_window();
        let (client, activity): (Client, Arc<dyn ActivityFeed>) = match config.db_conn().await? {
            Some(db) => (
                Client::new(db.clone()),
                Arc::new(PgActivityFeed::new(db, window)),
            ),
            None => (
                Client::in_memory(),
                Arc::new(MemoryActivityFeed::new(window)),
            ),
        };
        let authenticator = authenticator_from_config(&config)?;
        Self::with_parts(config, client, authenticator, activity)
    }

    pub fn with_parts(
        config: Configuration,
        client: Client,
        authenticator: Arc<dyn Authenticator>,
        activity: Arc<dyn ActivityFeed>,
    ) -> PinmarkResult<Self> {
        let flash_config = axum_flash::Config::new(config.flash_key()?);
        Ok(Self {
            config,
            client,
            authenticator,
            activity,
            flash_config,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn get_db_client(&self) -> Client {
        self.client.clone()
    }
}
