#[macro_use]
extern crate tracing;

mod models;
pub mod slug;
pub mod store;
mod validation;

use std::ops::Deref;
use std::sync::Arc;

pub use models::*;
pub use validation::ValidationErrors;

use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::store::{MemoryStore, PgStore, Storage};

pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Other error: {}", .0)]
    Other(String),
    #[error("Error in underlying datamodel: {}", .0)]
    SQLx(#[from] sqlx::Error),
    #[error("Could not migrate database: {}", .0)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{} {} not found", .0, .1)]
    NotFound(&'static str, String),
    #[error("Invalid input: {}", .0)]
    Validation(#[from] ValidationErrors),
    #[error("Unknown like action {:?}", .0)]
    UnknownLikeAction(String),
    #[error("No free slug left for {:?}", .0)]
    SlugExhausted(String),
    #[error("{:?}", .0)]
    Context(#[from] anyhow::Error),
}

impl ModelError {
    pub fn image_not_found<S: ToString>(what: S) -> Self {
        Self::NotFound("Image", what.to_string())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_, _))
    }
}

/// Handle on the storage backend. Cheap to clone; every request gets its own.
#[derive(Clone)]
pub struct Client {
    db: Option<PgPool>,
    store: Arc<dyn Storage>,
}

impl Client {
    pub fn new(db: PgPool) -> Self {
        debug!("Creating new Database Client");
        Self {
            store: Arc::new(PgStore::new(db.clone())),
            db: Some(db),
        }
    }

    /// Volatile storage, lost on restart.
    pub fn in_memory() -> Self {
        warn!("Creating in-memory client, nothing will be persisted");
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Storage>) -> Self {
        Self { db: None, store }
    }

    pub async fn migrate(&self) -> ModelResult<()> {
        match &self.db {
            Some(db) => {
                info!("Migrating database");
                MIGRATOR.run(db).await?;
                info!("Database migrated!");
            }
            None => debug!("No database configured, skipping migrations"),
        }
        Ok(())
    }
}

impl Deref for Client {
    type Target = dyn Storage;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
