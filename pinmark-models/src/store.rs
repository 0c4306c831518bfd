//! Storage seams for images and the likes join table.
//!
//! Both traits promise atomic operations: slug assignment is serialized by the
//! backend's uniqueness check and like edges are inserted or deleted in one step,
//! so handlers never read-modify-write shared state.

use async_trait::async_trait;

use crate::{Image, ImageID, ModelResult, NewImage, UserID};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// How often an insert is retried after losing a slug race.
pub const MAX_SLUG_ATTEMPTS: u32 = 16;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists the image under a unique slug derived from its title.
    async fn insert(&self, image: NewImage) -> ModelResult<Image>;
    /// Fails with `NotFound` unless one record matches both fields.
    async fn get(&self, id: ImageID, slug: &str) -> ModelResult<Image>;
    async fn get_id(&self, id: ImageID) -> ModelResult<Image>;
    /// All images, newest first, ties broken by descending id.
    async fn list(&self) -> ModelResult<Vec<Image>>;
    async fn count(&self) -> ModelResult<u64>;
    /// Window into the order of [`ImageStore::list`].
    async fn list_range(&self, offset: u64, limit: u64) -> ModelResult<Vec<Image>>;
}

#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Returns true if the edge did not exist yet.
    async fn add_like(&self, image: ImageID, user: UserID) -> ModelResult<bool>;
    /// Returns true if an edge was removed. Removing an absent edge is not an error.
    async fn remove_like(&self, image: ImageID, user: UserID) -> ModelResult<bool>;
    /// Likers in the order they liked the image.
    async fn likers(&self, image: ImageID) -> ModelResult<Vec<UserID>>;
    async fn has_liked(&self, image: ImageID, user: UserID) -> ModelResult<bool>;
}

pub trait Storage: ImageStore + LikeStore {}

impl<T: ImageStore + LikeStore> Storage for T {}
