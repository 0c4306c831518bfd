use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use pinmark_dependencies::chrono::Utc;
use pinmark_dependencies::itertools::Itertools;
use tokio::sync::RwLock;

use crate::store::{ImageStore, LikeStore};
use crate::{slug, Image, ImageID, ImageLike, ModelError, ModelResult, NewImage, UserID};

/// Process-local backend. Every mutation happens under one write lock, which is
/// what makes slug assignment and like edges atomic here.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    images: BTreeMap<ImageID, Image>,
    slugs: BTreeSet<String>,
    likes: BTreeMap<(ImageID, UserID), ImageLike>,
}

impl MemoryState {
    fn newest_first(&self) -> impl Iterator<Item = &Image> {
        self.images
            .values()
            .sorted_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn insert(&self, image: NewImage) -> ModelResult<Image> {
        let mut state = self.inner.write().await;
        let base = image.base_slug();
        let prefix = slug::taken_prefix(&base);
        let taken: Vec<&String> = state
            .slugs
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(|x| x.starts_with(prefix))
            .collect();
        let slug = slug::with_suffix(&base, slug::next_free(&base, &taken));
        if state.slugs.contains(&slug) {
            return Err(ModelError::SlugExhausted(base));
        }
        state.last_id += 1;
        let image = Image {
            id: state.last_id,
            title: image.title,
            slug: slug.clone(),
            url: image.url,
            description: image.description,
            created: Utc::now().naive_utc(),
            user_id: image.owner.0,
            total_likes: 0,
        };
        state.slugs.insert(slug);
        state.images.insert(image.id(), image.clone());
        Ok(image)
    }

    async fn get(&self, id: ImageID, slug: &str) -> ModelResult<Image> {
        let state = self.inner.read().await;
        state
            .images
            .get(&id)
            .filter(|x| x.slug == slug)
            .cloned()
            .ok_or_else(|| ModelError::image_not_found(format!("{}/{}", id, slug)))
    }

    async fn get_id(&self, id: ImageID) -> ModelResult<Image> {
        let state = self.inner.read().await;
        state
            .images
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::image_not_found(id))
    }

    async fn list(&self) -> ModelResult<Vec<Image>> {
        let state = self.inner.read().await;
        Ok(state.newest_first().cloned().collect())
    }

    async fn count(&self) -> ModelResult<u64> {
        Ok(self.inner.read().await.images.len() as u64)
    }

    async fn list_range(&self, offset: u64, limit: u64) -> ModelResult<Vec<Image>> {
        let state = self.inner.read().await;
        Ok(state
            .newest_first()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn add_like(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        let mut state = self.inner.write().await;
        if !state.images.contains_key(&image) {
            return Err(ModelError::image_not_found(image));
        }
        if state.likes.contains_key(&(image, user)) {
            return Ok(false);
        }
        state.likes.insert(
            (image, user),
            ImageLike {
                image_id: image.0,
                user_id: user.0,
                created: Utc::now().naive_utc(),
            },
        );
        if let Some(image) = state.images.get_mut(&image) {
            image.total_likes += 1;
        }
        Ok(true)
    }

    async fn remove_like(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        let mut state = self.inner.write().await;
        if !state.images.contains_key(&image) {
            return Err(ModelError::image_not_found(image));
        }
        if state.likes.remove(&(image, user)).is_none() {
            return Ok(false);
        }
        if let Some(image) = state.images.get_mut(&image) {
            image.total_likes -= 1;
        }
        Ok(true)
    }

    async fn likers(&self, image: ImageID) -> ModelResult<Vec<UserID>> {
        let state = self.inner.read().await;
        Ok(state
            .likes
            .values()
            .filter(|x| x.image() == image)
            .sorted_by_key(|x| (x.created, x.user_id))
            .map(ImageLike::user)
            .collect())
    }

    async fn has_liked(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        Ok(self.inner.read().await.likes.contains_key(&(image, user)))
    }
}
