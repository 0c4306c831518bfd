use std::sync::Arc;

use async_trait::async_trait;
use pinmark_dependencies::chrono::{Duration, Utc};
use pinmark_models::{Action, ImageID, UserID};
use sqlx::PgPool;
use tokio::{sync::RwLock, task::JoinHandle};

use crate::error::PinmarkResult;

pub const VERB_BOOKMARKED: &str = "bookmarked image";
pub const VERB_LIKES: &str = "likes";

/// Sink for the "user did something" stream shown to followers.
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Returns false if the action repeats one recorded a moment ago and was dropped.
    async fn record_action(
        &self,
        actor: UserID,
        verb: &str,
        target: Option<ImageID>,
    ) -> PinmarkResult<bool>;
}

/// Records the action in the background. Failures end up in the log and nowhere else.
pub fn spawn_action(
    feed: Arc<dyn ActivityFeed>,
    actor: UserID,
    verb: &'static str,
    target: Option<ImageID>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match feed.record_action(actor, verb, target).await {
            Ok(true) => trace!("recorded {:?} by {} on {:?}", verb, actor, target),
            Ok(false) => trace!("dropped repeated {:?} by {} on {:?}", verb, actor, target),
            Err(e) => warn!("could not record {:?} by {}: {}", verb, actor, e),
        }
    })
}

#[derive(Clone, Debug)]
pub struct PgActivityFeed {
    db: PgPool,
    window: Duration,
}

impl PgActivityFeed {
    pub fn new(db: PgPool, window: Duration) -> Self {
        Self { db, window }
    }
}

#[async_trait]
impl ActivityFeed for PgActivityFeed {
    #[instrument(skip(self))]
    async fn record_action(
        &self,
        actor: UserID,
        verb: &str,
        target: Option<ImageID>,
    ) -> PinmarkResult<bool> {
        let now = Utc::now().naive_utc();
        Ok(Action::insert_deduplicated(&self.db, actor, verb, target, now, self.window).await?)
    }
}

#[derive(Clone, Debug)]
pub struct MemoryActivityFeed {
    window: Duration,
    actions: Arc<RwLock<Vec<Action>>>,
}

impl MemoryActivityFeed {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            actions: Arc::default(),
        }
    }

    /// Everything recorded so far, oldest first.
    pub async fn actions(&self) -> Vec<Action> {
        self.actions.read().await.clone()
    }
}

#[async_trait]
impl ActivityFeed for MemoryActivityFeed {
    async fn record_action(
        &self,
        actor: UserID,
        verb: &str,
        target: Option<ImageID>,
    ) -> PinmarkResult<bool> {
        let now = Utc::now().naive_utc();
        let since = now - self.window;
        let mut actions = self.actions.write().await;
        if actions
            .iter()
            .rev()
            .any(|x| x.repeats(actor, verb, target, since))
        {
            return Ok(false);
        }
        let id = actions.len() as i64 + 1;
        actions.push(Action {
            id,
            user_id: actor.0,
            verb: verb.to_string(),
            target_image_id: target.map(|x| x.0),
            created: now,
        });
        Ok(true)
    }
}
