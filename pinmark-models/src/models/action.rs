use pinmark_dependencies::chrono::{Duration, NaiveDateTime};
use sqlx::PgPool;

use crate::{ImageID, ModelResult, UserID};

/// An entry of a user's activity stream, e.g. "user 4 likes image 17".
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Action {
    pub id: i64,
    pub user_id: i64,
    pub verb: String,
    pub target_image_id: Option<i64>,
    pub created: NaiveDateTime,
}

impl Action {
    pub fn user(&self) -> UserID {
        UserID(self.user_id)
    }
    pub fn target(&self) -> Option<ImageID> {
        self.target_image_id.map(ImageID)
    }

    /// True if `self` repeats `(user, verb, target)` no earlier than `since`.
    pub fn repeats(
        &self,
        user: UserID,
        verb: &str,
        target: Option<ImageID>,
        since: NaiveDateTime,
    ) -> bool {
        self.user() == user && self.verb == verb && self.target() == target && self.created >= since
    }

    /// Records the action unless the same one was recorded within `window` before `now`.
    /// Returns whether a row was written.
    pub async fn insert_deduplicated(
        db: &PgPool,
        user: UserID,
        verb: &str,
        target: Option<ImageID>,
        now: NaiveDateTime,
        window: Duration,
    ) -> ModelResult<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO actions (user_id, verb, target_image_id, created)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (
                SELECT 1 FROM actions
                WHERE user_id = $1
                  AND verb = $2
                  AND target_image_id IS NOT DISTINCT FROM $3
                  AND created >= $5
            )
            "#,
        )
        .bind(user.0)
        .bind(verb)
        .bind(target.map(|x| x.0))
        .bind(now)
        .bind(now - window)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
