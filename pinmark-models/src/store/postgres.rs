use async_trait::async_trait;
use sqlx::PgPool;

use crate::store::{ImageStore, LikeStore, MAX_SLUG_ATTEMPTS};
use crate::{slug, Image, ImageID, ImageLike, ModelError, ModelResult, NewImage, UserID};

const SLUG_CONSTRAINT: &str = "images_slug_unique";
const LIKE_IMAGE_CONSTRAINT: &str = "images_user_like_image_fk";

#[derive(Clone, Debug)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn taken_slugs(&self, base: &str) -> ModelResult<Vec<String>> {
        // slugs never contain LIKE wildcards
        Ok(sqlx::query_scalar("SELECT slug FROM images WHERE slug LIKE $1")
            .bind(format!("{}%", slug::taken_prefix(base)))
            .fetch_all(&self.db)
            .await?)
    }
}

fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

#[async_trait]
impl ImageStore for PgStore {
    #[instrument(skip(self, image))]
    async fn insert(&self, image: NewImage) -> ModelResult<Image> {
        let base = image.base_slug();
        let mut n = slug::next_free(&base, &self.taken_slugs(&base).await?);
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let candidate = slug::with_suffix(&base, n);
            let res = sqlx::query_as::<_, Image>(
                r#"
                INSERT INTO images (title, slug, url, description, user_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, title, slug, url, description, created, user_id, total_likes
                "#,
            )
            .bind(&image.title)
            .bind(&candidate)
            .bind(&image.url)
            .bind(&image.description)
            .bind(image.owner.0)
            .fetch_one(&self.db)
            .await;
            match res {
                Ok(image) => return Ok(image),
                Err(e) if violates(&e, SLUG_CONSTRAINT) => {
                    debug!("slug {:?} was taken concurrently, retrying", candidate);
                    n += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ModelError::SlugExhausted(base))
    }

    async fn get(&self, id: ImageID, slug: &str) -> ModelResult<Image> {
        sqlx::query_as(
            r#"
            SELECT id, title, slug, url, description, created, user_id, total_likes
            FROM images WHERE id = $1 AND slug = $2
            "#,
        )
        .bind(id.0)
        .bind(slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ModelError::image_not_found(format!("{}/{}", id, slug)))
    }

    async fn get_id(&self, id: ImageID) -> ModelResult<Image> {
        sqlx::query_as(
            r#"
            SELECT id, title, slug, url, description, created, user_id, total_likes
            FROM images WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ModelError::image_not_found(id))
    }

    async fn list(&self) -> ModelResult<Vec<Image>> {
        Ok(sqlx::query_as(
            r#"
            SELECT id, title, slug, url, description, created, user_id, total_likes
            FROM images ORDER BY created DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?)
    }

    async fn count(&self) -> ModelResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn list_range(&self, offset: u64, limit: u64) -> ModelResult<Vec<Image>> {
        Ok(sqlx::query_as(
            r#"
            SELECT id, title, slug, url, description, created, user_id, total_likes
            FROM images ORDER BY created DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?)
    }
}

#[async_trait]
impl LikeStore for PgStore {
    #[instrument(skip(self))]
    async fn add_like(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        let mut tx = self.db.begin().await?;
        let res = sqlx::query(
            r#"
            INSERT INTO images_user_like (image_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (image_id, user_id) DO NOTHING
            "#,
        )
        .bind(image.0)
        .bind(user.0)
        .execute(&mut *tx)
        .await;
        let created = match res {
            Ok(res) => res.rows_affected() > 0,
            Err(e) if violates(&e, LIKE_IMAGE_CONSTRAINT) => {
                return Err(ModelError::image_not_found(image))
            }
            Err(e) => return Err(e.into()),
        };
        if created {
            sqlx::query("UPDATE images SET total_likes = total_likes + 1 WHERE id = $1")
                .bind(image.0)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn remove_like(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        let mut tx = self.db.begin().await?;
        let removed = sqlx::query("DELETE FROM images_user_like WHERE image_id = $1 AND user_id = $2")
            .bind(image.0)
            .bind(user.0)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if removed {
            sqlx::query("UPDATE images SET total_likes = total_likes - 1 WHERE id = $1")
                .bind(image.0)
                .execute(&mut *tx)
                .await?;
        } else {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
                .bind(image.0)
                .fetch_one(&mut *tx)
                .await?;
            if !exists {
                return Err(ModelError::image_not_found(image));
            }
        }
        tx.commit().await?;
        Ok(removed)
    }

    async fn likers(&self, image: ImageID) -> ModelResult<Vec<UserID>> {
        let likes: Vec<ImageLike> = sqlx::query_as(
            r#"
            SELECT image_id, user_id, created FROM images_user_like
            WHERE image_id = $1
            ORDER BY created ASC, user_id ASC
            "#,
        )
        .bind(image.0)
        .fetch_all(&self.db)
        .await?;
        Ok(likes.iter().map(ImageLike::user).collect())
    }

    async fn has_liked(&self, image: ImageID, user: UserID) -> ModelResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM images_user_like WHERE image_id = $1 AND user_id = $2)",
        )
        .bind(image.0)
        .bind(user.0)
        .fetch_one(&self.db)
        .await?)
    }
}
