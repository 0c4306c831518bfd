use pinmark_dependencies::chrono::NaiveDateTime;

use crate::{ImageID, ModelError, UserID};

/// One row of the `images_user_like` join table.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ImageLike {
    pub image_id: i64,
    pub user_id: i64,
    pub created: NaiveDateTime,
}

impl ImageLike {
    pub fn image(&self) -> ImageID {
        ImageID(self.image_id)
    }
    pub fn user(&self) -> UserID {
        UserID(self.user_id)
    }
}

/// Requested change to the likers of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl std::str::FromStr for LikeAction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "unlike" => Ok(Self::Unlike),
            v => Err(ModelError::UnknownLikeAction(v.to_string())),
        }
    }
}

impl ToString for LikeAction {
    fn to_string(&self) -> String {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
        }
        .to_string()
    }
}
