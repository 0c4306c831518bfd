use std::fmt;

use pinmark_dependencies::chrono::NaiveDateTime;
use pinmark_dependencies::url::Url;
use tracing::trace;

use crate::store::{ImageStore, LikeStore};
use crate::{slug, Client, ModelResult, UserID, ValidationErrors};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 2000;
pub const VALID_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ImageID(pub i64);

impl From<i64> for ImageID {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<ImageID> for i64 {
    fn from(v: ImageID) -> Self {
        v.0
    }
}

impl fmt::Display for ImageID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(sqlx::FromRow, Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct Image {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: Option<String>,
    pub created: NaiveDateTime,
    pub user_id: i64,
    pub total_likes: i32,
}

/// A validated submission, ready to be stored. The slug is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub owner: UserID,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
}

impl NewImage {
    pub fn base_slug(&self) -> String {
        slug::base_slug(&self.title)
    }
}

/// Raw fields of the bookmark form. Every field is optional so that a
/// bookmarklet request carrying only some of them can still prefill the form.
#[derive(serde::Deserialize, serde::Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct ImageForm {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ImageForm {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn validate(&self, owner: UserID) -> Result<NewImage, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = self.title().trim();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {} characters.", MAX_TITLE_LEN),
            );
        }

        let url = self.url().trim();
        if url.is_empty() {
            errors.add("url", "This field is required.");
        } else if let Err(message) = validate_image_url(url) {
            errors.add("url", message);
        }

        let description = Some(self.description().trim())
            .filter(|x| !x.is_empty())
            .map(|x| x.to_string());

        errors.into_result(NewImage {
            owner,
            url: url.to_string(),
            title: title.to_string(),
            description,
        })
    }
}

fn validate_image_url(url: &str) -> Result<(), String> {
    if url.len() > MAX_URL_LEN {
        return Err(format!(
            "Ensure this value has at most {} characters.",
            MAX_URL_LEN
        ));
    }
    let parsed = Url::parse(url).map_err(|_| "Enter a valid URL.".to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err("Enter a valid URL.".to_string());
    }
    let extension = parsed
        .path_segments()
        .and_then(|x| x.last())
        .and_then(|x| x.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if VALID_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err("The given URL does not match valid image extensions.".to_string()),
    }
}

impl Image {
    pub fn id(&self) -> ImageID {
        ImageID(self.id)
    }
    pub fn owner(&self) -> UserID {
        UserID(self.user_id)
    }

    /// Validates the form and stores the image with `owner` as its creator.
    #[tracing::instrument(skip(client, form))]
    pub async fn create(client: &Client, owner: UserID, form: &ImageForm) -> ModelResult<Image> {
        let new = form.validate(owner)?;
        trace!("storing new image {:?}", new.title);
        client.insert(new).await
    }

    /// Both `id` and `slug` have to match the same record.
    pub async fn get_id_slug(client: &Client, id: ImageID, slug: &str) -> ModelResult<Image> {
        client.get(id, slug).await
    }
    pub async fn get_id(client: &Client, id: ImageID) -> ModelResult<Image> {
        client.get_id(id).await
    }
    /// Newest first.
    pub async fn get_all(client: &Client) -> ModelResult<Vec<Image>> {
        client.list().await
    }
    pub async fn count(client: &Client) -> ModelResult<u64> {
        client.count().await
    }
    pub async fn get_range(client: &Client, offset: u64, limit: u64) -> ModelResult<Vec<Image>> {
        client.list_range(offset, limit).await
    }

    /// Returns true if the user was not among the likers before.
    pub async fn like(client: &Client, id: ImageID, user: UserID) -> ModelResult<bool> {
        client.add_like(id, user).await
    }
    /// Returns true if the user was among the likers before.
    pub async fn unlike(client: &Client, id: ImageID, user: UserID) -> ModelResult<bool> {
        client.remove_like(id, user).await
    }
    pub async fn likers(&self, client: &Client) -> ModelResult<Vec<UserID>> {
        client.likers(self.id()).await
    }
    pub async fn liked_by(&self, client: &Client, user: UserID) -> ModelResult<bool> {
        client.has_liked(self.id(), user).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn form(url: &str, title: &str, description: Option<&str>) -> ImageForm {
        ImageForm {
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            description: description.map(|x| x.to_string()),
        }
    }

    #[test]
    fn test_valid_form() {
        let new = form(
            "https://example.com/pics/Sunset.JPG",
            "  Sunset  ",
            Some("   "),
        )
        .validate(UserID(3))
        .unwrap();
        assert_eq!("Sunset", new.title);
        assert_eq!("https://example.com/pics/Sunset.JPG", new.url);
        assert_eq!(None, new.description);
        assert_eq!(UserID(3), new.owner);
        assert_eq!("sunset", new.base_slug());
    }

    #[test]
    fn test_missing_fields() {
        let errors = ImageForm::default().validate(UserID(1)).unwrap_err();
        assert_eq!(&["This field is required.".to_string()], errors.field("url"));
        assert_eq!(&["This field is required.".to_string()], errors.field("title"));
    }

    #[test]
    fn test_malformed_urls() {
        for url in [
            "not a url",
            "ftp://example.com/a.jpg",
            "https://example.com/a.gif",
            "https://example.com/",
            "https://example.com/jpg",
        ] {
            let errors = form(url, "Title", None).validate(UserID(1)).unwrap_err();
            assert_eq!(1, errors.field("url").len(), "{} must be rejected", url);
            assert!(errors.field("title").is_empty());
        }
    }

    #[test]
    fn test_overlong_title() {
        let title = "t".repeat(MAX_TITLE_LEN + 1);
        let errors = form("http://example.com/a.png", &title, None)
            .validate(UserID(1))
            .unwrap_err();
        assert_eq!(1, errors.field("title").len());
    }
}
