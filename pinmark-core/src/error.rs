use axum::{
    headers::{ContentType, HeaderMapExt},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use pinmark_models::{ModelError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinmarkError {
    #[error("Database Error: {0}")]
    Database(#[from] ModelError),
    #[error("SQLx Error: {0}")]
    SQLx(#[from] sqlx::Error),
    #[error("SQL Migration Error: {0}")]
    SQLMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Serde: JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Server Error: {0}")]
    Hyper(#[from] pinmark_dependencies::hyper::Error),
    #[error("Other Error: {0:?}")]
    Other(String),
    #[error("The page located under {0:?} could not be found")]
    PageNotFound(String),
    #[error("Login required, continue at {login:?}")]
    AuthRequired { login: String },
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Configuration Invalid: {0}")]
    Configuration(String),
    #[error("Could not join thread: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type PinmarkResult<T> = std::result::Result<T, PinmarkError>;

impl PinmarkError {
    pub fn is_not_found(&self) -> bool {
        match self {
            PinmarkError::PageNotFound(_) => true,
            PinmarkError::Database(e) => e.is_not_found(),
            _ => false,
        }
    }
}

fn html_page(status: StatusCode, c: maud::Markup) -> Response {
    let mut hm = HeaderMap::new();
    hm.typed_insert(ContentType::html());
    (status, hm, c.into_string()).into_response()
}

impl IntoResponse for PinmarkError {
    fn into_response(self) -> Response {
        match self {
            PinmarkError::AuthRequired { login } => Redirect::to(&login).into_response(),
            e if e.is_not_found() => {
                debug!("Not found: {}", e);
                html_page(
                    StatusCode::NOT_FOUND,
                    maud::html! {
                        h1 { "Not Found" }
                        p { "The page you were looking for doesn't exist." }
                    },
                )
            }
            PinmarkError::Validation(e) => html_page(
                StatusCode::BAD_REQUEST,
                maud::html! {
                    h1 { "Bad Request" }
                    ul {
                        @for (field, messages) in e.iter() {
                            @for message in messages {
                                li { (field) ": " (message) }
                            }
                        }
                    }
                },
            ),
            e => {
                error!("Error presented to user: {:?}", e);
                html_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    maud::html! {
                        "Internal Error"
                        br;
                    },
                )
            }
        }
    }
}
