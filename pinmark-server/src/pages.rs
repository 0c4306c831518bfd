use axum::http::{StatusCode, Uri};
use maud::{html, Markup, PreEscaped};
use pinmark_core::{error::PinmarkError, request_helper::HtmlResponse};

pub mod common;
pub mod images;

pub fn error_page(err: &PinmarkError) -> Markup {
    let error = err.to_string();
    html! {
        (maud::DOCTYPE)
        html {
            head {
                style {
                    (PreEscaped(r#"
                    .error.wrapper { max-width: 40em; margin: 4em auto; font-family: sans-serif; }
                    "#))
                }
            }
            body {
                div.error.wrapper {
                     h1.error.title { "An error occured while processing your request" }
                     main {
                         (error)
                     }
                }
            }
        }
    }
}

#[instrument]
pub async fn not_found_page(uri: Uri) -> (StatusCode, HtmlResponse) {
    let page = error_page(&PinmarkError::PageNotFound(uri.path().to_string()));
    (StatusCode::NOT_FOUND, page.into())
}
