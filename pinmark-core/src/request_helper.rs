use axum::{
    headers::{ContentType, HeaderMapExt},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;

use crate::error::PinmarkError;

pub enum PinmarkResponse<T: IntoResponse> {
    Html(HtmlResponse),
    Json(JsonResponse),
    Redirect(Redirect),
    Error(PinmarkError),
    Other(T),
}

impl<T> IntoResponse for PinmarkResponse<T>
where
    T: IntoResponse,
{
    fn into_response(self) -> axum::response::Response {
        match self {
            PinmarkResponse::Html(h) => h.into_response(),
            PinmarkResponse::Json(j) => j.into_response(),
            PinmarkResponse::Redirect(r) => r.into_response(),
            PinmarkResponse::Error(e) => e.into_response(),
            PinmarkResponse::Other(v) => v.into_response(),
        }
    }
}

pub struct HtmlResponse {
    pub content: String,
}

impl IntoResponse for HtmlResponse {
    fn into_response(self) -> axum::response::Response {
        let mut hm = HeaderMap::new();
        hm.typed_insert(ContentType::html());
        (hm, self.content).into_response()
    }
}

impl From<String> for HtmlResponse {
    fn from(s: String) -> Self {
        Self { content: s }
    }
}

impl From<maud::PreEscaped<String>> for HtmlResponse {
    fn from(s: maud::PreEscaped<String>) -> Self {
        Self { content: s.0 }
    }
}

pub struct JsonResponse {
    pub content: serde_json::Value,
    pub headers: HeaderMap,
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> axum::response::Response {
        let mut headers = self.headers;
        headers.typed_insert(ContentType::json());
        (headers, self.content.to_string()).into_response()
    }
}

impl JsonResponse {
    /// `{"status": "ok"}` or `{"status": "error"}`
    pub fn status(status: Status) -> Self {
        JsonResponse {
            content: serde_json::json!({ "status": status }),
            headers: HeaderMap::new(),
        }
    }
}

#[derive(Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}
