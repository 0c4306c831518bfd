use axum_extra::routing::TypedPath;
use maud::{html, Markup, DOCTYPE};
use pinmark_core::{
    app::PageTitle,
    session::{PinmarkRequestState, SessionMode},
    state::PinmarkState,
};
use pinmark_dependencies::axum_flash::IncomingFlashes;

use crate::pages::{
    common::flash::flash_notices,
    images::{PathImageCreate, PathImageList},
};

pub fn stylesheet() -> Markup {
    html! {
        style {
            r#"
            body { font-family: sans-serif; margin: 0; }
            .header { display: flex; gap: 1em; padding: 0.5em 1em; background: #263238; }
            .header a { color: #eceff1; }
            .header__user { margin-left: auto; color: #b0bec5; }
            #content { padding: 1em; }
            .flash { padding: 0.5em 1em; }
            .flash--success { background: #c8e6c9; }
            .flash--error { background: #ffcdd2; }
            .image-list { display: flex; flex-wrap: wrap; gap: 1em; }
            .image__thumb { max-width: 250px; max-height: 250px; }
            .form__errors { color: #b71c1c; }
            "#
        }
    }
}

pub fn header<T: SessionMode>(state: &PinmarkState, rstate: &PinmarkRequestState<T>) -> Markup {
    html! {
        header.header {
            a.header__link href=(PathImageList {}.to_uri().to_string()) { "Images" }
            a.header__link href=(PathImageCreate {}.to_uri().to_string()) { "Bookmark an image" }
            @if let Some(user) = rstate.user() {
                span.header__user { "Logged in as user #" (user) }
            } @else {
                a.header__user href=(state.config().login_redirect(&rstate.uri)) { "Log in" }
            }
        }
    }
}

/// Site layout around `body`.
pub fn app<T: SessionMode>(
    state: &PinmarkState,
    rstate: &PinmarkRequestState<T>,
    page_title: Option<PageTitle>,
    flashes: Option<&IncomingFlashes>,
    body: Markup,
) -> Markup {
    let title = match page_title {
        Some(t) => format!("{} - Pinmark", t.as_str()),
        None => "Pinmark".to_string(),
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                (stylesheet())
            }
            body {
                (header(state, rstate))
                (flash_notices(flashes))
                main #content {
                    (body)
                }
            }
        }
    }
}
