use axum_extra::routing::TypedPath;
use maud::{html, Markup};
use pinmark_models::{Image, ImageForm, ValidationErrors};

use crate::pages::{
    common::pluralize,
    images::{PathImageCreate, PathImageDetail},
};

/// Canonical location of an image, `/images/detail/<id>/<slug>/`.
pub fn image_url(image: &Image) -> String {
    PathImageDetail {
        id: image.id.to_string(),
        slug: image.slug.clone(),
    }
    .to_uri()
    .to_string()
}

pub fn image_box(image: &Image) -> Markup {
    let link = image_url(image);
    html! {
        .image.media-box data-image-id=(image.id) {
            a.image__link href=(link) {
                img.image__thumb src=(image.url) alt=(image.title);
            }
            .image__info {
                a.image__title href=(link) { (image.title) }
                " "
                span.image__likes { (pluralize("like", "likes", image.total_likes)) }
            }
        }
    }
}

fn field_errors(errors: Option<&ValidationErrors>, field: &str) -> Markup {
    html! {
        @if let Some(errors) = errors {
            @let messages = errors.field(field);
            @if !messages.is_empty() {
                ul.form__errors {
                    @for message in messages {
                        li { (message) }
                    }
                }
            }
        }
    }
}

/// The bookmark form, filled with whatever was submitted or passed by the bookmarklet.
pub fn image_form(form: &ImageForm, errors: Option<&ValidationErrors>) -> Markup {
    html! {
        form.image-form method="POST" action=(PathImageCreate {}.to_uri().to_string()) {
            (field_errors(errors, "url"))
            label for="image_url" { "Image URL" }
            input #image_url type="url" name="url" required value=(form.url());

            (field_errors(errors, "title"))
            label for="image_title" { "Title" }
            input #image_title type="text" name="title" required maxlength="200" value=(form.title());

            (field_errors(errors, "description"))
            label for="image_description" { "Description" }
            textarea #image_description name="description" { (form.description()) }

            button.button type="submit" { "Bookmark it!" }
        }
    }
}
