use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::Redirect,
    Form, Router,
};
use axum_extra::routing::{RouterExt, TypedPath};
use maud::{html, Markup};
use pinmark_core::{
    activity::{spawn_action, VERB_BOOKMARKED, VERB_LIKES},
    app::PageTitle,
    error::{PinmarkError, PinmarkResult},
    pagination::{OverflowPolicy, PageWindow},
    request_helper::{JsonResponse, PinmarkResponse, Status},
    session::{Authenticated, PinmarkRequestState, Unauthenticated},
    state::PinmarkState,
};
use pinmark_dependencies::axum_flash::{Flash, IncomingFlashes};
use pinmark_models::{Image, ImageForm, ImageID, LikeAction, ModelError, UserID};
use serde::Deserialize;

use crate::pages::common::{
    frontmatter::app,
    human_date,
    image::{image_box, image_form, image_url},
    pagination::PaginationCtl,
    pluralize,
};

pub fn image_pages(r: Router<PinmarkState>) -> Router<PinmarkState> {
    r.typed_get(create_image_form)
        .typed_post(create_image)
        .typed_get(show_image)
        .typed_post(like_image)
        .typed_get(list_images)
}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/images/create/")]
pub struct PathImageCreate {}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/images/detail/:id/:slug/")]
pub struct PathImageDetail {
    pub id: String,
    pub slug: String,
}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/images/like/")]
pub struct PathImageLike {}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/images/")]
pub struct PathImageList {}

fn create_page(
    state: &PinmarkState,
    rstate: &PinmarkRequestState<Authenticated>,
    form: Markup,
) -> PinmarkResponse<(Flash, Redirect)> {
    let body = html! {
        h1 { "Bookmark an image" }
        (form)
    };
    let page = app(
        state,
        rstate,
        Some(PageTitle::from("Bookmark an image")),
        None,
        body,
    );
    PinmarkResponse::Html(page.into())
}

/// Prefilled from the query string, which is how the bookmarklet hands over the image.
#[instrument(skip(state, rstate))]
pub async fn create_image_form(
    _: PathImageCreate,
    State(state): State<PinmarkState>,
    rstate: PinmarkRequestState<Authenticated>,
    query: Option<Query<ImageForm>>,
) -> PinmarkResult<PinmarkResponse<(Flash, Redirect)>> {
    let form = query.map(|Query(x)| x).unwrap_or_default();
    Ok(create_page(&state, &rstate, image_form(&form, None)))
}

#[instrument(skip(state, rstate, flash, form))]
pub async fn create_image(
    _: PathImageCreate,
    State(state): State<PinmarkState>,
    flash: Flash,
    rstate: PinmarkRequestState<Authenticated>,
    form: Option<Form<ImageForm>>,
) -> PinmarkResult<PinmarkResponse<(Flash, Redirect)>> {
    let form = form.map(|Form(x)| x).unwrap_or_default();
    let client = state.get_db_client();
    match Image::create(&client, rstate.actor, &form).await {
        Ok(image) => {
            info!("user {} bookmarked image {} as {:?}", rstate.actor, image.id, image.slug);
            spawn_action(
                state.activity.clone(),
                rstate.actor,
                VERB_BOOKMARKED,
                Some(image.id()),
            );
            Ok(PinmarkResponse::Other((
                flash.success("Image added successfully"),
                Redirect::to(&image_url(&image)),
            )))
        }
        Err(ModelError::Validation(errors)) => {
            debug!("rejected bookmark by {}: {}", rstate.actor, errors);
            Ok(create_page(&state, &rstate, image_form(&form, Some(&errors))))
        }
        Err(e) => Err(e.into()),
    }
}

fn like_button(image: &Image, liked: bool) -> Markup {
    let (action, label) = if liked {
        (LikeAction::Unlike, "Unlike")
    } else {
        (LikeAction::Like, "Like")
    };
    html! {
        form.like-form method="POST" action=(PathImageLike {}.to_uri().to_string()) {
            input type="hidden" name="id" value=(image.id);
            input type="hidden" name="action" value=(action.to_string());
            button.button.like
                type="submit"
                data-id=(image.id)
                data-action=(action.to_string()) { (label) }
        }
    }
}

#[instrument(skip(state, rstate, flashes))]
pub async fn show_image(
    path: PathImageDetail,
    State(state): State<PinmarkState>,
    flashes: IncomingFlashes,
    rstate: PinmarkRequestState<Unauthenticated>,
) -> PinmarkResult<(IncomingFlashes, PinmarkResponse<()>)> {
    // ids that don't parse can't name an image either
    let id = path
        .id
        .parse::<i64>()
        .map_err(|_| PinmarkError::PageNotFound(rstate.uri.path().to_string()))?;
    let client = state.get_db_client();
    let image = Image::get_id_slug(&client, ImageID(id), &path.slug).await?;
    let likers = image.likers(&client).await?;
    let viewer: Option<UserID> = rstate.user();
    let liked = match viewer {
        Some(user) => image.liked_by(&client, user).await?,
        None => false,
    };

    let body = html! {
        .image-detail data-image-id=(image.id) {
            h1 { (image.title) }
            a href=(image.url) {
                img.image-detail__img src=(image.url) alt=(image.title);
            }
            @if let Some(description) = &image.description {
                p.image-detail__description { (description) }
            }
            p.image-detail__meta {
                "Bookmarked by user #" (image.owner()) " on " (human_date(image.created))
            }
            .image-detail__likes {
                span.count { (pluralize("like", "likes", image.total_likes)) }
                @if viewer.is_some() {
                    (like_button(&image, liked))
                }
            }
            .image-likes {
                @for user in &likers {
                    span.image-likes__user { "user #" (user) }
                }
                @if likers.is_empty() {
                    p { "Nobody likes this image yet." }
                }
            }
        }
    };
    let page = app(
        &state,
        &rstate,
        Some(PageTitle::from(image.title.clone())),
        Some(&flashes),
        body,
    );
    Ok((flashes, PinmarkResponse::Html(page.into())))
}

#[derive(Deserialize, Debug, Default)]
pub struct LikeForm {
    #[serde(alias = "pk")]
    pub id: Option<String>,
    pub action: Option<String>,
}

async fn toggle_like(
    state: &PinmarkState,
    user: UserID,
    form: Result<Form<LikeForm>, FormRejection>,
) -> PinmarkResult<()> {
    let Form(form) = form.map_err(|e| PinmarkError::Other(format!("unreadable like form: {}", e)))?;
    let id: i64 = form
        .id
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| PinmarkError::Other("no image id given".to_string()))?
        .parse::<i64>()
        .map_err(|e| PinmarkError::Other(format!("invalid image id: {}", e)))?;
    let action = form.action.as_deref().unwrap_or_default().parse::<LikeAction>()?;
    let image = ImageID(id);
    let client = state.get_db_client();
    match action {
        LikeAction::Like => {
            if Image::like(&client, image, user).await? {
                spawn_action(state.activity.clone(), user, VERB_LIKES, Some(image));
            }
        }
        LikeAction::Unlike => {
            Image::unlike(&client, image, user).await?;
        }
    }
    Ok(())
}

/// Always answers with a JSON status, whatever went wrong is only logged.
#[instrument(skip(state, rstate, form))]
pub async fn like_image(
    _: PathImageLike,
    State(state): State<PinmarkState>,
    rstate: PinmarkRequestState<Authenticated>,
    form: Result<Form<LikeForm>, FormRejection>,
) -> PinmarkResponse<()> {
    let status = match toggle_like(&state, rstate.actor, form).await {
        Ok(()) => Status::Ok,
        Err(e) => {
            debug!("like request by {} failed: {}", rstate.actor, e);
            Status::Error
        }
    };
    PinmarkResponse::Json(JsonResponse::status(status))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub fragment_only: Option<String>,
    pub images_only: Option<String>,
}

fn flag_set(v: &Option<String>) -> bool {
    match v.as_deref().map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

impl ListQuery {
    /// Repeated keys keep their last value, unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "fragment_only" => &mut query.fragment_only,
                "images_only" => &mut query.images_only,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }

    /// Infinite scroll asks for bare list items without the page around them.
    pub fn fragment(&self) -> bool {
        flag_set(&self.fragment_only) || flag_set(&self.images_only)
    }
}

#[instrument(skip(state, rstate, flashes))]
pub async fn list_images(
    _: PathImageList,
    State(state): State<PinmarkState>,
    flashes: IncomingFlashes,
    rstate: PinmarkRequestState<Unauthenticated>,
    query: Option<Query<Vec<(String, String)>>>,
) -> PinmarkResult<PinmarkResponse<(IncomingFlashes, PinmarkResponse<()>)>> {
    let query = query
        .map(|Query(pairs)| ListQuery::from_pairs(pairs))
        .unwrap_or_default();
    let fragment = query.fragment();
    let policy = if fragment {
        OverflowPolicy::Empty
    } else {
        OverflowPolicy::Clamp
    };
    let client = state.get_db_client();
    let total = Image::count(&client).await?;
    let window = PageWindow::resolve(
        total,
        state.config().page_size(),
        query.page.as_deref(),
        policy,
    );
    let items = if window.limit == 0 {
        Vec::new()
    } else {
        Image::get_range(&client, window.offset, window.limit).await?
    };
    let page = window.page(items);
    trace!(
        "listing page {}/{} with {} images",
        page.number,
        page.num_pages,
        page.items.len()
    );

    if page.is_empty_overflow {
        return Ok(PinmarkResponse::Html(String::new().into()));
    }
    let list = html! {
        @for image in &page.items {
            (image_box(image))
        }
    };
    if fragment {
        return Ok(PinmarkResponse::Html(list.into()));
    }

    let pager = PaginationCtl::new(&page, PathImageList {}.to_uri().to_string());
    let body = html! {
        h1 { "Images bookmarked" }
        @if page.is_empty() {
            p { "Nobody bookmarked an image yet." }
        } @else {
            .image-list #image-list data-page=(page.number) data-last-page=(page.num_pages) {
                (list)
            }
        }
        (pager.pagination())
    };
    let page = app(
        &state,
        &rstate,
        Some(PageTitle::from("Images bookmarked")),
        Some(&flashes),
        body,
    );
    Ok(PinmarkResponse::Other((
        flashes,
        PinmarkResponse::Html(page.into()),
    )))
}
