use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use pinmark_core::{
    activity::{MemoryActivityFeed, VERB_BOOKMARKED, VERB_LIKES},
    config::Configuration,
    error::PinmarkResult,
    session::TrustedHeaderAuth,
    state::PinmarkState,
};
use pinmark_dependencies::{hyper, serde_urlencoded, tower::ServiceExt};
use pinmark_models::{Client, Image, ImageForm, ImageID, UserID};

use crate::cli::server::axum_setup;

struct TestApp {
    state: PinmarkState,
    feed: MemoryActivityFeed,
    router: Router,
}

impl TestApp {
    fn new() -> PinmarkResult<Self> {
        let config = Configuration::default();
        let feed = MemoryActivityFeed::new(config.activity_window());
        let state = PinmarkState::with_parts(
            config,
            Client::in_memory(),
            Arc::new(TrustedHeaderAuth::new("X-Remote-User")?),
            Arc::new(feed.clone()),
        )?;
        let router = axum_setup(state.clone());
        Ok(Self {
            state,
            feed,
            router,
        })
    }

    async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    async fn get(&self, uri: &str, user: Option<i64>) -> Response {
        let mut req = Request::builder().method(Method::GET).uri(uri);
        if let Some(user) = user {
            req = req.header("x-remote-user", user.to_string());
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, user: Option<i64>, fields: &[(&str, &str)]) -> Response {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            req = req.header("x-remote-user", user.to_string());
        }
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(req.body(Body::from(body)).unwrap()).await
    }

    async fn bookmark(&self, owner: i64, title: &str) -> Image {
        let form = ImageForm {
            url: Some(format!("https://example.com/{}.jpg", owner)),
            title: Some(title.to_string()),
            description: None,
        };
        Image::create(&self.state.client, UserID(owner), &form)
            .await
            .unwrap()
    }

    /// Actions are recorded in the background.
    async fn wait_for_actions(&self, count: usize) -> Vec<pinmark_models::Action> {
        for _ in 0..100 {
            let actions = self.feed.actions().await;
            if actions.len() >= count {
                return actions;
            }
            tokio::task::yield_now().await;
        }
        self.feed.actions().await
    }
}

async fn body_string(resp: Response) -> String {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn image_count(body: &str) -> usize {
    body.matches("data-image-id=").count()
}

#[tokio::test]
async fn test_create_requires_login() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let resp = app.get("/images/create/", None).await;
    assert_eq!(StatusCode::SEE_OTHER, resp.status());
    assert_eq!(
        resp.headers()[LOCATION],
        "/account/login/?next=%2Fimages%2Fcreate%2F"
    );

    let resp = app
        .post_form(
            "/images/create/",
            None,
            &[("url", "https://example.com/a.jpg"), ("title", "A")],
        )
        .await;
    assert_eq!(StatusCode::SEE_OTHER, resp.status());
    assert_eq!(0, Image::count(&app.state.client).await?);
    Ok(())
}

#[tokio::test]
async fn test_create_form_prefill() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let resp = app
        .get(
            "/images/create/?url=https%3A%2F%2Fexample.com%2Fcat.png&title=A+cat",
            Some(1),
        )
        .await;
    assert_eq!(StatusCode::OK, resp.status());
    let body = body_string(resp).await;
    assert!(body.contains(r#"value="https://example.com/cat.png""#));
    assert!(body.contains(r#"value="A cat""#));
    assert!(
        !body.contains("This field is required."),
        "prefilling must not complain about missing fields"
    );
    Ok(())
}

#[tokio::test]
async fn test_create_image() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let resp = app
        .post_form(
            "/images/create/",
            Some(3),
            &[
                ("url", "https://example.com/sunset.jpg"),
                ("title", "Sunset"),
                ("description", "over the sea"),
            ],
        )
        .await;
    assert_eq!(StatusCode::SEE_OTHER, resp.status());
    assert_eq!(resp.headers()[LOCATION], "/images/detail/1/sunset/");
    let flash = resp.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let image = Image::get_id(&app.state.client, ImageID(1)).await?;
    assert_eq!(UserID(3), image.owner());
    assert_eq!("sunset", image.slug);
    assert_eq!(Some("over the sea".to_string()), image.description);

    let req = Request::builder()
        .uri("/images/detail/1/sunset/")
        .header(COOKIE, flash)
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(StatusCode::OK, resp.status());
    let body = body_string(resp).await;
    assert!(body.contains("Image added successfully"));
    assert!(body.contains("over the sea"));

    let actions = app.wait_for_actions(1).await;
    assert_eq!(1, actions.len());
    assert_eq!(VERB_BOOKMARKED, actions[0].verb);
    assert_eq!(Some(ImageID(1)), actions[0].target());
    Ok(())
}

#[tokio::test]
async fn test_create_same_title_twice() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let fields = [("url", "https://example.com/a.jpg"), ("title", "Sunset")];
    app.post_form("/images/create/", Some(1), &fields).await;
    let resp = app.post_form("/images/create/", Some(2), &fields).await;
    assert_eq!(StatusCode::SEE_OTHER, resp.status());
    assert_eq!(resp.headers()[LOCATION], "/images/detail/2/sunset-2/");
    Ok(())
}

#[tokio::test]
async fn test_create_invalid() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let resp = app
        .post_form(
            "/images/create/",
            Some(1),
            &[("url", "https://example.com/anim.gif"), ("title", "Kept")],
        )
        .await;
    assert_eq!(
        StatusCode::OK,
        resp.status(),
        "invalid forms are shown again, not redirected"
    );
    let body = body_string(resp).await;
    assert!(body.contains("does not match valid image extensions"));
    assert!(body.contains(r#"value="Kept""#));
    assert_eq!(0, Image::count(&app.state.client).await?);

    let resp = app.post_form("/images/create/", Some(1), &[]).await;
    assert_eq!(StatusCode::OK, resp.status());
    let body = body_string(resp).await;
    assert_eq!(2, body.matches("This field is required.").count());
    assert!(app.feed.actions().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_detail_not_found() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let image = app.bookmark(1, "Sunset").await;
    let resp = app.get(&format!("/images/detail/{}/sunset/", image.id), None).await;
    assert_eq!(StatusCode::OK, resp.status());

    let resp = app.get(&format!("/images/detail/{}/sunrise/", image.id), None).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    let resp = app.get("/images/detail/99/sunset/", None).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    let resp = app.get("/images/detail/one/sunset/", None).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    let resp = app.get("/nothing/here", None).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    Ok(())
}

#[tokio::test]
async fn test_detail_like_button() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let image = app.bookmark(1, "Sunset").await;
    let uri = format!("/images/detail/{}/sunset/", image.id);

    let body = body_string(app.get(&uri, None).await).await;
    assert!(!body.contains("like-form"), "anonymous users can't like");
    assert!(body.contains("0 likes"));

    let body = body_string(app.get(&uri, Some(2)).await).await;
    assert!(body.contains(r#"data-action="like""#));

    Image::like(&app.state.client, image.id(), UserID(2)).await?;
    let body = body_string(app.get(&uri, Some(2)).await).await;
    assert!(body.contains(r#"data-action="unlike""#));
    assert!(body.contains("1 like<"));
    assert!(body.contains(r#"<span class="image-likes__user">user #2</span>"#));
    Ok(())
}

#[tokio::test]
async fn test_like_and_unlike() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let image = app.bookmark(1, "Sunset").await;
    let id = image.id.to_string();

    let resp = app
        .post_form("/images/like/", Some(2), &[("id", id.as_str()), ("action", "like")])
        .await;
    assert_eq!(StatusCode::OK, resp.status());
    assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(r#"{"status":"ok"}"#, body_string(resp).await);
    let image = Image::get_id(&app.state.client, image.id()).await?;
    assert_eq!(1, image.total_likes);
    assert_eq!(vec![UserID(2)], image.likers(&app.state.client).await?);

    // liking twice changes nothing
    let resp = app
        .post_form("/images/like/", Some(2), &[("pk", id.as_str()), ("action", "like")])
        .await;
    assert_eq!(r#"{"status":"ok"}"#, body_string(resp).await);
    let image = Image::get_id(&app.state.client, image.id()).await?;
    assert_eq!(1, image.total_likes);

    let resp = app
        .post_form("/images/like/", Some(2), &[("id", id.as_str()), ("action", "unlike")])
        .await;
    assert_eq!(r#"{"status":"ok"}"#, body_string(resp).await);
    let image = Image::get_id(&app.state.client, image.id()).await?;
    assert_eq!(0, image.total_likes);
    assert!(image.likers(&app.state.client).await?.is_empty());

    let resp = app
        .post_form("/images/like/", Some(5), &[("id", id.as_str()), ("action", "unlike")])
        .await;
    assert_eq!(
        r#"{"status":"ok"}"#,
        body_string(resp).await,
        "unliking an image that was never liked is fine"
    );

    let actions = app.wait_for_actions(1).await;
    assert_eq!(1, actions.len(), "the repeated like must not be recorded twice");
    assert_eq!(VERB_LIKES, actions[0].verb);
    assert_eq!(UserID(2), actions[0].user());
    Ok(())
}

#[tokio::test]
async fn test_like_errors() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let image = app.bookmark(1, "Sunset").await;
    let id = image.id.to_string();
    let error = r#"{"status":"error"}"#;

    for fields in [
        vec![("action", "like")],
        vec![("id", "abc"), ("action", "like")],
        vec![("id", id.as_str())],
        vec![("id", id.as_str()), ("action", "love")],
        vec![("id", "999"), ("action", "like")],
        vec![("id", "999"), ("action", "unlike")],
    ] {
        let resp = app.post_form("/images/like/", Some(2), &fields).await;
        assert_eq!(StatusCode::OK, resp.status(), "{:?}", fields);
        assert_eq!(error, body_string(resp).await, "{:?}", fields);
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/images/like/")
        .header("x-remote-user", "2")
        .body(Body::from("id=1&action=like"))
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(error, body_string(resp).await, "no form content type");

    assert_eq!(0, Image::get_id(&app.state.client, image.id()).await?.total_likes);
    Ok(())
}

#[tokio::test]
async fn test_like_access() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let image = app.bookmark(1, "Sunset").await;
    let id = image.id.to_string();

    let resp = app
        .post_form("/images/like/", None, &[("id", id.as_str()), ("action", "like")])
        .await;
    assert_eq!(StatusCode::SEE_OTHER, resp.status());
    assert_eq!(0, Image::get_id(&app.state.client, image.id()).await?.total_likes);

    let resp = app.get("/images/like/", Some(2)).await;
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED, resp.status());
    Ok(())
}

#[tokio::test]
async fn test_list_pages() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    for n in 1..=10 {
        app.bookmark(1, &format!("Picture {:02}", n)).await;
    }

    let resp = app.get("/images/", None).await;
    assert_eq!(StatusCode::OK, resp.status());
    let body = body_string(resp).await;
    assert_eq!(8, image_count(&body));
    assert!(body.contains("Picture 10"), "newest first");
    assert!(!body.contains("Picture 01"));
    assert!(body.contains(r#"href="/images/?page=2""#));

    let body = body_string(app.get("/images/?page=abc", None).await).await;
    assert_eq!(8, image_count(&body));
    assert!(body.contains("Picture 10"));

    let body = body_string(app.get("/images/?page=0", None).await).await;
    assert!(body.contains("Picture 10"));

    let body = body_string(app.get("/images/?page=999", None).await).await;
    assert_eq!(2, image_count(&body), "out of range pages show the last page");
    assert!(body.contains("Picture 01"));
    assert!(body.contains("Picture 02"));
    Ok(())
}

#[tokio::test]
async fn test_list_fragment() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    for n in 1..=10 {
        app.bookmark(1, &format!("Picture {:02}", n)).await;
    }

    let resp = app.get("/images/?page=2&fragment_only=1", None).await;
    assert_eq!(StatusCode::OK, resp.status());
    let body = body_string(resp).await;
    assert_eq!(2, image_count(&body));
    assert!(!body.contains("<html"));

    let body = body_string(app.get("/images/?page=2&images_only=1", None).await).await;
    assert_eq!(2, image_count(&body));

    let resp = app.get("/images/?page=3&fragment_only=1", None).await;
    assert_eq!(StatusCode::OK, resp.status());
    assert_eq!("", body_string(resp).await, "scrolled past the end");

    let body = body_string(app.get("/images/?page=3&fragment_only=0", None).await).await;
    assert!(body.contains("<html"), "a false flag asks for the whole page");
    assert_eq!(2, image_count(&body));

    let body = body_string(app.get("/images/?page=1&page=2&fragment_only=1", None).await).await;
    assert!(!body.contains("<html"), "repeated keys must not drop the fragment flag");
    assert_eq!(2, image_count(&body));
    assert!(body.contains("Picture 01"));
    Ok(())
}

#[tokio::test]
async fn test_list_empty() -> PinmarkResult<()> {
    let app = TestApp::new()?;
    let body = body_string(app.get("/images/?page=4", None).await).await;
    assert!(body.contains("Nobody bookmarked an image yet."));
    assert_eq!(0, image_count(&body));

    let resp = app.get("/images/?fragment_only=1", None).await;
    assert_eq!(StatusCode::OK, resp.status());
    assert_eq!("", body_string(resp).await);
    Ok(())
}
