use std::{fmt::Debug, marker::PhantomData, sync::Arc, time::Instant};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderName, Uri},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use pinmark_models::UserID;

use crate::{
    config::Configuration,
    error::{PinmarkError, PinmarkResult},
    state::PinmarkState,
};

/// Decides which requests reach a handler, based on whether a user could be identified.
pub trait SessionMode: Send + Sync + 'static {
    type Actor: Clone + Debug + Send + Sync;

    /// `None` turns the request away.
    fn admit(user: Option<UserID>) -> Option<Self::Actor>;
    fn user(actor: &Self::Actor) -> Option<UserID>;
}

/// Only logged in users, everyone else is sent to the login page.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

/// Everyone.
#[derive(Debug, Clone, Copy)]
pub struct Unauthenticated;

impl SessionMode for Authenticated {
    type Actor = UserID;

    fn admit(user: Option<UserID>) -> Option<UserID> {
        user
    }
    fn user(actor: &UserID) -> Option<UserID> {
        Some(*actor)
    }
}

impl SessionMode for Unauthenticated {
    type Actor = Option<UserID>;

    fn admit(user: Option<UserID>) -> Option<Option<UserID>> {
        Some(user)
    }
    fn user(actor: &Option<UserID>) -> Option<UserID> {
        *actor
    }
}

/// Identifies the user behind a request. Accounts live elsewhere, all we get is an id.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> PinmarkResult<Option<UserID>>;
}

/// Trusts a header set by the reverse proxy that did the login.
#[derive(Debug, Clone)]
pub struct TrustedHeaderAuth {
    header: HeaderName,
}

impl TrustedHeaderAuth {
    pub fn new(header: &str) -> PinmarkResult<Self> {
        let header = HeaderName::from_bytes(header.as_bytes()).map_err(|e| {
            PinmarkError::Configuration(format!("invalid auth header {:?}: {}", header, e))
        })?;
        Ok(Self { header })
    }
}

#[async_trait]
impl Authenticator for TrustedHeaderAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> PinmarkResult<Option<UserID>> {
        let value = match headers.get(&self.header) {
            Some(v) => v,
            None => return Ok(None),
        };
        match value.to_str().ok().map(str::parse::<UserID>) {
            Some(Ok(user)) => Ok(Some(user)),
            _ => {
                warn!("Ignoring malformed {} header: {:?}", self.header, value);
                Ok(None)
            }
        }
    }
}

/// Reads the user id from a cookie signed by the login service.
#[derive(Clone)]
pub struct SignedCookieAuth {
    cookie: String,
    key: Key,
}

impl SignedCookieAuth {
    pub fn new<S: Into<String>>(cookie: S, key: Key) -> Self {
        Self {
            cookie: cookie.into(),
            key,
        }
    }
}

#[async_trait]
impl Authenticator for SignedCookieAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> PinmarkResult<Option<UserID>> {
        let jar = SignedCookieJar::from_headers(headers, self.key.clone());
        let cookie = match jar.get(&self.cookie) {
            Some(v) => v,
            None => return Ok(None),
        };
        match cookie.value().parse::<UserID>() {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Session cookie {} carries no user id: {}", self.cookie, e);
                Ok(None)
            }
        }
    }
}

/// The signed cookie when a session key is configured, the proxy header otherwise.
pub fn authenticator_from_config(config: &Configuration) -> PinmarkResult<Arc<dyn Authenticator>> {
    Ok(match config.session_key()? {
        Some(key) => {
            info!("Authenticating users by signed cookie {:?}", config.session_cookie);
            Arc::new(SignedCookieAuth::new(config.session_cookie.clone(), key))
        }
        None => {
            info!("Authenticating users by trusted header {:?}", config.auth_header);
            Arc::new(TrustedHeaderAuth::new(&config.auth_header)?)
        }
    })
}

/// Per-request view of who is asking. Extracting it with [`Authenticated`] is the login gate.
pub struct PinmarkRequestState<T: SessionMode> {
    pub headers: HeaderMap,
    pub uri: Uri,
    pub actor: T::Actor,
    pub started_at: Instant,
    _mode: PhantomData<T>,
}

impl<T: SessionMode> PinmarkRequestState<T> {
    pub fn user(&self) -> Option<UserID> {
        T::user(&self.actor)
    }
}

impl<T: SessionMode> Debug for PinmarkRequestState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinmarkRequestState")
            .field("uri", &self.uri)
            .field("actor", &self.actor)
            .finish()
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for PinmarkRequestState<T>
where
    S: Send + Sync,
    PinmarkState: FromRef<S>,
    T: SessionMode,
{
    type Rejection = PinmarkError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let started_at = Instant::now();
        let state = PinmarkState::from_ref(state);
        let user = state.authenticator.authenticate(&parts.headers).await?;
        let actor = match T::admit(user) {
            Some(v) => v,
            None => {
                debug!("Anonymous request to {}, redirecting to login", parts.uri);
                return Err(PinmarkError::AuthRequired {
                    login: state.config().login_redirect(&parts.uri),
                });
            }
        };
        Ok(Self {
            headers: parts.headers.clone(),
            uri: parts.uri.clone(),
            actor,
            started_at,
            _mode: PhantomData,
        })
    }
}
