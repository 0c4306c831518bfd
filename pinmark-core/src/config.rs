use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::Uri;
use axum_extra::extract::cookie::Key;
use pinmark_dependencies::chrono::Duration;
use pinmark_dependencies::url::{form_urlencoded, Url};

use crate::app::DBPool;
use crate::error::{PinmarkError, PinmarkResult};
use crate::pagination::DEFAULT_PAGE_SIZE;

fn default_bind_to() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_login_url() -> String {
    "/account/login/".to_string()
}

fn default_auth_header() -> String {
    "X-Remote-User".to_string()
}

fn default_session_cookie() -> String {
    "pinmark_session".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_activity_dedup_secs() -> i64 {
    60
}

#[derive(clap::Args, serde::Deserialize, Clone, securefmt::Debug)]
pub struct Configuration {
    /// Postgres database to store images in. Without it everything lives in memory
    /// and is gone on restart.
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<Url>,
    #[clap(long, env = "BIND_TO", default_value = "127.0.0.1:8080")]
    #[serde(default = "default_bind_to")]
    pub bind_to: SocketAddr,
    /// Where anonymous users are sent when a page needs a login
    #[clap(long, env = "LOGIN_URL", default_value = "/account/login/")]
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Header set by the authenticating proxy, carrying the numeric user id
    #[clap(long, env = "AUTH_HEADER", default_value = "X-Remote-User")]
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    #[clap(long, env = "SESSION_COOKIE", default_value = "pinmark_session")]
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// At least 64 bytes. When set, users are read from the signed session cookie
    /// instead of the proxy header.
    #[clap(long, env = "SESSION_KEY")]
    #[sensitive]
    pub session_key: Option<String>,
    /// At least 64 bytes, a random key is used when unset
    #[clap(long, env = "FLASH_KEY")]
    #[sensitive]
    pub flash_key: Option<String>,
    #[clap(long, env = "PAGE_SIZE", default_value = "8")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Identical activity within this many seconds is recorded once
    #[clap(long, env = "ACTIVITY_DEDUP_SECS", default_value = "60")]
    #[serde(default = "default_activity_dedup_secs")]
    pub activity_dedup_secs: i64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_to: default_bind_to(),
            login_url: default_login_url(),
            auth_header: default_auth_header(),
            session_cookie: default_session_cookie(),
            session_key: None,
            flash_key: None,
            page_size: default_page_size(),
            activity_dedup_secs: default_activity_dedup_secs(),
        }
    }
}

impl Configuration {
    pub async fn db_conn(&self) -> PinmarkResult<Option<DBPool>> {
        let url = match &self.database_url {
            Some(v) => v,
            None => return Ok(None),
        };
        let opts = sqlx::postgres::PgConnectOptions::from_str(url.as_str())?
            .application_name(&crate::package_full());
        Ok(Some(sqlx::PgPool::connect_with(opts).await?))
    }

    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    pub fn activity_window(&self) -> Duration {
        Duration::seconds(self.activity_dedup_secs.max(0))
    }

    pub fn flash_key(&self) -> PinmarkResult<Key> {
        match &self.flash_key {
            Some(v) => parse_key("FLASH_KEY", v),
            None => {
                debug!("No flash key configured, flash notices won't survive a restart");
                Ok(Key::generate())
            }
        }
    }

    pub fn session_key(&self) -> PinmarkResult<Option<Key>> {
        self.session_key
            .as_ref()
            .map(|v| parse_key("SESSION_KEY", v))
            .transpose()
    }

    /// The login page, with `next` pointing back at the page that was denied.
    pub fn login_redirect(&self, next: &Uri) -> String {
        let next = next
            .path_and_query()
            .map(|x| x.as_str())
            .unwrap_or_else(|| next.path());
        let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
        let sep = if self.login_url.contains('?') { '&' } else { '?' };
        format!("{}{}next={}", self.login_url, sep, next)
    }
}

fn parse_key(name: &str, v: &str) -> PinmarkResult<Key> {
    Key::try_from(v.as_bytes()).map_err(|e| {
        PinmarkError::Configuration(format!("{} is unusable: {}", name, e))
    })
}
