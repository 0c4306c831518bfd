//! Shared third-party crates, re-exported so every workspace member agrees on one version.

pub use axum_flash;
pub use better_panic;
pub use chrono;
pub use hyper;
pub use itertools;
pub use kankyo;
pub use lazy_static;
pub use regex;
pub use serde_urlencoded;
pub use tower;
pub use url;
