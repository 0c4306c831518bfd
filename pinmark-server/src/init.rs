use std::str::FromStr;

use pinmark_dependencies::{better_panic, kankyo};
use tracing::Level;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{prelude::*, EnvFilter};

pub fn logging() {
    better_panic::install();
    let dotenv = kankyo::load(false);
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    // a plain level only applies to our crates, full directives are handed to EnvFilter
    let (def_level, env_filter) = match Level::from_str(&rust_log) {
        Ok(level) => (Some(level), None),
        Err(_) => match EnvFilter::try_new(&rust_log) {
            Ok(filter) => (None, Some(filter)),
            Err(_) => (Some(Level::INFO), None),
        },
    };
    let fmt_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer.with_filter(filter_fn(move |metadata| {
            let def_level = match def_level {
                Some(v) => v,
                None => return true,
            };
            match (metadata.module_path(), metadata.level()) {
                (Some(m), &n) if m.starts_with("pinmark") => n <= def_level,
                // sqlx, hyper and friends
                (_, &n) => n <= Level::WARN,
            }
        })))
        .init();
    if let Err(e) = dotenv {
        info!("couldn't load .env file: {}, this is probably fine", e);
    }
}
