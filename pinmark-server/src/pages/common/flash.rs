use maud::{html, Markup};
use pinmark_dependencies::axum_flash::{IncomingFlashes, Level};

fn level_class(level: Level) -> &'static str {
    match level {
        Level::Debug | Level::Info => "flash--info",
        Level::Success => "flash--success",
        Level::Warning => "flash--warning",
        Level::Error => "flash--error",
    }
}

/// Notices left by the previous request, e.g. after a redirect.
pub fn flash_notices(flashes: Option<&IncomingFlashes>) -> Markup {
    trace!("rendering flash notices");
    html! {
        @if let Some(flashes) = flashes {
            @for (level, message) in flashes.iter() {
                div class={ "flash " (level_class(level)) } { (message) }
            }
        }
    }
}
