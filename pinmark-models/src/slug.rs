use pinmark_dependencies::{lazy_static, regex::Regex};

/// Longest slug the `images.slug` column accepts.
pub const MAX_SLUG_LEN: usize = 200;

/// Longest suffix [`with_suffix`] can append, `-` plus a `u32`.
const MAX_SUFFIX_LEN: usize = 11;

/// Used when a title contains nothing sluggable.
pub const FALLBACK_SLUG: &str = "image";

lazy_static::lazy_static! {
    static ref DESTRUCTIVE_SLUG_NONPRINTABLE: Regex = Regex::new(r#"[^ -~]"#).unwrap();
    static ref DESTRUCTIVE_SLUG_NONALPHARUNS: Regex = Regex::new(r#"[^a-zA-Z0-9]+"#).unwrap();
    static ref DESTRUCTIVE_SLUG_STARTENDHYPHENS: Regex = Regex::new(r#"^-+|-+$"#).unwrap();
}

/// Lossy slug: drops everything that isn't ASCII alphanumeric and joins the rest with hyphens.
pub fn destructive_sluggify<S: AsRef<str>>(data: S) -> String {
    let data: &str = data.as_ref();
    let data = DESTRUCTIVE_SLUG_NONPRINTABLE.replace_all(data, "");
    let data = DESTRUCTIVE_SLUG_NONALPHARUNS.replace_all(&data, "-");
    let data = DESTRUCTIVE_SLUG_STARTENDHYPHENS.replace_all(&data, "");
    data.to_ascii_lowercase()
}

/// The slug an image title starts out with, before collisions are resolved.
pub fn base_slug<S: AsRef<str>>(title: S) -> String {
    let slug = destructive_sluggify(title);
    let slug = truncate(&slug, MAX_SLUG_LEN);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Candidate number `n` for `base`. The first candidate is the base itself, later ones
/// get `-2`, `-3`, ... appended while staying within [`MAX_SLUG_LEN`].
pub fn with_suffix(base: &str, n: u32) -> String {
    if n <= 1 {
        return truncate(base, MAX_SLUG_LEN).to_string();
    }
    let suffix = format!("-{}", n);
    let base = truncate(base, MAX_SLUG_LEN - suffix.len());
    format!("{}{}", base, suffix)
}

/// Every candidate of `base` starts with this, however much of `base` its suffix cut off.
/// Backends look up taken slugs by it before calling [`next_free`].
pub fn taken_prefix(base: &str) -> &str {
    truncate(base, MAX_SLUG_LEN - MAX_SUFFIX_LEN)
}

/// First candidate number for `base` that is not in `taken`.
pub fn next_free<S: AsRef<str>>(base: &str, taken: &[S]) -> u32 {
    let mut highest = 0;
    for slug in taken {
        let slug = slug.as_ref();
        if slug == truncate(base, MAX_SLUG_LEN) {
            highest = highest.max(1);
        } else if let Some(n) = suffix_of(base, slug) {
            highest = highest.max(n);
        }
    }
    highest + 1
}

fn suffix_of(base: &str, slug: &str) -> Option<u32> {
    let (head, n) = slug.rsplit_once('-')?;
    let n: u32 = n.parse().ok()?;
    if n < 2 || with_suffix(base, n) != slug || head.is_empty() {
        return None;
    }
    Some(n)
}

// slugs are ASCII, byte offsets are char boundaries
fn truncate(s: &str, len: usize) -> &str {
    let s = if s.len() > len { &s[..len] } else { s };
    s.trim_end_matches('-')
}
