use pinmark_dependencies::chrono::NaiveDateTime;

pub mod flash;
pub mod frontmatter;
pub mod image;
pub mod pagination;

pub fn pluralize<S: Into<String>>(singular: S, plural: S, count: i32) -> String {
    if count == 1 {
        let singular: String = singular.into();
        format!("{} {}", count, singular)
    } else {
        let plural: String = plural.into();
        format!("{} {}", count, plural)
    }
}

pub fn human_date(d: NaiveDateTime) -> String {
    d.format("%B %e, %Y %H:%M").to_string()
}
