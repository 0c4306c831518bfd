use std::ops::Range;

use maud::{html, Markup};
use pinmark_core::pagination::Page;
use pinmark_dependencies::url::form_urlencoded;

const SURROUNDING_PAGES: u64 = 3;

/// Pager links for a [`Page`] served at `base`.
pub struct PaginationCtl {
    base: String,
    pages: u64,
    current_page: u64,
}

impl PaginationCtl {
    pub fn new<T, S: Into<String>>(page: &Page<T>, base: S) -> Self {
        Self {
            base: base.into(),
            pages: page.num_pages,
            current_page: page.number.min(page.num_pages),
        }
    }

    /// Returns true if pagination should be used for this page
    pub fn need_pagination(&self) -> bool {
        self.pages > 1
    }

    pub fn href(&self, page: u64) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page.to_string())
            .finish();
        format!("{}?{}", self.base, query)
    }

    fn left_gap(&self) -> bool {
        self.current_page.saturating_sub(SURROUNDING_PAGES) > 1
    }
    fn left_page_numbers(&self) -> Range<u64> {
        self.current_page.saturating_sub(SURROUNDING_PAGES).max(1)..self.current_page
    }
    fn right_gap(&self) -> bool {
        self.current_page.saturating_add(SURROUNDING_PAGES) < self.pages
    }
    fn right_page_numbers(&self) -> Range<u64> {
        self.current_page + 1..(self.current_page + SURROUNDING_PAGES).min(self.pages) + 1
    }

    pub fn pagination(&self) -> Markup {
        html! {
            @if self.need_pagination() {
                nav.pagination {
                    @if self.current_page > 1 {
                        a href=(self.href(1)) { "« First" }
                        a.js-prev rel="prev" href=(self.href(self.current_page - 1)) { "‹ Prev" }
                    }

                    @if self.left_gap() {
                        span.page.gap { "…" }
                    }

                    @for number in self.left_page_numbers() {
                        a href=(self.href(number)) { (number) }
                    }

                    span.page-current { (self.current_page) }

                    @for number in self.right_page_numbers() {
                        a href=(self.href(number)) { (number) }
                    }

                    @if self.right_gap() {
                        span.page.gap { "…" }
                    }

                    @if self.current_page < self.pages {
                        a.js-next rel="next" href=(self.href(self.current_page + 1)) { "Next ›" }
                        a href=(self.href(self.pages)) { "Last »" }
                    }
                }
            }
        }
    }
}
