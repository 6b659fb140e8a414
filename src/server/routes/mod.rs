mod categories;
mod questions;
mod quizzes;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use serde::Deserialize;

use crate::pagination::Page;
use crate::server::error::ApiError;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Deserialize)]
pub(crate) struct PageQuery {
    page: Option<String>,
}

/// Parses `?page=N`. Absent or blank means the first page; a number too large
/// to represent is a page past the end rather than an error.
fn parse_page_index(raw: Option<&str>) -> Option<usize> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Some(1);
    }
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<usize>().unwrap_or(usize::MAX))
}

pub(crate) fn requested_page(
    query: Result<Query<PageQuery>, QueryRejection>,
    page_size: usize,
) -> ApiResponse<Page> {
    let Query(PageQuery { page }) = query?;
    parse_page_index(page.as_deref())
        .and_then(|index| Page::new(index, page_size))
        .ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "page must be a positive integer, got {}",
                page.unwrap_or_default()
            ))
        })
}
