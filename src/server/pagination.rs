use axum::extract::{rejection::QueryRejection, Query};
use serde::Deserialize;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<i64>,
}

/// 1-based page number, falling back to the first page when absent or unparsable.
pub fn page_number(query: Result<Query<PageQuery>, QueryRejection>) -> i64 {
    query.ok().and_then(|Query(q)| q.page).unwrap_or(1)
}

/// The `[(page - 1) * 10, page * 10)` slice of `items`, empty when out of range.
pub fn page_window<T>(items: &[T], page: i64) -> &[T] {
    if page < 1 {
        return &[];
    }
    let start = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
        .unwrap_or(usize::MAX);
    if start >= items.len() {
        return &[];
    }
    let end = (start + QUESTIONS_PER_PAGE).min(items.len());
    &items[start..end]
}
