mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Category;

use super::error_handlers::ApiError;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

#[derive(Serialize)]
struct MessageBody {
    success: bool,
    message: &'static str,
}

impl MessageBody {
    fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

// serialized as {"1": "Science", ...}
fn category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

// logs the database error before it is replaced with the reported kind
fn db_error(kind: ApiError) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |error| {
        match (&error, kind) {
            (sqlx::Error::RowNotFound, _) | (_, ApiError::NotFound) => {
                tracing::warn!(%error, "Request rejected as {kind:?}")
            }
            _ => tracing::error!(%error, "Database request failed"),
        }
        kind
    }
}
