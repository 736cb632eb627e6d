use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Question,
    },
    server::{
        app::AppState,
        error_handlers::{ApiError, ApiResponse},
        pagination::{page_number, page_window, PageQuery},
    },
};

use super::{category_map, db_error};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

#[tracing::instrument(skip_all)]
async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesBody>> {
    let categories = get_all_categories(&pool)
        .await
        .map_err(db_error(ApiError::Internal))?;
    Ok(Json(CategoriesBody {
        success: true,
        categories: category_map(categories),
    }))
}

#[tracing::instrument(skip_all)]
async fn category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let category = get_category(&pool, id)
        .await
        .map_err(db_error(ApiError::Internal))?
        .ok_or_else(|| {
            tracing::warn!(id, "Unknown category");
            ApiError::Unprocessable
        })?;

    let questions = get_questions_for_category(&pool, id)
        .await
        .map_err(db_error(ApiError::Internal))?;
    let current = page_window(&questions, page_number(query));
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(CategoryQuestionsBody {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
