use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, get_all_questions, search_questions},
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::deserialize_optional_i64,
        error_handlers::{ApiError, ApiResponse},
        pagination::{page_number, page_window, PageQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{category_map, db_error, MessageBody};

#[derive(Debug, Deserialize)]
struct NewQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    category: Option<i64>,
}

impl NewQuestionBody {
    /// All four fields present and non-empty.
    fn validated(&self) -> Option<NewQuestion<'_>> {
        let question = self.question.as_deref().filter(|q| !q.is_empty())?;
        let answer = self.answer.as_deref().filter(|a| !a.is_empty())?;
        Some(NewQuestion {
            question,
            answer,
            category: self.category?,
            difficulty: self.difficulty?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    searchterm: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

#[tracing::instrument(skip_all)]
async fn list_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = get_all_questions(&pool)
        .await
        .map_err(db_error(ApiError::Internal))?;
    let categories = get_all_categories(&pool)
        .await
        .map_err(db_error(ApiError::Internal))?;

    let current = page_window(&questions, page_number(query));
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        total_questions: questions.len(),
        categories: category_map(categories),
        questions: current.to_vec(),
    }))
}

#[tracing::instrument(skip_all)]
async fn create_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<MessageBody>)> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(%rejection, "Malformed question");
        ApiError::Unprocessable
    })?;
    let new_question = body.validated().ok_or_else(|| {
        tracing::warn!(?body, "Question is missing required fields");
        ApiError::Unprocessable
    })?;

    let id = questions::create_question(&pool, new_question)
        .await
        .map_err(db_error(ApiError::Unprocessable))?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, "Question created");

    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new("Question successfully created!")),
    ))
}

#[tracing::instrument(skip_all)]
async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<MessageBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    questions::delete_question(&pool, id)
        .await
        .map_err(db_error(ApiError::Unprocessable))?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");

    Ok(Json(MessageBody::new("Question successfully deleted")))
}

#[tracing::instrument(skip_all)]
async fn search(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<SearchResults>> {
    let term = payload
        .ok()
        .and_then(|Json(body)| body.searchterm)
        .filter(|term| !term.is_empty())
        .ok_or(ApiError::Unprocessable)?;

    let found = search_questions(&pool, &term)
        .await
        .map_err(db_error(ApiError::NotFound))?;
    let current = page_window(&found, page_number(query));
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(SearchResults {
        success: true,
        questions: current.to_vec(),
        total_questions: found.len(),
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search))
        .with_state(state)
}
