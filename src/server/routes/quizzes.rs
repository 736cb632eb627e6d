use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{get_all_questions, get_questions_for_category},
        Question,
    },
    server::{
        app::AppState,
        deserializers::deserialize_i64,
        error_handlers::{ApiError, ApiResponse},
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::db_error;

/// Category id meaning "questions from every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_i64")]
    id: i64,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuizRequest {
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct QuizBody {
    success: bool,
    question: Option<Question>,
}

/// Picks uniformly among the questions of `pool` not listed in `previous`.
///
/// `None` once every question of the pool has been asked.
fn pick_unseen<R: Rng + ?Sized>(
    pool: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let unseen: Vec<Question> = pool
        .into_iter()
        .filter(|question| !seen.contains(&question.id))
        .collect();
    unseen.choose(rng).cloned()
}

#[tracing::instrument(skip_all)]
async fn play_quiz(
    State(pool): State<SqlitePool>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizBody>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(%rejection, "Malformed quiz request");
        ApiError::BadRequest
    })?;
    let (Some(previous), Some(category)) = (request.previous_questions, request.quiz_category)
    else {
        return Err(ApiError::BadRequest);
    };
    tracing::debug!(
        category = category.id,
        kind = ?category.kind,
        asked = previous.len(),
        "Quiz turn"
    );

    let candidates = if category.id == ALL_CATEGORIES {
        get_all_questions(&pool).await
    } else {
        get_questions_for_category(&pool, category.id).await
    }
    .map_err(db_error(ApiError::Internal))?;

    let question = pick_unseen(candidates, &previous, &mut rand::thread_rng());
    let label = category.id.to_string();
    match &question {
        Some(_) => QUIZ_QUESTIONS_SERVED
            .with_label_values(&[label.as_str()])
            .inc(),
        None => tracing::info!(category = category.id, "No questions left in quiz pool"),
    }

    Ok(Json(QuizBody {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
