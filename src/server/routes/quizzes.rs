use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question,
    },
    quiz::{select_next, CategoryFilter, QuizOutcome},
    server::{app::AppState, deserializers::deserialize_id_set, error::ApiError},
    telemetry::{QUIZ_EXHAUSTED_CNTR, QUIZ_SERVED_CNTR},
};

use super::ApiResponse;

const UNKNOWN_CATEGORY_LABEL: &str = "unknown";

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    id: Option<i64>,
}

#[derive(Deserialize)]
struct QuizRequestBody {
    quiz_category: Option<QuizCategory>,
    #[serde(default, deserialize_with = "deserialize_id_set")]
    previous_questions: Option<HashSet<i64>>,
}

struct QuizRequest {
    category: CategoryFilter,
    previous_questions: HashSet<i64>,
}

impl QuizRequestBody {
    fn validate(self) -> Result<QuizRequest, ApiError> {
        let id = self
            .quiz_category
            .and_then(|c| c.id)
            .ok_or_else(|| ApiError::InvalidInput("quiz_category.id is required".to_owned()))?;
        if id < 0 {
            return Err(ApiError::InvalidInput(format!("invalid category id {id}")));
        }
        let previous_questions = self
            .previous_questions
            .ok_or_else(|| ApiError::InvalidInput("previous_questions is required".to_owned()))?;
        Ok(QuizRequest {
            category: CategoryFilter::from(id),
            previous_questions,
        })
    }
}

#[derive(Serialize)]
struct QuizBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Ids that are not stored categories share one series so clients cannot grow the registry.
async fn metric_label(pool: &SqlitePool, id: i64) -> ApiResponse<String> {
    Ok(match categories::get_category(pool, id).await? {
        Some(category) => category.id.to_string(),
        None => UNKNOWN_CATEGORY_LABEL.to_owned(),
    })
}

async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequestBody>, JsonRejection>,
) -> ApiResponse<Json<QuizBody>> {
    let Json(body) = body?;
    let request = body.validate()?;

    let (candidates, label) = match request.category {
        CategoryFilter::All => (questions::get_all_questions(&pool).await?, "all".to_owned()),
        CategoryFilter::Only(id) => (
            questions::get_questions_for_category(&pool, id).await?,
            metric_label(&pool, id).await?,
        ),
    };

    let outcome = {
        let mut rng = rand::thread_rng();
        select_next(&candidates, &request.previous_questions, &mut rng)
    };
    let body = match outcome {
        QuizOutcome::Selected(question) => {
            QUIZ_SERVED_CNTR.with_label_values(&[label.as_str()]).inc();
            tracing::debug!(
                question.id = question.id,
                served = request.previous_questions.len(),
                "quiz question selected"
            );
            QuizBody {
                success: true,
                question: Some(question.clone()),
                message: None,
            }
        }
        QuizOutcome::Exhausted => {
            QUIZ_EXHAUSTED_CNTR.with_label_values(&[label.as_str()]).inc();
            tracing::debug!(category = %label, pool = candidates.len(), "quiz exhausted");
            QuizBody {
                success: true,
                question: None,
                message: Some("No more questions!"),
            }
        }
    };
    Ok(Json(body))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
