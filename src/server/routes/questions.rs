use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    config::PaginationSettings,
    db::{
        queries::{categories, questions},
        NewQuestion, Question,
    },
    pagination::paginate,
    server::{app::AppState, error::ApiError},
};

use super::{requested_page, ApiResponse, PageQuery};

const DIFFICULTY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Deserialize)]
struct QuestionRequest {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
}

impl QuestionRequest {
    fn validate(self) -> Result<NewQuestion, ApiError> {
        let text = |field: &str, value: Option<String>| match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ApiError::Unprocessable(format!("{field} must be a non-empty string"))),
        };
        let question = text("question", self.question)?;
        let answer = text("answer", self.answer)?;
        let difficulty = self
            .difficulty
            .filter(|d| DIFFICULTY_RANGE.contains(d))
            .ok_or_else(|| ApiError::Unprocessable("difficulty must be between 1 and 5".to_owned()))?;
        let category = self
            .category
            .filter(|c| *c > 0)
            .ok_or_else(|| ApiError::Unprocessable("category must be a positive id".to_owned()))?;
        Ok(NewQuestion {
            question,
            answer,
            difficulty,
            category,
        })
    }
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPageBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct DeletedBody {
    success: bool,
    deleted: i64,
}

#[derive(Serialize)]
struct CreatedBody {
    success: bool,
    created: i64,
    question_created: String,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<PaginationSettings>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPageBody>> {
    let page = requested_page(query, pagination.page_size)?;
    let selection = questions::get_all_questions(&pool).await?;
    let current = paginate(&selection, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsPageBody {
        success: true,
        questions: current.to_vec(),
        total_questions: selection.len() as i64,
        categories: categories::get_categories_map(&pool).await?,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<DeletedBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    if !questions::delete_question(&pool, id)
        .await
        .map_err(ApiError::from_write)?
    {
        return Err(ApiError::NotFound);
    }
    tracing::info!(question.id = id, "question deleted");
    Ok(Json(DeletedBody {
        success: true,
        deleted: id,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    State(pagination): State<PaginationSettings>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<QuestionRequest>, JsonRejection>,
) -> ApiResponse<Json<CreatedBody>> {
    let Json(request) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    let new_question = request.validate()?;
    let page = requested_page(query, pagination.page_size)?;

    let id = questions::create_question(&pool, &new_question)
        .await
        .map_err(ApiError::from_write)?;
    tracing::info!(question.id = id, question.category = new_question.category, "question created");

    let selection = questions::get_all_questions(&pool).await?;
    Ok(Json(CreatedBody {
        success: true,
        created: id,
        question_created: new_question.question,
        questions: paginate(&selection, page).to_vec(),
        total_questions: selection.len() as i64,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<PaginationSettings>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResponse<Json<SearchBody>> {
    let Json(request) = body?;
    let term = request
        .search_term
        .ok_or_else(|| ApiError::InvalidInput("searchTerm is required".to_owned()))?;
    let page = requested_page(query, pagination.page_size)?;

    let selection = questions::search_questions(&pool, &term).await?;
    if selection.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(SearchBody {
        success: true,
        questions: paginate(&selection, page).to_vec(),
        total_questions: questions::count_questions(&pool).await?,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search_question", post(search_questions))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> QuestionRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn validation_accepts_numeric_strings() {
        let q = request(r#"{"question": "Why?", "answer": "Because", "category": "1", "difficulty": 1}"#)
            .validate()
            .unwrap();
        assert_eq!(q.category, 1);
        assert_eq!(q.difficulty, 1);
        assert_eq!(q.question, "Why?");
    }

    #[test]
    fn validation_rejects_missing_and_blank_fields() {
        for body in [
            r#"{"answer": "a", "category": 1, "difficulty": 1}"#,
            r#"{"question": "q", "answer": "  ", "category": 1, "difficulty": 1}"#,
            r#"{"question": "q", "answer": "a", "difficulty": 1}"#,
            r#"{"question": "q", "answer": "a", "category": 1}"#,
            r#"{"question": "q", "answer": "a", "category": "0", "difficulty": 1}"#,
            r#"{"question": "q", "answer": "a", "category": 1, "difficulty": 9}"#,
        ] {
            assert!(
                matches!(request(body).validate(), Err(ApiError::Unprocessable(_))),
                "{body} should be rejected"
            );
        }
    }
}
