use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    config::PaginationSettings,
    db::{
        queries::{categories, questions},
        Question,
    },
    pagination::paginate,
    server::{app::AppState, error::ApiError},
};

use super::{requested_page, ApiResponse, PageQuery};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesBody>> {
    let categories = categories::get_categories_map(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesBody {
        success: true,
        categories,
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<PaginationSettings>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let page = requested_page(query, pagination.page_size)?;

    let category = categories::get_category(&pool, id)
        .await?
        .ok_or_else(|| ApiError::InvalidInput(format!("category {id} does not exist")))?;
    let selection = questions::get_questions_for_category(&pool, category.id).await?;
    let total_questions = questions::count_questions(&pool).await?;

    Ok(Json(CategoryQuestionsBody {
        success: true,
        questions: paginate(&selection, page).to_vec(),
        total_questions,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}
