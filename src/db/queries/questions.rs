use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

/// A question that has passed request validation but has no id yet.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.category = ?1
ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

fn matches_term(question: &Question, needle: &str) -> bool {
    question.question.to_lowercase().contains(needle)
}

/// Case-insensitive substring match on the question text. Folding is done
/// here rather than with SQLite's `LIKE`, which only folds ASCII letters.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| matches_term(q, &needle))
        .collect())
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.difficulty)
    .bind(question.category)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

async fn replace_question(pool: &SqlitePool, question: &Question) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
INSERT OR REPLACE INTO questions (id, question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(question.id)
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.difficulty)
    .bind(question.category)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns `false` when no question with this id exists.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let mut conn = pool.acquire().await?;

    let affected = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    Ok(affected > 0)
}

/// Makes the stored questions match `questions` exactly, keeping their ids.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_questions(pool)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_question(pool, *id).await?;
    }
    for question in questions {
        replace_question(pool, &question).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_question, memory_pool};

    #[tokio::test]
    async fn create_and_fetch() {
        let pool = memory_pool().await;
        let id = insert_question(&pool, "What is the capital of Chad?", 3).await;
        let question = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(question.question, "What is the capital of Chad?");
        assert_eq!(question.category, 3);
        assert_eq!(count_questions(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_category_violates_foreign_key() {
        let pool = memory_pool().await;
        let result = create_question(
            &pool,
            &NewQuestion {
                question: "Orphan?".to_owned(),
                answer: "Yes".to_owned(),
                difficulty: 1,
                category: 99,
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let pool = memory_pool().await;
        insert_question(&pool, "Which is the largest lake in Africa?", 3).await;
        insert_question(&pool, "Who painted the Mona Lisa?", 2).await;
        insert_question(&pool, "What is 50% of 10?", 1).await;

        let found = search_questions(&pool, "aFRICA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("Africa"));

        let found = search_questions(&pool, "%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "What is 50% of 10?");

        assert_eq!(search_questions(&pool, "").await.unwrap().len(), 3);
        assert!(search_questions(&pool, "lake_in").await.unwrap().is_empty());
        assert!(search_questions(&pool, "nothing like this").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_letters() {
        let pool = memory_pool().await;
        insert_question(&pool, "Quelle est la capitale de l'ÉTAT?", 3).await;
        insert_question(&pool, "Wer schrieb FAUST?", 4).await;

        let found = search_questions(&pool, "état").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("ÉTAT"));

        let found = search_questions(&pool, "Faust").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn filter_by_category() {
        let pool = memory_pool().await;
        insert_question(&pool, "a", 1).await;
        insert_question(&pool, "b", 2).await;
        insert_question(&pool, "c", 1).await;

        let science = get_questions_for_category(&pool, 1).await.unwrap();
        let texts: Vec<&str> = science.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(get_questions_for_category(&pool, 6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let pool = memory_pool().await;
        let id = insert_question(&pool, "gone soon", 4).await;
        assert!(delete_question(&pool, id).await.unwrap());
        assert!(!delete_question(&pool, id).await.unwrap());
        assert!(get_question_by_id(&pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_replaces_existing_set() {
        let pool = memory_pool().await;
        let stale = insert_question(&pool, "stale", 1).await;
        let kept = insert_question(&pool, "kept", 1).await;

        import_questions(
            &pool,
            vec![
                Question {
                    id: kept,
                    question: "kept, reworded".to_owned(),
                    answer: "x".to_owned(),
                    difficulty: 1,
                    category: 2,
                },
                Question {
                    id: 100,
                    question: "imported".to_owned(),
                    answer: "y".to_owned(),
                    difficulty: 5,
                    category: 6,
                },
            ],
        )
        .await
        .unwrap();

        assert!(get_question_by_id(&pool, stale).await.unwrap().is_none());
        let all = get_all_questions(&pool).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![kept, 100]);
        assert_eq!(all[0].question, "kept, reworded");
    }
}
