//! CSV import/export of the question store, used to seed categories out-of-band.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("category id 0 is reserved for \"all categories\"")]
    ReservedCategoryId,
}

fn write_to(path: &Path, data: Vec<impl Serialize>) -> Result<(), TransferError> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TransferError> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> Result<(), TransferError> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    tracing::info!(dir = %dir.display(), "Exported questions and categories");
    Ok(())
}

pub async fn import_data(pool: &SqlitePool, dir: &Path) -> Result<(), TransferError> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    if categories.iter().any(|c| c.id == 0) {
        return Err(TransferError::ReservedCategoryId);
    }
    let counts = (categories.len(), questions.len());
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    tracing::info!(
        categories = counts.0,
        questions = counts.1,
        "Imported questions and categories"
    );
    Ok(())
}
