/// Summary model and database operations
///
/// Summaries are per-user content records for documents the user has
/// processed. Text extraction and summarization happen outside this service;
/// callers hand over the extracted text and (optionally) the finished
/// summary, and we store both alongside the source metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Source document kind a summary was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "summary_file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SummaryFileType {
    /// Word document (.docx)
    Word,

    /// PDF document
    Pdf,

    /// Image run through OCR
    Ocr,
}

impl SummaryFileType {
    /// Converts to the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFileType::Word => "word",
            SummaryFileType::Pdf => "pdf",
            SummaryFileType::Ocr => "ocr",
        }
    }
}

/// Summary model: stored document text plus its summary
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Summary {
    /// Unique summary ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display title
    pub title: String,

    /// Name of the uploaded source file
    pub original_filename: String,

    /// Source document kind
    pub file_type: SummaryFileType,

    /// Text extracted from the source document
    pub extracted_text: Option<String>,

    /// Finished summary text
    pub summary_text: Option<String>,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// When the summary was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a summary record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSummary {
    /// Owning user
    pub user_id: Uuid,

    /// Display title
    pub title: String,

    /// Source file name
    pub original_filename: String,

    /// Source document kind
    pub file_type: SummaryFileType,

    /// Extracted text, if available
    pub extracted_text: Option<String>,

    /// Finished summary text, if available
    pub summary_text: Option<String>,
}

const SUMMARY_COLUMNS: &str = "id, user_id, title, original_filename, file_type, extracted_text, \
                               summary_text, created_at, updated_at";

impl Summary {
    /// Creates a new summary record
    pub async fn create(pool: &PgPool, data: CreateSummary) -> Result<Self, sqlx::Error> {
        let summary = sqlx::query_as::<_, Summary>(&format!(
            r#"
            INSERT INTO summaries (user_id, title, original_filename, file_type, extracted_text, summary_text)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUMMARY_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.original_filename)
        .bind(data.file_type)
        .bind(data.extracted_text)
        .bind(data.summary_text)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }

    /// Finds a summary by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let summary = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(summary)
    }

    /// Lists a user's summaries, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, Summary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM summaries
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }

    /// Deletes a summary, scoped to its owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM summaries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
