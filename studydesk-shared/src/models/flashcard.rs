/// Flashcard model and database operations
///
/// Flashcards are independent per-user study records with no cross-entity
/// invariants beyond ownership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Flashcard model: a question/answer pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flashcard {
    /// Unique flashcard ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Question side
    pub question: String,

    /// Answer side
    pub answer: String,

    /// When the flashcard was created
    pub created_at: DateTime<Utc>,

    /// When the flashcard was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a flashcard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFlashcard {
    /// Owning user
    pub user_id: Uuid,

    /// Question side
    pub question: String,

    /// Answer side
    pub answer: String,
}

const FLASHCARD_COLUMNS: &str = "id, user_id, question, answer, created_at, updated_at";

impl Flashcard {
    /// Creates a new flashcard
    pub async fn create(pool: &PgPool, data: CreateFlashcard) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Flashcard>(&format!(
            r#"
            INSERT INTO flashcards (user_id, question, answer)
            VALUES ($1, $2, $3)
            RETURNING {FLASHCARD_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.question)
        .bind(data.answer)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a flashcard by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Flashcard>(&format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Lists a user's flashcards, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let cards = sqlx::query_as::<_, Flashcard>(&format!(
            r#"
            SELECT {FLASHCARD_COLUMNS}
            FROM flashcards
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Overwrites question and answer
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        question: &str,
        answer: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Flashcard>(&format!(
            r#"
            UPDATE flashcards
            SET question = $3, answer = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {FLASHCARD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Deletes a flashcard, scoped to its owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
