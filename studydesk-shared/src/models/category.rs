/// Category model and database operations
///
/// Categories are per-user labels applied to tasks. They are created lazily
/// the first time a user types a new free-text category name, with the name
/// normalized to Title Case so "study" and "Study" resolve to the same row.
/// Deletion is soft: a deleted category keeps its row (tasks lose the link
/// via `ON DELETE SET NULL` only on hard deletes, so we null it explicitly).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     color VARCHAR(7) NOT NULL DEFAULT '#3498db',
///     icon VARCHAR(50),
///     is_default BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX idx_categories_user_name
///     ON categories (user_id, name) WHERE deleted_at IS NULL;
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Fallback color when no keyword matches
pub const DEFAULT_COLOR: &str = "#3498db";

/// Keyword-to-color mapping for newly created categories
const COLOR_KEYWORDS: &[(&str, &str)] = &[
    ("homework", "#e74c3c"),
    ("project", "#3498db"),
    ("exam", "#e67e22"),
    ("reading", "#9b59b6"),
    ("personal", "#95a5a6"),
    ("work", "#16a085"),
    ("study", "#2ecc71"),
];

/// Category model representing a per-user task label
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name, unique per user among live categories
    pub name: String,

    /// Hex color for board rendering
    pub color: String,

    /// Optional icon identifier
    pub icon: Option<String>,

    /// Whether this is one of the seeded default categories
    pub is_default: bool,

    /// Soft-deletion timestamp (None = live)
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Owning user
    pub user_id: Uuid,

    /// Raw name (will be normalized)
    pub name: String,

    /// Optional color override (heuristic assignment when None)
    pub color: Option<String>,

    /// Optional icon identifier
    pub icon: Option<String>,
}

/// Normalizes a free-text category name to Title Case
///
/// Whitespace is collapsed, each word gets an uppercase first letter and a
/// lowercase remainder, so "  my EXAMS " becomes "My Exams".
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Picks a color for a new category based on name keywords
pub fn default_color(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    for (keyword, color) in COLOR_KEYWORDS {
        if lower.contains(keyword) {
            return color;
        }
    }
    DEFAULT_COLOR
}

const CATEGORY_COLUMNS: &str =
    "id, user_id, name, color, icon, is_default, deleted_at, created_at, updated_at";

impl Category {
    /// Resolves a free-text category name to a row, creating it on first use
    ///
    /// The name is normalized before lookup, so exactly one live category
    /// exists per unique (user, normalized name) pair. Concurrent first uses
    /// are collapsed by the partial unique index.
    pub async fn find_or_create(
        pool: &PgPool,
        user_id: Uuid,
        raw_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let name = normalize_name(raw_name);
        let color = default_color(&name);

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (user_id, name, color)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, name) WHERE deleted_at IS NULL
            DO UPDATE SET updated_at = NOW()
            RETURNING {CATEGORY_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&name)
        .bind(color)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Creates a category explicitly (settings page)
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let name = normalize_name(&data.name);
        let color = data
            .color
            .unwrap_or_else(|| default_color(&name).to_string());

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (user_id, name, color, icon)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATEGORY_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(&name)
        .bind(color)
        .bind(data.icon)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Finds a live category by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Lists a user's live categories, alphabetically
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY name ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Soft-deletes a category and detaches it from the user's tasks
    ///
    /// Returns false when the category does not exist, is already deleted,
    /// or belongs to another user.
    pub async fn soft_delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE tasks SET category_id = NULL, updated_at = NOW() WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
