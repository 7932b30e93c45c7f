/// Category endpoints
///
/// Categories are per-user labels with a display color. Names are
/// normalized to Title Case, so "math homework" and "Math Homework" are
/// the same category. Deleting a category is a soft delete: it disappears
/// from lists and its tasks become uncategorized, but the row survives so
/// the name can be reused later.
///
/// # Endpoints
///
/// - `GET    /v1/categories` - List categories
/// - `POST   /v1/categories` - Create (or reuse) a category
/// - `GET    /v1/categories/:id` - Get category
/// - `DELETE /v1/categories/:id` - Soft-delete category

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::check_request,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use studydesk_shared::{
    auth::middleware::AuthContext,
    models::{Category, CreateCategory},
};
use uuid::Uuid;
use validator::Validate;

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name (normalized to Title Case)
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Hex color override, e.g. "#e74c3c" (keyword heuristic when absent)
    #[validate(length(min = 4, max = 7, message = "Color must be a hex value like #3498db"))]
    pub color: Option<String>,

    /// Optional icon identifier
    #[validate(length(max = 50, message = "Icon must be at most 50 characters"))]
    pub icon: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    /// Always true on success
    pub deleted: bool,
}

/// List the user's categories, alphabetically
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(categories))
}

/// Create a category, reusing an existing one with the same name
///
/// Posting just a name resolves to the existing category when one matches
/// (after normalization). When a color or icon is supplied the create is
/// explicit: a clashing name is a conflict rather than a silent reuse that
/// would ignore the overrides.
///
/// # Errors
///
/// - `409 Conflict`: Explicit create with a name that already exists
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    check_request(&req)?;

    let category = if req.color.is_some() || req.icon.is_some() {
        Category::create(
            &state.db,
            CreateCategory {
                user_id: auth.user_id,
                name: req.name,
                color: req.color,
                icon: req.icon,
            },
        )
        .await?
    } else {
        Category::find_or_create(&state.db, auth.user_id, &req.name).await?
    };

    Ok(Json(category))
}

/// Get a single category
pub async fn get_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    let category = Category::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// Soft-delete a category
///
/// The category's tasks are detached (they keep existing, uncategorized)
/// in the same transaction.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteCategoryResponse>> {
    let deleted = Category::soft_delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    Ok(Json(DeleteCategoryResponse { deleted }))
}
