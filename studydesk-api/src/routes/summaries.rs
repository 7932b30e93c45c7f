/// Summary endpoints
///
/// Summaries are records of condensed study documents. The text extraction
/// and summarization itself happens client-side; this API stores the
/// results (title, source file name and kind, extracted and summarized
/// text).
///
/// # Endpoints
///
/// - `GET    /v1/summaries` - List summaries (newest first)
/// - `POST   /v1/summaries` - Create summary record
/// - `GET    /v1/summaries/:id` - Get summary
/// - `DELETE /v1/summaries/:id` - Delete summary

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
    models::summary::{CreateSummary, Summary, SummaryFileType},
};
use uuid::Uuid;
use validator::Validate;

/// Create summary request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSummaryRequest {
    /// Display title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Name of the uploaded source file
    #[validate(length(min = 1, message = "Original filename is required"))]
    pub original_filename: String,

    /// Source document kind ("word", "pdf" or "ocr")
    pub file_type: SummaryFileType,

    /// Text extracted from the source document
    pub extracted_text: Option<String>,

    /// Finished summary text
    pub summary_text: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteSummaryResponse {
    /// Always true on success
    pub deleted: bool,
}

/// List the user's summaries, newest first
pub async fn list_summaries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Summary>>> {
    let summaries = Summary::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(summaries))
}

/// Create a summary record
pub async fn create_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateSummaryRequest>,
) -> ApiResult<Json<Summary>> {
    check_request(&req)?;

    let summary = Summary::create(
        &state.db,
        CreateSummary {
            user_id: auth.user_id,
            title: req.title,
            original_filename: req.original_filename,
            file_type: req.file_type,
            extracted_text: req.extracted_text,
            summary_text: req.summary_text,
        },
    )
    .await?;

    Ok(Json(summary))
}

/// Get a single summary
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Summary>> {
    let summary = Summary::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Summary not found".to_string()))?;

    Ok(Json(summary))
}

/// Delete a summary
pub async fn delete_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteSummaryResponse>> {
    let deleted = Summary::delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Summary not found".to_string()));
    }

    Ok(Json(DeleteSummaryResponse { deleted }))
}
