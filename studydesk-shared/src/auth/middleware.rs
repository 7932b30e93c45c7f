/// Authentication context for request handlers
///
/// After the API's JWT middleware validates a Bearer token, it inserts an
/// `AuthContext` into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor; the contained `user_id` scopes every
/// database query, which is how the per-request ownership invariant is
/// enforced.
///
/// # Example
///
/// ```
/// use studydesk_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let ctx = AuthContext::from_jwt(Uuid::new_v4());
/// let greeting = format!("User: {}", ctx.user_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Invalid authorization header format
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
