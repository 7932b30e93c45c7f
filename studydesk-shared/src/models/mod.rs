/// Database models
///
/// Each model module provides the row struct, Create/Update input structs,
/// and the async CRUD operations over a `PgPool`. All per-user lookups go
/// through `..._and_user` variants so ownership is enforced per request.

pub mod category;
pub mod flashcard;
pub mod summary;
pub mod task;
pub mod user;

pub use category::{Category, CreateCategory};
pub use flashcard::Flashcard;
pub use summary::Summary;
pub use task::{Task, TaskStatus};
pub use user::User;
