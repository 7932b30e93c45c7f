/// Database utilities
///
/// - `pool`: connection pool creation and health checks
/// - `migrations`: embedded migration runner

pub mod migrations;
pub mod pool;
