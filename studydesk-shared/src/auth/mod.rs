/// Authentication utilities
///
/// - `password`: Argon2id hashing and strength validation
/// - `jwt`: HS256 access/refresh token creation and validation
/// - `middleware`: the `AuthContext` injected into authenticated requests

pub mod jwt;
pub mod middleware;
pub mod password;
