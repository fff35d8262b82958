// Supabase session verification

pub mod extractor;
pub mod jwt;

pub use extractor::AuthUser;
pub use jwt::{extract_bearer_token, AuthError, Claims, JwtVerifier};
