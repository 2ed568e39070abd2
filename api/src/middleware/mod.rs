pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{AuthContext, JwtAuth};
pub use cors::create_cors;
pub use rate_limit::ApiRateLimit;
pub use security::SecurityMiddleware;
