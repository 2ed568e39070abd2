//! Request helpers shared by the route handlers

pub mod error;
pub mod request;

pub use error::{api_error, request_language, ApiError};
pub use request::{client_ip, json_config, path_config, query_config, request_context, validated};
