//! # Sombreando API
//!
//! HTTP layer of the Sombreando backend: Actix-web application factory,
//! middleware, request DTOs, route handlers and startup wiring.

pub mod app;
pub mod bootstrap;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use app::create_app;
pub use state::{AppState, Repositories};
