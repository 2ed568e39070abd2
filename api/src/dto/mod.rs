pub mod auth;
pub mod maps;
pub mod payment;

pub use auth::*;
pub use maps::*;
pub use payment::*;
