//! Periodic removal of expired authentication state

mod service;

pub use service::{CleanupConfig, CleanupReport, CleanupService};
