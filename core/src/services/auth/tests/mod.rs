//! Tests for authentication service

mod mocks;
mod two_factor_tests;
