//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - An in-memory store implementing every repository trait
//! - A pinned clock and an `AppState` builder for HTTP-level tests

mod club_store_mocks;
mod factories;
mod fixed_clock;

pub use app_state_builder::*;
pub use club_store_mocks::*;
pub use factories::*;
pub use fixed_clock::*;
