//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Sample documents
//! - A mock language model
//! - API test client

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
pub mod test_app;

pub use fixtures::*;
pub use mocks::*;
pub use test_app::*;
