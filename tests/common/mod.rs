//! Common test utilities for jasper-exec E2E tests

#[allow(dead_code)]
pub mod config;

pub use config::*;
