//! Shared test utilities for shopgen integration tests.
//!
//! This module provides:
//! - Builders for category taxonomies
//! - A scripted executor and an event-recording progress reporter for
//!   driving the batch runner deterministically

pub mod builders;

pub use builders::*;
