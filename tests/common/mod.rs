//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - Itinerary PDF builders
//! - Text-based assertions on redacted output
//! - Page rendering for checking the painted fill

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod render;

pub use assertions::*;
pub use fixtures::*;
pub use render::*;
