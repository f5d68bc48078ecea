//! Shared test fixtures and utilities for Tether crates.
//!
//! Provides reusable profile fixtures and Bevy test app builders.

pub mod app;
pub mod profiles;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{minimal_test_app, test_app_with};
pub use profiles::{anchored_profile, overlapping_lod_profile, shared, two_level_lod_profile};
