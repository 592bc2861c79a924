//! # Application Layer
//!
//! Ports for the completion service and the presentation layer, and the
//! fallback orchestration driving them.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
