//! # Domain Layer
//!
//! Prompt, endpoint, completion and session models.
//! This layer is independent of the HTTP client and the terminal front end.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
