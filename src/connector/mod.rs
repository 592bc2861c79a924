//! # Connector Layer
//!
//! External integrations implementing application ports:
//! - Completion dispatch (Gemini over HTTP, plus an offline mock)
//! - Session observers for the terminal front end
//! - The CLI-facing api layer (container, router, controllers)

pub mod adapter;
pub mod api;

pub use adapter::*;
