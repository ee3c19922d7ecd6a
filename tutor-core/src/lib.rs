//! Core domain types shared across the tutorbot workspace: turns, roles,
//! languages, the error taxonomy, and tracing initialization.
//!
//! Every other crate in the workspace depends on this one; it depends on
//! nothing but the ambient stack.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{EngineError, Result, TutorError};
pub use types::{Language, SessionId, Turn, TurnRole};
