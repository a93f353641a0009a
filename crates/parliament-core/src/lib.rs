//! Core domain types for the debate processing pipeline

mod error;
mod models;

pub use error::CoreError;
pub use models::*;
