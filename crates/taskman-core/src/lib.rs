//! Taskman Core — domain models, store traits and the workspace-wide
//! error type shared by every other crate.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TaskmanError, TaskmanResult};
