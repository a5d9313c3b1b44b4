//! Domain models for Taskman.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod task;
