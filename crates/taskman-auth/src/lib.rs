//! Taskman Auth — password hashing, HS256 session tokens, token
//! validation and role/ownership access decisions.

pub mod access;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod tasks;
pub mod token;

pub use access::{Decision, DenyReason, Policy, authorize};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use service::{AuthService, LoginOutput, RegisterInput, UpdateAccountInput};
pub use tasks::{CreateTaskInput, TaskService};
pub use token::SessionClaims;
