//! SurrealDB repository implementations.

mod account;
mod task;

pub use account::SurrealAccountRepository;
pub use task::SurrealTaskRepository;
