//! CLI command handlers.

pub mod check;
pub mod envs;
pub mod resolve;
pub mod schema;

pub use check::run_check;
pub use envs::run_envs;
pub use resolve::run_resolve;
pub use schema::run_schema;
