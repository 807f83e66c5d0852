//! Postgres persistence for the workflow orchestrator. One `Database` handle,
//! with repository methods grouped by entity across several modules.

pub mod db;
pub mod error;
pub mod execution_store;
pub mod models;
pub mod node_type_store;
pub mod schedule_store;
pub mod task_store;
pub mod workflow_store;

pub use db::Database;
pub use error::{StoreError, StoreResult};
