pub mod executions;
pub mod node_types;
pub mod schedules;
pub mod tasks;
pub mod workflows;
