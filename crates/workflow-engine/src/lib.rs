//! Graph traversal, executor dispatch, static introspection, and
//! required-parameter analysis for the workflow orchestrator.
//!
//! ```text
//! workflow-storage (rows)
//!        |
//!        v
//! workflow-engine: executor (C1) -> engine (C5) -> analyzer (C6)
//!                  introspect (C3) feeds analyzer when the catalog has
//!                  no declared parameters for a task
//! ```

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod executor;
pub mod introspect;

pub use analyzer::{analyze_required_params, build_predecessors, TaskSignature};
pub use engine::{EngineConfig, GraphIndex, RunOutcome, StepOutcome, WorkflowEngine};
pub use error::{EngineError, EngineResult};
pub use executor::{
    BashExecutor, Executor, ExecutorOutcome, ExecutorRegistry, HttpExecutor, PythonExecutor,
    StoredFunctionExecutor, StoredProcedureExecutor,
};
pub use introspect::{introspect_inputs, introspect_outputs};
