//! C7 Task Scheduler: translates schedule definitions into cron expressions
//! or flat intervals, keeps a Redis-backed recurring store in sync with the
//! Postgres schedule table, and dispatches `IMMEDIATE` schedules directly.

pub mod error;
pub mod service;
pub mod store;
pub mod translate;

pub use error::{SchedulerError, SchedulerResult};
pub use service::SchedulerService;
pub use store::{RecurringEntry, RecurringStore};
pub use translate::{materialize, parse_frequency_unit, MaterializedSchedule};
