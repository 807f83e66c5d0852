//! The recurring scheduler store: a thin Redis-backed registry of
//! materialized schedules (cron expression or flat interval), keyed by a
//! synthesized `store_schedule_name`. A real beat process would poll this
//! store; driving that poll loop is out of scope here (see spec Non-goals).

use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Pool, Runtime};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerResult;
use crate::translate::MaterializedSchedule;

const KEY_PREFIX: &str = "workflow:schedule:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringEntry {
    pub task_name: String,
    pub cron_expression: Option<String>,
    pub interval_minutes: Option<i64>,
    pub parameters: serde_json::Value,
}

impl RecurringEntry {
    pub fn from_materialized(
        task_name: String,
        materialized: &MaterializedSchedule,
        parameters: serde_json::Value,
    ) -> Option<Self> {
        match materialized {
            MaterializedSchedule::Cron(expr) => Some(Self {
                task_name,
                cron_expression: Some(expr.clone()),
                interval_minutes: None,
                parameters,
            }),
            MaterializedSchedule::IntervalMinutes(minutes) => Some(Self {
                task_name,
                cron_expression: None,
                interval_minutes: Some(*minutes),
                parameters,
            }),
            MaterializedSchedule::None => None,
        }
    }
}

#[derive(Clone)]
pub struct RecurringStore {
    pool: Pool,
}

impl RecurringStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_url(redis_url: &str) -> SchedulerResult<Self> {
        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| crate::error::SchedulerError::RedisStore(e.to_string()))?;
        Ok(Self { pool })
    }

    fn key(name: &str) -> String {
        format!("{KEY_PREFIX}{name}")
    }

    #[tracing::instrument(skip(self, entry))]
    pub async fn put(&self, name: &str, entry: &RecurringEntry) -> SchedulerResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| crate::error::SchedulerError::RedisStore(e.to_string()))?;
        let payload = serde_json::to_string(entry)?;
        let _: () = conn.set(Self::key(name), payload).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, name: &str) -> SchedulerResult<Option<RecurringEntry>> {
        let mut conn = self.pool.get().await.map_err(|e| crate::error::SchedulerError::RedisStore(e.to_string()))?;
        let payload: Option<String> = conn.get(Self::key(name)).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> SchedulerResult<()> {
        let mut conn = self.pool.get().await.map_err(|e| crate::error::SchedulerError::RedisStore(e.to_string()))?;
        let _: () = conn.del(Self::key(name)).await?;
        Ok(())
    }
}

impl From<serde_json::Error> for crate::error::SchedulerError {
    fn from(e: serde_json::Error) -> Self {
        crate::error::SchedulerError::RedisStore(e.to_string())
    }
}
