use std::sync::Arc;

use axum::extract::FromRef;
use workflow_engine::ExecutorRegistry;
use workflow_scheduler::SchedulerService;
use workflow_storage::Database;

use crate::auth::JwtSecret;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub registry: Arc<ExecutorRegistry>,
    pub scheduler: Arc<SchedulerService>,
    pub jwt_secret: JwtSecret,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
