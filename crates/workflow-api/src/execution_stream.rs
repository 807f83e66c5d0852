//! C8 Execution Stream: polls the database for new or changed execution
//! steps and relays them as Server-Sent Events, with an adaptive poll
//! cadence and a hard wall-clock timeout so a stuck client doesn't poll
//! forever.

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream};
use serde_json::json;
use uuid::Uuid;
use workflow_storage::Database;

use crate::state::AppState;

const MAX_WAIT: Duration = Duration::from_secs(3600);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

pub fn router() -> Router<AppState> {
    Router::new().route("/executions/:execution_id/stream", get(stream_execution))
}

struct PollState {
    db: Database,
    execution_id: Uuid,
    last_statuses: HashMap<Uuid, String>,
    started_at: Instant,
    last_heartbeat: Option<Instant>,
    next_event_id: u64,
    done: bool,
}

/// Every event on the stream carries a monotonically increasing id, not
/// just `step`s, so a client reconnecting with `Last-Event-ID` can resume
/// after any event type.
fn next_event(poll_state: &mut PollState, kind: &'static str, data: String) -> Event {
    poll_state.next_event_id += 1;
    Event::default().event(kind).id(poll_state.next_event_id.to_string()).data(data)
}

fn poll_interval(elapsed: Duration) -> Duration {
    if elapsed < Duration::from_secs(60) {
        Duration::from_secs(1)
    } else if elapsed < Duration::from_secs(300) {
        Duration::from_secs(2)
    } else {
        Duration::from_secs(5)
    }
}

#[utoipa::path(get, path = "/executions/{execution_id}/stream", responses((status = 200)))]
pub(crate) async fn stream_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let initial = PollState {
        db: state.db.clone(),
        execution_id,
        last_statuses: HashMap::new(),
        started_at: Instant::now(),
        last_heartbeat: None,
        next_event_id: 0,
        done: false,
    };

    let stream = stream::unfold(initial, |mut poll_state| async move {
        if poll_state.done {
            return None;
        }

        loop {
            let elapsed = poll_state.started_at.elapsed();
            if elapsed > MAX_WAIT {
                poll_state.done = true;
                let event = next_event(&mut poll_state, "timeout", "execution stream timed out".to_string());
                return Some((Ok(event), poll_state));
            }

            tokio::time::sleep(poll_interval(elapsed)).await;

            let execution = match poll_state.db.get_execution(poll_state.execution_id).await {
                Ok(Some(execution)) => execution,
                Ok(None) => {
                    poll_state.done = true;
                    let event = next_event(&mut poll_state, "error", "execution not found".to_string());
                    return Some((Ok(event), poll_state));
                }
                Err(e) => {
                    let event = next_event(&mut poll_state, "error", e.to_string());
                    return Some((Ok(event), poll_state));
                }
            };

            let steps = match poll_state.db.list_execution_steps(poll_state.execution_id).await {
                Ok(steps) => steps,
                Err(e) => {
                    let event = next_event(&mut poll_state, "error", e.to_string());
                    return Some((Ok(event), poll_state));
                }
            };

            let mut changed_step = None;
            for step in &steps {
                let changed = poll_state
                    .last_statuses
                    .get(&step.step_id)
                    .map(|s| s != &step.status)
                    .unwrap_or(true);
                if changed {
                    poll_state.last_statuses.insert(step.step_id, step.status.clone());
                    changed_step = Some(json!({
                        "step_id": step.step_id,
                        "node_id": step.node_id,
                        "task_name": step.task_name,
                        "status": step.status,
                        "output": step.output,
                        "error": step.error,
                    }));
                    break;
                }
            }
            if let Some(payload) = changed_step {
                let event = next_event(&mut poll_state, "step", payload.to_string());
                return Some((Ok(event), poll_state));
            }

            if execution.status != "RUNNING" {
                poll_state.done = true;
                let payload = json!({"status": execution.status, "error": execution.error});
                let event = next_event(&mut poll_state, "complete", payload.to_string());
                return Some((Ok(event), poll_state));
            }

            let due_for_heartbeat = poll_state
                .last_heartbeat
                .map(|last| last.elapsed() >= HEARTBEAT_INTERVAL)
                .unwrap_or(true);
            if due_for_heartbeat {
                poll_state.last_heartbeat = Some(Instant::now());
                let event = next_event(&mut poll_state, "heartbeat", String::new());
                return Some((Ok(event), poll_state));
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
