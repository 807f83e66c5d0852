//! C1 Executor Registry: dispatches a task's declared `executor` kind to the
//! code that actually runs it. An executor never propagates an error across
//! the trait boundary — whatever goes wrong is folded into `ExecutorOutcome.error`
//! so a single misbehaving task cannot unwind the traversal loop.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use workflow_contracts::ExecutorKind;

/// What came back from running a task: either a JSON result, or an error
/// message describing why there wasn't one.
#[derive(Debug, Clone, Default)]
pub struct ExecutorOutcome {
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ExecutorOutcome {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Something that knows how to run one kind of task.
#[async_trait]
pub trait Executor: Send + Sync {
    /// `target` is the task's `target` column (script path, procedure name,
    /// or URL); `context` is the merged inputs the task is invoked with.
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome;
}

/// Runs a Python script as a subprocess, passing the context as a single
/// JSON argument and parsing stdout as the result.
pub struct PythonExecutor {
    pub interpreter: String,
}

impl Default for PythonExecutor {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }
}

#[async_trait]
impl Executor for PythonExecutor {
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome {
        let context_json = context.to_string();
        let output = Command::new(&self.interpreter)
            .arg(target)
            .arg(&context_json)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => parse_stdout(&output.stdout),
            Ok(output) => ExecutorOutcome::failed(String::from_utf8_lossy(&output.stderr).into_owned()),
            Err(e) => ExecutorOutcome::failed(e.to_string()),
        }
    }
}

/// Runs a shell command, substituting `target` verbatim. The context is
/// exposed to the script via the `WORKFLOW_CONTEXT` environment variable.
pub struct BashExecutor;

#[async_trait]
impl Executor for BashExecutor {
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome {
        let output = Command::new("bash")
            .arg("-c")
            .arg(target)
            .env("WORKFLOW_CONTEXT", context.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => parse_stdout(&output.stdout),
            Ok(output) => ExecutorOutcome::failed(String::from_utf8_lossy(&output.stderr).into_owned()),
            Err(e) => ExecutorOutcome::failed(e.to_string()),
        }
    }
}

/// Invokes a Postgres stored procedure (`CALL target(...)`) against the
/// engine's own pool, wrapping the context as a single JSONB argument.
pub struct StoredProcedureExecutor {
    pub pool: sqlx::PgPool,
}

#[async_trait]
impl Executor for StoredProcedureExecutor {
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome {
        let sql = format!("CALL {target}($1)");
        match sqlx::query(&sql).bind(context).execute(&self.pool).await {
            Ok(_) => ExecutorOutcome::ok(Value::Null),
            Err(e) => ExecutorOutcome::failed(e.to_string()),
        }
    }
}

/// Invokes a Postgres stored function (`SELECT target(...)`), treating the
/// single returned column as the JSON result.
pub struct StoredFunctionExecutor {
    pub pool: sqlx::PgPool,
}

#[async_trait]
impl Executor for StoredFunctionExecutor {
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome {
        let sql = format!("SELECT {target}($1) AS result");
        match sqlx::query_scalar::<_, Value>(&sql)
            .bind(context)
            .fetch_one(&self.pool)
            .await
        {
            Ok(result) => ExecutorOutcome::ok(result),
            Err(e) => ExecutorOutcome::failed(e.to_string()),
        }
    }
}

/// POSTs the context as JSON to `target` and parses the response body as JSON.
pub struct HttpExecutor {
    pub client: reqwest::Client,
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn invoke(&self, target: &str, context: &Value) -> ExecutorOutcome {
        let response = self.client.post(target).json(context).send().await;
        match response {
            Ok(response) if response.status().is_success() => match response.json::<Value>().await {
                Ok(body) => ExecutorOutcome::ok(body),
                Err(e) => ExecutorOutcome::failed(e.to_string()),
            },
            Ok(response) => ExecutorOutcome::failed(format!("http status {}", response.status())),
            Err(e) => ExecutorOutcome::failed(e.to_string()),
        }
    }
}

fn parse_stdout(bytes: &[u8]) -> ExecutorOutcome {
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => ExecutorOutcome::ok(value),
        Err(_) if text.trim().is_empty() => ExecutorOutcome::ok(Value::Null),
        Err(e) => ExecutorOutcome::failed(format!("could not parse output as JSON: {e}")),
    }
}

/// Maps an [`ExecutorKind`] to the code that runs it.
pub struct ExecutorRegistry {
    executors: HashMap<String, Box<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: ExecutorKind, executor: Box<dyn Executor>) {
        self.executors.insert(kind.to_string(), executor);
    }

    pub fn get(&self, kind: &str) -> Option<&dyn Executor> {
        self.executors.get(kind).map(|b| b.as_ref())
    }

    /// Registers python and bash executors, which need no external
    /// connection. Callers that need database-backed or HTTP executors
    /// register them separately once a `PgPool`/`reqwest::Client` exists.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ExecutorKind::Python, Box::new(PythonExecutor::default()));
        registry.register(ExecutorKind::Bash, Box::new(BashExecutor));
        registry.register(ExecutorKind::Http, Box::new(HttpExecutor::default()));
        registry
    }

    pub fn with_database(pool: sqlx::PgPool) -> Self {
        let mut registry = Self::with_defaults();
        registry.register(
            ExecutorKind::StoredProcedure,
            Box::new(StoredProcedureExecutor { pool: pool.clone() }),
        );
        registry.register(ExecutorKind::StoredFunction, Box::new(StoredFunctionExecutor { pool }));
        registry
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bash_executor_runs_and_captures_json_stdout() {
        let executor = BashExecutor;
        let outcome = executor.invoke("echo '{\"ok\": true}'", &Value::Null).await;
        assert_eq!(outcome.result, Some(serde_json::json!({"ok": true})));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn bash_executor_reports_failure_without_panicking() {
        let executor = BashExecutor;
        let outcome = executor.invoke("exit 1", &Value::Null).await;
        assert!(outcome.result.is_none());
        assert!(outcome.error.is_some());
    }

    #[test]
    fn registry_resolves_by_executor_kind_string() {
        let registry = ExecutorRegistry::with_defaults();
        assert!(registry.get("python").is_some());
        assert!(registry.get("bash").is_some());
        assert!(registry.get("http").is_some());
        assert!(registry.get("stored_procedure").is_none());
    }
}
