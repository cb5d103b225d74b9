//! Keyed task/result store for clustering runs.
//!
//! Callers that process uploads off the request path create a task, hand
//! its id out for polling, run the pipeline, and record the terminal
//! outcome. A task transitions exactly once from `Processing` to either
//! `Completed` or `Failed`; results live only for the process lifetime.
//!
//! # Example
//!
//! ```
//! use cohorts::pipeline::{ClusterPipeline, PipelineConfig, Verbosity};
//! use cohorts::tasks::{TaskStatus, TaskStore};
//!
//! let store = TaskStore::new();
//! let task = store.create();
//! assert_eq!(store.status(&task).unwrap(), TaskStatus::Processing);
//!
//! let pipeline = ClusterPipeline::new(PipelineConfig {
//!     n_clusters: 2,
//!     verbosity: Verbosity::Silent,
//!     ..Default::default()
//! });
//! store.run_pipeline(&task, &pipeline, b"name,age\nAlice,20\nBob,45\n");
//!
//! assert_eq!(store.status(&task).unwrap(), TaskStatus::Completed);
//! assert!(store.result(&task).unwrap().is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use uuid::Uuid;

use crate::pipeline::{ClusterPipeline, ClusterResult};

/// Opaque, collision-resistant task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh identifier (UUID v4, compact hex form).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Poll-friendly task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task {0} already reached a terminal state")]
    AlreadyTerminal(String),
}

#[derive(Debug, Clone)]
enum TaskState {
    Processing,
    Completed(ClusterResult),
    Failed(String),
}

impl TaskState {
    fn status(&self) -> TaskStatus {
        match self {
            TaskState::Processing => TaskStatus::Processing,
            TaskState::Completed(_) => TaskStatus::Completed,
            TaskState::Failed(_) => TaskStatus::Failed,
        }
    }
}

/// Concurrency-safe keyed store with single-writer-per-key semantics.
///
/// Each identifier transitions exactly once from `Processing` to a terminal
/// state; a second terminal write is rejected rather than overwriting.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Mutex<HashMap<TaskId, TaskState>>,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task in the `Processing` state and return its id.
    pub fn create(&self) -> TaskId {
        let id = TaskId::generate();
        self.lock().insert(id.clone(), TaskState::Processing);
        id
    }

    /// Record a successful run.
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownTask`] for ids never created here;
    /// [`TaskError::AlreadyTerminal`] if the task already completed or
    /// failed.
    pub fn complete(&self, id: &TaskId, result: ClusterResult) -> Result<(), TaskError> {
        self.transition(id, TaskState::Completed(result))
    }

    /// Record a failed run with its terminal error message.
    pub fn fail(&self, id: &TaskId, message: impl Into<String>) -> Result<(), TaskError> {
        self.transition(id, TaskState::Failed(message.into()))
    }

    /// Current status of a task.
    pub fn status(&self, id: &TaskId) -> Result<TaskStatus, TaskError> {
        self.lock()
            .get(id)
            .map(TaskState::status)
            .ok_or_else(|| TaskError::UnknownTask(id.to_string()))
    }

    /// The result of a completed task; `None` while processing or failed.
    pub fn result(&self, id: &TaskId) -> Result<Option<ClusterResult>, TaskError> {
        let tasks = self.lock();
        let state = tasks
            .get(id)
            .ok_or_else(|| TaskError::UnknownTask(id.to_string()))?;
        Ok(match state {
            TaskState::Completed(result) => Some(result.clone()),
            _ => None,
        })
    }

    /// The error message of a failed task; `None` otherwise.
    pub fn error_message(&self, id: &TaskId) -> Result<Option<String>, TaskError> {
        let tasks = self.lock();
        let state = tasks
            .get(id)
            .ok_or_else(|| TaskError::UnknownTask(id.to_string()))?;
        Ok(match state {
            TaskState::Failed(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Run a pipeline over raw CSV bytes and record the terminal outcome
    /// under `id`.
    ///
    /// Any pipeline failure becomes the task's failure message; the run
    /// itself never panics the store. Returns the recorded status.
    pub fn run_pipeline(
        &self,
        id: &TaskId,
        pipeline: &ClusterPipeline,
        bytes: &[u8],
    ) -> TaskStatus {
        match pipeline.run_csv(bytes) {
            Ok(result) => {
                let _ = self.complete(id, result);
                TaskStatus::Completed
            }
            Err(error) => {
                let _ = self.fail(id, error.to_string());
                TaskStatus::Failed
            }
        }
    }

    fn transition(&self, id: &TaskId, next: TaskState) -> Result<(), TaskError> {
        let mut tasks = self.lock();
        let state = tasks
            .get_mut(id)
            .ok_or_else(|| TaskError::UnknownTask(id.to_string()))?;
        match state {
            TaskState::Processing => {
                *state = next;
                Ok(())
            }
            _ => Err(TaskError::AlreadyTerminal(id.to_string())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TaskId, TaskState>> {
        self.tasks.lock().expect("task store mutex poisoned")
    }
}
