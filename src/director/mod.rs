use async_trait::async_trait;

use crate::error::Result;

pub mod client;

/// Deployment-events input for the annotator: epoch seconds to the labels of the events
/// that happened at that second, in the order they occurred.
pub type DeploymentTimes = std::collections::BTreeMap<i64, Vec<String>>;

/// Source of the state of an orchestration task.
#[async_trait]
pub trait TaskStatus: Send + Sync {
    /// Returns the id of the task while it is still active, 0 once it has finished.
    async fn current_task_id(&self, task: &str) -> Result<u64>;
}
