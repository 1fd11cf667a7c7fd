//! Stop-Condition Gate
//!
//! Both policies answer the same question before every probe: keep going or stop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::director::TaskStatus;
use crate::error::Result;

#[async_trait]
pub trait StopCondition: Send {
    /// Whether another probe should be issued.
    async fn should_continue(&mut self) -> Result<bool>;

    /// Informs the gate that the engine slept for `slept`.
    fn waited(&mut self, _slept: Duration) {}
}

/// Runs for a fixed budget split into interval-sized slots. Elapsed time only counts the
/// intervals slept, so `floor(budget / interval)` probes are issued regardless of probe
/// latency.
#[derive(Debug)]
pub struct DurationLimit {
    budget: Duration,
    interval: Duration,
    elapsed: Duration,
}

impl DurationLimit {
    pub fn new(budget: Duration, interval: Duration) -> Self {
        DurationLimit {
            budget,
            interval,
            elapsed: Duration::ZERO,
        }
    }
}

#[async_trait]
impl StopCondition for DurationLimit {
    async fn should_continue(&mut self) -> Result<bool> {
        Ok(self.elapsed + self.interval <= self.budget)
    }

    fn waited(&mut self, slept: Duration) {
        self.elapsed += slept;
    }
}

/// Runs while the external task reports a non-zero id.
pub struct TaskActive {
    task: String,
    status: Arc<dyn TaskStatus>,
}

impl TaskActive {
    pub fn new(task: impl Into<String>, status: Arc<dyn TaskStatus>) -> Self {
        TaskActive {
            task: task.into(),
            status,
        }
    }
}

#[async_trait]
impl StopCondition for TaskActive {
    async fn should_continue(&mut self) -> Result<bool> {
        let id = self.status.current_task_id(&self.task).await?;
        if id == 0 {
            tracing::info!(task = %self.task, "task no longer active");
        }
        Ok(id != 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;

    struct Countdown(AtomicUsize);

    #[async_trait]
    impl TaskStatus for Countdown {
        async fn current_task_id(&self, _task: &str) -> Result<u64> {
            let left = self.0.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(0);
            }
            self.0.store(left - 1, Ordering::SeqCst);
            Ok(111)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TaskStatus for Unreachable {
        async fn current_task_id(&self, task: &str) -> Result<u64> {
            Err(Error::TaskStatus {
                task: task.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    async fn count_slots(gate: &mut dyn StopCondition, interval: Duration) -> usize {
        let mut slots = 0;
        while gate.should_continue().await.unwrap() {
            slots += 1;
            gate.waited(interval);
        }
        slots
    }

    #[tokio::test]
    async fn test_duration_slots() {
        let interval = Duration::from_millis(5);
        for (budget_ms, expected) in [(102, 20), (100, 20), (4, 0), (0, 0), (5, 1)] {
            let mut gate = DurationLimit::new(Duration::from_millis(budget_ms), interval);
            assert_eq!(count_slots(&mut gate, interval).await, expected, "budget {budget_ms}ms");
        }
    }

    #[tokio::test]
    async fn test_task_active_until_zero() {
        let mut gate = TaskActive::new("111", Arc::new(Countdown(AtomicUsize::new(4))));
        assert_eq!(count_slots(&mut gate, Duration::from_millis(5)).await, 4);
    }

    #[tokio::test]
    async fn test_task_error_propagates() {
        let mut gate = TaskActive::new("111", Arc::new(Unreachable));
        let err = gate.should_continue().await.unwrap_err();
        assert!(err.to_string().contains("111"));
    }
}
