//! Probing Engine
//!
//! Drives one recording run through `Idle → Probing ⇄ WaitingInterval → Stopped`:
//! probe, append the record, sleep for the interval, ask the stop condition, repeat.
//! Everything happens in sequence on the calling task, so probes never overlap.

pub mod gate;

use std::sync::Arc;

use reqwest::Client;
use tokio::time::sleep;

use crate::annotate::annotate;
use crate::config::model::{Opts, StopPolicy};
use crate::director::{DeploymentTimes, TaskStatus};
use crate::error::{Error, Result};
use crate::http_probe::prelude::{build_client, probe_url};
use crate::recorder::LogRecorder;
use gate::{DurationLimit, StopCondition, TaskActive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Probing,
    WaitingInterval,
    Stopped,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub probes: usize,
    pub failures: usize,
}

pub struct Prober {
    opts: Opts,
    client: Client,
    gate: Box<dyn StopCondition>,
}

impl Prober {
    /// Prepares a run. `tasks` is only consulted by the task policy and may be `None`
    /// for a fixed duration.
    pub fn new(opts: Opts, tasks: Option<Arc<dyn TaskStatus>>) -> Result<Self> {
        Self::with_client(opts, build_client()?, tasks)
    }

    pub fn with_client(
        opts: Opts,
        client: Client,
        tasks: Option<Arc<dyn TaskStatus>>,
    ) -> Result<Self> {
        let gate: Box<dyn StopCondition> = match opts.stop() {
            StopPolicy::Duration(budget) => Box::new(DurationLimit::new(*budget, opts.interval())),
            StopPolicy::Task(task) => {
                let status = tasks.ok_or_else(|| {
                    Error::Config(format!("task {task} given without a task status client"))
                })?;
                Box::new(TaskActive::new(task.clone(), status))
            }
        };

        Ok(Prober { opts, client, gate })
    }

    /// Probes until the stop condition says otherwise, writing one row per probe.
    /// Returns the first fatal error: log I/O or a failed task status query.
    pub async fn record_downtime(&mut self) -> Result<RunSummary> {
        let url = self.opts.url().clone();
        let interval = self.opts.interval();
        let mut recorder = LogRecorder::create(self.opts.output_file()).await?;
        let mut summary = RunSummary::default();
        let mut last_timestamp = i64::MIN;
        let mut state = State::Idle;

        tracing::info!(%url, ?interval, stop = ?self.opts.stop(), path = %recorder.path().display(), "recording downtime");

        while state != State::Stopped {
            state = match state {
                State::Idle => self.next_after_check().await?,
                State::Probing => {
                    let mut record = probe_url(&self.client, &url).await;
                    // Wall clock may step back; rows stay ordered.
                    record.timestamp = record.timestamp.max(last_timestamp);
                    last_timestamp = record.timestamp;

                    recorder.append(&record).await?;
                    summary.probes += 1;
                    if !record.success {
                        summary.failures += 1;
                    }
                    State::WaitingInterval
                }
                State::WaitingInterval => {
                    sleep(interval).await;
                    self.gate.waited(interval);
                    self.next_after_check().await?
                }
                State::Stopped => State::Stopped,
            };
        }

        tracing::info!(
            probes = summary.probes,
            failures = summary.failures,
            rows = recorder.rows(),
            "recording finished"
        );
        Ok(summary)
    }

    /// Annotates this run's log with deployment events.
    pub async fn annotate_with_timestamps(&self, times: &DeploymentTimes) -> Result<()> {
        annotate(self.opts.output_file(), times).await
    }

    async fn next_after_check(&mut self) -> Result<State> {
        if self.gate.should_continue().await? {
            Ok(State::Probing)
        } else {
            Ok(State::Stopped)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_task_policy_requires_client() {
        let opts = Opts::new(
            "report.csv",
            "http://localhost:54321/fake-url",
            Duration::from_millis(5),
            None,
            Some("111".into()),
        )
        .unwrap();

        let err = Prober::new(opts, None).err().expect("Must fail");
        assert!(matches!(err, Error::Config(_)));
    }
}
