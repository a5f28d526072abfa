//! Logging setup and per-scenario step trail.
//!
//! Interactions log through `tracing` (`debug!` per primitive, `info!` per
//! scenario, `warn!` for fixed delays, auto-dismissed dialogs and leaked
//! popups). [`init_tracing`] installs a `tracing-subscriber` fmt subscriber
//! once per process; [`StepLog`] keeps the ordered step trail of a running
//! scenario so a failure report can name the step that failed.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "UIPROBE_LOG";

/// Output format of the subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

fn env_filter(default_filter: &str) -> EnvFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

/// Install the global subscriber; later calls are no-ops.
///
/// Returns `true` when this call installed the subscriber.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(false);
    let installed = match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(filter = default_filter, ?format, "tracing initialized");
    }
    installed
}

/// Outcome of one recorded step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Still executing
    Running,
    /// Completed
    Passed,
    /// Failed with the rendered error
    Failed(String),
}

/// One recorded step
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// What the step did, e.g. `click role=button[name="Submit"i]`
    pub description: String,
    /// Status
    pub status: StepStatus,
    /// Time spent (zero while running)
    pub duration: Duration,
    started_at: Instant,
}

/// Ordered, shared step trail of one scenario
#[derive(Debug, Clone, Default)]
pub struct StepLog {
    steps: Arc<Mutex<Vec<StepRecord>>>,
}

impl StepLog {
    /// Empty trail
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a step; returns its index
    pub fn begin(&self, description: impl Into<String>) -> usize {
        let description = description.into();
        tracing::debug!(step = %description, "step");
        let Ok(mut steps) = self.steps.lock() else {
            return 0;
        };
        steps.push(StepRecord {
            description,
            status: StepStatus::Running,
            duration: Duration::ZERO,
            started_at: Instant::now(),
        });
        steps.len() - 1
    }

    /// Mark a step finished
    pub fn finish<T, E: std::fmt::Display>(&self, index: usize, outcome: &Result<T, E>) {
        if let Ok(mut steps) = self.steps.lock() {
            if let Some(step) = steps.get_mut(index) {
                step.duration = step.started_at.elapsed();
                step.status = match outcome {
                    Ok(_) => StepStatus::Passed,
                    Err(err) => StepStatus::Failed(err.to_string()),
                };
            }
        }
    }

    /// Snapshot of all steps
    #[must_use]
    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of recorded steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// No steps recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first failed step, else the last step left running
    #[must_use]
    pub fn failed_step(&self) -> Option<StepRecord> {
        let steps = self.steps();
        steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Failed(_)))
            .or_else(|| steps.iter().rev().find(|s| s.status == StepStatus::Running))
            .cloned()
    }
}
