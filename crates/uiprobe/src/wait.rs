//! Wait Mechanisms
//!
//! Polling-based synchronization against live page state. A predicate is
//! evaluated immediately, then once per poll interval, until it holds or the
//! timeout elapses. Timeouts report the last observed value and the elapsed
//! time; predicate errors propagate unchanged.
//!
//! All timing goes through `tokio::time`, so tests can pause the clock and
//! assert timing windows exactly.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: every wait is bounded and fails loudly with what it last saw
//! - **Muda**: poll intervals replace fixed sleeps; [`fixed_delay`] is the
//!   documented exception

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::result::{ProbeError, ProbeResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for polling waits (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Value produced by one evaluation of a predicate
pub trait Outcome {
    /// The condition holds
    fn is_satisfied(&self) -> bool;

    /// Polling cannot succeed anymore; stop early
    fn is_terminal(&self) -> bool {
        false
    }

    /// Rendering for timeout reports
    fn describe(&self) -> String;
}

impl Outcome for bool {
    fn is_satisfied(&self) -> bool {
        *self
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Satisfaction flag plus what was actually seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    /// The condition holds
    pub satisfied: bool,
    /// Observed state, e.g. the current text
    pub detail: String,
}

impl Observed {
    /// Create an observation
    #[must_use]
    pub fn new(satisfied: bool, detail: impl Into<String>) -> Self {
        Self {
            satisfied,
            detail: detail.into(),
        }
    }
}

impl Outcome for Observed {
    fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    fn describe(&self) -> String {
        self.detail.clone()
    }
}

/// How a polling loop ended
#[derive(Debug, Clone)]
pub enum Polled<T> {
    /// The predicate held
    Satisfied {
        /// The satisfying value
        value: T,
        /// Time spent
        elapsed: Duration,
        /// Number of evaluations
        attempts: u32,
    },
    /// The predicate reported a terminal state
    Aborted {
        /// The terminal value
        value: T,
        /// Time spent
        elapsed: Duration,
    },
    /// The timeout elapsed
    TimedOut {
        /// Last value observed
        last: T,
        /// Time spent
        elapsed: Duration,
        /// Number of evaluations
        attempts: u32,
    },
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T = bool> {
    /// The satisfying value
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of evaluations
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING LOOP
// =============================================================================

/// Evaluate `predicate` until it holds, reports a terminal state, or the
/// timeout elapses. Never sleeps past the deadline.
pub async fn poll<T, F, Fut>(mut predicate: F, options: &WaitOptions) -> ProbeResult<Polled<T>>
where
    T: Outcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval().max(Duration::from_millis(1));
    let mut attempts = 0u32;

    loop {
        let value = predicate().await?;
        attempts += 1;
        let elapsed = start.elapsed();
        if value.is_satisfied() {
            return Ok(Polled::Satisfied {
                value,
                elapsed,
                attempts,
            });
        }
        if value.is_terminal() {
            return Ok(Polled::Aborted { value, elapsed });
        }
        if elapsed >= timeout {
            return Ok(Polled::TimedOut {
                last: value,
                elapsed,
                attempts,
            });
        }
        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

/// Wait until `predicate` holds; `Timeout` carries the last observed value
pub async fn wait_for<T, F, Fut>(
    description: &str,
    predicate: F,
    options: &WaitOptions,
) -> ProbeResult<WaitResult<T>>
where
    T: Outcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    match poll(predicate, options).await? {
        Polled::Satisfied {
            value,
            elapsed,
            attempts,
        } => {
            tracing::trace!(waited_for = description, elapsed_ms = elapsed.as_millis() as u64, attempts, "condition satisfied");
            Ok(WaitResult {
                value,
                elapsed,
                attempts,
                waited_for: description.to_string(),
            })
        }
        Polled::Aborted { value, .. } => Err(ProbeError::assertion(description, value.describe())),
        Polled::TimedOut { last, elapsed, .. } => Err(ProbeError::Timeout {
            waited_for: description.to_string(),
            timeout_ms: options.timeout_ms,
            elapsed_ms: elapsed.as_millis() as u64,
            last_observed: Some(last.describe()),
        }),
    }
}

/// Wait until `predicate` holds
pub async fn wait_until<T, F, Fut>(predicate: F, options: &WaitOptions) -> ProbeResult<WaitResult<T>>
where
    T: Outcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    wait_for("condition", predicate, options).await
}

/// Check that `predicate` keeps holding for `hold_ms`, sampling every poll
/// interval. Fails with `AssertionFailed` on the first sample that does not hold.
pub async fn wait_stable<T, F, Fut>(
    description: &str,
    mut predicate: F,
    hold_ms: u64,
    options: &WaitOptions,
) -> ProbeResult<WaitResult<T>>
where
    T: Outcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    let start = Instant::now();
    let hold = Duration::from_millis(hold_ms);
    let poll_interval = options.poll_interval().max(Duration::from_millis(1));
    let mut attempts = 0u32;

    loop {
        let value = predicate().await?;
        attempts += 1;
        let elapsed = start.elapsed();
        if !value.is_satisfied() {
            return Err(ProbeError::assertion(
                format!("{description} to hold for {hold_ms}ms"),
                format!("{} after {}ms", value.describe(), elapsed.as_millis()),
            ));
        }
        if elapsed >= hold {
            return Ok(WaitResult {
                value,
                elapsed,
                attempts,
                waited_for: description.to_string(),
            });
        }
        tokio::time::sleep(poll_interval.min(hold - elapsed)).await;
    }
}

/// Sleep for a fixed duration.
///
/// Flaky by nature: prefer [`wait_until`] against observable state. Every
/// call is logged at `warn`.
pub async fn fixed_delay(duration_ms: u64) {
    tracing::warn!(duration_ms, "fixed delay used instead of a polling condition");
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
}

// =============================================================================
// PENDING CONDITION
// =============================================================================

/// A described condition waiting to be polled
pub struct PendingCondition<F> {
    description: String,
    predicate: F,
    options: WaitOptions,
}

impl<F> std::fmt::Debug for PendingCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCondition")
            .field("description", &self.description)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<F, Fut, T> PendingCondition<F>
where
    T: Outcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    /// Describe a condition with default options
    pub fn new(description: impl Into<String>, predicate: F) -> Self {
        Self {
            description: description.into(),
            predicate,
            options: WaitOptions::default(),
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.options.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Replace all options
    #[must_use]
    pub fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Poll until satisfied or timed out
    pub async fn wait(self) -> ProbeResult<WaitResult<T>> {
        wait_for(&self.description, self.predicate, &self.options).await
    }

    /// Check the condition keeps holding for `hold_ms`
    pub async fn hold_for(self, hold_ms: u64) -> ProbeResult<WaitResult<T>> {
        wait_stable(&self.description, self.predicate, hold_ms, &self.options).await
    }
}

// =============================================================================
// TIMING WINDOWS
// =============================================================================

/// Half-open window `[lower, upper)` for elapsed-time assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    lower: Duration,
    upper: Duration,
}

impl TimingWindow {
    /// Window in milliseconds
    #[must_use]
    pub const fn new(lower_ms: u64, upper_ms: u64) -> Self {
        Self {
            lower: Duration::from_millis(lower_ms),
            upper: Duration::from_millis(upper_ms),
        }
    }

    /// Whether `elapsed` falls inside the window
    #[must_use]
    pub fn contains(&self, elapsed: Duration) -> bool {
        elapsed >= self.lower && elapsed < self.upper
    }

    /// Assert `elapsed` falls inside the window
    pub fn check(&self, elapsed: Duration) -> ProbeResult<()> {
        if self.contains(elapsed) {
            Ok(())
        } else {
            Err(ProbeError::assertion(
                format!(
                    "elapsed within [{}ms, {}ms)",
                    self.lower.as_millis(),
                    self.upper.as_millis()
                ),
                format!("{}ms", elapsed.as_millis()),
            ))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
