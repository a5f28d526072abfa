//! Scenario harness: named scenarios, fixture-style groups, suite runs.
//!
//! Each scenario runs on a fresh page from a [`PageFactory`]; the group's
//! fixtures prepare the page first. After the body finishes the harness
//! closes popups the scenario left open (logging a warning) and then the
//! page itself. Scenarios run one after another.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::fixture::{Fixture, FixtureState};
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};

/// Default scenario budget
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 30_000;

/// Body of a scenario: borrows the page for the duration of the run
pub type ScenarioFn = Arc<dyn for<'a> Fn(&'a Page) -> BoxFuture<'a, ProbeResult<()>> + Send + Sync>;

/// Source of fresh pages, one per scenario
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Open a new, isolated page configured by `config`
    async fn new_page(&self, config: Arc<HarnessConfig>) -> ProbeResult<Page>;
}

/// A named scenario
#[derive(Clone)]
pub struct Scenario {
    name: String,
    timeout_ms: u64,
    body: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario.
    ///
    /// ```ignore
    /// Scenario::new("accept an alert", |page| alert_scenario(page).boxed())
    /// ```
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a Page) -> BoxFuture<'a, ProbeResult<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            body: Arc::new(body),
        }
    }

    /// Set the scenario budget
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenario budget
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Run the body on `page` within the scenario budget
    pub async fn run(&self, page: &Page) -> ProbeResult<()> {
        let limit = Duration::from_millis(self.timeout_ms);
        match tokio::time::timeout(limit, (self.body)(page)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout {
                waited_for: format!("scenario {:?}", self.name),
                timeout_ms: self.timeout_ms,
                elapsed_ms: self.timeout_ms,
                last_observed: None,
            }),
        }
    }
}

/// Scenarios sharing fixtures
#[derive(Clone)]
pub struct ScenarioGroup {
    name: String,
    fixtures: Vec<Arc<dyn Fixture>>,
    scenarios: Vec<Scenario>,
}

impl std::fmt::Debug for ScenarioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioGroup")
            .field("name", &self.name)
            .field("fixtures", &self.fixtures.iter().map(|x| x.name().to_string()).collect::<Vec<_>>())
            .field("scenarios", &self.scenarios)
            .finish()
    }
}

impl ScenarioGroup {
    /// Empty group
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixtures: Vec::new(),
            scenarios: Vec::new(),
        }
    }

    /// Run `fixture` around every scenario of the group
    #[must_use]
    pub fn with_fixture(mut self, fixture: impl Fixture + 'static) -> Self {
        self.fixtures.push(Arc::new(fixture));
        self
    }

    /// Add a scenario
    #[must_use]
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Group name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenarios in registration order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Fixtures in setup order
    fn ordered_fixtures(&self) -> Vec<Arc<dyn Fixture>> {
        let mut fixtures = self.fixtures.clone();
        // stable: equal priorities keep registration order
        fixtures.sort_by_key(|f| std::cmp::Reverse(f.priority()));
        fixtures
    }

    /// Set up fixtures, run `scenario`, tear down what was set up
    async fn execute(&self, scenario: &Scenario, page: &Page) -> ProbeResult<()> {
        let fixtures = self.ordered_fixtures();
        let mut states = vec![FixtureState::Registered; fixtures.len()];
        let mut outcome = Ok(());

        for (fixture, state) in fixtures.iter().zip(states.iter_mut()) {
            tracing::debug!(fixture = fixture.name(), "fixture setup");
            match fixture.setup(page).await {
                Ok(()) => *state = FixtureState::SetUp,
                Err(err) => {
                    *state = FixtureState::Failed;
                    outcome = Err(err);
                    break;
                }
            }
        }

        if outcome.is_ok() {
            outcome = scenario.run(page).await;
        }

        for (fixture, state) in fixtures.iter().zip(states.iter_mut()).rev() {
            if *state != FixtureState::SetUp {
                continue;
            }
            if let Err(err) = fixture.teardown(page).await {
                tracing::warn!(fixture = fixture.name(), %err, "fixture teardown failed");
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
            *state = FixtureState::TornDown;
        }
        outcome
    }
}

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Group name
    pub group: String,
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Rendered error of a failed scenario
    pub error: Option<String>,
    /// Step that failed, when the failure happened inside one
    pub failed_step: Option<String>,
    /// Number of steps recorded
    pub steps: usize,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Time spent, including fixtures and cleanup
    pub duration_ms: u64,
}

impl ScenarioResult {
    /// `group / name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} / {}", self.group, self.name)
    }
}

/// Results of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration_ms: u64,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Result of the scenario called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per failure plus a totals line
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = self
            .failures()
            .iter()
            .map(|r| {
                let step = r
                    .failed_step
                    .as_deref()
                    .map(|s| format!(" at step `{s}`"))
                    .unwrap_or_default();
                format!(
                    "FAILED {}{step}: {}",
                    r.full_name(),
                    r.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect();
        lines.push(format!(
            "{}: {} passed, {} failed, {} total in {}ms",
            self.suite_name,
            self.passed_count(),
            self.failed_count(),
            self.total(),
            self.duration_ms
        ));
        lines.join("\n")
    }
}

/// A named catalogue of scenario groups
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    config: Arc<HarnessConfig>,
    groups: Vec<ScenarioGroup>,
    fail_fast: bool,
}

impl Suite {
    /// Empty suite
    #[must_use]
    pub fn new(name: impl Into<String>, config: HarnessConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            groups: Vec::new(),
            fail_fast: false,
        }
    }

    /// Add a group
    #[must_use]
    pub fn group(mut self, group: ScenarioGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Stop at the first failing scenario
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Groups in registration order
    #[must_use]
    pub fn groups(&self) -> &[ScenarioGroup] {
        &self.groups
    }

    /// Number of scenarios across groups
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.groups.iter().map(|g| g.scenarios.len()).sum()
    }

    /// Names of every scenario, `group / name`
    #[must_use]
    pub fn scenario_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.scenarios.iter().map(move |s| format!("{} / {}", g.name, s.name)))
            .collect()
    }

    /// Run every scenario
    pub async fn run(&self, factory: &dyn PageFactory) -> SuiteResults {
        self.run_matching(factory, "").await
    }

    /// Run scenarios whose `group / name` contains `filter`
    pub async fn run_matching(&self, factory: &dyn PageFactory, filter: &str) -> SuiteResults {
        let start = Instant::now();
        let mut results = Vec::new();
        tracing::info!(suite = %self.name, scenarios = self.scenario_count(), "suite started");

        'groups: for group in &self.groups {
            for scenario in &group.scenarios {
                let full_name = format!("{} / {}", group.name, scenario.name);
                if !full_name.contains(filter) {
                    continue;
                }
                let result = self.run_one(factory, group, scenario).await;
                let failed = !result.passed;
                results.push(result);
                if failed && self.fail_fast {
                    tracing::warn!(scenario = %full_name, "stopping after first failure");
                    break 'groups;
                }
            }
        }

        let results = SuiteResults {
            suite_name: self.name.clone(),
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            suite = %self.name,
            passed = results.passed_count(),
            failed = results.failed_count(),
            duration_ms = results.duration_ms,
            "suite finished"
        );
        results
    }

    async fn run_one(
        &self,
        factory: &dyn PageFactory,
        group: &ScenarioGroup,
        scenario: &Scenario,
    ) -> ScenarioResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!(%run_id, group = %group.name, scenario = %scenario.name, "scenario started");

        let (outcome, failed_step, steps) = match factory.new_page(Arc::clone(&self.config)).await {
            Ok(page) => {
                let outcome = group.execute(scenario, &page).await;
                let outcome = match (outcome, release(&page).await) {
                    (Ok(()), Err(err)) => Err(err),
                    (outcome, _) => outcome,
                };
                let failed_step = if outcome.is_err() {
                    page.steps().failed_step().map(|s| s.description)
                } else {
                    None
                };
                (outcome, failed_step, page.steps().len())
            }
            Err(err) => (Err(err), None, 0),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => tracing::info!(%run_id, scenario = %scenario.name, duration_ms, "scenario passed"),
            Err(err) => tracing::info!(%run_id, scenario = %scenario.name, duration_ms, %err, failed_step = ?failed_step, "scenario failed"),
        }
        ScenarioResult {
            run_id,
            group: group.name.clone(),
            name: scenario.name.clone(),
            passed: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
            failed_step,
            steps,
            started_at,
            duration_ms,
        }
    }
}

/// Close leftover popups, then the page
async fn release(page: &Page) -> ProbeResult<()> {
    let leaked = page.close_popups().await?;
    if leaked > 0 {
        tracing::warn!(leaked, "scenario left popups open");
    }
    page.close().await
}
