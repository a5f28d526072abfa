//! Scenario fixtures.
//!
//! A fixture prepares a fresh page before a scenario runs and cleans up
//! after it. Fixtures are registered on a scenario group; the harness sets
//! them up in priority order (highest first) and tears them down in
//! reverse.

use async_trait::async_trait;

use crate::page::Page;
use crate::pages::Sidebar;
use crate::result::{ProbeError, ProbeResult};

/// Setup and teardown around every scenario of a group
#[async_trait]
pub trait Fixture: Send + Sync {
    /// Prepare `page` before the scenario body runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the page could not be brought into the expected
    /// state; the scenario is then reported as failed without running.
    async fn setup(&self, page: &Page) -> ProbeResult<()>;

    /// Clean up after the scenario body, whatever its outcome
    async fn teardown(&self, _page: &Page) -> ProbeResult<()> {
        Ok(())
    }

    /// Name for logs and reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Higher priorities are set up first and torn down last
    fn priority(&self) -> i32 {
        0
    }
}

/// Lifecycle of a fixture within one scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Not set up yet
    Registered,
    /// Setup succeeded
    SetUp,
    /// Teardown ran
    TornDown,
    /// Setup failed
    Failed,
}

/// Open a section the way a visitor does: land on `/elements`, then use the
/// sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFixture {
    group: String,
    item: String,
    name: String,
}

impl SectionFixture {
    /// Fixture for sidebar entry `item` of `group`
    #[must_use]
    pub fn new(group: impl Into<String>, item: impl Into<String>) -> Self {
        let group = group.into();
        let item = item.into();
        let name = format!("{group} > {item}");
        Self { group, item, name }
    }

    /// Sidebar group
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Sidebar entry
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }
}

#[async_trait]
impl Fixture for SectionFixture {
    async fn setup(&self, page: &Page) -> ProbeResult<()> {
        page.goto("/elements").await?;
        Sidebar::new(page)
            .open(&self.group, &self.item)
            .await
            .map_err(|err| ProbeError::Fixture {
                message: format!("{}: {err}", self.name),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Navigate straight to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFixture {
    path: String,
}

impl PathFixture {
    /// Fixture that opens `path`
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Fixture for PathFixture {
    async fn setup(&self, page: &Page) -> ProbeResult<()> {
        page.goto(&self.path).await
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn priority(&self) -> i32 {
        // navigation has to happen before anything that inspects the page
        100
    }
}
