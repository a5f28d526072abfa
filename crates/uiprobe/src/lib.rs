//! uiprobe: page objects, polling assertions and dialog/popup handshakes
//! for end-to-end UI scenarios.
//!
//! Scenarios are written against [`Page`], which re-resolves [`Locator`]s on
//! every call, waits for elements to become actionable and records each
//! operation as a step. Page objects in [`pages`] wrap the screens of the
//! demoqa practice site; [`scenarios`] holds the named catalogue that
//! exercises them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      UIPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ PageDriver │            │
//! │   │ catalogue  │───►│ objects +  │───►│ chromium / │            │
//! │   │ (Suite)    │    │ expect()   │    │ sim        │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use uiprobe::prelude::*;
//!
//! # async fn run(page: &Page) -> ProbeResult<()> {
//! let alerts = AlertsPage::new(page);
//! let dialog = alerts
//!     .answer(&alerts.confirm_button, DialogResponse::Accept)
//!     .await?;
//! ensure_eq(Dialog::confirm("Do you confirm action?"), dialog)?;
//! expect(page, alerts.confirm_result.clone())
//!     .to_have_text("You selected OK")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Chromium backend over CDP
#[cfg(feature = "browser")]
pub mod chromium;

/// Harness configuration (YAML file plus environment overrides)
pub mod config;

/// Native dialogs: handshake state machine, handlers and recorder
#[allow(clippy::missing_errors_doc)]
pub mod dialog;

/// The browser-automation seam
#[allow(clippy::missing_errors_doc)]
pub mod driver;

/// Page events and one-shot waits
#[allow(clippy::missing_errors_doc)]
pub mod event;

/// Polling expectations on locators and pages
#[allow(clippy::missing_errors_doc)]
pub mod expect;

/// Upload file resolution
#[allow(clippy::missing_errors_doc)]
pub mod file_ops;

/// Scenario fixtures
#[allow(clippy::missing_errors_doc)]
pub mod fixture;

/// Scenarios, groups and the suite runner
#[allow(clippy::missing_errors_doc)]
pub mod harness;

/// Locators: immutable element descriptions
pub mod locator;

/// Tracing setup and the per-scenario step log
pub mod logging;

/// The page handle scenarios drive
#[allow(clippy::missing_errors_doc)]
pub mod page;

/// The page-object contract
#[allow(clippy::missing_errors_doc)]
pub mod page_object;

/// Page objects for the demoqa practice site
#[allow(clippy::missing_errors_doc)]
pub mod pages;

mod result;

/// The named scenario catalogue
pub mod scenarios;

/// In-memory backend for tests
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod sim;

/// Polling waits, stability holds and timing windows
#[allow(clippy::missing_errors_doc)]
pub mod wait;

#[cfg(feature = "browser")]
pub use chromium::{ChromiumDriver, ChromiumFactory, ChromiumLauncher};
pub use config::HarnessConfig;
pub use dialog::{
    AutoDialogBehavior, Dialog, DialogGuard, DialogHandler, DialogHandshake, DialogKind,
    DialogRecorder, DialogResponse, DialogState, HandledDialog,
};
pub use driver::{ElementHandle, MouseAction, MouseButton, PageDriver, Viewport};
pub use event::{
    DialogEvent, EventKind, EventPayload, EventWaiter, PageEvent, ResponseInfo, TimedEvent,
    UrlPattern,
};
pub use expect::{ensure, ensure_eq, expect, expect_page, Expectation, PageExpectation};
pub use file_ops::{guess_mime_type, FileInput, UploadDir};
pub use fixture::{Fixture, FixtureState, PathFixture, SectionFixture};
pub use harness::{
    PageFactory, Scenario, ScenarioFn, ScenarioGroup, ScenarioResult, Suite, SuiteResults,
    DEFAULT_SCENARIO_TIMEOUT_MS,
};
pub use locator::{
    normalize_text, text_matches, ClickOptions, Filter, FrameLocator, Locator, Nth, Scope,
    Selector,
};
pub use logging::{init_tracing, LogFormat, StepLog, StepRecord, StepStatus};
pub use page::{OneOrMany, Page, PopupWaiter};
pub use page_object::{PageObject, UrlMatcher};
pub use result::{ProbeError, ProbeResult};
pub use wait::{
    fixed_delay, poll, wait_for, wait_stable, wait_until, Observed, Outcome, PendingCondition,
    Polled, TimingWindow, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};

/// Everything a scenario author needs
pub mod prelude {
    pub use super::dialog::{Dialog, DialogKind, DialogRecorder, DialogResponse};
    pub use super::event::{EventKind, UrlPattern};
    pub use super::expect::{ensure, ensure_eq, expect, expect_page};
    pub use super::fixture::{Fixture, PathFixture, SectionFixture};
    pub use super::harness::{PageFactory, Scenario, ScenarioGroup, Suite, SuiteResults};
    pub use super::locator::{ClickOptions, Locator};
    pub use super::page::Page;
    pub use super::page_object::PageObject;
    pub use super::pages::*;
    pub use super::result::{ProbeError, ProbeResult};
    pub use super::wait::{TimingWindow, WaitOptions};
    pub use super::HarnessConfig;
}
