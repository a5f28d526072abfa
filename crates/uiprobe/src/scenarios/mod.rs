//! Named scenario catalogue for the demoqa practice site.
//!
//! Groups mirror the site's sidebar sections. Every group carries a
//! [`SectionFixture`](crate::fixture::SectionFixture) that lands on
//! `/elements` and opens its section through the sidebar, the way a visitor
//! would; the practice form is opened by path.

pub mod alerts_frames_windows;
pub mod elements;
pub mod forms;
pub mod interactions;
pub mod widgets;

use crate::config::HarnessConfig;
use crate::harness::{ScenarioGroup, Suite};

/// Name of the full catalogue
pub const SUITE_NAME: &str = "demoqa";

/// Every scenario group, in sidebar order
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    let mut groups = elements::groups();
    groups.extend(forms::groups());
    groups.extend(alerts_frames_windows::groups());
    groups.extend(widgets::groups());
    groups.extend(interactions::groups());
    groups
}

/// The full catalogue bound to `config`
#[must_use]
pub fn suite(config: HarnessConfig) -> Suite {
    groups()
        .into_iter()
        .fold(Suite::new(SUITE_NAME, config), Suite::group)
}
