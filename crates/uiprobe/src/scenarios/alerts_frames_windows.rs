//! Alerts, Frame & Windows: popups, native dialogs, iframes and modals.

use futures::FutureExt;

use crate::dialog::{Dialog, DialogResponse};
use crate::event::UrlPattern;
use crate::expect::{ensure, ensure_eq, expect, expect_page};
use crate::fixture::SectionFixture;
use crate::harness::{Scenario, ScenarioGroup};
use crate::locator::Locator;
use crate::page::Page;
use crate::pages::{
    AlertsPage, BrowserWindowsPage, FramesPage, ModalDialogsPage, ModalSize, NestedFramesPage,
};
use crate::result::ProbeResult;
use crate::wait::TimingWindow;

const GROUP: &str = "Alerts, Frame & Windows";

/// When the timer alert may appear, measured from the click
pub const TIMER_ALERT_WINDOW: TimingWindow = TimingWindow::new(5_000, 6_000);

/// Scenario groups of the Alerts, Frame & Windows section
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![
        browser_windows(),
        alerts(),
        frames(),
        nested_frames(),
        modal_dialogs(),
    ]
}

// ============================================================================
// Browser Windows
// ============================================================================

fn browser_windows() -> ScenarioGroup {
    ScenarioGroup::new("Browser Windows")
        .with_fixture(SectionFixture::new(GROUP, "Browser Windows"))
        .scenario(Scenario::new("new tab shares the viewport", |page| {
            new_tab_shares_viewport(page).boxed()
        }))
        .scenario(Scenario::new("new window opens the sample page", |page| {
            new_window_opens_sample(page).boxed()
        }))
        .scenario(Scenario::new("message window shows its text", |page| {
            message_window_text(page).boxed()
        }))
}

async fn new_tab_shares_viewport(page: &Page) -> ProbeResult<()> {
    let windows = BrowserWindowsPage::new(page);
    let tab = windows.open_new_tab().await?;
    ensure_eq(page.viewport().await?, tab.viewport().await?)?;
    expect_page(&tab)
        .to_have_url(UrlPattern::Contains("/sample".to_string()))
        .await?;
    ensure_eq(1, page.close_popups().await?)
}

async fn new_window_opens_sample(page: &Page) -> ProbeResult<()> {
    let windows = BrowserWindowsPage::new(page);
    let window = windows.open_new_window().await?;
    expect(&window, Locator::text("This is a sample page"))
        .to_be_visible()
        .await?;
    window.close().await?;
    ensure_eq(0, page.open_popups().len())
}

async fn message_window_text(page: &Page) -> ProbeResult<()> {
    let windows = BrowserWindowsPage::new(page);
    let message = windows.open_message_window().await?;
    let content = message.content().await?;
    ensure(
        content.contains("Knowledge increases by"),
        "message window text",
        content,
    )
}

// ============================================================================
// Alerts
// ============================================================================

fn alerts() -> ScenarioGroup {
    ScenarioGroup::new("Alerts")
        .with_fixture(SectionFixture::new(GROUP, "Alerts"))
        .scenario(Scenario::new("alert is accepted", |page| {
            alert_is_accepted(page).boxed()
        }))
        .scenario(Scenario::new("timer alert appears after five seconds", |page| {
            timer_alert_is_late(page).boxed()
        }))
        .scenario(Scenario::new("confirm reports the answer", |page| {
            confirm_reports_answer(page).boxed()
        }))
        .scenario(Scenario::new("prompt echoes the entered text", |page| {
            prompt_echoes_text(page).boxed()
        }))
}

async fn alert_is_accepted(page: &Page) -> ProbeResult<()> {
    let alerts = AlertsPage::new(page);
    let dialog = alerts
        .answer(&alerts.alert_button, DialogResponse::Accept)
        .await?;
    ensure_eq(Dialog::alert("You clicked a button"), dialog)
}

async fn timer_alert_is_late(page: &Page) -> ProbeResult<()> {
    let alerts = AlertsPage::new(page);
    let (dialog, elapsed) = alerts.timed_alert().await?;
    ensure_eq(Dialog::alert("This alert appeared after 5 seconds"), dialog)?;
    TIMER_ALERT_WINDOW.check(elapsed)
}

async fn confirm_reports_answer(page: &Page) -> ProbeResult<()> {
    let alerts = AlertsPage::new(page);
    for (response, outcome) in [
        (DialogResponse::Dismiss, "You selected Cancel"),
        (DialogResponse::Accept, "You selected OK"),
    ] {
        let dialog = alerts.answer(&alerts.confirm_button, response).await?;
        ensure_eq(Dialog::confirm("Do you confirm action?"), dialog)?;
        expect(page, alerts.confirm_result.clone())
            .to_have_text(outcome)
            .await?;
    }
    Ok(())
}

async fn prompt_echoes_text(page: &Page) -> ProbeResult<()> {
    let alerts = AlertsPage::new(page);
    for text in ["Test Data", "New Test Data"] {
        let response = DialogResponse::AcceptWith(text.to_string());
        let dialog = alerts.answer(&alerts.prompt_button, response).await?;
        ensure_eq(Dialog::prompt("Please enter your name", None), dialog)?;
        expect(page, alerts.prompt_result.clone())
            .to_have_text(&format!("You entered {text}"))
            .await?;
    }

    alerts
        .answer(&alerts.prompt_button, DialogResponse::Accept)
        .await?;
    expect(page, alerts.prompt_result.clone()).to_be_hidden().await
}

// ============================================================================
// Frames
// ============================================================================

fn frames() -> ScenarioGroup {
    ScenarioGroup::new("Frames")
        .with_fixture(SectionFixture::new(GROUP, "Frames"))
        .scenario(Scenario::new("both frames load the sample page", |page| {
            frames_load_sample(page).boxed()
        }))
        .scenario(Scenario::new("small frame is 100px square", |page| {
            small_frame_size(page).boxed()
        }))
}

async fn frames_load_sample(page: &Page) -> ProbeResult<()> {
    let frames = FramesPage::new(page);
    for id in ["frame1", "frame2"] {
        expect(page, frames.frame_body(id))
            .to_contain_text("This is a sample page")
            .await?;
    }
    Ok(())
}

async fn small_frame_size(page: &Page) -> ProbeResult<()> {
    let frames = FramesPage::new(page);
    let (width, height) = frames.frame_size("frame2").await?;
    ensure_eq(Some("100px".to_string()), width)?;
    ensure_eq(Some("100px".to_string()), height)
}

fn nested_frames() -> ScenarioGroup {
    ScenarioGroup::new("Nested Frames")
        .with_fixture(SectionFixture::new(GROUP, "Nested Frames"))
        .scenario(Scenario::new("child frame sits inside the parent", |page| {
            child_inside_parent(page).boxed()
        }))
}

async fn child_inside_parent(page: &Page) -> ProbeResult<()> {
    let nested = NestedFramesPage::new(page);
    expect(page, nested.parent_body())
        .to_contain_text("Parent frame")
        .await?;
    expect(page, nested.child_body())
        .to_have_text("Child Iframe")
        .await
}

// ============================================================================
// Modal Dialogs
// ============================================================================

fn modal_dialogs() -> ScenarioGroup {
    ScenarioGroup::new("Modal Dialogs")
        .with_fixture(SectionFixture::new(GROUP, "Modal Dialogs"))
        .scenario(Scenario::new("small modal opens and closes", |page| {
            modal_round_trip(page, ModalSize::Small).boxed()
        }))
        .scenario(Scenario::new("large modal opens and closes", |page| {
            modal_round_trip(page, ModalSize::Large).boxed()
        }))
}

async fn modal_round_trip(page: &Page, size: ModalSize) -> ProbeResult<()> {
    let modals = ModalDialogsPage::new(page);
    expect(page, modals.body(size)).to_be_hidden().await?;
    modals.open_modal(size).await?;
    expect(page, modals.body(size)).to_be_visible().await?;
    modals.close_modal(size).await?;
    expect(page, modals.body(size)).to_be_hidden().await
}
