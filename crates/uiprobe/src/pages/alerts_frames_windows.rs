//! The "Alerts, Frame & Windows" group.

use async_trait::async_trait;
use std::time::Duration;

use crate::dialog::{Dialog, DialogRecorder, DialogResponse};
use crate::locator::{FrameLocator, Locator};
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};

// ============================================================================
// Browser Windows
// ============================================================================

/// `/browser-windows`
#[derive(Debug, Clone)]
pub struct BrowserWindowsPage<'p> {
    page: &'p Page,
    /// Opens `/sample` in a new tab
    pub new_tab: Locator,
    /// Opens `/sample` in a new window
    pub new_window: Locator,
    /// Opens a message-only window
    pub new_window_message: Locator,
}

impl<'p> BrowserWindowsPage<'p> {
    /// Browser windows page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            new_tab: Locator::role("button").name("New Tab").exact(),
            new_window: Locator::role("button").name("New Window").exact(),
            new_window_message: Locator::role("button").name("New Window Message"),
        }
    }

    async fn open_with(&self, trigger: &Locator) -> ProbeResult<Page> {
        // registered before the click so the popup event cannot be missed
        let popup = self.page.expect_popup();
        self.page.click(trigger).await?;
        popup.wait().await
    }

    /// Click "New Tab" and return the opened page
    pub async fn open_new_tab(&self) -> ProbeResult<Page> {
        self.open_with(&self.new_tab).await
    }

    /// Click "New Window" and return the opened page
    pub async fn open_new_window(&self) -> ProbeResult<Page> {
        self.open_with(&self.new_window).await
    }

    /// Click "New Window Message" and return the opened page
    pub async fn open_message_window(&self) -> ProbeResult<Page> {
        self.open_with(&self.new_window_message).await
    }
}

#[async_trait]
impl PageObject for BrowserWindowsPage<'_> {
    fn path(&self) -> &str {
        "/browser-windows"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Alerts
// ============================================================================

/// `/alerts`
#[derive(Debug, Clone)]
pub struct AlertsPage<'p> {
    page: &'p Page,
    /// Immediate alert
    pub alert_button: Locator,
    /// Alert after a five second timer
    pub timer_alert_button: Locator,
    /// Confirm box
    pub confirm_button: Locator,
    /// Prompt box
    pub prompt_button: Locator,
    /// Outcome of the confirm box
    pub confirm_result: Locator,
    /// Outcome of the prompt box
    pub prompt_result: Locator,
}

impl<'p> AlertsPage<'p> {
    /// Alerts page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            alert_button: Locator::css("#alertButton"),
            timer_alert_button: Locator::css("#timerAlertButton"),
            confirm_button: Locator::css("#confirmButton"),
            prompt_button: Locator::css("#promtButton"),
            confirm_result: Locator::css("#confirmResult"),
            prompt_result: Locator::css("#promptResult"),
        }
    }

    /// Click `trigger` with `response` as the answer to whatever dialog it
    /// raises; returns the dialog
    pub async fn answer(&self, trigger: &Locator, response: DialogResponse) -> ProbeResult<Dialog> {
        let recorder = DialogRecorder::new(move |_: &Dialog| response.clone());
        let waiter = self.page.expect_dialog();
        self.page
            .with_dialog_handler(recorder.clone(), async {
                self.page.click(trigger).await?;
                waiter.wait().await
            })
            .await?;
        recorder
            .last()
            .map(|handled| handled.dialog)
            .ok_or_else(|| ProbeError::driver("dialog event without a recorded dialog"))
    }

    /// Click the timer button, accept the alert and report how long it took
    /// to appear, measured from the click
    pub async fn timed_alert(&self) -> ProbeResult<(Dialog, Duration)> {
        let recorder = DialogRecorder::accepting();
        let timeout_ms = 10_000;
        let waiter = self.page.expect_dialog().with_timeout(timeout_ms);
        let payload = self
            .page
            .with_dialog_handler(recorder.clone(), async {
                self.page.click(&self.timer_alert_button).await?;
                let clicked = tokio::time::Instant::now();
                let payload = waiter.wait().await?;
                Ok::<_, ProbeError>((payload, clicked))
            })
            .await;
        let (payload, clicked) = payload?;
        let event = payload
            .dialog()
            .ok_or_else(|| ProbeError::driver("dialog waiter resolved without a dialog"))?;
        let elapsed = payload.fired_at.saturating_duration_since(clicked);
        Ok((event.dialog.clone(), elapsed))
    }
}

#[async_trait]
impl PageObject for AlertsPage<'_> {
    fn path(&self) -> &str {
        "/alerts"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Frames
// ============================================================================

/// `/frames`
#[derive(Debug, Clone)]
pub struct FramesPage<'p> {
    page: &'p Page,
}

impl<'p> FramesPage<'p> {
    /// Frames page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// The iframe element with `id`
    #[must_use]
    pub fn frame_element(&self, id: &str) -> Locator {
        Locator::css(format!("#{id}"))
    }

    /// Body of the document inside the iframe with `id`
    #[must_use]
    pub fn frame_body(&self, id: &str) -> Locator {
        self.page.frame_locator(&format!("#{id}")).css("body")
    }

    /// Declared `(width, height)` attributes of an iframe
    pub async fn frame_size(&self, id: &str) -> ProbeResult<(Option<String>, Option<String>)> {
        let frame = self.frame_element(id);
        let width = self.page.attribute(&frame, "width").await?;
        let height = self.page.attribute(&frame, "height").await?;
        Ok((width, height))
    }
}

#[async_trait]
impl PageObject for FramesPage<'_> {
    fn path(&self) -> &str {
        "/frames"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

/// `/nestedframes`
#[derive(Debug, Clone)]
pub struct NestedFramesPage<'p> {
    page: &'p Page,
    /// The outer frame
    pub parent: FrameLocator,
}

impl<'p> NestedFramesPage<'p> {
    /// Nested frames page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            parent: page.frame_locator("#frame1"),
        }
    }

    /// Body of the outer frame
    #[must_use]
    pub fn parent_body(&self) -> Locator {
        self.parent.css("body")
    }

    /// Body of the frame nested inside the outer one
    #[must_use]
    pub fn child_body(&self) -> Locator {
        self.parent.frame("iframe").css("body")
    }
}

#[async_trait]
impl PageObject for NestedFramesPage<'_> {
    fn path(&self) -> &str {
        "/nestedframes"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Modal Dialogs
// ============================================================================

/// The two modals of `/modal-dialogs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalSize {
    /// "Small modal"
    Small,
    /// "Large modal"
    Large,
}

impl ModalSize {
    const fn button_name(self) -> &'static str {
        match self {
            Self::Small => "Small modal",
            Self::Large => "Large modal",
        }
    }

    const fn close_id(self) -> &'static str {
        match self {
            Self::Small => "#closeSmallModal",
            Self::Large => "#closeLargeModal",
        }
    }

    /// Start of the modal body text
    #[must_use]
    pub const fn body_text(self) -> &'static str {
        match self {
            Self::Small => "This is a small modal. It has",
            Self::Large => "Lorem Ipsum is simply dummy",
        }
    }
}

/// `/modal-dialogs`
#[derive(Debug, Clone)]
pub struct ModalDialogsPage<'p> {
    page: &'p Page,
}

impl<'p> ModalDialogsPage<'p> {
    /// Modal dialogs page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Button that opens a modal
    #[must_use]
    pub fn open_button(&self, size: ModalSize) -> Locator {
        Locator::role("button").name(size.button_name())
    }

    /// Body text of a modal
    #[must_use]
    pub fn body(&self, size: ModalSize) -> Locator {
        Locator::text(size.body_text())
    }

    /// Close button of a modal
    #[must_use]
    pub fn close_button(&self, size: ModalSize) -> Locator {
        Locator::css(size.close_id())
    }

    /// Open a modal
    pub async fn open_modal(&self, size: ModalSize) -> ProbeResult<()> {
        self.page.click(&self.open_button(size)).await
    }

    /// Close a modal
    pub async fn close_modal(&self, size: ModalSize) -> ProbeResult<()> {
        self.page.click(&self.close_button(size)).await
    }
}

#[async_trait]
impl PageObject for ModalDialogsPage<'_> {
    fn path(&self) -> &str {
        "/modal-dialogs"
    }

    fn page(&self) -> &Page {
        self.page
    }
}
