//! Page: a scenario's handle on one browser page.
//!
//! `Page` turns the thin [`PageDriver`] primitives into the operations page
//! objects are written against:
//!
//! - **Resolution**: locators are re-resolved on every call, never cached
//! - **Actionability**: single-target interactions poll until exactly one
//!   matching element is visible (and enabled, for clicks)
//! - **Strictness**: more than one match where one is required fails at once
//!   with `NotFound { matched: n }`
//! - **Dialogs**: handlers are scoped ([`Page::on_dialog`],
//!   [`Page::with_dialog_handler`]); a dialog nobody handled fails the next
//!   operation with `UnhandledDialog`
//! - **Popups**: pages opened by this page are tracked so the harness can
//!   close leftovers when the scenario ends
//!
//! Every operation is recorded in the scenario's [`StepLog`] and bounded by
//! a timeout from [`HarnessConfig`].

use std::future::Future;
use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::HarnessConfig;
use crate::dialog::{DialogGuard, DialogHandler};
use crate::driver::{ElementHandle, MouseAction, MouseButton, PageDriver, Viewport};
use crate::event::{EventKind, EventWaiter, UrlPattern};
use crate::file_ops::UploadDir;
use crate::locator::{normalize_text, ClickOptions, FrameLocator, Locator};
use crate::logging::StepLog;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll, Outcome, Polled};

// ============================================================================
// Multi-valued arguments
// ============================================================================

/// One value or a sequence of values, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneOrMany(Vec<String>);

impl OneOrMany {
    /// Values in application order
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Consume into the value list
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(|v| (*v).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| (*v).to_string()).collect())
    }
}

impl From<&[String]> for OneOrMany {
    fn from(values: &[String]) -> Self {
        Self(values.to_vec())
    }
}

impl IntoIterator for OneOrMany {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ============================================================================
// Actionability
// ============================================================================

/// What a single-target operation requires of its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    /// Exactly one match, visible or not
    Attached,
    /// Exactly one visible match
    Visible,
    /// Exactly one visible, enabled match
    VisibleEnabled,
}

/// One observation of a single-target locator
#[derive(Debug, Clone)]
enum Target {
    Ready(ElementHandle),
    Missing,
    Ambiguous(usize),
    Hidden,
    Disabled,
}

impl Outcome for Target {
    fn is_satisfied(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }

    fn describe(&self) -> String {
        match self {
            Self::Ready(_) => "ready".to_string(),
            Self::Missing => "no match".to_string(),
            Self::Ambiguous(n) => format!("{n} matches"),
            Self::Hidden => "hidden".to_string(),
            Self::Disabled => "disabled".to_string(),
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// A scenario's handle on one page; cheap to clone, clones share state
#[derive(Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    config: Arc<HarnessConfig>,
    steps: StepLog,
    popups: Arc<Mutex<Vec<Page>>>,
    dialog_slot: Arc<AtomicU64>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("base_url", &self.config.base_url)
            .field("closed", &self.driver.is_closed())
            .field("steps", &self.steps.len())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: Arc<HarnessConfig>) -> Self {
        Self {
            driver,
            config,
            steps: StepLog::new(),
            popups: Arc::new(Mutex::new(Vec::new())),
            dialog_slot: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A page opened by this one; shares config and step trail
    fn adopt(&self, driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            config: Arc::clone(&self.config),
            steps: self.steps.clone(),
            popups: Arc::new(Mutex::new(Vec::new())),
            dialog_slot: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Step trail of the running scenario
    #[must_use]
    pub const fn steps(&self) -> &StepLog {
        &self.steps
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Locator for an `<iframe>` document
    #[must_use]
    pub fn frame_locator(&self, selector: &str) -> FrameLocator {
        Locator::frame(selector)
    }

    /// Fail with `UnhandledDialog` if a dialog was auto-dismissed
    pub fn check_dialogs(&self) -> ProbeResult<()> {
        match self.driver.take_unhandled_dialog() {
            Some(dialog) => {
                tracing::warn!(kind = %dialog.kind(), message = dialog.message(), "dialog had no handler");
                Err(dialog.into())
            }
            None => Ok(()),
        }
    }

    /// Run `action` as a recorded step, checking for unhandled dialogs
    /// before and after
    pub async fn step<T, F>(&self, description: impl Into<String>, action: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        let index = self.steps.begin(description);
        let outcome = match self.check_dialogs() {
            Ok(()) => match action.await {
                Ok(value) => self.check_dialogs().map(|()| value),
                Err(err) => Err(self.check_dialogs().err().unwrap_or(err)),
            },
            Err(err) => Err(err),
        };
        self.steps.finish(index, &outcome);
        outcome
    }

    /// Bound a driver call by the action timeout
    async fn bounded<T, F>(&self, what: &str, call: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        let limit = self.config.action_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(limit), call).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                waited_for: what.to_string(),
                timeout_ms: limit,
                elapsed_ms: limit,
                last_observed: None,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Navigation and page state
    // ------------------------------------------------------------------------

    /// Navigate to a site path (or absolute URL)
    pub async fn goto(&self, path: &str) -> ProbeResult<()> {
        let url = self.config.url(path);
        let limit = self.config.navigation_timeout_ms;
        self.step(format!("goto {url}"), async {
            match tokio::time::timeout(Duration::from_millis(limit), self.driver.goto(&url)).await
            {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Navigation {
                    url: url.clone(),
                    message: format!("load did not finish within {limit}ms"),
                }),
            }
        })
        .await
    }

    /// Current URL
    pub async fn url(&self) -> ProbeResult<String> {
        self.bounded("url", self.driver.url()).await
    }

    /// Serialized document content
    pub async fn content(&self) -> ProbeResult<String> {
        self.bounded("content", self.driver.content()).await
    }

    /// Viewport size
    pub async fn viewport(&self) -> ProbeResult<Viewport> {
        self.bounded("viewport", self.driver.viewport()).await
    }

    /// Close the page
    pub async fn close(&self) -> ProbeResult<()> {
        if self.driver.is_closed() {
            return Ok(());
        }
        self.bounded("close", self.driver.close()).await
    }

    /// Whether the page is closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.driver.is_closed()
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Resolve once; zero matches is an empty vector
    pub async fn resolve(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.bounded("query", self.driver.query(locator)).await
    }

    /// Number of current matches
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.resolve(locator).await?.len())
    }

    /// Whether the single match is visible (false when nothing matches)
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let matches = self.resolve(locator).await?;
        match matches.as_slice() {
            [] => Ok(false),
            [only] => Ok(only.visible),
            many => Err(self.strict_violation(locator, many.len())),
        }
    }

    fn strict_violation(&self, locator: &Locator, matched: usize) -> ProbeError {
        ProbeError::NotFound {
            locator: locator.to_string(),
            matched,
            timeout_ms: self.config.action_timeout_ms,
        }
    }

    async fn observe(&self, locator: &Locator, requirement: Requirement) -> ProbeResult<Target> {
        let mut matches = self.resolve(locator).await?;
        if matches.len() > 1 {
            return Ok(Target::Ambiguous(matches.len()));
        }
        let Some(element) = matches.pop() else {
            return Ok(Target::Missing);
        };
        Ok(match requirement {
            Requirement::Attached => Target::Ready(element),
            Requirement::Visible | Requirement::VisibleEnabled if !element.visible => Target::Hidden,
            Requirement::VisibleEnabled if !element.enabled => Target::Disabled,
            Requirement::Visible | Requirement::VisibleEnabled => Target::Ready(element),
        })
    }

    /// Poll until the locator has exactly one element meeting `requirement`
    async fn actionable(
        &self,
        locator: &Locator,
        requirement: Requirement,
    ) -> ProbeResult<ElementHandle> {
        let options = self.config.action_wait();
        match poll(|| self.observe(locator, requirement), &options).await? {
            Polled::Satisfied {
                value: Target::Ready(element),
                ..
            } => Ok(element),
            Polled::Aborted {
                value: Target::Ambiguous(matched),
                ..
            } => Err(self.strict_violation(locator, matched)),
            Polled::TimedOut {
                last: Target::Disabled,
                ..
            } => Err(ProbeError::interaction(locator, "element is disabled")),
            Polled::TimedOut {
                last: Target::Hidden,
                elapsed,
                ..
            } => Err(ProbeError::Timeout {
                waited_for: format!("{locator} to be visible"),
                timeout_ms: options.timeout_ms,
                elapsed_ms: elapsed.as_millis() as u64,
                last_observed: Some("hidden".to_string()),
            }),
            _ => Err(ProbeError::NotFound {
                locator: locator.to_string(),
                matched: 0,
                timeout_ms: options.timeout_ms,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Interactions
    // ------------------------------------------------------------------------

    /// Click with default options
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.click_with(locator, ClickOptions::default()).await
    }

    /// Double click
    pub async fn dblclick(&self, locator: &Locator) -> ProbeResult<()> {
        self.click_with(locator, ClickOptions::double()).await
    }

    /// Click once the target is visible and enabled
    pub async fn click_with(&self, locator: &Locator, options: ClickOptions) -> ProbeResult<()> {
        let locator = match options.exact {
            Some(exact) => locator.clone().with_exact(exact),
            None => locator.clone(),
        };
        self.step(format!("click {locator}"), async {
            let element = self.actionable(&locator, Requirement::VisibleEnabled).await?;
            self.bounded(
                "click",
                self.driver.click(&element, options.button, options.click_count),
            )
            .await
        })
        .await
    }

    /// Clear the target and type `text`; the target must be editable
    pub async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.step(format!("fill {locator} with {text:?}"), async {
            let element = self.actionable(locator, Requirement::Visible).await?;
            if !element.editable {
                return Err(ProbeError::interaction(
                    locator,
                    format!("<{}> is not editable", element.tag),
                ));
            }
            self.bounded("fill", self.driver.fill(&element, text)).await
        })
        .await
    }

    /// Check a checkbox or radio; already-checked targets are left alone
    pub async fn check(&self, locator: &Locator) -> ProbeResult<()> {
        self.set_checked(locator, true).await
    }

    /// Uncheck a checkbox; already-unchecked targets are left alone
    pub async fn uncheck(&self, locator: &Locator) -> ProbeResult<()> {
        self.set_checked(locator, false).await
    }

    async fn set_checked(&self, locator: &Locator, wanted: bool) -> ProbeResult<()> {
        let verb = if wanted { "check" } else { "uncheck" };
        self.step(format!("{verb} {locator}"), async {
            let element = self.actionable(locator, Requirement::VisibleEnabled).await?;
            if element.checked == wanted {
                return Ok(());
            }
            self.bounded("click", self.driver.click(&element, MouseButton::Left, 1))
                .await?;
            let after = self.actionable(locator, Requirement::Attached).await?;
            if after.checked == wanted {
                Ok(())
            } else {
                Err(ProbeError::interaction(
                    locator,
                    format!("clicking did not {verb} the element"),
                ))
            }
        })
        .await
    }

    /// Move the pointer over the target
    pub async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        self.step(format!("hover {locator}"), async {
            let element = self.actionable(locator, Requirement::Visible).await?;
            self.bounded("hover", self.driver.hover(&element)).await
        })
        .await
    }

    /// Focus the target
    pub async fn focus(&self, locator: &Locator) -> ProbeResult<()> {
        self.step(format!("focus {locator}"), async {
            let element = self.actionable(locator, Requirement::Visible).await?;
            self.bounded("focus", self.driver.focus(&element)).await
        })
        .await
    }

    /// Press a key on whatever has focus
    pub async fn press(&self, key: &str) -> ProbeResult<()> {
        self.step(format!("press {key}"), async {
            self.bounded("press", self.driver.press(key)).await
        })
        .await
    }

    /// Focus the target, then press a key
    pub async fn press_on(&self, locator: &Locator, key: &str) -> ProbeResult<()> {
        self.step(format!("press {key} on {locator}"), async {
            let element = self.actionable(locator, Requirement::Visible).await?;
            self.bounded("focus", self.driver.focus(&element)).await?;
            self.bounded("press", self.driver.press(key)).await
        })
        .await
    }

    /// Select options of a `<select>` by value or label
    pub async fn select_option(
        &self,
        locator: &Locator,
        values: impl Into<OneOrMany>,
    ) -> ProbeResult<()> {
        let values = values.into().into_vec();
        self.step(format!("select {values:?} in {locator}"), async {
            let element = self.actionable(locator, Requirement::VisibleEnabled).await?;
            self.bounded("select", self.driver.select_options(&element, &values))
                .await
        })
        .await
    }

    /// Attach files resolved against the configured upload directory.
    ///
    /// Missing files fail with `Interaction` before the page is touched.
    pub async fn set_input_files<P: AsRef<Path>>(
        &self,
        locator: &Locator,
        names: &[P],
    ) -> ProbeResult<()> {
        let uploads = UploadDir::new(&self.config.upload_dir);
        let description = format!(
            "upload {:?} to {locator}",
            names.iter().map(|n| n.as_ref().display().to_string()).collect::<Vec<_>>()
        );
        self.step(description, async {
            let paths = uploads.resolve_all(names)?;
            let element = self.actionable(locator, Requirement::Attached).await?;
            if element.tag != "input" || element.attribute("type") != Some("file") {
                return Err(ProbeError::interaction(locator, "not a file input"));
            }
            self.bounded("set_input_files", self.driver.set_input_files(&element, &paths))
                .await
        })
        .await
    }

    /// Drag `source` onto `target`
    pub async fn drag_to(&self, source: &Locator, target: &Locator) -> ProbeResult<()> {
        self.step(format!("drag {source} to {target}"), async {
            let from = self.actionable(source, Requirement::Visible).await?;
            let to = self.actionable(target, Requirement::Visible).await?;
            self.bounded("drag", self.driver.drag(&from, &to)).await
        })
        .await
    }

    /// Press a mouse button at the current pointer position
    pub async fn mouse_down(&self) -> ProbeResult<()> {
        self.mouse(MouseAction::Down(MouseButton::Left)).await
    }

    /// Move the pointer to viewport coordinates
    pub async fn mouse_move(&self, x: f64, y: f64) -> ProbeResult<()> {
        self.mouse(MouseAction::Move { x, y }).await
    }

    /// Release the mouse button
    pub async fn mouse_up(&self) -> ProbeResult<()> {
        self.mouse(MouseAction::Up(MouseButton::Left)).await
    }

    async fn mouse(&self, action: MouseAction) -> ProbeResult<()> {
        self.step(format!("mouse {action:?}"), async {
            self.bounded("mouse", self.driver.mouse(action)).await
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------------

    /// Text content of the single match
    pub async fn text_content(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.actionable(locator, Requirement::Attached).await?.full_text)
    }

    /// Whitespace-normalized text of the single visible match
    pub async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.actionable(locator, Requirement::Visible).await?;
        Ok(normalize_text(&element.full_text))
    }

    /// Value of the single matching form control
    pub async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        self.actionable(locator, Requirement::Attached)
            .await?
            .value
            .ok_or_else(|| ProbeError::interaction(locator, "not a form control"))
    }

    /// Attribute of the single match
    pub async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let element = self.actionable(locator, Requirement::Attached).await?;
        Ok(element.attribute(name).map(str::to_string))
    }

    /// Checked state of the single match
    pub async fn is_checked(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.actionable(locator, Requirement::Attached).await?.checked)
    }

    /// Texts of every current match, normalized
    pub async fn all_inner_texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        Ok(self
            .resolve(locator)
            .await?
            .iter()
            .map(|e| normalize_text(&e.full_text))
            .collect())
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Register a one-shot wait; call before triggering the event
    #[must_use]
    pub fn expect_event(&self, kind: EventKind) -> EventWaiter {
        EventWaiter::new(self.driver.subscribe(), kind, self.config.assertion_timeout_ms)
    }

    /// Register for the next dialog
    #[must_use]
    pub fn expect_dialog(&self) -> EventWaiter {
        self.expect_event(EventKind::Dialog)
    }

    /// Register for the next response matching `pattern`
    #[must_use]
    pub fn expect_response(&self, pattern: UrlPattern) -> EventWaiter {
        self.expect_event(EventKind::Response(pattern))
    }

    /// Register for the next popup
    #[must_use]
    pub fn expect_popup(&self) -> PopupWaiter {
        PopupWaiter {
            waiter: self.expect_event(EventKind::Popup),
            opener: self.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Dialogs
    // ------------------------------------------------------------------------

    /// Install a dialog handler until the guard drops
    pub fn on_dialog(&self, handler: impl DialogHandler + 'static) -> DialogGuard {
        DialogGuard::install(
            Arc::clone(&self.driver),
            Arc::clone(&self.dialog_slot),
            Arc::new(handler),
        )
    }

    /// Run `action` with `handler` installed, then uninstall it
    pub async fn with_dialog_handler<H, F, T>(&self, handler: H, action: F) -> ProbeResult<T>
    where
        H: DialogHandler + 'static,
        F: Future<Output = ProbeResult<T>>,
    {
        let guard = self.on_dialog(handler);
        let outcome = action.await;
        drop(guard);
        self.check_dialogs()?;
        outcome
    }

    // ------------------------------------------------------------------------
    // Popups
    // ------------------------------------------------------------------------

    /// Popups opened by this page that are still open, waited for or not
    #[must_use]
    pub fn open_popups(&self) -> Vec<Self> {
        let opened = self.driver.opened_popups();
        let Ok(mut popups) = self.popups.lock() else {
            return Vec::new();
        };
        for driver in opened {
            if !popups.iter().any(|known| Arc::ptr_eq(&known.driver, &driver)) {
                popups.push(self.adopt(driver));
            }
        }
        popups.iter().filter(|page| !page.is_closed()).cloned().collect()
    }

    /// Close every popup still open; returns how many were closed
    pub async fn close_popups(&self) -> ProbeResult<usize> {
        let leftovers = self.open_popups();
        for popup in &leftovers {
            let url = popup.url().await.ok();
            tracing::warn!(url = ?url, "closing popup left open by scenario");
            popup.close().await?;
        }
        if let Ok(mut popups) = self.popups.lock() {
            popups.clear();
        }
        Ok(leftovers.len())
    }
}

/// Registered wait for a popup page
#[derive(Debug)]
pub struct PopupWaiter {
    waiter: EventWaiter,
    opener: Page,
}

impl PopupWaiter {
    /// Override the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.waiter = self.waiter.with_timeout(timeout_ms);
        self
    }

    /// Suspend until the popup opens; it is owned by the opener's scenario
    pub async fn wait(self) -> ProbeResult<Page> {
        let payload = self.waiter.wait().await?;
        let driver = payload
            .popup()
            .ok_or_else(|| ProbeError::driver("popup event without a page"))?;
        let Ok(mut popups) = self.opener.popups.lock() else {
            return Ok(self.opener.adopt(driver));
        };
        let popup = match popups.iter().find(|known| Arc::ptr_eq(&known.driver, &driver)) {
            Some(known) => known.clone(),
            None => {
                let popup = self.opener.adopt(driver);
                popups.push(popup.clone());
                popup
            }
        };
        drop(popups);
        tracing::debug!(latency_ms = payload.latency().as_millis() as u64, "popup opened");
        Ok(popup)
    }
}
