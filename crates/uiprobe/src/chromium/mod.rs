//! Chromium backend over the Chrome `DevTools` Protocol.
//!
//! Locators are resolved in the page by `resolve.js`, which receives the
//! serde form of the [`Locator`] and returns [`ElementHandle`] snapshots.
//! Resolved elements stay addressable through their `node_ref` until the
//! next navigation.
//!
//! Input goes through the CDP `Input` domain so pages see trusted events.
//! Dialogs, responses, loads and popups are forwarded from CDP event
//! streams onto the driver's broadcast channel by background tasks that
//! live as long as the page.

#![allow(
    clippy::significant_drop_tightening,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, InsertTextParams, MouseButton as CdpMouseButton,
};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::browser_protocol::page::{
    DialogType, EventJavascriptDialogOpening, EventLoadEventFired, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::browser_protocol::target::EventTargetCreated;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::config::HarnessConfig;
use crate::dialog::{Dialog, DialogHandler, DialogHandshake, DialogKind, DialogResponse, DialogState};
use crate::driver::{ElementHandle, MouseAction, MouseButton, PageDriver, Viewport};
use crate::event::{DialogEvent, PageEvent, ResponseInfo, TimedEvent, EVENT_CHANNEL_CAPACITY};
use crate::harness::PageFactory;
use crate::locator::Locator;
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};

const RESOLVE_JS: &str = include_str!("resolve.js");

const CENTER_JS: &str = r"(id) => {
  const el = window.__uiprobeRefs[id];
  el.scrollIntoView({ block: 'center', inline: 'center' });
  const rect = el.getBoundingClientRect();
  let x = rect.left + rect.width / 2;
  let y = rect.top + rect.height / 2;
  let win = el.ownerDocument.defaultView;
  while (win !== window.top && win.frameElement) {
    const frame = win.frameElement.getBoundingClientRect();
    x += frame.left;
    y += frame.top;
    win = win.parent;
  }
  return { x, y };
}";

const FOCUS_JS: &str = r"(id) => { window.__uiprobeRefs[id].focus(); return true; }";

/// Clears the control; range inputs get their value set directly since
/// they cannot be typed into. Returns whether `text` was already applied.
const CLEAR_JS: &str = r"(id, text) => {
  const el = window.__uiprobeRefs[id];
  el.focus();
  const view = el.ownerDocument.defaultView;
  const proto = el.tagName === 'TEXTAREA' ? view.HTMLTextAreaElement.prototype : view.HTMLInputElement.prototype;
  const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
  const fire = (type) => el.dispatchEvent(new view.Event(type, { bubbles: true }));
  setter.call(el, '');
  fire('input');
  if (el.type === 'range') {
    setter.call(el, text);
    fire('input');
    fire('change');
    return true;
  }
  return false;
}";

const SELECT_JS: &str = r"(id, values) => {
  const el = window.__uiprobeRefs[id];
  const view = el.ownerDocument.defaultView;
  for (const option of Array.from(el.options)) {
    option.selected = values.includes(option.value) || values.includes(option.label);
  }
  el.dispatchEvent(new view.Event('input', { bubbles: true }));
  el.dispatchEvent(new view.Event('change', { bubbles: true }));
  return true;
}";

const VIEWPORT_JS: &str = "({ width: window.innerWidth, height: window.innerHeight })";

/// Intermediate pointer positions while dragging
const DRAG_STEPS: u32 = 10;

/// Attempts to attach to a freshly created popup target
const POPUP_ATTACH_ATTEMPTS: u32 = 20;

fn cdp_error(err: impl std::fmt::Display) -> ProbeError {
    ProbeError::driver(err.to_string())
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

const fn cdp_button(button: MouseButton) -> CdpMouseButton {
    match button {
        MouseButton::Left => CdpMouseButton::Left,
        MouseButton::Right => CdpMouseButton::Right,
        MouseButton::Middle => CdpMouseButton::Middle,
    }
}

/// `(key, code, virtual key code, text)` for a key name
fn key_definition(key: &str) -> (String, String, i64, Option<String>) {
    match key {
        "Enter" => ("Enter".into(), "Enter".into(), 13, Some("\r".into())),
        "Backspace" => ("Backspace".into(), "Backspace".into(), 8, None),
        "Tab" => ("Tab".into(), "Tab".into(), 9, None),
        "Escape" => ("Escape".into(), "Escape".into(), 27, None),
        "Delete" => ("Delete".into(), "Delete".into(), 46, None),
        "ArrowLeft" => ("ArrowLeft".into(), "ArrowLeft".into(), 37, None),
        "ArrowUp" => ("ArrowUp".into(), "ArrowUp".into(), 38, None),
        "ArrowRight" => ("ArrowRight".into(), "ArrowRight".into(), 39, None),
        "ArrowDown" => ("ArrowDown".into(), "ArrowDown".into(), 40, None),
        other => {
            let code = other
                .chars()
                .next()
                .filter(|_| other.chars().count() == 1)
                .map_or(0, |c| i64::from(u32::from(c.to_ascii_uppercase())));
            (other.to_string(), other.to_string(), code, Some(other.to_string()))
        }
    }
}

// ============================================================================
// Dialog policy shared with the listener task
// ============================================================================

#[derive(Default)]
struct DialogSlot {
    handler: Mutex<Option<Arc<dyn DialogHandler>>>,
    unhandled: Mutex<Option<Dialog>>,
    handshake: Mutex<DialogHandshake>,
}

impl DialogSlot {
    /// Run the handshake for `dialog`; returns the answer and final state
    fn answer(&self, dialog: &Dialog) -> (DialogResponse, DialogState, bool) {
        let handler = self.handler.lock().ok().and_then(|h| h.clone());
        let (response, handled) = match handler {
            Some(handler) => (handler.handle(dialog), true),
            None => {
                tracing::warn!(kind = %dialog.kind(), message = dialog.message(), "auto-dismissing dialog with no handler");
                if let Ok(mut unhandled) = self.unhandled.lock() {
                    unhandled.get_or_insert_with(|| dialog.clone());
                }
                (DialogResponse::Dismiss, false)
            }
        };
        let outcome = match self.handshake.lock() {
            Ok(mut handshake) => {
                let finished = handshake
                    .raise(dialog)
                    .and_then(|()| handshake.respond(&response).map(|_| ()))
                    .and_then(|()| handshake.complete());
                finished.unwrap_or_else(|err| {
                    tracing::warn!(%err, "dialog handshake failed");
                    *handshake = DialogHandshake::new();
                    DialogState::Dismissed
                })
            }
            Err(_) => DialogState::Dismissed,
        };
        (response, outcome, handled)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// [`PageDriver`] backed by one Chromium tab
pub struct ChromiumDriver {
    page: CdpPage,
    browser: Arc<AsyncMutex<CdpBrowser>>,
    events: broadcast::Sender<TimedEvent>,
    dialogs: Arc<DialogSlot>,
    pointer: Mutex<Point>,
    closed: AtomicBool,
    listeners: Mutex<Vec<JoinHandle<()>>>,
    popups: Arc<Mutex<Vec<Arc<dyn PageDriver>>>>,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("target", self.page.target_id())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Wrap a CDP page, apply the viewport and start forwarding its events
    pub async fn attach(
        browser: Arc<AsyncMutex<CdpBrowser>>,
        page: CdpPage,
        viewport: Viewport,
    ) -> ProbeResult<Arc<Self>> {
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        ))
        .await
        .map_err(cdp_error)?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let driver = Arc::new(Self {
            page,
            browser,
            events,
            dialogs: Arc::new(DialogSlot::default()),
            pointer: Mutex::new(Point { x: 0.0, y: 0.0 }),
            closed: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            popups: Arc::new(Mutex::new(Vec::new())),
        });
        driver.start_listeners(viewport).await?;
        Ok(driver)
    }

    fn emit(events: &broadcast::Sender<TimedEvent>, event: PageEvent) {
        // no receivers is fine; waits subscribe before they trigger
        let _ = events.send(TimedEvent::now(event));
    }

    async fn start_listeners(self: &Arc<Self>, viewport: Viewport) -> ProbeResult<()> {
        let mut tasks = Vec::new();

        let mut dialogs = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(cdp_error)?;
        let page = self.page.clone();
        let slot = Arc::clone(&self.dialogs);
        let events = self.events.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(opening) = dialogs.next().await {
                let kind = match opening.r#type {
                    DialogType::Alert => DialogKind::Alert,
                    DialogType::Confirm => DialogKind::Confirm,
                    DialogType::Prompt => DialogKind::Prompt,
                    DialogType::Beforeunload => DialogKind::BeforeUnload,
                };
                let dialog = match kind {
                    DialogKind::Prompt => Dialog::prompt(
                        opening.message.clone(),
                        opening.default_prompt.clone().filter(|d| !d.is_empty()),
                    ),
                    _ => Dialog::new(kind, opening.message.clone()),
                };
                let (response, outcome, handled) = slot.answer(&dialog);
                let mut params = HandleJavaScriptDialogParams::new(response.is_accept());
                params.prompt_text = response.prompt_text(&dialog);
                if let Err(err) = page.execute(params).await {
                    tracing::warn!(%err, "failed to answer dialog");
                }
                Self::emit(
                    &events,
                    PageEvent::Dialog(DialogEvent {
                        dialog,
                        outcome,
                        handled,
                    }),
                );
            }
        }));

        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(cdp_error)?;
        let events = self.events.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(received) = responses.next().await {
                let status = u16::try_from(received.response.status).unwrap_or_default();
                Self::emit(
                    &events,
                    PageEvent::Response(ResponseInfo::new(received.response.url.clone(), status)),
                );
            }
        }));

        let mut loads = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(cdp_error)?;
        let page = self.page.clone();
        let events = self.events.clone();
        tasks.push(tokio::spawn(async move {
            while loads.next().await.is_some() {
                let url = page.url().await.ok().flatten().unwrap_or_default();
                Self::emit(&events, PageEvent::Load { url });
            }
        }));

        let mut targets = self
            .browser
            .lock()
            .await
            .event_listener::<EventTargetCreated>()
            .await
            .map_err(cdp_error)?;
        let opener = self.page.target_id().clone();
        let browser = Arc::clone(&self.browser);
        let events = self.events.clone();
        let opened = Arc::clone(&self.popups);
        tasks.push(tokio::spawn(async move {
            while let Some(created) = targets.next().await {
                let info = &created.target_info;
                if info.r#type != "page" || info.opener_id.as_ref() != Some(&opener) {
                    continue;
                }
                match Self::attach_popup(&browser, info.target_id.clone(), viewport).await {
                    Ok(popup) => {
                        if let Ok(mut opened) = opened.lock() {
                            opened.push(Arc::clone(&popup));
                        }
                        Self::emit(&events, PageEvent::Popup(popup));
                    }
                    Err(err) => tracing::warn!(%err, "failed to attach popup"),
                }
            }
        }));

        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.extend(tasks);
        }
        Ok(())
    }

    async fn attach_popup(
        browser: &Arc<AsyncMutex<CdpBrowser>>,
        target: chromiumoxide::cdp::browser_protocol::target::TargetId,
        viewport: Viewport,
    ) -> ProbeResult<Arc<dyn PageDriver>> {
        let mut last_error = String::from("target never attached");
        for _ in 0..POPUP_ATTACH_ATTEMPTS {
            let found = browser.lock().await.get_page(target.clone()).await;
            match found {
                Ok(page) => {
                    let driver: Arc<dyn PageDriver> =
                        Self::attach(Arc::clone(browser), page, viewport).await?;
                    return Ok(driver);
                }
                Err(err) => last_error = err.to_string(),
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Err(ProbeError::driver(format!("popup {target:?}: {last_error}")))
    }

    /// Evaluate `function` applied to JSON `args`
    async fn call<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &[serde_json::Value],
    ) -> ProbeResult<T> {
        let args = args
            .iter()
            .map(serde_json::Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.evaluate(&format!("({function})({args})")).await
    }

    async fn evaluate<T: DeserializeOwned>(&self, expression: &str) -> ProbeResult<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(cdp_error)?;
        self.page
            .evaluate_expression(params)
            .await
            .map_err(cdp_error)?
            .into_value()
            .map_err(cdp_error)
    }

    async fn center(&self, element: &ElementHandle) -> ProbeResult<Point> {
        self.call(CENTER_JS, &[element.node_ref.clone().into()]).await
    }

    async fn mouse_event(
        &self,
        kind: DispatchMouseEventType,
        at: Point,
        button: Option<MouseButton>,
        click_count: u32,
    ) -> ProbeResult<()> {
        let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(at.x).y(at.y);
        if let Some(button) = button {
            builder = builder
                .button(cdp_button(button))
                .click_count(i64::from(click_count));
        }
        let params = builder.build().map_err(cdp_error)?;
        self.page.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    fn pointer(&self) -> Point {
        self.pointer
            .lock()
            .map(|p| *p)
            .unwrap_or(Point { x: 0.0, y: 0.0 })
    }

    async fn move_pointer(&self, to: Point) -> ProbeResult<()> {
        self.mouse_event(DispatchMouseEventType::MouseMoved, to, None, 0)
            .await?;
        if let Ok(mut pointer) = self.pointer.lock() {
            *pointer = to;
        }
        Ok(())
    }

    async fn key_event(&self, kind: DispatchKeyEventType, key: &str) -> ProbeResult<()> {
        let (key, code, virtual_code, text) = key_definition(key);
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key)
            .code(code)
            .windows_virtual_key_code(virtual_code);
        if let (DispatchKeyEventType::KeyDown, Some(text)) = (kind, text) {
            builder = builder.text(text);
        }
        let params = builder.build().map_err(cdp_error)?;
        self.page.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    fn stop_listeners(&self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            for task in listeners.drain(..) {
                task.abort();
            }
        }
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.stop_listeners();
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|err| ProbeError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        Ok(())
    }

    async fn url(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(cdp_error)?
            .unwrap_or_default())
    }

    async fn content(&self) -> ProbeResult<String> {
        self.page.content().await.map_err(cdp_error)
    }

    async fn viewport(&self) -> ProbeResult<Viewport> {
        self.evaluate(VIEWPORT_JS).await
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        let locator = serde_json::to_value(locator)?;
        self.call(RESOLVE_JS, &[locator]).await
    }

    async fn click(
        &self,
        element: &ElementHandle,
        button: MouseButton,
        click_count: u32,
    ) -> ProbeResult<()> {
        let at = self.center(element).await?;
        self.move_pointer(at).await?;
        for count in 1..=click_count.max(1) {
            self.mouse_event(DispatchMouseEventType::MousePressed, at, Some(button), count)
                .await?;
            self.mouse_event(DispatchMouseEventType::MouseReleased, at, Some(button), count)
                .await?;
        }
        Ok(())
    }

    async fn hover(&self, element: &ElementHandle) -> ProbeResult<()> {
        let at = self.center(element).await?;
        self.move_pointer(at).await
    }

    async fn focus(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.call::<bool>(FOCUS_JS, &[element.node_ref.clone().into()])
            .await
            .map(|_| ())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let applied: bool = self
            .call(CLEAR_JS, &[element.node_ref.clone().into(), text.into()])
            .await?;
        if !applied && !text.is_empty() {
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(cdp_error)?;
        }
        Ok(())
    }

    async fn press(&self, key: &str) -> ProbeResult<()> {
        self.key_event(DispatchKeyEventType::KeyDown, key).await?;
        self.key_event(DispatchKeyEventType::KeyUp, key).await
    }

    async fn select_options(&self, element: &ElementHandle, values: &[String]) -> ProbeResult<()> {
        let values = serde_json::to_value(values)?;
        self.call::<bool>(SELECT_JS, &[element.node_ref.clone().into(), values])
            .await
            .map(|_| ())
    }

    async fn set_input_files(&self, element: &ElementHandle, files: &[PathBuf]) -> ProbeResult<()> {
        let params = EvaluateParams::builder()
            .expression(format!("window.__uiprobeRefs[{}]", element.node_ref))
            .build()
            .map_err(cdp_error)?;
        let evaluated = self.page.execute(params).await.map_err(cdp_error)?;
        let object_id = evaluated
            .result
            .result
            .object_id
            .clone()
            .ok_or_else(|| ProbeError::driver("file input is not addressable"))?;
        let files = files
            .iter()
            .map(|f| f.display().to_string())
            .collect::<Vec<_>>();
        let params = SetFileInputFilesParams::builder()
            .files(files)
            .object_id(object_id)
            .build()
            .map_err(cdp_error)?;
        self.page.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn drag(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()> {
        let from = self.center(source).await?;
        self.move_pointer(from).await?;
        self.mouse_event(DispatchMouseEventType::MousePressed, from, Some(MouseButton::Left), 1)
            .await?;
        let to = self.center(target).await?;
        for step in 1..=DRAG_STEPS {
            let t = f64::from(step) / f64::from(DRAG_STEPS);
            let at = Point {
                x: (to.x - from.x).mul_add(t, from.x),
                y: (to.y - from.y).mul_add(t, from.y),
            };
            self.move_pointer(at).await?;
        }
        self.mouse_event(DispatchMouseEventType::MouseReleased, to, Some(MouseButton::Left), 1)
            .await
    }

    async fn mouse(&self, action: MouseAction) -> ProbeResult<()> {
        match action {
            MouseAction::Down(button) => {
                self.mouse_event(DispatchMouseEventType::MousePressed, self.pointer(), Some(button), 1)
                    .await
            }
            MouseAction::Move { x, y } => self.move_pointer(Point { x, y }).await,
            MouseAction::Up(button) => {
                self.mouse_event(DispatchMouseEventType::MouseReleased, self.pointer(), Some(button), 1)
                    .await
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<TimedEvent> {
        self.events.subscribe()
    }

    fn set_dialog_handler(&self, handler: Option<Arc<dyn DialogHandler>>) {
        if let Ok(mut slot) = self.dialogs.handler.lock() {
            *slot = handler;
        }
    }

    fn take_unhandled_dialog(&self) -> Option<Dialog> {
        self.dialogs.unhandled.lock().ok().and_then(|mut d| d.take())
    }

    fn opened_popups(&self) -> Vec<Arc<dyn PageDriver>> {
        self.popups.lock().map(|p| p.clone()).unwrap_or_default()
    }

    async fn close(&self) -> ProbeResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.stop_listeners();
        self.page.clone().close().await.map_err(cdp_error)?;
        Self::emit(&self.events, PageEvent::Close);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Launcher and factory
// ============================================================================

/// Browser launch settings, taken from [`HarnessConfig`]
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    /// Run without a window
    pub headless: bool,
    /// Window and page viewport
    pub viewport: Viewport,
    /// Browser executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl From<&HarnessConfig> for ChromiumLauncher {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            headless: config.headless,
            viewport: config.viewport,
            chrome_path: config.chrome_path.clone(),
            sandbox: true,
        }
    }
}

impl ChromiumLauncher {
    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Launch the browser
    pub async fn launch(self) -> ProbeResult<ChromiumFactory> {
        let mut builder = CdpConfig::builder().window_size(self.viewport.width, self.viewport.height);
        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(%err, "cdp handler stopped");
                    break;
                }
            }
        });
        tracing::info!(headless = self.headless, "chromium launched");

        Ok(ChromiumFactory {
            browser: Arc::new(AsyncMutex::new(browser)),
            viewport: self.viewport,
            handle,
        })
    }
}

/// Opens one fresh tab per scenario in a shared browser
#[derive(Debug)]
pub struct ChromiumFactory {
    browser: Arc<AsyncMutex<CdpBrowser>>,
    viewport: Viewport,
    handle: JoinHandle<()>,
}

impl ChromiumFactory {
    /// Close the browser
    pub async fn close(self) -> ProbeResult<()> {
        self.browser
            .lock()
            .await
            .close()
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
        self.handle.abort();
        Ok(())
    }
}

#[async_trait]
impl PageFactory for ChromiumFactory {
    async fn new_page(&self, config: Arc<HarnessConfig>) -> ProbeResult<Page> {
        let tab = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(cdp_error)?;
        let driver = ChromiumDriver::attach(Arc::clone(&self.browser), tab, self.viewport).await?;
        Ok(Page::new(driver, config))
    }
}
