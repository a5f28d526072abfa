//! Simulated backend: an in-memory page that implements [`PageDriver`].
//!
//! A [`SimSite`] maps URL paths to route builders that populate a fresh
//! [`SimDocument`] on every navigation. Builders attach behaviors (Rust
//! closures) to nodes; primitives dispatched by the page layer run the
//! element's default action and then bubble through those behaviors.
//! Behaviors interact with the rest of the world through [`SimContext`]:
//! raising dialogs, scheduling timers on the tokio clock, opening popups
//! and navigating.
//!
//! Everything runs on `tokio::time`, so tests with a paused clock observe
//! exact timer firings.

mod css;
mod dom;
mod query;

pub use css::CssSelector;
pub use dom::{Handler, NodeId, SimDocument, SimElement, SimEvent, SimEventKind};

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::dialog::{Dialog, DialogHandler, DialogHandshake, DialogResponse, DialogState};
use crate::driver::{ElementHandle, MouseAction, MouseButton, PageDriver, Viewport};
use crate::event::{DialogEvent, PageEvent, ResponseInfo, TimedEvent, EVENT_CHANNEL_CAPACITY};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

type Route = Arc<dyn Fn(&mut SimDocument) + Send + Sync>;

// ============================================================================
// Site
// ============================================================================

/// Route table of a simulated site
#[derive(Clone, Default)]
pub struct SimSite {
    routes: HashMap<String, Route>,
}

impl std::fmt::Debug for SimSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<&String> = self.routes.keys().collect();
        paths.sort();
        f.debug_struct("SimSite").field("routes", &paths).finish()
    }
}

impl SimSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `path` with a document built by `build`
    #[must_use]
    pub fn route<F>(mut self, path: &str, build: F) -> Self
    where
        F: Fn(&mut SimDocument) + Send + Sync + 'static,
    {
        self.routes.insert(normalize_path(path), Arc::new(build));
        self
    }

    /// Whether `path` is served
    #[must_use]
    pub fn serves(&self, path: &str) -> bool {
        self.routes.contains_key(&normalize_path(path))
    }

    fn route_for(&self, url: &str) -> Option<Route> {
        self.routes.get(&normalize_path(&url_path(url))).cloned()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Path component of an absolute URL
fn url_path(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("/", |i| &rest[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].to_string()
}

/// Resolve `target` (absolute URL or site path) against `current`
fn resolve_url(current: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    let origin = match current.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{host}")
        }
        None => String::new(),
    };
    format!("{origin}/{}", target.trim_start_matches('/'))
}

// ============================================================================
// Page state
// ============================================================================

struct SimState {
    doc: SimDocument,
    url: String,
    viewport: Viewport,
    generation: u64,
    closed: bool,
    focused: Option<NodeId>,
    pointer: Option<NodeId>,
    captured: Option<NodeId>,
    dialog_handler: Option<Arc<dyn DialogHandler>>,
    unhandled: Option<Dialog>,
    handshake: DialogHandshake,
    pending_navigation: Option<String>,
    popups: Vec<Arc<dyn PageDriver>>,
}

struct SimShared {
    site: Arc<SimSite>,
    state: Mutex<SimState>,
    events: broadcast::Sender<TimedEvent>,
}

impl SimShared {
    fn lock(&self) -> ProbeResult<MutexGuard<'_, SimState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::driver("simulated page state poisoned"))
    }

    fn emit(&self, event: PageEvent) {
        // no subscribers is fine
        let _ = self.events.send(TimedEvent::now(event));
    }

    /// Build the document for `url`, run load behaviors, follow redirects
    fn load(self: &Arc<Self>, url: &str) -> ProbeResult<()> {
        let route = self.site.route_for(url).ok_or_else(|| ProbeError::Navigation {
            url: url.to_string(),
            message: format!("no page at {}", url_path(url)),
        })?;
        let mut doc = SimDocument::new();
        route(&mut doc);

        let pending = {
            let mut state = self.lock()?;
            if state.closed {
                return Err(ProbeError::driver("page is closed"));
            }
            state.doc = doc;
            state.url = url.to_string();
            state.generation += 1;
            state.focused = None;
            state.pointer = None;
            state.captured = None;
            tracing::debug!(url, generation = state.generation, "sim page loaded");
            self.emit(PageEvent::Response(ResponseInfo::new(url, 200)));
            let body = state.doc.body();
            for handler in state.doc.load_handlers() {
                let mut ctx = SimContext::new(self, &mut state, SimEvent::Load, body, body);
                handler(&mut ctx);
            }
            self.emit(PageEvent::Load {
                url: url.to_string(),
            });
            state.pending_navigation.take()
        };
        match pending {
            Some(next) => self.load(&next),
            None => Ok(()),
        }
    }

    /// Run `action` against live state, then follow any navigation it requested
    fn act<T>(
        self: &Arc<Self>,
        action: impl FnOnce(&Arc<Self>, &mut SimState) -> ProbeResult<T>,
    ) -> ProbeResult<T> {
        let (value, pending) = {
            let mut state = self.lock()?;
            if state.closed {
                return Err(ProbeError::driver("page is closed"));
            }
            let value = action(self, &mut state)?;
            (value, state.pending_navigation.take())
        };
        if let Some(url) = pending {
            self.load(&url)?;
        }
        Ok(value)
    }

    /// Fire a scheduled timer; returns whether a repeating timer keeps going
    fn fire_timer(
        self: &Arc<Self>,
        generation: u64,
        handler: &Arc<dyn Fn(&mut SimContext<'_>) -> bool + Send + Sync>,
    ) -> bool {
        let result = self.act(|shared, state| {
            if state.generation != generation {
                return Ok(false);
            }
            let body = state.doc.body();
            let mut ctx = SimContext::new(shared, state, SimEvent::Timer, body, body);
            Ok(handler(&mut ctx))
        });
        result.unwrap_or(false)
    }
}

fn node_of(state: &SimState, element: &ElementHandle) -> ProbeResult<NodeId> {
    query::parse_ref(&element.node_ref, state.generation)
        .filter(|&node| state.doc.is_attached(node))
        .ok_or_else(|| ProbeError::interaction(&element.node_ref, "element is detached"))
}

/// Run handlers for `event` on `target` and its same-document ancestors
fn dispatch(shared: &Arc<SimShared>, state: &mut SimState, target: NodeId, event: &SimEvent) {
    let Some(kind) = event.kind() else {
        return;
    };
    let mut current = Some(target);
    while let Some(node) = current {
        for handler in state.doc.handlers(node, kind) {
            let mut ctx = SimContext::new(shared, state, event.clone(), target, node);
            handler(&mut ctx);
        }
        current = state.doc.parent_in_document(node);
    }
}

/// Primary click: default action, behaviors, then label activation
fn click_node(shared: &Arc<SimShared>, state: &mut SimState, node: NodeId) {
    let Some(element) = state.doc.element(node).cloned() else {
        return;
    };
    if element.disabled {
        return;
    }
    if element.is_focusable() {
        state.focused = Some(node);
    }
    match element.input_type() {
        Some("checkbox") => state.doc.set_checked(node, !element.checked),
        Some("radio") if !element.checked => {
            if let Some(group) = element.attribute("name") {
                let group = group.to_string();
                for other in state.doc.descendants(state.doc.root()) {
                    if state.doc.attr(other, "name").as_deref() == Some(group.as_str())
                        && state.doc.element(other).is_some_and(|e| e.input_type() == Some("radio"))
                    {
                        state.doc.set_checked(other, false);
                    }
                }
            }
            state.doc.set_checked(node, true);
        }
        _ => {}
    }
    dispatch(shared, state, node, &SimEvent::Click);
    if element.is_toggle() {
        dispatch(shared, state, node, &SimEvent::Input);
    }
    if let Some(control) = state.doc.labelled_control(node) {
        click_node(shared, state, control);
    }
}

// ============================================================================
// Behavior context
// ============================================================================

/// What a behavior can see and do while it runs
pub struct SimContext<'a> {
    shared: &'a Arc<SimShared>,
    state: &'a mut SimState,
    event: SimEvent,
    target: NodeId,
    current: NodeId,
}

impl<'a> SimContext<'a> {
    fn new(
        shared: &'a Arc<SimShared>,
        state: &'a mut SimState,
        event: SimEvent,
        target: NodeId,
        current: NodeId,
    ) -> Self {
        Self {
            shared,
            state,
            event,
            target,
            current,
        }
    }

    /// The live document
    pub fn doc(&mut self) -> &mut SimDocument {
        &mut self.state.doc
    }

    /// The event being handled
    #[must_use]
    pub const fn event(&self) -> &SimEvent {
        &self.event
    }

    /// Node the event was dispatched to
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose behavior is running (differs from `target` while bubbling)
    #[must_use]
    pub const fn current(&self) -> NodeId {
        self.current
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.state.url
    }

    /// Raise a modal dialog and block until it is answered.
    ///
    /// With no handler installed the dialog is dismissed and remembered as
    /// unhandled; the page layer reports it on its next operation.
    pub fn raise_dialog(&mut self, dialog: Dialog) -> DialogResponse {
        let state = &mut *self.state;
        if let Err(err) = state.handshake.raise(&dialog) {
            tracing::warn!(%err, "dialog raised while another is open");
            return DialogResponse::Dismiss;
        }
        let (response, handled) = match state.dialog_handler.clone() {
            Some(handler) => (handler.handle(&dialog), true),
            None => {
                tracing::warn!(kind = %dialog.kind(), message = dialog.message(), "auto-dismissing dialog with no handler");
                if state.unhandled.is_none() {
                    state.unhandled = Some(dialog.clone());
                }
                (DialogResponse::Dismiss, false)
            }
        };
        let outcome = match state
            .handshake
            .respond(&response)
            .map(|_| ())
            .and_then(|()| state.handshake.complete())
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%err, "dialog handshake failed");
                state.handshake = DialogHandshake::new();
                DialogState::Dismissed
            }
        };
        self.shared.emit(PageEvent::Dialog(DialogEvent {
            dialog,
            outcome,
            handled,
        }));
        response
    }

    /// Run `behavior` once after `delay_ms`, unless the page navigated or closed
    pub fn after<F>(&mut self, delay_ms: u64, behavior: F)
    where
        F: Fn(&mut SimContext<'_>) + Send + Sync + 'static,
    {
        self.schedule(
            delay_ms,
            false,
            Arc::new(move |ctx: &mut SimContext<'_>| -> bool {
                behavior(ctx);
                false
            }),
        );
    }

    /// Run `behavior` every `period_ms` while it returns `true`
    pub fn every<F>(&mut self, period_ms: u64, behavior: F)
    where
        F: Fn(&mut SimContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.schedule(period_ms, true, Arc::new(behavior));
    }

    fn schedule(
        &mut self,
        delay_ms: u64,
        repeat: bool,
        behavior: Arc<dyn Fn(&mut SimContext<'_>) -> bool + Send + Sync>,
    ) {
        let shared = Arc::clone(self.shared);
        let generation = self.state.generation;
        let delay = Duration::from_millis(delay_ms.max(1));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if !shared.fire_timer(generation, &behavior) || !repeat {
                    break;
                }
            }
        });
    }

    /// Open `target` in a new page sharing this page's viewport
    pub fn open_popup(&mut self, target: &str) {
        let url = resolve_url(&self.state.url, target);
        let popup = SimPage::with_viewport(Arc::clone(&self.shared.site), self.state.viewport);
        match popup.shared.load(&url) {
            Ok(()) => {
                self.state.popups.push(popup.clone());
                self.shared.emit(PageEvent::Popup(popup));
            }
            Err(err) => tracing::warn!(%err, url, "popup failed to load"),
        }
    }

    /// Navigate this page once the current behavior returns
    pub fn navigate(&mut self, target: &str) {
        self.state.pending_navigation = Some(resolve_url(&self.state.url, target));
    }
}

// ============================================================================
// Driver
// ============================================================================

/// In-memory page
#[derive(Clone)]
pub struct SimPage {
    shared: Arc<SimShared>,
}

impl std::fmt::Debug for SimPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let url = self.shared.lock().map(|s| s.url.clone()).unwrap_or_default();
        f.debug_struct("SimPage").field("url", &url).finish()
    }
}

impl SimPage {
    /// Blank page on `site` with the default viewport
    #[must_use]
    pub fn open(site: Arc<SimSite>) -> Arc<Self> {
        Self::with_viewport(site, Viewport::default())
    }

    /// Blank page on `site`
    #[must_use]
    pub fn with_viewport(site: Arc<SimSite>, viewport: Viewport) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            shared: Arc::new(SimShared {
                site,
                state: Mutex::new(SimState {
                    doc: SimDocument::new(),
                    url: "about:blank".to_string(),
                    viewport,
                    generation: 0,
                    closed: false,
                    focused: None,
                    pointer: None,
                    captured: None,
                    dialog_handler: None,
                    unhandled: None,
                    handshake: DialogHandshake::new(),
                    pending_navigation: None,
                    popups: Vec::new(),
                }),
                events,
            }),
        })
    }

    /// Run a read-only inspection of the live document
    pub fn inspect<T>(&self, f: impl FnOnce(&SimDocument) -> T) -> ProbeResult<T> {
        Ok(f(&self.shared.lock()?.doc))
    }
}

#[async_trait]
impl PageDriver for SimPage {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        self.shared.load(url)
    }

    async fn url(&self) -> ProbeResult<String> {
        Ok(self.shared.lock()?.url.clone())
    }

    async fn content(&self) -> ProbeResult<String> {
        Ok(self.shared.lock()?.doc.render())
    }

    async fn viewport(&self) -> ProbeResult<Viewport> {
        Ok(self.shared.lock()?.viewport)
    }

    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        let state = self.shared.lock()?;
        if state.closed {
            return Err(ProbeError::driver("page is closed"));
        }
        let nodes = query::resolve(&state.doc, locator)?;
        Ok(nodes
            .into_iter()
            .map(|node| query::snapshot(&state.doc, node, state.generation))
            .collect())
    }

    async fn click(
        &self,
        element: &ElementHandle,
        button: MouseButton,
        click_count: u32,
    ) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let node = node_of(state, element)?;
            if state.doc.is_disabled(node) {
                return Err(ProbeError::interaction(&element.node_ref, "element is disabled"));
            }
            match button {
                MouseButton::Left => {
                    for _ in 0..click_count.max(1) {
                        click_node(shared, state, node);
                    }
                    if click_count == 2 {
                        dispatch(shared, state, node, &SimEvent::DoubleClick);
                    }
                }
                MouseButton::Right => dispatch(shared, state, node, &SimEvent::ContextMenu),
                MouseButton::Middle => {}
            }
            Ok(())
        })
    }

    async fn hover(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let node = node_of(state, element)?;
            state.pointer = Some(node);
            dispatch(shared, state, node, &SimEvent::Hover);
            Ok(())
        })
    }

    async fn focus(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.shared.act(|_, state| {
            state.focused = Some(node_of(state, element)?);
            Ok(())
        })
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let node = node_of(state, element)?;
            let editable = query::snapshot(&state.doc, node, state.generation).editable;
            if !editable {
                return Err(ProbeError::interaction(&element.node_ref, "element is not editable"));
            }
            state.focused = Some(node);
            state.doc.set_value(node, text);
            dispatch(shared, state, node, &SimEvent::Input);
            Ok(())
        })
    }

    async fn press(&self, key: &str) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let target = state
                .focused
                .filter(|&n| state.doc.is_attached(n))
                .unwrap_or_else(|| state.doc.body());
            dispatch(shared, state, target, &SimEvent::Key(key.to_string()));
            Ok(())
        })
    }

    async fn select_options(&self, element: &ElementHandle, values: &[String]) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let node = node_of(state, element)?;
            if element.tag != "select" {
                return Err(ProbeError::interaction(&element.node_ref, "not a <select> element"));
            }
            let options = state.doc.children(node);
            let mut chosen = Vec::new();
            for value in values {
                let option = options
                    .iter()
                    .copied()
                    .find(|&o| {
                        state.doc.attr(o, "value").as_deref() == Some(value.as_str())
                            || state.doc.full_text(o) == *value
                    })
                    .ok_or_else(|| {
                        ProbeError::interaction(&element.node_ref, format!("no option {value:?}"))
                    })?;
                chosen.push(option);
            }
            let multiple = element.attribute("multiple").is_some();
            for &option in &options {
                let keep = multiple && state.doc.is_checked(option);
                state.doc.set_checked(option, keep);
            }
            let chosen = if multiple {
                &chosen[..]
            } else {
                chosen.last().map(std::slice::from_ref).unwrap_or_default()
            };
            for &option in chosen {
                state.doc.set_checked(option, true);
            }
            dispatch(shared, state, node, &SimEvent::Input);
            Ok(())
        })
    }

    async fn set_input_files(&self, element: &ElementHandle, files: &[PathBuf]) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let node = node_of(state, element)?;
            if element.tag != "input" || element.attribute("type") != Some("file") {
                return Err(ProbeError::interaction(&element.node_ref, "not a file input"));
            }
            let names: Vec<String> = files
                .iter()
                .filter_map(|f| f.file_name().map(|n| n.to_string_lossy().to_string()))
                .collect();
            let value = names
                .first()
                .map(|name| format!("C:\\fakepath\\{name}"))
                .unwrap_or_default();
            state.doc.set_value(node, &value);
            state.doc.set_attr(node, "data-files", &names.join(","));
            dispatch(shared, state, node, &SimEvent::Input);
            Ok(())
        })
    }

    async fn drag(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            let from = node_of(state, source)?;
            let to = node_of(state, target)?;
            dispatch(shared, state, to, &SimEvent::Drop { source: from });
            Ok(())
        })
    }

    async fn mouse(&self, action: MouseAction) -> ProbeResult<()> {
        self.shared.act(|shared, state| {
            match action {
                MouseAction::Down(_) => {
                    state.captured = state.pointer;
                    if let Some(node) = state.captured {
                        dispatch(shared, state, node, &SimEvent::MouseDown);
                    }
                }
                MouseAction::Move { x, y } => {
                    if let Some(node) = state.captured.or(state.pointer) {
                        dispatch(shared, state, node, &SimEvent::MouseMove { x, y });
                    }
                }
                MouseAction::Up(_) => {
                    if let Some(node) = state.captured.take().or(state.pointer) {
                        dispatch(shared, state, node, &SimEvent::MouseUp);
                    }
                }
            }
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<TimedEvent> {
        self.shared.events.subscribe()
    }

    fn set_dialog_handler(&self, handler: Option<Arc<dyn DialogHandler>>) {
        if let Ok(mut state) = self.shared.lock() {
            state.dialog_handler = handler;
        }
    }

    fn take_unhandled_dialog(&self) -> Option<Dialog> {
        self.shared.lock().ok().and_then(|mut s| s.unhandled.take())
    }

    fn opened_popups(&self) -> Vec<Arc<dyn PageDriver>> {
        self.shared.lock().map(|s| s.popups.clone()).unwrap_or_default()
    }

    async fn close(&self) -> ProbeResult<()> {
        {
            let mut state = self.shared.lock()?;
            if state.closed {
                return Ok(());
            }
            state.closed = true;
            state.generation += 1;
        }
        self.shared.emit(PageEvent::Close);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.shared.lock().map_or(true, |s| s.closed)
    }
}
