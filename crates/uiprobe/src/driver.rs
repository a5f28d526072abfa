//! PageDriver - the browser-automation seam
//!
//! Everything above this trait (page objects, waits, expectations, scenarios)
//! talks to a page only through [`PageDriver`]. Two backends implement it:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Page (resolve, actionability, events, dialog scoping)        │
//! ├───────────────────────────────────────────────────────────────┤
//! │  PageDriver (async trait)                                     │
//! │                                                               │
//! │  ┌───────────────────────┐      ┌──────────────────────────┐  │
//! │  │  ChromiumDriver       │      │  SimPage                 │  │
//! │  │  CDP via chromiumoxide│      │  in-memory DOM, tests    │  │
//! │  │  (feature "browser")  │      │                          │  │
//! │  └───────────────────────┘      └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drivers are deliberately thin: they resolve a [`Locator`] to element
//! snapshots and perform one primitive at a time. Waiting, strictness and
//! dialog policy live in [`crate::page::Page`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::dialog::{Dialog, DialogHandler};
use crate::event::TimedEvent;
use crate::locator::Locator;
use crate::result::ProbeResult;

/// Snapshot of one resolved element.
///
/// Only valid for the interaction that immediately follows resolution; the
/// page re-resolves before every primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Backend-specific reference used to address the element again
    pub node_ref: String,
    /// Lower-case tag name
    pub tag: String,
    /// Text directly owned by the element
    pub own_text: String,
    /// Text content of the element and its descendants
    pub full_text: String,
    /// Rendered and not hidden by any ancestor
    pub visible: bool,
    /// Not disabled (for labels: the associated control is not disabled)
    pub enabled: bool,
    /// Accepts typed text (enabled, not read-only, a text control)
    pub editable: bool,
    /// Checked state of a checkbox or radio (for labels: of the control)
    pub checked: bool,
    /// Current value of a form control
    pub value: Option<String>,
    /// Attributes as rendered
    pub attributes: BTreeMap<String, String>,
}

impl ElementHandle {
    /// Attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the `class` attribute lists `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Page viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button
    #[default]
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

impl MouseButton {
    /// CDP / DOM name of the button
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

/// Low-level mouse primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseAction {
    /// Press a button at the current position
    Down(MouseButton),
    /// Move the pointer to viewport coordinates
    Move {
        /// X coordinate
        x: f64,
        /// Y coordinate
        y: f64,
    },
    /// Release a button at the current position
    Up(MouseButton),
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
/// - `SimPage` - in-memory DOM for tests
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the load to finish
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Current URL
    async fn url(&self) -> ProbeResult<String>;

    /// Serialized document content
    async fn content(&self) -> ProbeResult<String>;

    /// Current viewport size
    async fn viewport(&self) -> ProbeResult<Viewport>;

    /// Resolve a locator; zero matches is an empty vector, not an error
    async fn query(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>>;

    /// Click an element
    async fn click(&self, element: &ElementHandle, button: MouseButton, click_count: u32)
        -> ProbeResult<()>;

    /// Move the pointer over an element
    async fn hover(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Move keyboard focus to an element
    async fn focus(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Focus an element, clear it and type `text`
    async fn fill(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Press a key on the focused element
    async fn press(&self, key: &str) -> ProbeResult<()>;

    /// Select options of a `<select>` by value or label
    async fn select_options(&self, element: &ElementHandle, values: &[String]) -> ProbeResult<()>;

    /// Attach files to a file input
    async fn set_input_files(&self, element: &ElementHandle, files: &[PathBuf]) -> ProbeResult<()>;

    /// Drag `source` and drop it onto `target`
    async fn drag(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()>;

    /// Low-level mouse primitive
    async fn mouse(&self, action: MouseAction) -> ProbeResult<()>;

    /// Subscribe to page events; only events fired after this call are seen
    fn subscribe(&self) -> broadcast::Receiver<TimedEvent>;

    /// Install (or clear) the dialog handler consulted for every dialog
    fn set_dialog_handler(&self, handler: Option<Arc<dyn DialogHandler>>);

    /// Take the dialog that was auto-dismissed because no handler was set
    fn take_unhandled_dialog(&self) -> Option<Dialog>;

    /// Every page this page opened, whether or not anyone waited for it
    fn opened_popups(&self) -> Vec<Arc<dyn PageDriver>>;

    /// Close the page
    async fn close(&self) -> ProbeResult<()>;

    /// Whether the page has been closed
    fn is_closed(&self) -> bool;
}
