//! One-shot page events: popups, dialogs, network responses, loads.
//!
//! An [`EventWaiter`] subscribes to the driver's event stream when it is
//! constructed, so registration happens-before whatever action the scenario
//! performs next. It never sees events fired before it existed: there is no
//! buffering, and an event missed because the waiter was created too late
//! simply times out.
//!
//! ```text
//! let popup = page.expect_popup();     // register
//! page.click(&new_tab).await?;         // trigger
//! let popup = popup.wait().await?;     // suspend until fired or timeout
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::dialog::{Dialog, DialogState};
use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};

/// Capacity of each driver's event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Next value of the process-wide event sequence.
///
/// Registrations and firings draw from the same counter, so
/// `registered_seq < fired_seq` proves the waiter existed first even when
/// both happen at the same clock instant.
pub fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst) + 1
}

/// An observed network response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Response URL
    pub url: String,
    /// HTTP status
    pub status: u16,
}

impl ResponseInfo {
    /// Create a response record
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }

    /// 2xx status
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A dialog and how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEvent {
    /// The dialog
    pub dialog: Dialog,
    /// Final handshake state (`Accepted` or `Dismissed`)
    pub outcome: DialogState,
    /// Whether a registered handler answered (false: auto-dismissed)
    pub handled: bool,
}

/// Something that happened on a page
#[derive(Clone)]
pub enum PageEvent {
    /// A new page was opened by this page
    Popup(Arc<dyn PageDriver>),
    /// A dialog was raised and answered
    Dialog(DialogEvent),
    /// A network response arrived
    Response(ResponseInfo),
    /// A navigation finished loading
    Load {
        /// Loaded URL
        url: String,
    },
    /// The page was closed
    Close,
}

impl PageEvent {
    /// Event name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Popup(_) => "popup",
            Self::Dialog(_) => "dialog",
            Self::Response(_) => "response",
            Self::Load { .. } => "load",
            Self::Close => "close",
        }
    }
}

impl fmt::Debug for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Popup(_) => f.write_str("Popup(..)"),
            Self::Dialog(event) => f.debug_tuple("Dialog").field(event).finish(),
            Self::Response(info) => f.debug_tuple("Response").field(info).finish(),
            Self::Load { url } => f.debug_struct("Load").field("url", url).finish(),
            Self::Close => f.write_str("Close"),
        }
    }
}

/// An event stamped by the driver that fired it
#[derive(Debug, Clone)]
pub struct TimedEvent {
    /// The event
    pub event: PageEvent,
    /// Clock instant of firing
    pub fired_at: Instant,
    /// Position in the process-wide event sequence
    pub sequence: u64,
}

impl TimedEvent {
    /// Stamp an event fired now
    #[must_use]
    pub fn now(event: PageEvent) -> Self {
        Self {
            event,
            fired_at: Instant::now(),
            sequence: next_sequence(),
        }
    }
}

/// URL pattern for response events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/sample*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// Simple glob matching for URLs; `*` and `**` both match any run
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        let mut pos = 0;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let Some(found) = url[pos..].find(part) else {
                return false;
            };
            if i == 0 && found != 0 {
                return false;
            }
            pos += found + part.len();
        }
        if pattern.ends_with('*') {
            return true;
        }
        // The last literal part must sit at the very end
        match parts.last() {
            Some(last) if parts.len() > 1 => url.ends_with(last),
            _ => pos == url.len(),
        }
    }
}

/// Which event a waiter resolves on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A popup opened
    Popup,
    /// A dialog was raised
    Dialog,
    /// A response whose URL matches
    Response(UrlPattern),
    /// A navigation finished
    Load,
    /// The page closed
    Close,
}

impl EventKind {
    /// Whether `event` resolves a waiter of this kind
    #[must_use]
    pub fn matches(&self, event: &PageEvent) -> bool {
        match (self, event) {
            (Self::Popup, PageEvent::Popup(_))
            | (Self::Dialog, PageEvent::Dialog(_))
            | (Self::Load, PageEvent::Load { .. })
            | (Self::Close, PageEvent::Close) => true,
            (Self::Response(pattern), PageEvent::Response(info)) => pattern.matches(&info.url),
            _ => false,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Popup => write!(f, "popup event"),
            Self::Dialog => write!(f, "dialog event"),
            Self::Response(pattern) => write!(f, "response matching {pattern:?}"),
            Self::Load => write!(f, "load event"),
            Self::Close => write!(f, "close event"),
        }
    }
}

/// Resolved event with both ends of the registration window
#[derive(Debug, Clone)]
pub struct EventPayload {
    /// The event
    pub event: PageEvent,
    /// When the event fired
    pub fired_at: Instant,
    /// When the waiter was registered
    pub registered_at: Instant,
    fired_seq: u64,
    registered_seq: u64,
}

impl EventPayload {
    /// Registration strictly preceded the event
    #[must_use]
    pub const fn registered_before_fired(&self) -> bool {
        self.registered_seq < self.fired_seq
    }

    /// Time from registration to firing
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.fired_at.saturating_duration_since(self.registered_at)
    }

    /// Dialog payload
    #[must_use]
    pub const fn dialog(&self) -> Option<&DialogEvent> {
        match &self.event {
            PageEvent::Dialog(event) => Some(event),
            _ => None,
        }
    }

    /// Response payload
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseInfo> {
        match &self.event {
            PageEvent::Response(info) => Some(info),
            _ => None,
        }
    }

    /// Popup driver
    #[must_use]
    pub fn popup(&self) -> Option<Arc<dyn PageDriver>> {
        match &self.event {
            PageEvent::Popup(driver) => Some(Arc::clone(driver)),
            _ => None,
        }
    }
}

/// Registered, not-yet-resolved one-shot wait
#[derive(Debug)]
pub struct EventWaiter {
    rx: broadcast::Receiver<TimedEvent>,
    kind: EventKind,
    registered_at: Instant,
    registered_seq: u64,
    timeout_ms: u64,
}

impl EventWaiter {
    /// Register on a freshly subscribed receiver
    #[must_use]
    pub fn new(rx: broadcast::Receiver<TimedEvent>, kind: EventKind, timeout_ms: u64) -> Self {
        Self {
            rx,
            kind,
            registered_at: Instant::now(),
            registered_seq: next_sequence(),
            timeout_ms,
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Registration instant
    #[must_use]
    pub const fn registered_at(&self) -> Instant {
        self.registered_at
    }

    /// Event kind this waiter resolves on
    #[must_use]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Suspend until the first matching event or the timeout
    pub async fn wait(mut self) -> ProbeResult<EventPayload> {
        let limit = Duration::from_millis(self.timeout_ms);
        let kind = self.kind.clone();
        let rx = &mut self.rx;
        let received = tokio::time::timeout(limit, async move {
            loop {
                match rx.recv().await {
                    Ok(timed) if kind.matches(&timed.event) => return Ok(timed),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event waiter lagged behind the page");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(ProbeError::driver("page event stream closed"));
                    }
                }
            }
        })
        .await;

        match received {
            Ok(Ok(timed)) => {
                tracing::debug!(
                    event = timed.event.as_str(),
                    latency_ms = timed.fired_at.saturating_duration_since(self.registered_at).as_millis() as u64,
                    "event resolved"
                );
                Ok(EventPayload {
                    event: timed.event,
                    fired_at: timed.fired_at,
                    registered_at: self.registered_at,
                    fired_seq: timed.sequence,
                    registered_seq: self.registered_seq,
                })
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ProbeError::Timeout {
                waited_for: self.kind.to_string(),
                timeout_ms: self.timeout_ms,
                elapsed_ms: self.registered_at.elapsed().as_millis() as u64,
                last_observed: None,
            }),
        }
    }
}
