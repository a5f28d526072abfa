//! Dialog handling (alert, confirm, prompt, beforeunload).
//!
//! Dialogs are modal: the page is blocked until someone answers. Handling is
//! therefore explicit and scoped. A scenario registers a [`DialogHandler`]
//! for the duration of the action expected to raise a dialog (see
//! [`crate::page::Page::on_dialog`]); a dialog raised while no handler is
//! registered is auto-dismissed by the backend and reported as
//! [`ProbeError::UnhandledDialog`] on the next page operation.
//!
//! Every dialog goes through a [`DialogHandshake`]:
//!
//! ```text
//! Idle -> Raised(kind, message) -> Accepted(value?) | Dismissed -> Idle
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};

/// Kind of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl DialogKind {
    /// Parse the DOM / CDP dialog type name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "alert" => Some(Self::Alert),
            "confirm" => Some(Self::Confirm),
            "prompt" => Some(Self::Prompt),
            "beforeunload" => Some(Self::BeforeUnload),
            _ => None,
        }
    }
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// A dialog raised by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    kind: DialogKind,
    message: String,
    default_value: Option<String>,
}

impl Dialog {
    /// Create a new dialog
    #[must_use]
    pub fn new(kind: DialogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            default_value: None,
        }
    }

    /// Create an alert dialog
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogKind::Alert, message)
    }

    /// Create a confirm dialog
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(DialogKind::Confirm, message)
    }

    /// Create a prompt dialog
    #[must_use]
    pub fn prompt(message: impl Into<String>, default: Option<String>) -> Self {
        let mut dialog = Self::new(DialogKind::Prompt, message);
        dialog.default_value = default;
        dialog
    }

    /// Dialog kind
    #[must_use]
    pub const fn kind(&self) -> DialogKind {
        self.kind
    }

    /// Dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Default value (for prompts)
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    fn unhandled_error(&self) -> ProbeError {
        ProbeError::UnhandledDialog {
            kind: self.kind.to_string(),
            message: self.message.clone(),
        }
    }
}

impl From<Dialog> for ProbeError {
    fn from(dialog: Dialog) -> Self {
        dialog.unhandled_error()
    }
}

/// Answer given to a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogResponse {
    /// Accept (OK/Yes/Leave); prompts submit their default value
    Accept,
    /// Accept with input text (for prompts)
    AcceptWith(String),
    /// Dismiss (Cancel/No/Stay)
    Dismiss,
}

impl DialogResponse {
    /// Whether the dialog was accepted
    #[must_use]
    pub const fn is_accept(&self) -> bool {
        !matches!(self, Self::Dismiss)
    }

    /// Text the page receives from a prompt answered with this response
    #[must_use]
    pub fn prompt_text(&self, dialog: &Dialog) -> Option<String> {
        if dialog.kind() != DialogKind::Prompt {
            return None;
        }
        match self {
            Self::Accept => Some(dialog.default_value().unwrap_or_default().to_string()),
            Self::AcceptWith(text) => Some(text.clone()),
            Self::Dismiss => None,
        }
    }
}

// ============================================================================
// Handshake state machine
// ============================================================================

/// State of the dialog handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    /// No dialog open
    Idle,
    /// A dialog is open and awaiting an answer
    Raised {
        /// Dialog kind
        kind: DialogKind,
        /// Dialog message
        message: String,
    },
    /// Accepted; prompts carry the submitted text
    Accepted(Option<String>),
    /// Dismissed
    Dismissed,
}

/// Validates the `Idle -> Raised -> Accepted|Dismissed -> Idle` cycle.
///
/// Exactly one answer is accepted per raised dialog; anything else is a
/// [`ProbeError::Dialog`].
#[derive(Debug, Clone)]
pub struct DialogHandshake {
    state: DialogState,
    raised: Option<Dialog>,
}

impl DialogHandshake {
    /// New handshake in `Idle`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DialogState::Idle,
            raised: None,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &DialogState {
        &self.state
    }

    /// `Idle -> Raised`
    pub fn raise(&mut self, dialog: &Dialog) -> ProbeResult<()> {
        if self.state != DialogState::Idle {
            return Err(ProbeError::Dialog {
                message: format!(
                    "cannot raise {} {:?} while in state {:?}",
                    dialog.kind(),
                    dialog.message(),
                    self.state
                ),
            });
        }
        self.state = DialogState::Raised {
            kind: dialog.kind(),
            message: dialog.message().to_string(),
        };
        self.raised = Some(dialog.clone());
        Ok(())
    }

    /// `Raised -> Accepted | Dismissed`
    pub fn respond(&mut self, response: &DialogResponse) -> ProbeResult<&DialogState> {
        let Some(dialog) = self.raised.as_ref() else {
            return Err(ProbeError::Dialog {
                message: format!("cannot answer {response:?}: no dialog is open"),
            });
        };
        if !matches!(self.state, DialogState::Raised { .. }) {
            return Err(ProbeError::Dialog {
                message: format!("dialog {:?} was already answered", dialog.message()),
            });
        }
        self.state = if response.is_accept() {
            DialogState::Accepted(response.prompt_text(dialog))
        } else {
            DialogState::Dismissed
        };
        Ok(&self.state)
    }

    /// `Accepted | Dismissed -> Idle`, returning the final state
    pub fn complete(&mut self) -> ProbeResult<DialogState> {
        match self.state {
            DialogState::Accepted(_) | DialogState::Dismissed => {
                self.raised = None;
                Ok(std::mem::replace(&mut self.state, DialogState::Idle))
            }
            _ => Err(ProbeError::Dialog {
                message: format!("cannot complete handshake from {:?}", self.state),
            }),
        }
    }
}

impl Default for DialogHandshake {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Decides how to answer a dialog
pub trait DialogHandler: Send + Sync {
    /// Classify the dialog and choose a response
    fn handle(&self, dialog: &Dialog) -> DialogResponse;
}

impl<F> DialogHandler for F
where
    F: Fn(&Dialog) -> DialogResponse + Send + Sync,
{
    fn handle(&self, dialog: &Dialog) -> DialogResponse {
        self(dialog)
    }
}

/// Fixed answer for every dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoDialogBehavior {
    /// Accept all dialogs
    AcceptAll,
    /// Dismiss all dialogs
    DismissAll,
}

impl DialogHandler for AutoDialogBehavior {
    fn handle(&self, _dialog: &Dialog) -> DialogResponse {
        match self {
            Self::AcceptAll => DialogResponse::Accept,
            Self::DismissAll => DialogResponse::Dismiss,
        }
    }
}

/// A dialog together with the answer it received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledDialog {
    /// The dialog
    pub dialog: Dialog,
    /// The answer
    pub response: DialogResponse,
}

/// Handler wrapper that keeps a history of every dialog it answered
#[derive(Clone)]
pub struct DialogRecorder {
    inner: Arc<dyn DialogHandler>,
    history: Arc<Mutex<Vec<HandledDialog>>>,
}

impl DialogRecorder {
    /// Record the answers of `handler`
    pub fn new(handler: impl DialogHandler + 'static) -> Self {
        Self {
            inner: Arc::new(handler),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Recorder that accepts everything
    #[must_use]
    pub fn accepting() -> Self {
        Self::new(AutoDialogBehavior::AcceptAll)
    }

    /// Recorder that dismisses everything
    #[must_use]
    pub fn dismissing() -> Self {
        Self::new(AutoDialogBehavior::DismissAll)
    }

    /// All handled dialogs in order
    #[must_use]
    pub fn dialogs(&self) -> Vec<HandledDialog> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Number of handled dialogs
    #[must_use]
    pub fn count(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Most recent dialog
    #[must_use]
    pub fn last(&self) -> Option<HandledDialog> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }

    /// Check that exactly one dialog of `kind` with `message` was handled
    pub fn expect_one(&self, kind: DialogKind, message: &str) -> ProbeResult<HandledDialog> {
        let dialogs = self.dialogs();
        match dialogs.as_slice() {
            [only] if only.dialog.kind() == kind && only.dialog.message() == message => {
                Ok(only.clone())
            }
            [only] => Err(ProbeError::assertion(
                format!("{kind} dialog {message:?}"),
                format!("{} dialog {:?}", only.dialog.kind(), only.dialog.message()),
            )),
            other => Err(ProbeError::assertion(
                format!("exactly one {kind} dialog {message:?}"),
                format!("{} dialogs", other.len()),
            )),
        }
    }
}

impl DialogHandler for DialogRecorder {
    fn handle(&self, dialog: &Dialog) -> DialogResponse {
        let response = self.inner.handle(dialog);
        if let Ok(mut history) = self.history.lock() {
            history.push(HandledDialog {
                dialog: dialog.clone(),
                response: response.clone(),
            });
        }
        response
    }
}

impl std::fmt::Debug for DialogRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRecorder")
            .field("count", &self.count())
            .finish()
    }
}

/// Keeps a dialog handler installed until dropped.
///
/// Installing a new handler supersedes the previous guard; dropping a
/// superseded guard leaves the newer handler in place.
#[must_use = "the handler is removed as soon as the guard is dropped"]
pub struct DialogGuard {
    driver: Arc<dyn PageDriver>,
    slot: Arc<AtomicU64>,
    generation: u64,
}

impl DialogGuard {
    pub(crate) fn install(
        driver: Arc<dyn PageDriver>,
        slot: Arc<AtomicU64>,
        handler: Arc<dyn DialogHandler>,
    ) -> Self {
        let generation = slot.fetch_add(1, Ordering::SeqCst) + 1;
        driver.set_dialog_handler(Some(handler));
        Self {
            driver,
            slot,
            generation,
        }
    }
}

impl Drop for DialogGuard {
    fn drop(&mut self) {
        if self.slot.load(Ordering::SeqCst) == self.generation {
            self.driver.set_dialog_handler(None);
        }
    }
}

impl std::fmt::Debug for DialogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogGuard")
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod dialog_tests {
        use super::*;

        #[test]
        fn test_constructors() {
            assert_eq!(Dialog::alert("hi").kind(), DialogKind::Alert);
            assert_eq!(Dialog::confirm("sure?").kind(), DialogKind::Confirm);
            let prompt = Dialog::prompt("name?", Some("anon".to_string()));
            assert_eq!(prompt.kind(), DialogKind::Prompt);
            assert_eq!(prompt.default_value(), Some("anon"));
        }

        #[test]
        fn test_kind_parse_and_display() {
            for kind in [
                DialogKind::Alert,
                DialogKind::Confirm,
                DialogKind::Prompt,
                DialogKind::BeforeUnload,
            ] {
                assert_eq!(DialogKind::parse(&kind.to_string()), Some(kind));
            }
            assert_eq!(DialogKind::parse("toast"), None);
        }

        #[test]
        fn test_unhandled_conversion() {
            let err: ProbeError = Dialog::alert("You clicked a button").into();
            assert!(matches!(err, ProbeError::UnhandledDialog { ref kind, .. } if kind == "alert"));
        }
    }

    mod response_tests {
        use super::*;

        #[test]
        fn test_prompt_text() {
            let prompt = Dialog::prompt("name?", None);
            assert_eq!(
                DialogResponse::AcceptWith("Test Data".to_string()).prompt_text(&prompt),
                Some("Test Data".to_string())
            );
            assert_eq!(DialogResponse::Accept.prompt_text(&prompt), Some(String::new()));
            assert_eq!(DialogResponse::Dismiss.prompt_text(&prompt), None);
        }

        #[test]
        fn test_prompt_text_ignored_for_alert() {
            let alert = Dialog::alert("hi");
            assert_eq!(
                DialogResponse::AcceptWith("x".to_string()).prompt_text(&alert),
                None
            );
        }
    }

    mod handshake_tests {
        use super::*;

        #[test]
        fn test_accept_cycle() {
            let mut handshake = DialogHandshake::new();
            handshake.raise(&Dialog::confirm("Do you confirm action?")).unwrap();
            assert!(matches!(handshake.state(), DialogState::Raised { kind: DialogKind::Confirm, .. }));
            handshake.respond(&DialogResponse::Accept).unwrap();
            assert_eq!(handshake.complete().unwrap(), DialogState::Accepted(None));
            assert_eq!(handshake.state(), &DialogState::Idle);
        }

        #[test]
        fn test_dismiss_cycle() {
            let mut handshake = DialogHandshake::new();
            handshake.raise(&Dialog::confirm("Do you confirm action?")).unwrap();
            handshake.respond(&DialogResponse::Dismiss).unwrap();
            assert_eq!(handshake.complete().unwrap(), DialogState::Dismissed);
        }

        #[test]
        fn test_double_answer_rejected() {
            let mut handshake = DialogHandshake::new();
            handshake.raise(&Dialog::confirm("?")).unwrap();
            handshake.respond(&DialogResponse::Accept).unwrap();
            let err = handshake.respond(&DialogResponse::Dismiss).unwrap_err();
            assert!(matches!(err, ProbeError::Dialog { .. }));
        }

        #[test]
        fn test_answer_without_dialog_rejected() {
            let mut handshake = DialogHandshake::new();
            assert!(handshake.respond(&DialogResponse::Accept).is_err());
            assert!(handshake.complete().is_err());
        }

        #[test]
        fn test_raise_while_open_rejected() {
            let mut handshake = DialogHandshake::new();
            handshake.raise(&Dialog::alert("one")).unwrap();
            assert!(handshake.raise(&Dialog::alert("two")).is_err());
        }

        #[test]
        fn test_prompt_value_carried() {
            let mut handshake = DialogHandshake::new();
            handshake.raise(&Dialog::prompt("Please enter your name", None)).unwrap();
            handshake
                .respond(&DialogResponse::AcceptWith("Test Data".to_string()))
                .unwrap();
            assert_eq!(
                handshake.complete().unwrap(),
                DialogState::Accepted(Some("Test Data".to_string()))
            );
        }
    }

    mod recorder_tests {
        use super::*;

        #[test]
        fn test_records_closure_answers() {
            let recorder = DialogRecorder::new(|dialog: &Dialog| {
                if dialog.kind() == DialogKind::Confirm {
                    DialogResponse::Dismiss
                } else {
                    DialogResponse::Accept
                }
            });
            assert_eq!(recorder.handle(&Dialog::confirm("?")), DialogResponse::Dismiss);
            assert_eq!(recorder.handle(&Dialog::alert("!")), DialogResponse::Accept);
            assert_eq!(recorder.count(), 2);
            assert_eq!(recorder.last().unwrap().dialog.message(), "!");
        }

        #[test]
        fn test_expect_one() {
            let recorder = DialogRecorder::accepting();
            recorder.handle(&Dialog::alert("You clicked a button"));
            let handled = recorder
                .expect_one(DialogKind::Alert, "You clicked a button")
                .unwrap();
            assert_eq!(handled.response, DialogResponse::Accept);
            assert!(recorder.expect_one(DialogKind::Confirm, "x").is_err());
        }

        #[test]
        fn test_expect_one_rejects_none_and_many() {
            let recorder = DialogRecorder::dismissing();
            assert!(recorder.expect_one(DialogKind::Alert, "x").is_err());
            recorder.handle(&Dialog::alert("x"));
            recorder.handle(&Dialog::alert("x"));
            assert!(recorder.expect_one(DialogKind::Alert, "x").is_err());
        }

        #[test]
        fn test_clones_share_history() {
            let recorder = DialogRecorder::accepting();
            let clone = recorder.clone();
            clone.handle(&Dialog::alert("shared"));
            assert_eq!(recorder.count(), 1);
        }
    }
}
