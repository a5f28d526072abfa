//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a description, never a live handle: a resolution strategy
//! ([`Selector`]), an optional scoping parent (element or frame), text filters
//! and an optional positional pick. Every use re-resolves it against the
//! current page state, so a page object can hold locators for its whole life
//! without caching stale elements.
//!
//! # Design Philosophy
//!
//! - **Semantic first**: role, label, placeholder and text strategies mirror how
//!   a user finds a control; CSS is the escape hatch
//! - **Immutable builders**: every refinement returns a new `Locator`
//! - **Strict by default**: single-target interactions fail when more than one
//!   element matches (enforced by the page, see [`crate::page::Page`])

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::driver::MouseButton;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Resolution strategy of a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Selector {
    /// ARIA role with an optional accessible name
    Role {
        /// Role name (button, link, row, tab, ...)
        role: String,
        /// Accessible name to match
        name: Option<String>,
        /// Exact (case-sensitive, whole-string) name match
        exact: bool,
    },
    /// Control associated with a label text (or `aria-label`)
    Label {
        /// Label text
        text: String,
        /// Exact match
        exact: bool,
    },
    /// Input with a placeholder text
    Placeholder {
        /// Placeholder text
        text: String,
        /// Exact match
        exact: bool,
    },
    /// CSS selector (e.g., "#submit", ".list-group-item-action")
    Css {
        /// Selector source
        selector: String,
    },
    /// Element whose own text matches
    Text {
        /// Text to match
        text: String,
        /// Exact match
        exact: bool,
    },
    /// Element with a `title` attribute
    Title {
        /// Title text
        text: String,
        /// Exact match
        exact: bool,
    },
}

impl Selector {
    /// Set the exact-match flag where the strategy has one
    #[must_use]
    pub fn with_exact(mut self, value: bool) -> Self {
        match &mut self {
            Self::Role { exact, .. }
            | Self::Label { exact, .. }
            | Self::Placeholder { exact, .. }
            | Self::Text { exact, .. }
            | Self::Title { exact, .. } => *exact = value,
            Self::Css { .. } => {}
        }
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |exact: &bool| if *exact { "s" } else { "i" };
        match self {
            Self::Role { role, name, exact } => match name {
                Some(name) => write!(f, "role={role}[name={name:?}{}]", suffix(exact)),
                None => write!(f, "role={role}"),
            },
            Self::Label { text, exact } => write!(f, "label={text:?}{}", suffix(exact)),
            Self::Placeholder { text, exact } => {
                write!(f, "placeholder={text:?}{}", suffix(exact))
            }
            Self::Css { selector } => write!(f, "css={selector}"),
            Self::Text { text, exact } => write!(f, "text={text:?}{}", suffix(exact)),
            Self::Title { text, exact } => write!(f, "title={text:?}{}", suffix(exact)),
        }
    }
}

/// Scoping parent of a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parent", rename_all = "snake_case")]
pub enum Scope {
    /// Resolve among descendants of the parent's matches
    Within(Locator),
    /// Resolve inside the document of the frame element the parent matches
    Frame(Locator),
}

/// Text filter applied after the selector matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Keep elements whose text contains the value (case-insensitive)
    HasText(String),
    /// Drop elements whose text contains the value (case-insensitive)
    HasNotText(String),
    /// Keep elements whose text matches the regular expression
    HasTextMatching(String),
}

/// Positional pick among the filtered matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Nth {
    /// First match in document order
    First,
    /// Last match in document order
    Last,
    /// Zero-based index
    Index(usize),
}

impl Nth {
    /// Pick from a list of matches
    #[must_use]
    pub fn pick<T>(self, mut matches: Vec<T>) -> Vec<T> {
        let index = match self {
            Self::First => 0,
            Self::Last => match matches.len().checked_sub(1) {
                Some(index) => index,
                None => return matches,
            },
            Self::Index(index) => index,
        };
        if index < matches.len() {
            vec![matches.swap_remove(index)]
        } else {
            Vec::new()
        }
    }
}

/// Immutable element description, re-resolved on every use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    scope: Option<Box<Scope>>,
    filters: Vec<Filter>,
    nth: Option<Nth>,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            selector,
            scope: None,
            filters: Vec::new(),
            nth: None,
        }
    }

    /// CSS selector locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Selector::Css {
            selector: selector.into(),
        })
    }

    /// Role locator; refine with [`Locator::name`]
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::new(Selector::Role {
            role: role.into(),
            name: None,
            exact: false,
        })
    }

    /// Label locator
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::new(Selector::Label {
            text: text.into(),
            exact: false,
        })
    }

    /// Placeholder locator
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(Selector::Placeholder {
            text: text.into(),
            exact: false,
        })
    }

    /// Text locator
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text {
            text: text.into(),
            exact: false,
        })
    }

    /// Title-attribute locator
    #[must_use]
    pub fn title(text: impl Into<String>) -> Self {
        Self::new(Selector::Title {
            text: text.into(),
            exact: false,
        })
    }

    /// Enter the document of an `<iframe>` matched by `selector`
    #[must_use]
    pub fn frame(selector: impl Into<String>) -> FrameLocator {
        FrameLocator {
            frame: Self::css(selector),
        }
    }

    /// Set the accessible name of a role locator (no-op for other strategies)
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        if let Selector::Role { name, .. } = &mut self.selector {
            *name = Some(value.into());
        }
        self
    }

    /// Require an exact, case-sensitive match
    #[must_use]
    pub fn exact(self) -> Self {
        self.with_exact(true)
    }

    /// Set the exact-match flag explicitly
    #[must_use]
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.selector = self.selector.with_exact(exact);
        self
    }

    /// Resolve `child` among descendants of this locator's matches
    #[must_use]
    pub fn locator(&self, child: Self) -> Self {
        child.rooted(Scope::Within(self.clone()))
    }

    /// Shorthand for `self.locator(Locator::css(selector))`
    #[must_use]
    pub fn css_within(&self, selector: impl Into<String>) -> Self {
        self.locator(Self::css(selector))
    }

    /// Shorthand for `self.locator(Locator::text(text))`
    #[must_use]
    pub fn text_within(&self, text: impl Into<String>) -> Self {
        self.locator(Self::text(text))
    }

    /// Shorthand for `self.locator(Locator::role(role))`
    #[must_use]
    pub fn role_within(&self, role: impl Into<String>) -> Self {
        self.locator(Self::role(role))
    }

    /// Keep matches containing `text`
    #[must_use]
    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.filters.push(Filter::HasText(text.into()));
        self
    }

    /// Drop matches containing `text`
    #[must_use]
    pub fn has_not_text(mut self, text: impl Into<String>) -> Self {
        self.filters.push(Filter::HasNotText(text.into()));
        self
    }

    /// Keep matches whose text matches a regular expression
    #[must_use]
    pub fn has_text_matching(mut self, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::HasTextMatching(pattern.into()));
        self
    }

    /// First match
    #[must_use]
    pub fn first(mut self) -> Self {
        self.nth = Some(Nth::First);
        self
    }

    /// Last match
    #[must_use]
    pub fn last(mut self) -> Self {
        self.nth = Some(Nth::Last);
        self
    }

    /// Zero-based positional match
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(Nth::Index(index));
        self
    }

    /// Resolution strategy
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Scoping parent, if any
    #[must_use]
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_deref()
    }

    /// Text filters in application order
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Positional pick, if any
    #[must_use]
    pub const fn nth_pick(&self) -> Option<Nth> {
        self.nth
    }

    /// Attach `scope` at the outermost end of this locator's scope chain
    fn rooted(mut self, scope: Scope) -> Self {
        self.scope = Some(Box::new(match self.scope.take().map(|boxed| *boxed) {
            None => scope,
            Some(Scope::Within(parent)) => Scope::Within(parent.rooted(scope)),
            Some(Scope::Frame(parent)) => Scope::Frame(parent.rooted(scope)),
        }));
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope.as_deref() {
            Some(Scope::Within(parent)) => write!(f, "{parent} >> ")?,
            Some(Scope::Frame(parent)) => write!(f, "frame({parent}) >> ")?,
            None => {}
        }
        write!(f, "{}", self.selector)?;
        for filter in &self.filters {
            match filter {
                Filter::HasText(text) => write!(f, " >> has_text={text:?}")?,
                Filter::HasNotText(text) => write!(f, " >> has_not_text={text:?}")?,
                Filter::HasTextMatching(pattern) => write!(f, " >> has_text=/{pattern}/")?,
            }
        }
        match self.nth {
            Some(Nth::First) => write!(f, " >> first"),
            Some(Nth::Last) => write!(f, " >> last"),
            Some(Nth::Index(index)) => write!(f, " >> nth={index}"),
            None => Ok(()),
        }
    }
}

/// Entry point into an `<iframe>` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLocator {
    frame: Locator,
}

impl FrameLocator {
    /// Resolve `child` inside the frame document
    #[must_use]
    pub fn locator(&self, child: Locator) -> Locator {
        child.rooted(Scope::Frame(self.frame.clone()))
    }

    /// Shorthand for a CSS locator inside the frame
    #[must_use]
    pub fn css(&self, selector: impl Into<String>) -> Locator {
        self.locator(Locator::css(selector))
    }

    /// Enter a frame nested inside this one
    #[must_use]
    pub fn frame(&self, selector: impl Into<String>) -> Self {
        Self {
            frame: self.css(selector),
        }
    }

    /// The locator of the `<iframe>` element itself
    #[must_use]
    pub const fn owner(&self) -> &Locator {
        &self.frame
    }
}

/// Options for [`crate::page::Page::click_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOptions {
    /// Mouse button
    pub button: MouseButton,
    /// 1 for a click, 2 for a double click
    pub click_count: u32,
    /// Override the locator's exact-match flag for this click
    pub exact: Option<bool>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            exact: None,
        }
    }
}

impl ClickOptions {
    /// Double click with the left button
    #[must_use]
    pub fn double() -> Self {
        Self {
            click_count: 2,
            ..Self::default()
        }
    }

    /// Click with the right button
    #[must_use]
    pub fn right() -> Self {
        Self {
            button: MouseButton::Right,
            ..Self::default()
        }
    }

    /// Set exact matching for this click
    #[must_use]
    pub const fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }
}

// ============================================================================
// Text matching shared by every backend
// ============================================================================

/// Collapse runs of whitespace into single spaces and trim the ends
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Match `candidate` against `needle`.
///
/// Exact matching compares whitespace-normalized strings case-sensitively;
/// otherwise the normalized needle must occur in the candidate ignoring case.
#[must_use]
pub fn text_matches(needle: &str, candidate: &str, exact: bool) -> bool {
    let needle = normalize_text(needle);
    let candidate = normalize_text(candidate);
    if exact {
        candidate == needle
    } else {
        candidate.to_lowercase().contains(&needle.to_lowercase())
    }
}
