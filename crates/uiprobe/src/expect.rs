//! Locator expectations built on the polling loop.
//!
//! `expect(&page, locator).to_be_visible().await` re-resolves the locator
//! every poll interval until the condition holds or the assertion timeout
//! from [`HarnessConfig`](crate::config::HarnessConfig) elapses.
//!
//! Single-element expectations are strict: a locator matching more than
//! one element fails immediately with `NotFound { matched: n }` rather than
//! waiting out the timeout. [`Expectation::to_have_count`] is the only
//! expectation that looks at every match.

use crate::driver::ElementHandle;
use crate::event::UrlPattern;
use crate::locator::{normalize_text, Locator};
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll, wait_for, Observed, Outcome, Polled, WaitOptions};

/// Start an expectation on `locator`
#[must_use]
pub fn expect(page: &Page, locator: Locator) -> Expectation<'_> {
    Expectation {
        page,
        locator,
        negate: false,
        ignore_case: false,
        options: page.config().assertion_wait(),
    }
}

/// Start an expectation on the page itself
#[must_use]
pub fn expect_page(page: &Page) -> PageExpectation<'_> {
    PageExpectation {
        page,
        options: page.config().assertion_wait(),
    }
}

/// One-shot check for values already read from the page
pub fn ensure(
    condition: bool,
    expected: impl Into<String>,
    observed: impl Into<String>,
) -> ProbeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::assertion(expected, observed))
    }
}

/// One-shot equality check
pub fn ensure_eq<T>(expected: T, observed: T) -> ProbeResult<()>
where
    T: PartialEq + std::fmt::Debug,
{
    ensure(
        expected == observed,
        format!("{expected:?}"),
        format!("{observed:?}"),
    )
}

/// One evaluation of an expectation
#[derive(Debug, Clone)]
enum Reading {
    Checked { satisfied: bool, observed: String },
    Ambiguous(usize),
}

impl Outcome for Reading {
    fn is_satisfied(&self) -> bool {
        matches!(self, Self::Checked { satisfied: true, .. })
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }

    fn describe(&self) -> String {
        match self {
            Self::Checked { observed, .. } => observed.clone(),
            Self::Ambiguous(n) => format!("{n} matches"),
        }
    }
}

const NO_MATCH: &str = "no match";

fn fold(text: &str, ignore_case: bool) -> String {
    let text = normalize_text(text);
    if ignore_case {
        text.to_lowercase()
    } else {
        text
    }
}

async fn observe<F>(
    page: &Page,
    locator: &Locator,
    strict: bool,
    negate: bool,
    test: &F,
) -> ProbeResult<Reading>
where
    F: Fn(&[ElementHandle]) -> (bool, String),
{
    let matches = page.resolve(locator).await?;
    if strict && matches.len() > 1 {
        return Ok(Reading::Ambiguous(matches.len()));
    }
    let (holds, observed) = test(&matches);
    Ok(Reading::Checked {
        satisfied: holds != negate,
        observed,
    })
}

async fn url_matches(page: &Page, pattern: &UrlPattern) -> ProbeResult<Observed> {
    let url = page.url().await?;
    Ok(Observed::new(pattern.matches(&url), url))
}

/// Pending assertion about a locator
#[derive(Debug, Clone)]
pub struct Expectation<'a> {
    page: &'a Page,
    locator: Locator,
    negate: bool,
    ignore_case: bool,
    options: WaitOptions,
}

impl<'a> Expectation<'a> {
    /// Invert the next assertion
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub const fn not(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Override the assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.options.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Compare text case-insensitively
    #[must_use]
    pub const fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Poll `test` against the current matches
    async fn run<F>(self, what: String, strict: bool, test: F) -> ProbeResult<()>
    where
        F: Fn(&[ElementHandle]) -> (bool, String),
    {
        let description = if self.negate {
            format!("{} not {what}", self.locator)
        } else {
            format!("{} {what}", self.locator)
        };
        let page = self.page;
        let locator = &self.locator;
        let negate = self.negate;
        let options = &self.options;
        let test = &test;

        page.step(format!("expect {description}"), async {
            let polled = poll(|| observe(page, locator, strict, negate, test), options).await?;
            match polled {
                Polled::Satisfied { elapsed, .. } => {
                    tracing::debug!(expectation = %description, elapsed_ms = elapsed.as_millis() as u64, "expectation met");
                    Ok(())
                }
                Polled::Aborted {
                    value: Reading::Ambiguous(matched),
                    ..
                } => Err(ProbeError::NotFound {
                    locator: locator.to_string(),
                    matched,
                    timeout_ms: options.timeout_ms,
                }),
                Polled::Aborted { value: last, elapsed } | Polled::TimedOut { last, elapsed, .. } => {
                    Err(ProbeError::Timeout {
                        waited_for: description.clone(),
                        timeout_ms: options.timeout_ms,
                        elapsed_ms: elapsed.as_millis() as u64,
                        last_observed: Some(last.describe()),
                    })
                }
            }
        })
        .await
    }

    /// Strict check on the single match (`None` when nothing matches)
    async fn run_single<F>(self, what: String, test: F) -> ProbeResult<()>
    where
        F: Fn(Option<&ElementHandle>) -> (bool, String),
    {
        self.run(what, true, move |matches| test(matches.first()))
            .await
    }

    /// The single match is visible
    pub async fn to_be_visible(self) -> ProbeResult<()> {
        self.run_single("to be visible".to_string(), |element| match element {
            Some(e) if e.visible => (true, "visible".to_string()),
            Some(_) => (false, "hidden".to_string()),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// The locator matches nothing visible
    pub async fn to_be_hidden(self) -> ProbeResult<()> {
        self.not().to_be_visible().await
    }

    /// Full text equals `expected` after whitespace normalization
    pub async fn to_have_text(self, expected: &str) -> ProbeResult<()> {
        let ignore_case = self.ignore_case;
        let wanted = fold(expected, ignore_case);
        let what = format!("to have text {expected:?}");
        self.run_single(what, move |element| match element {
            Some(e) => (fold(&e.full_text, ignore_case) == wanted, format!("{:?}", e.full_text)),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Full text contains `expected`
    pub async fn to_contain_text(self, expected: &str) -> ProbeResult<()> {
        let ignore_case = self.ignore_case;
        let wanted = fold(expected, ignore_case);
        let what = format!("to contain text {expected:?}");
        self.run_single(what, move |element| match element {
            Some(e) => (
                fold(&e.full_text, ignore_case).contains(&wanted),
                format!("{:?}", e.full_text),
            ),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Class list contains the token `class`
    pub async fn to_have_class(self, class: &str) -> ProbeResult<()> {
        self.run_single(format!("to have class {class:?}"), |element| match element {
            Some(e) => (
                e.has_class(class),
                format!("class={:?}", e.attribute("class").unwrap_or_default()),
            ),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Checkbox or radio is checked
    pub async fn to_be_checked(self) -> ProbeResult<()> {
        self.run_single("to be checked".to_string(), |element| match element {
            Some(e) if e.checked => (true, "checked".to_string()),
            Some(_) => (false, "unchecked".to_string()),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Checkbox or radio is not checked
    pub async fn to_be_unchecked(self) -> ProbeResult<()> {
        self.not().to_be_checked().await
    }

    /// Element is enabled
    pub async fn to_be_enabled(self) -> ProbeResult<()> {
        self.run_single("to be enabled".to_string(), |element| match element {
            Some(e) if e.enabled => (true, "enabled".to_string()),
            Some(_) => (false, "disabled".to_string()),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Element is disabled; a missing element is neither
    pub async fn to_be_disabled(self) -> ProbeResult<()> {
        self.run_single("to be disabled".to_string(), |element| match element {
            Some(e) if !e.enabled => (true, "disabled".to_string()),
            Some(_) => (false, "enabled".to_string()),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Form control value equals `expected`
    pub async fn to_have_value(self, expected: &str) -> ProbeResult<()> {
        self.run_single(format!("to have value {expected:?}"), |element| match element {
            Some(ElementHandle {
                value: Some(value), ..
            }) => (value == expected, format!("{value:?}")),
            Some(e) => (false, format!("<{}> has no value", e.tag)),
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Attribute `name` equals `expected`
    pub async fn to_have_attribute(self, name: &str, expected: &str) -> ProbeResult<()> {
        self.run_single(format!("to have {name}={expected:?}"), |element| match element {
            Some(e) => match e.attribute(name) {
                Some(value) => (value == expected, format!("{name}={value:?}")),
                None => (false, format!("no {name} attribute")),
            },
            None => (false, NO_MATCH.to_string()),
        })
        .await
    }

    /// Exactly `count` matches, visible or not
    pub async fn to_have_count(self, count: usize) -> ProbeResult<()> {
        self.run(format!("to have count {count}"), false, |matches| {
            (matches.len() == count, format!("{} matches", matches.len()))
        })
        .await
    }
}

/// Pending assertion about the page
#[derive(Debug, Clone)]
pub struct PageExpectation<'a> {
    page: &'a Page,
    options: WaitOptions,
}

impl<'a> PageExpectation<'a> {
    /// Override the assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Current URL matches `pattern`
    pub async fn to_have_url(self, pattern: UrlPattern) -> ProbeResult<()> {
        let page = self.page;
        let pattern = &pattern;
        wait_for(
            &format!("url to match {pattern:?}"),
            || url_matches(page, pattern),
            &self.options,
        )
        .await
        .map(|_| ())
    }
}
