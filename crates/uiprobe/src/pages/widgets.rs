//! The Widgets group: accordion, autocomplete, date picker, slider, progress
//! bar, tabs, tool tips, menu and select menu.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{wait_for, wait_stable, Observed, WaitOptions};

// ============================================================================
// Accordion
// ============================================================================

/// Sections of the accordion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccordionSection {
    /// "What is Lorem Ipsum?"
    WhatIsLoremIpsum,
    /// "Where does it come from?"
    WhereDoesItComeFrom,
    /// "Why do we use it?"
    WhyDoWeUseIt,
}

impl AccordionSection {
    /// Header text
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::WhatIsLoremIpsum => "What is Lorem Ipsum?",
            Self::WhereDoesItComeFrom => "Where does it come from?",
            Self::WhyDoWeUseIt => "Why do we use it?",
        }
    }

    /// Start of the section body
    #[must_use]
    pub const fn content(self) -> &'static str {
        match self {
            Self::WhatIsLoremIpsum => "Lorem Ipsum is simply dummy",
            Self::WhereDoesItComeFrom => "Contrary to popular belief",
            Self::WhyDoWeUseIt => "It is a long established fact",
        }
    }
}

/// `/accordian`
#[derive(Debug, Clone)]
pub struct AccordionPage<'p> {
    page: &'p Page,
}

impl<'p> AccordionPage<'p> {
    /// Accordion page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Header of a section
    #[must_use]
    pub fn heading(&self, section: AccordionSection) -> Locator {
        Locator::text(section.heading())
    }

    /// Body of a section
    #[must_use]
    pub fn content(&self, section: AccordionSection) -> Locator {
        Locator::text(section.content())
    }

    /// Click a section header
    pub async fn toggle(&self, section: AccordionSection) -> ProbeResult<()> {
        self.page.click(&self.heading(section)).await
    }
}

#[async_trait]
impl PageObject for AccordionPage<'_> {
    fn path(&self) -> &str {
        "/accordian"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Auto Complete
// ============================================================================

/// `/auto-complete`
#[derive(Debug, Clone)]
pub struct AutoCompletePage<'p> {
    page: &'p Page,
    /// Multi-value container
    pub multiple_container: Locator,
    /// Multi-value input
    pub multiple_input: Locator,
    /// Single-value container
    pub single_container: Locator,
    /// Single-value input
    pub single_input: Locator,
    /// Suggestion menu
    pub menu: Locator,
    /// Clears every chosen value
    pub clear_indicator: Locator,
}

impl<'p> AutoCompletePage<'p> {
    /// Autocomplete page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            multiple_container: Locator::css("#autoCompleteMultipleContainer"),
            multiple_input: Locator::css("#autoCompleteMultipleInput"),
            single_container: Locator::css("#autoCompleteSingleContainer"),
            single_input: Locator::css("#autoCompleteSingleInput"),
            menu: Locator::css(".auto-complete__menu"),
            clear_indicator: Locator::css(".auto-complete__indicator"),
        }
    }

    /// Suggestion for `color` in the open menu
    #[must_use]
    pub fn option(&self, color: &str) -> Locator {
        self.menu.locator(Locator::text(color).exact())
    }

    /// Chosen value `color` in the multi-value container
    #[must_use]
    pub fn chip(&self, color: &str) -> Locator {
        self.multiple_container.locator(Locator::text(color).exact())
    }

    /// Type into the multi-value input
    pub async fn type_multiple(&self, text: &str) -> ProbeResult<()> {
        self.page.fill(&self.multiple_input, text).await
    }

    /// Type into the single-value input
    pub async fn type_single(&self, text: &str) -> ProbeResult<()> {
        self.page.fill(&self.single_input, text).await
    }

    /// Pick `color` from the open menu
    pub async fn pick(&self, color: &str) -> ProbeResult<()> {
        self.page.click(&self.option(color)).await
    }

    /// Type `text` into the multi-value input and pick `color`
    pub async fn add_color(&self, text: &str, color: &str) -> ProbeResult<()> {
        self.type_multiple(text).await?;
        self.pick(color).await
    }

    /// Type `text` into the single-value input and pick `color`
    pub async fn choose_single(&self, text: &str, color: &str) -> ProbeResult<()> {
        self.type_single(text).await?;
        self.pick(color).await
    }

    /// Remove the first chosen value with its cross icon
    pub async fn remove_first_chip(&self) -> ProbeResult<()> {
        self.page
            .click(&self.multiple_container.css_within("svg").first())
            .await
    }

    /// Remove every chosen value
    pub async fn clear_all(&self) -> ProbeResult<()> {
        self.page.click(&self.clear_indicator).await
    }

    /// Press Backspace in the empty multi-value input
    pub async fn backspace(&self) -> ProbeResult<()> {
        self.page.press_on(&self.multiple_input, "Backspace").await
    }
}

#[async_trait]
impl PageObject for AutoCompletePage<'_> {
    fn path(&self) -> &str {
        "/auto-complete"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Date Picker
// ============================================================================

/// Format of the month/year picker input
pub const PICKER_INPUT_FORMAT: &str = "%m/%d/%Y";

/// Accessible label of a calendar day, e.g. "Choose Thursday, December 31st, 1987"
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    format!(
        "Choose {}, {} {}, {}",
        date.format("%A"),
        date.format("%B"),
        ordinal(date.day()),
        date.year()
    )
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// `/date-picker`
#[derive(Debug, Clone)]
pub struct DatePickerPage<'p> {
    page: &'p Page,
    /// Date-only input
    pub input: Locator,
    /// Calendar header with the shown month
    pub header: Locator,
    /// Month dropdown inside the calendar
    pub month_select: Locator,
    /// Year dropdown inside the calendar
    pub year_select: Locator,
    /// Grid of days of the shown month
    pub month_container: Locator,
}

impl<'p> DatePickerPage<'p> {
    /// Date picker page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            input: Locator::css("#datePickerMonthYearInput"),
            header: Locator::css(".react-datepicker__header"),
            month_select: Locator::css(".react-datepicker__month-select"),
            year_select: Locator::css(".react-datepicker__year-select"),
            month_container: Locator::css(".react-datepicker__month-container"),
        }
    }

    /// Day `day` of the shown month
    #[must_use]
    pub fn day(&self, day: u32) -> Locator {
        self.month_container.locator(Locator::text(day.to_string()).exact())
    }

    /// Type `date` into the input
    pub async fn type_date(&self, date: NaiveDate) -> ProbeResult<()> {
        self.page
            .fill(&self.input, &date.format(PICKER_INPUT_FORMAT).to_string())
            .await
    }

    /// Open the calendar, pick month and year from the dropdowns, then click the day
    pub async fn pick(&self, date: NaiveDate) -> ProbeResult<()> {
        self.page.click(&self.input).await?;
        self.page
            .select_option(&self.month_select, date.month0().to_string())
            .await?;
        self.page
            .select_option(&self.year_select, date.year().to_string())
            .await?;
        self.page.click(&Locator::label(day_label(date))).await
    }

    /// Current input value
    pub async fn value(&self) -> ProbeResult<String> {
        self.page.input_value(&self.input).await
    }
}

#[async_trait]
impl PageObject for DatePickerPage<'_> {
    fn path(&self) -> &str {
        "/date-picker"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Slider
// ============================================================================

/// `/slider`
#[derive(Debug, Clone)]
pub struct SliderPage<'p> {
    page: &'p Page,
    /// Range input
    pub slider: Locator,
    /// Read-only mirror of the slider value
    pub value_display: Locator,
}

impl<'p> SliderPage<'p> {
    /// Slider page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            slider: Locator::css(".range-slider"),
            value_display: Locator::css("#sliderValue"),
        }
    }

    /// Move the slider to `value`
    pub async fn set_value(&self, value: u32) -> ProbeResult<()> {
        self.page.fill(&self.slider, &value.to_string()).await
    }

    /// Value shown next to the slider
    pub async fn displayed_value(&self) -> ProbeResult<u32> {
        let text = self.page.input_value(&self.value_display).await?;
        text.parse()
            .map_err(|_| ProbeError::assertion("numeric slider value", text))
    }
}

#[async_trait]
impl PageObject for SliderPage<'_> {
    fn path(&self) -> &str {
        "/slider"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Progress Bar
// ============================================================================

/// Poll interval used while chasing a moving progress bar
const PROGRESS_POLL_MS: u64 = 10;

/// `/progress-bar`
#[derive(Debug, Clone)]
pub struct ProgressBarPage<'p> {
    page: &'p Page,
    /// Start/Stop toggle
    pub start_stop: Locator,
    /// Reset button, shown once the bar is full
    pub reset: Locator,
    /// The bar itself
    pub bar: Locator,
}

async fn progress_observation(page: &Page, bar: &Locator, satisfied: impl Fn(u32) -> bool) -> ProbeResult<Observed> {
    let value = progress_value(page, bar).await?;
    Ok(Observed::new(satisfied(value), format!("{value}%")))
}

async fn progress_value(page: &Page, bar: &Locator) -> ProbeResult<u32> {
    let raw = page.attribute(bar, "aria-valuenow").await?.unwrap_or_default();
    raw.parse()
        .map_err(|_| ProbeError::assertion("numeric aria-valuenow", raw))
}

impl<'p> ProgressBarPage<'p> {
    /// Progress bar page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            start_stop: Locator::css("#startStopButton"),
            reset: Locator::css("#resetButton"),
            bar: Locator::css("#progressBar .progress-bar"),
        }
    }

    /// Current value from `aria-valuenow`
    pub async fn value(&self) -> ProbeResult<u32> {
        progress_value(self.page, &self.bar).await
    }

    /// Click Start or Stop
    pub async fn toggle(&self) -> ProbeResult<()> {
        self.page.click(&self.start_stop).await
    }

    /// Click Reset
    pub async fn reset_bar(&self) -> ProbeResult<()> {
        self.page.click(&self.reset).await
    }

    /// Poll quickly until the bar reaches at least `target`
    pub async fn wait_for_value(&self, target: u32, timeout_ms: u64) -> ProbeResult<u32> {
        let options = WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(PROGRESS_POLL_MS);
        wait_for(
            &format!("progress to reach {target}%"),
            || progress_observation(self.page, &self.bar, |v| v >= target),
            &options,
        )
        .await?;
        self.value().await
    }

    /// Check the bar stays at `value` for `hold_ms`
    pub async fn hold_steady(&self, value: u32, hold_ms: u64) -> ProbeResult<()> {
        let options = self.page.config().assertion_wait();
        wait_stable(
            &format!("progress to stay at {value}%"),
            || progress_observation(self.page, &self.bar, |v| v == value),
            hold_ms,
            &options,
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl PageObject for ProgressBarPage<'_> {
    fn path(&self) -> &str {
        "/progress-bar"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Tabs
// ============================================================================

/// `/tabs`
#[derive(Debug, Clone)]
pub struct TabsPage<'p> {
    page: &'p Page,
}

impl<'p> TabsPage<'p> {
    /// Tabs page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Tab named `name`
    #[must_use]
    pub fn tab(&self, name: &str) -> Locator {
        Locator::role("tab").name(name).exact()
    }

    /// Text inside the visible panel
    #[must_use]
    pub fn panel_text(&self, text: &str) -> Locator {
        Locator::css(".tab-pane").locator(Locator::text(text))
    }

    /// Activate the tab named `name`
    pub async fn select(&self, name: &str) -> ProbeResult<()> {
        self.page.click(&self.tab(name)).await
    }
}

#[async_trait]
impl PageObject for TabsPage<'_> {
    fn path(&self) -> &str {
        "/tabs"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Tool Tips
// ============================================================================

/// `/tool-tips`
#[derive(Debug, Clone)]
pub struct ToolTipsPage<'p> {
    page: &'p Page,
    /// Button with a tip
    pub button: Locator,
    /// Text field with a tip
    pub field: Locator,
}

impl<'p> ToolTipsPage<'p> {
    /// Tool tips page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            button: Locator::role("button").name("Hover me to see"),
            field: Locator::placeholder("Hover me to see"),
        }
    }

    /// Link in the article text
    #[must_use]
    pub fn link(&self, name: &str) -> Locator {
        Locator::role("link").name(name)
    }

    /// Tip whose text contains `text`
    #[must_use]
    pub fn tip(&self, text: &str) -> Locator {
        Locator::role("tooltip").name(text)
    }

    /// Move the pointer over `target`
    pub async fn hover(&self, target: &Locator) -> ProbeResult<()> {
        self.page.hover(target).await
    }
}

#[async_trait]
impl PageObject for ToolTipsPage<'_> {
    fn path(&self) -> &str {
        "/tool-tips"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Menu
// ============================================================================

/// Top-level entries of the menu
pub const MAIN_ITEMS: [&str; 3] = ["Main Item 1", "Main Item 2", "Main Item 3"];

/// Entries under "Main Item 2"
pub const SUB_ITEMS: [&str; 3] = ["Sub Item", "Sub Item", "SUB SUB LIST \u{bb}"];

/// Entries under "SUB SUB LIST"
pub const SUB_SUB_ITEMS: [&str; 2] = ["Sub Sub Item 1", "Sub Sub Item 2"];

/// `/menu`; positions are one-based, like the `:nth-child` they map to
#[derive(Debug, Clone)]
pub struct MenuPage<'p> {
    page: &'p Page,
    /// Links of the top level
    pub main_items: Locator,
}

impl<'p> MenuPage<'p> {
    /// Menu page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            main_items: Locator::css("#nav > li > a"),
        }
    }

    /// Link of the main entry at `main`
    #[must_use]
    pub fn main_item(&self, main: usize) -> Locator {
        Locator::css(format!("#nav > li:nth-child({main}) > a"))
    }

    /// Links one level below the main entry at `main`
    #[must_use]
    pub fn sub_items(&self, main: usize) -> Locator {
        Locator::css(format!("#nav > li:nth-child({main}) > ul > li > a"))
    }

    /// Link of the sub entry at `sub` below the main entry at `main`
    #[must_use]
    pub fn sub_item(&self, main: usize, sub: usize) -> Locator {
        Locator::css(format!("#nav > li:nth-child({main}) > ul > li:nth-child({sub}) > a"))
    }

    /// Links below the sub entry at `sub`
    #[must_use]
    pub fn sub_sub_items(&self, main: usize, sub: usize) -> Locator {
        Locator::css(format!(
            "#nav > li:nth-child({main}) > ul > li:nth-child({sub}) > ul > li > a"
        ))
    }

    /// Hover the main entry at `main`
    pub async fn hover_main(&self, main: usize) -> ProbeResult<()> {
        self.page.hover(&self.main_item(main)).await
    }

    /// Hover the sub entry at `sub`; its main entry must be open
    pub async fn hover_sub(&self, main: usize, sub: usize) -> ProbeResult<()> {
        self.page.hover(&self.sub_item(main, sub)).await
    }

    /// Text of every match of `links`, shown or not
    pub async fn texts(&self, links: &Locator) -> ProbeResult<Vec<String>> {
        let count = self.page.count(links).await?;
        let mut texts = Vec::with_capacity(count);
        for index in 0..count {
            texts.push(self.page.text_content(&links.clone().nth(index)).await?);
        }
        Ok(texts)
    }
}

#[async_trait]
impl PageObject for MenuPage<'_> {
    fn path(&self) -> &str {
        "/menu"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Select Menu
// ============================================================================

/// `/select-menu`
#[derive(Debug, Clone)]
pub struct SelectMenuPage<'p> {
    page: &'p Page,
    /// Grouped dropdown
    pub with_opt_group: Locator,
    /// Title dropdown
    pub select_one: Locator,
    /// Native single select
    pub old_select: Locator,
    /// Native multi select
    pub cars: Locator,
}

impl<'p> SelectMenuPage<'p> {
    /// Select menu page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            with_opt_group: Locator::css("#withOptGroup"),
            select_one: Locator::css("#selectOne"),
            old_select: Locator::css("#oldSelectMenu"),
            cars: Locator::css("#cars"),
        }
    }

    /// Open the grouped dropdown and choose `option`
    pub async fn choose_grouped(&self, option: &str) -> ProbeResult<()> {
        self.page
            .click(&self.with_opt_group.locator(Locator::text("Select Option")))
            .await?;
        self.page
            .click(&self.with_opt_group.locator(Locator::text(option).exact()))
            .await
    }

    /// Labels of the chosen cars
    pub async fn chosen_cars(&self) -> ProbeResult<Vec<String>> {
        let chosen = self.cars.css_within("option:checked");
        let count = self.page.count(&chosen).await?;
        let mut labels = Vec::with_capacity(count);
        for index in 0..count {
            labels.push(self.page.text_content(&chosen.clone().nth(index)).await?);
        }
        Ok(labels)
    }
}

#[async_trait]
impl PageObject for SelectMenuPage<'_> {
    fn path(&self) -> &str {
        "/select-menu"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_day_label() {
        let date = NaiveDate::from_ymd_opt(1987, 12, 31).unwrap();
        assert_eq!(day_label(date), "Choose Thursday, December 31st, 1987");
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert_eq!(day_label(date), "Choose Tuesday, March 12th, 2024");
    }

    #[test]
    fn test_ordinal_suffixes() {
        for (day, expected) in [(1, "1st"), (2, "2nd"), (3, "3rd"), (4, "4th"), (11, "11th"), (13, "13th"), (22, "22nd"), (31, "31st")] {
            assert_eq!(ordinal(day), expected);
        }
    }
}
