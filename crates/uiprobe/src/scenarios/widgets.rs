//! Widgets: accordion, autocomplete, date picker, slider, progress bar, tabs,
//! tool tips, menu and select menu.

use chrono::NaiveDate;
use futures::FutureExt;

use crate::expect::{ensure, ensure_eq, expect};
use crate::fixture::SectionFixture;
use crate::harness::{Scenario, ScenarioGroup};
use crate::page::Page;
use crate::pages::widgets::{MAIN_ITEMS, SUB_ITEMS, SUB_SUB_ITEMS};
use crate::pages::{
    AccordionPage, AccordionSection, AutoCompletePage, DatePickerPage, MenuPage, ProgressBarPage,
    SelectMenuPage, SliderPage, TabsPage, ToolTipsPage,
};
use crate::result::{ProbeError, ProbeResult};

const GROUP: &str = "Widgets";

/// Generous bound for the bar to travel from empty to full
const PROGRESS_RUN_MS: u64 = 15_000;

/// Scenario groups of the Widgets section
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![
        accordion(),
        auto_complete(),
        date_picker(),
        slider(),
        progress_bar(),
        tabs(),
        tool_tips(),
        menu(),
        select_menu(),
    ]
}

// ============================================================================
// Accordion
// ============================================================================

fn accordion() -> ScenarioGroup {
    ScenarioGroup::new("Accordian")
        .with_fixture(SectionFixture::new(GROUP, "Accordian"))
        .scenario(Scenario::new("sections open one at a time", |page| {
            sections_open_one_at_a_time(page).boxed()
        }))
        .scenario(Scenario::new("second click collapses a section", |page| {
            second_click_collapses(page).boxed()
        }))
}

const SECTIONS: [AccordionSection; 3] = [
    AccordionSection::WhatIsLoremIpsum,
    AccordionSection::WhereDoesItComeFrom,
    AccordionSection::WhyDoWeUseIt,
];

/// Expect `open` (or nothing) to be the only expanded section
async fn expect_open(page: &Page, accordion: &AccordionPage<'_>, open: Option<AccordionSection>) -> ProbeResult<()> {
    for section in SECTIONS {
        let content = expect(page, accordion.content(section));
        if Some(section) == open {
            content.to_be_visible().await?;
        } else {
            content.to_be_hidden().await?;
        }
    }
    Ok(())
}

async fn sections_open_one_at_a_time(page: &Page) -> ProbeResult<()> {
    let accordion = AccordionPage::new(page);
    expect_open(page, &accordion, None).await?;
    for section in SECTIONS {
        accordion.toggle(section).await?;
        expect_open(page, &accordion, Some(section)).await?;
    }
    Ok(())
}

async fn second_click_collapses(page: &Page) -> ProbeResult<()> {
    let accordion = AccordionPage::new(page);
    let section = AccordionSection::WhereDoesItComeFrom;
    accordion.toggle(section).await?;
    expect_open(page, &accordion, Some(section)).await?;
    accordion.toggle(section).await?;
    expect_open(page, &accordion, None).await
}

// ============================================================================
// Auto Complete
// ============================================================================

fn auto_complete() -> ScenarioGroup {
    ScenarioGroup::new("Auto Complete")
        .with_fixture(SectionFixture::new(GROUP, "Auto Complete"))
        .scenario(Scenario::new("suggests colors containing the input", |page| {
            suggests_matching_colors(page).boxed()
        }))
        .scenario(Scenario::new("adds several colors", |page| {
            adds_several_colors(page).boxed()
        }))
        .scenario(Scenario::new("removes a color with its cross", |page| {
            removes_with_cross(page).boxed()
        }))
        .scenario(Scenario::new("clears every color at once", |page| {
            clears_every_color(page).boxed()
        }))
        .scenario(Scenario::new("backspace removes the last color", |page| {
            backspace_removes_last(page).boxed()
        }))
        .scenario(Scenario::new("single input keeps one color", |page| {
            single_keeps_one(page).boxed()
        }))
}

async fn suggests_matching_colors(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    expect(page, colors.menu.clone()).to_be_hidden().await?;

    colors.type_multiple("R").await?;
    for color in ["Red", "Green", "Purple"] {
        expect(page, colors.option(color)).to_be_visible().await?;
    }
    expect(page, colors.option("Blue")).to_be_hidden().await?;

    colors.type_multiple("Y").await?;
    expect(page, colors.option("Yellow")).to_be_visible().await?;
    expect(page, colors.option("Red")).to_be_hidden().await
}

async fn add_red_and_yellow(colors: &AutoCompletePage<'_>) -> ProbeResult<()> {
    colors.add_color("R", "Red").await?;
    colors.add_color("Y", "Yellow").await
}

async fn adds_several_colors(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    add_red_and_yellow(&colors).await?;
    expect(page, colors.chip("Red")).to_be_visible().await?;
    expect(page, colors.chip("Yellow")).to_be_visible().await?;
    expect(page, colors.menu.clone()).to_be_hidden().await
}

async fn removes_with_cross(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    add_red_and_yellow(&colors).await?;
    colors.remove_first_chip().await?;
    expect(page, colors.chip("Red")).to_be_hidden().await?;
    expect(page, colors.chip("Yellow")).to_be_visible().await
}

async fn clears_every_color(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    add_red_and_yellow(&colors).await?;
    colors.clear_all().await?;
    for color in ["Red", "Yellow"] {
        expect(page, colors.chip(color)).to_be_hidden().await?;
    }
    expect(page, colors.clear_indicator.clone()).to_be_hidden().await
}

async fn backspace_removes_last(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    add_red_and_yellow(&colors).await?;
    colors.backspace().await?;
    expect(page, colors.chip("Yellow")).to_be_hidden().await?;
    expect(page, colors.chip("Red")).to_be_visible().await
}

async fn single_keeps_one(page: &Page) -> ProbeResult<()> {
    let colors = AutoCompletePage::new(page);
    colors.choose_single("Y", "Yellow").await?;
    expect(page, colors.single_container.clone())
        .to_contain_text("Yellow")
        .await?;

    colors.choose_single("Bl", "Blue").await?;
    expect(page, colors.single_container.clone())
        .to_contain_text("Blue")
        .await?;
    expect(page, colors.single_container.clone())
        .not()
        .to_contain_text("Yellow")
        .await
}

// ============================================================================
// Date Picker
// ============================================================================

fn date_picker() -> ScenarioGroup {
    ScenarioGroup::new("Date Picker")
        .with_fixture(SectionFixture::new(GROUP, "Date Picker"))
        .scenario(Scenario::new("typed date moves the calendar", |page| {
            typed_date_moves_calendar(page).boxed()
        }))
        .scenario(Scenario::new("calendar pick fills the input", |page| {
            calendar_pick_fills_input(page).boxed()
        }))
}

fn new_years_eve_1987() -> ProbeResult<NaiveDate> {
    NaiveDate::from_ymd_opt(1987, 12, 31)
        .ok_or_else(|| ProbeError::assertion("a valid date", "1987-12-31"))
}

async fn typed_date_moves_calendar(page: &Page) -> ProbeResult<()> {
    let picker = DatePickerPage::new(page);
    picker.type_date(new_years_eve_1987()?).await?;
    expect(page, picker.header.clone())
        .to_contain_text("December 1987")
        .await?;
    expect(page, picker.day(31))
        .to_have_class("react-datepicker__day--selected")
        .await
}

async fn calendar_pick_fills_input(page: &Page) -> ProbeResult<()> {
    let picker = DatePickerPage::new(page);
    picker.pick(new_years_eve_1987()?).await?;
    expect(page, picker.input.clone())
        .to_have_value("12/31/1987")
        .await
}

// ============================================================================
// Slider
// ============================================================================

fn slider() -> ScenarioGroup {
    ScenarioGroup::new("Slider")
        .with_fixture(SectionFixture::new(GROUP, "Slider"))
        .scenario(Scenario::new("starts at 25", |page| {
            slider_starts_at_25(page).boxed()
        }))
        .scenario(Scenario::new("mirrors the chosen value", |page| {
            slider_mirrors_value(page).boxed()
        }))
}

async fn slider_starts_at_25(page: &Page) -> ProbeResult<()> {
    let slider = SliderPage::new(page);
    expect(page, slider.slider.clone()).to_have_value("25").await?;
    ensure_eq(25, slider.displayed_value().await?)
}

async fn slider_mirrors_value(page: &Page) -> ProbeResult<()> {
    let slider = SliderPage::new(page);
    for value in [50, 0, 100] {
        slider.set_value(value).await?;
        expect(page, slider.value_display.clone())
            .to_have_value(&value.to_string())
            .await?;
    }
    Ok(())
}

// ============================================================================
// Progress Bar
// ============================================================================

fn progress_bar() -> ScenarioGroup {
    ScenarioGroup::new("Progress Bar")
        .with_fixture(SectionFixture::new(GROUP, "Progress Bar"))
        .scenario(Scenario::new("starts empty", |page| {
            progress_starts_empty(page).boxed()
        }))
        .scenario(Scenario::new("fills past the midpoint", |page| {
            progress_passes_midpoint(page).boxed()
        }))
        .scenario(Scenario::new("stop holds the value until restarted", |page| {
            progress_stop_holds(page).boxed()
        }))
        .scenario(Scenario::new("reset replaces start once full", |page| {
            progress_reset(page).boxed()
        }))
}

async fn progress_starts_empty(page: &Page) -> ProbeResult<()> {
    let progress = ProgressBarPage::new(page);
    ensure_eq(0, progress.value().await?)?;
    expect(page, progress.bar.clone()).to_have_text("0%").await
}

async fn progress_passes_midpoint(page: &Page) -> ProbeResult<()> {
    let progress = ProgressBarPage::new(page);
    progress.toggle().await?;
    let value = progress.wait_for_value(50, PROGRESS_RUN_MS).await?;
    ensure(value >= 50, "progress at least 50%", format!("{value}%"))
}

async fn progress_stop_holds(page: &Page) -> ProbeResult<()> {
    let progress = ProgressBarPage::new(page);
    progress.toggle().await?;
    progress.wait_for_value(50, PROGRESS_RUN_MS).await?;
    progress.toggle().await?;

    let stopped = progress.value().await?;
    progress.hold_steady(stopped, 1_000).await?;

    progress.toggle().await?;
    let finished = progress.wait_for_value(100, PROGRESS_RUN_MS).await?;
    ensure_eq(100, finished)
}

async fn progress_reset(page: &Page) -> ProbeResult<()> {
    let progress = ProgressBarPage::new(page);
    progress.toggle().await?;
    progress.wait_for_value(100, PROGRESS_RUN_MS).await?;
    expect(page, progress.reset.clone()).to_be_visible().await?;
    expect(page, progress.start_stop.clone()).to_be_hidden().await?;

    progress.reset_bar().await?;
    expect(page, progress.start_stop.clone()).to_be_visible().await?;
    expect(page, progress.reset.clone()).to_be_hidden().await?;
    ensure_eq(0, progress.value().await?)
}

// ============================================================================
// Tabs
// ============================================================================

fn tabs() -> ScenarioGroup {
    ScenarioGroup::new("Tabs")
        .with_fixture(SectionFixture::new(GROUP, "Tabs"))
        .scenario(Scenario::new("each tab shows its panel", |page| {
            tabs_show_panels(page).boxed()
        }))
        .scenario(Scenario::new("More is disabled", |page| {
            more_is_disabled(page).boxed()
        }))
}

const TAB_PANELS: [(&str, &str); 3] = [
    ("What", "Lorem Ipsum is simply dummy text"),
    ("Origin", "Contrary to popular belief"),
    ("Use", "It is a long established fact"),
];

async fn tabs_show_panels(page: &Page) -> ProbeResult<()> {
    let tabs = TabsPage::new(page);
    expect(page, tabs.tab("What"))
        .to_have_attribute("aria-selected", "true")
        .await?;

    for (name, text) in TAB_PANELS.iter().rev() {
        tabs.select(name).await?;
        expect(page, tabs.tab(name))
            .to_have_attribute("aria-selected", "true")
            .await?;
        expect(page, tabs.panel_text(text)).to_be_visible().await?;
        for (other, other_text) in TAB_PANELS.iter().filter(|(n, _)| n != name) {
            expect(page, tabs.tab(other))
                .to_have_attribute("aria-selected", "false")
                .await?;
            expect(page, tabs.panel_text(other_text)).to_be_hidden().await?;
        }
    }
    Ok(())
}

async fn more_is_disabled(page: &Page) -> ProbeResult<()> {
    let tabs = TabsPage::new(page);
    expect(page, tabs.tab("More")).to_be_disabled().await
}

// ============================================================================
// Tool Tips
// ============================================================================

fn tool_tips() -> ScenarioGroup {
    ScenarioGroup::new("Tool Tips")
        .with_fixture(SectionFixture::new(GROUP, "Tool Tips"))
        .scenario(Scenario::new("button shows its tip on hover", |page| {
            button_tip(page).boxed()
        }))
        .scenario(Scenario::new("field shows its tip on hover", |page| {
            field_tip(page).boxed()
        }))
        .scenario(Scenario::new("article links show their tips on hover", |page| {
            link_tips(page).boxed()
        }))
}

async fn button_tip(page: &Page) -> ProbeResult<()> {
    let tips = ToolTipsPage::new(page);
    tips.hover(&tips.button).await?;
    expect(page, tips.tip("You hovered over the Button"))
        .to_be_visible()
        .await
}

async fn field_tip(page: &Page) -> ProbeResult<()> {
    let tips = ToolTipsPage::new(page);
    tips.hover(&tips.field).await?;
    expect(page, tips.tip("You hovered over the text field"))
        .to_be_visible()
        .await
}

async fn link_tips(page: &Page) -> ProbeResult<()> {
    let tips = ToolTipsPage::new(page);
    for link in ["Contrary", "1.10.32"] {
        tips.hover(&tips.link(link)).await?;
        expect(page, tips.tip(&format!("You hovered over the {link}")))
            .to_be_visible()
            .await?;
    }
    Ok(())
}

// ============================================================================
// Menu
// ============================================================================

fn menu() -> ScenarioGroup {
    ScenarioGroup::new("Menu")
        .with_fixture(SectionFixture::new(GROUP, "Menu"))
        .scenario(Scenario::new("lists every main item", |page| {
            lists_main_items(page).boxed()
        }))
        .scenario(Scenario::new("hover reveals the sub items", |page| {
            hover_reveals_sub_items(page).boxed()
        }))
        .scenario(Scenario::new("hover reveals the sub sub list", |page| {
            hover_reveals_sub_sub_list(page).boxed()
        }))
}

/// Main entry holding the nested lists
const MAIN_WITH_SUBS: usize = 2;

/// Sub entry holding the innermost list
const SUB_WITH_SUBS: usize = 3;

fn labels<const N: usize>(expected: [&str; N]) -> Vec<String> {
    expected.iter().map(|label| (*label).to_string()).collect()
}

async fn lists_main_items(page: &Page) -> ProbeResult<()> {
    let menu = MenuPage::new(page);
    expect(page, menu.main_items.clone()).to_have_count(MAIN_ITEMS.len()).await?;
    ensure_eq(labels(MAIN_ITEMS), menu.texts(&menu.main_items).await?)
}

async fn hover_reveals_sub_items(page: &Page) -> ProbeResult<()> {
    let menu = MenuPage::new(page);
    let subs = menu.sub_items(MAIN_WITH_SUBS);
    expect(page, subs.clone().first()).to_be_hidden().await?;

    menu.hover_main(MAIN_WITH_SUBS).await?;
    expect(page, subs.clone().first()).to_be_visible().await?;
    ensure_eq(labels(SUB_ITEMS), menu.texts(&subs).await?)
}

async fn hover_reveals_sub_sub_list(page: &Page) -> ProbeResult<()> {
    let menu = MenuPage::new(page);
    let sub_subs = menu.sub_sub_items(MAIN_WITH_SUBS, SUB_WITH_SUBS);
    expect(page, sub_subs.clone().first()).to_be_hidden().await?;

    menu.hover_main(MAIN_WITH_SUBS).await?;
    menu.hover_sub(MAIN_WITH_SUBS, SUB_WITH_SUBS).await?;
    expect(page, sub_subs.clone().first()).to_be_visible().await?;
    ensure_eq(labels(SUB_SUB_ITEMS), menu.texts(&sub_subs).await?)
}

// ============================================================================
// Select Menu
// ============================================================================

fn select_menu() -> ScenarioGroup {
    ScenarioGroup::new("Select Menu")
        .with_fixture(SectionFixture::new(GROUP, "Select Menu"))
        .scenario(Scenario::new("grouped dropdown shows the choice", |page| {
            grouped_dropdown(page).boxed()
        }))
        .scenario(Scenario::new("title dropdown shows its placeholder", |page| {
            title_placeholder(page).boxed()
        }))
        .scenario(Scenario::new("old style select takes a value", |page| {
            old_style_select(page).boxed()
        }))
        .scenario(Scenario::new("multi select keeps every car", |page| {
            multi_select_cars(page).boxed()
        }))
}

async fn grouped_dropdown(page: &Page) -> ProbeResult<()> {
    let menu = SelectMenuPage::new(page);
    menu.choose_grouped("Group 1, option 2").await?;
    expect(page, menu.with_opt_group.clone())
        .to_contain_text("Group 1, option 2")
        .await
}

async fn title_placeholder(page: &Page) -> ProbeResult<()> {
    let menu = SelectMenuPage::new(page);
    expect(page, menu.select_one.clone())
        .to_contain_text("Select Title")
        .await
}

async fn old_style_select(page: &Page) -> ProbeResult<()> {
    let menu = SelectMenuPage::new(page);
    page.select_option(&menu.old_select, "3").await?;
    expect(page, menu.old_select.clone()).to_have_value("3").await
}

async fn multi_select_cars(page: &Page) -> ProbeResult<()> {
    let menu = SelectMenuPage::new(page);
    page.select_option(&menu.cars, ["volvo", "audi"]).await?;
    let chosen = menu.chosen_cars().await?;
    ensure(
        chosen.iter().any(|c| c == "Volvo") && chosen.iter().any(|c| c == "Audi"),
        "Volvo and Audi chosen",
        chosen.join(", "),
    )
}
