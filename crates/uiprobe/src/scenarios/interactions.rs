//! Interactions: sortable, selectable and resizable.

use futures::FutureExt;

use crate::expect::{ensure_eq, expect};
use crate::fixture::SectionFixture;
use crate::harness::{Scenario, ScenarioGroup};
use crate::page::Page;
use crate::pages::{Layout, ResizablePage, SelectablePage, SortablePage};
use crate::result::ProbeResult;

const GROUP: &str = "Interactions";

/// Scenario groups of the Interactions section
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![sortable(), selectable(), resizable()]
}

// ============================================================================
// Sortable
// ============================================================================

fn sortable() -> ScenarioGroup {
    ScenarioGroup::new("Sortable")
        .with_fixture(SectionFixture::new(GROUP, "Sortable"))
        .scenario(Scenario::new("list starts in counting order", |page| {
            list_starts_ordered(page).boxed()
        }))
        .scenario(Scenario::new("dragging reorders the list", |page| {
            drag_reorders(page, Layout::List).boxed()
        }))
        .scenario(Scenario::new("dragging reorders the grid", |page| {
            drag_reorders(page, Layout::Grid).boxed()
        }))
}

async fn list_starts_ordered(page: &Page) -> ProbeResult<()> {
    let sortable = SortablePage::new(page);
    let expected: Vec<String> = ["One", "Two", "Three", "Four", "Five", "Six"]
        .iter()
        .map(ToString::to_string)
        .collect();
    ensure_eq(expected, sortable.order(Layout::List).await?)
}

async fn drag_reorders(page: &Page, layout: Layout) -> ProbeResult<()> {
    let sortable = SortablePage::new(page);
    sortable.show(layout).await?;
    sortable.drag(layout, 1, 3).await?;
    expect(page, sortable.item(layout, 1))
        .to_have_text("Three")
        .await?;
    expect(page, sortable.item(layout, 3)).to_have_text("Two").await
}

// ============================================================================
// Selectable
// ============================================================================

fn selectable() -> ScenarioGroup {
    ScenarioGroup::new("Selectable")
        .with_fixture(SectionFixture::new(GROUP, "Selectable"))
        .scenario(Scenario::new("list items toggle their selection", |page| {
            items_toggle(page, Layout::List).boxed()
        }))
        .scenario(Scenario::new("grid items toggle their selection", |page| {
            items_toggle(page, Layout::Grid).boxed()
        }))
}

async fn items_toggle(page: &Page, layout: Layout) -> ProbeResult<()> {
    let selectable = SelectablePage::new(page);
    selectable.show(layout).await?;

    for index in [0, 2] {
        selectable.toggle(layout, index).await?;
        expect(page, selectable.item(layout, index))
            .to_have_class("active")
            .await?;
    }
    expect(page, selectable.item(layout, 1))
        .not()
        .to_have_class("active")
        .await?;

    selectable.toggle(layout, 0).await?;
    expect(page, selectable.item(layout, 0))
        .not()
        .to_have_class("active")
        .await
}

// ============================================================================
// Resizable
// ============================================================================

fn resizable() -> ScenarioGroup {
    ScenarioGroup::new("Resizable")
        .with_fixture(SectionFixture::new(GROUP, "Resizable"))
        .scenario(Scenario::new("box starts at 200x200", |page| {
            box_starts_square(page).boxed()
        }))
        .scenario(Scenario::new("box size is clamped while dragging", |page| {
            box_size_clamped(page).boxed()
        }))
}

async fn box_starts_square(page: &Page) -> ProbeResult<()> {
    let resizable = ResizablePage::new(page);
    expect(page, resizable.restricted_box.clone())
        .to_have_attribute("style", "width: 200px; height: 200px;")
        .await
}

async fn box_size_clamped(page: &Page) -> ProbeResult<()> {
    let resizable = ResizablePage::new(page);
    resizable.drag_handle_to(1_200.0, 800.0).await?;
    ensure_eq((500, 300), resizable.size().await?)?;

    resizable.drag_handle_to(10.0, 10.0).await?;
    ensure_eq((150, 150), resizable.size().await?)
}
