//! Elements: text box, check box, radio button and web tables.

use futures::FutureExt;

use crate::event::UrlPattern;
use crate::expect::{expect, expect_page};
use crate::fixture::SectionFixture;
use crate::harness::{Scenario, ScenarioGroup};
use crate::page::Page;
use crate::pages::elements::{result_token, tree_levels, CHECKBOX_TREE};
use crate::page_object::PageObject;
use crate::pages::{
    CheckBoxPage, RadioButtonPage, RadioChoice, TextBoxForm, TextBoxPage, WebTableRecord,
    WebTablesPage,
};
use crate::result::ProbeResult;

const GROUP: &str = "Elements";

/// Addresses the text box must flag with `field-error`
pub const INVALID_EMAILS: [&str; 4] = ["test", "test@", "test@test", "test@test.test"];

/// Scenario groups of the Elements section
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![text_box(), check_box(), radio_button(), web_tables()]
}

async fn url_contains(page: &Page, fragment: &str) -> ProbeResult<()> {
    expect_page(page)
        .to_have_url(UrlPattern::Contains(fragment.to_string()))
        .await
}

// ============================================================================
// Text Box
// ============================================================================

fn text_box() -> ScenarioGroup {
    ScenarioGroup::new("Text Box")
        .with_fixture(SectionFixture::new(GROUP, "Text Box"))
        .scenario(Scenario::new("opens /text-box", |page| {
            url_contains(page, "/text-box").boxed()
        }))
        .scenario(Scenario::new("echoes the submitted fields", |page| {
            echoes_submitted_fields(page).boxed()
        }))
        .scenario(Scenario::new("flags malformed email addresses", |page| {
            flags_malformed_emails(page).boxed()
        }))
}

fn text_box_data() -> TextBoxForm {
    TextBoxForm {
        full_name: "Name".to_string(),
        email: "Email@example.com".to_string(),
        current_address: "Current random address".to_string(),
        permanent_address: "Permanent address".to_string(),
    }
}

async fn echoes_submitted_fields(page: &Page) -> ProbeResult<()> {
    let text_box = TextBoxPage::new(page);
    let data = text_box_data();
    expect(page, text_box.output.clone()).to_be_hidden().await?;

    text_box.fill_form(&data).await?;
    text_box.submit_form().await?;

    for (field, value) in [
        ("name", &data.full_name),
        ("email", &data.email),
        ("currentAddress", &data.current_address),
        ("permanentAddress", &data.permanent_address),
    ] {
        expect(page, text_box.output_field(field))
            .to_contain_text(value)
            .await?;
    }
    Ok(())
}

async fn flags_malformed_emails(page: &Page) -> ProbeResult<()> {
    let text_box = TextBoxPage::new(page);
    for email in INVALID_EMAILS {
        // the marker sticks until reload, so every address gets a fresh form
        text_box.open().await?;
        page.fill(&text_box.email, email).await?;
        text_box.submit_form().await?;
        expect(page, text_box.email.clone())
            .to_have_class("field-error")
            .await?;
    }
    expect(page, text_box.output.clone()).to_be_hidden().await
}

// ============================================================================
// Check Box
// ============================================================================

fn check_box() -> ScenarioGroup {
    ScenarioGroup::new("Check Box")
        .with_fixture(SectionFixture::new(GROUP, "Check Box"))
        .scenario(Scenario::new("opens /checkbox", |page| {
            url_contains(page, "/checkbox").boxed()
        }))
        .scenario(Scenario::new("expands and collapses the whole tree", |page| {
            expands_and_collapses_tree(page).boxed()
        }))
        .scenario(Scenario::new("toggle arrow opens one level", |page| {
            toggle_opens_one_level(page).boxed()
        }))
        .scenario(Scenario::new("checking home selects every node", |page| {
            checking_home_selects_everything(page).boxed()
        }))
}

/// Expect exactly the nodes in the first `open_levels` levels to be shown
async fn expect_tree_depth(page: &Page, tree: &CheckBoxPage<'_>, open_levels: usize) -> ProbeResult<()> {
    for (depth, level) in tree_levels().iter().enumerate() {
        for name in level {
            let node = expect(page, tree.node(name));
            if depth < open_levels {
                node.to_be_visible().await?;
            } else {
                node.to_be_hidden().await?;
            }
        }
    }
    Ok(())
}

async fn expands_and_collapses_tree(page: &Page) -> ProbeResult<()> {
    let tree = CheckBoxPage::new(page);
    tree.expand_everything().await?;
    expect_tree_depth(page, &tree, usize::MAX).await?;
    tree.collapse_everything().await?;
    expect_tree_depth(page, &tree, 1).await
}

async fn toggle_opens_one_level(page: &Page) -> ProbeResult<()> {
    let tree = CheckBoxPage::new(page);
    tree.toggle_root().await?;
    expect_tree_depth(page, &tree, 2).await?;
    tree.toggle_root().await?;
    expect_tree_depth(page, &tree, 1).await
}

async fn checking_home_selects_everything(page: &Page) -> ProbeResult<()> {
    let tree = CheckBoxPage::new(page);
    tree.toggle_check("Home").await?;

    expect(page, tree.result.clone())
        .to_contain_text("You have selected :")
        .await?;
    for node in &CHECKBOX_TREE {
        expect(page, tree.result.clone())
            .ignore_case()
            .to_contain_text(&result_token(node.name))
            .await?;
    }

    tree.toggle_check("Home").await?;
    expect(page, tree.result.clone()).to_be_hidden().await
}

// ============================================================================
// Radio Button
// ============================================================================

fn radio_button() -> ScenarioGroup {
    ScenarioGroup::new("Radio Button")
        .with_fixture(SectionFixture::new(GROUP, "Radio Button"))
        .scenario(Scenario::new("opens /radio-button", |page| {
            url_contains(page, "/radio-button").boxed()
        }))
        .scenario(Scenario::new("starts with nothing selected", |page| {
            starts_unselected(page).boxed()
        }))
        .scenario(Scenario::new("selects one answer at a time", |page| {
            selects_one_at_a_time(page).boxed()
        }))
        .scenario(Scenario::new("answer No is disabled", |page| {
            no_is_disabled(page).boxed()
        }))
}

async fn starts_unselected(page: &Page) -> ProbeResult<()> {
    let radio = RadioButtonPage::new(page);
    for choice in [RadioChoice::Yes, RadioChoice::Impressive, RadioChoice::No] {
        expect(page, radio.option(choice)).to_be_unchecked().await?;
    }
    Ok(())
}

async fn selects_one_at_a_time(page: &Page) -> ProbeResult<()> {
    let radio = RadioButtonPage::new(page);
    for (picked, other) in [
        (RadioChoice::Yes, RadioChoice::Impressive),
        (RadioChoice::Impressive, RadioChoice::Yes),
    ] {
        radio.choose(picked).await?;
        expect(page, radio.option(picked)).to_be_checked().await?;
        expect(page, radio.option(other)).to_be_unchecked().await?;
        expect(page, radio.result.clone())
            .to_contain_text(picked.label())
            .await?;
    }
    Ok(())
}

async fn no_is_disabled(page: &Page) -> ProbeResult<()> {
    let radio = RadioButtonPage::new(page);
    expect(page, radio.option(RadioChoice::No)).to_be_disabled().await
}

// ============================================================================
// Web Tables
// ============================================================================

fn web_tables() -> ScenarioGroup {
    ScenarioGroup::new("Web Tables")
        .with_fixture(SectionFixture::new(GROUP, "Web Tables"))
        .scenario(Scenario::new("opens /webtables", |page| {
            url_contains(page, "/webtables").boxed()
        }))
        .scenario(Scenario::new("adds, edits and deletes a row", |page| {
            adds_edits_deletes_row(page).boxed()
        }))
        .scenario(Scenario::new("finds a row by email", |page| {
            finds_row_by_email(page).boxed()
        }))
}

/// Row added by the table scenarios
#[must_use]
pub fn new_record() -> WebTableRecord {
    WebTableRecord {
        first_name: "Test First Name".to_string(),
        last_name: "Test Last Name".to_string(),
        email: "test_name@example.com".to_string(),
        age: 22,
        salary: 333_300,
        department: "Department".to_string(),
    }
}

/// Replacement values; none contains the original first name
#[must_use]
pub fn edited_record() -> WebTableRecord {
    WebTableRecord {
        first_name: "Edited First Name".to_string(),
        last_name: "Edited Last Name".to_string(),
        email: "edited_name@example.com".to_string(),
        age: 76,
        salary: 45_353_534,
        department: "NewDepartment".to_string(),
    }
}

async fn expect_row(page: &Page, table: &WebTablesPage<'_>, record: &WebTableRecord) -> ProbeResult<()> {
    let row = table.row(&record.first_name);
    expect(page, row.clone()).to_be_visible().await?;
    for cell in record.cells() {
        expect(page, row.clone()).to_contain_text(&cell).await?;
    }
    Ok(())
}

async fn adds_edits_deletes_row(page: &Page) -> ProbeResult<()> {
    let table = WebTablesPage::new(page);
    let original = new_record();
    let edited = edited_record();

    table.add_record(&original).await?;
    expect_row(page, &table, &original).await?;

    table.edit_record(&original.first_name, &edited).await?;
    expect(page, table.row(&original.first_name)).to_be_hidden().await?;
    expect_row(page, &table, &edited).await?;

    table.delete_record(&edited.first_name).await?;
    expect(page, table.row(&edited.first_name)).to_be_hidden().await
}

async fn finds_row_by_email(page: &Page) -> ProbeResult<()> {
    let table = WebTablesPage::new(page);
    let record = new_record();
    table.add_record(&record).await?;
    table.search_for(&record.email).await?;
    expect(page, table.row(&record.first_name)).to_be_visible().await?;
    expect(page, table.row("Cierra")).to_be_hidden().await
}
