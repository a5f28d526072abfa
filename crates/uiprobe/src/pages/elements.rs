//! The Elements group: text box, check box tree, radio buttons, web table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::exact_text_pattern;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ProbeResult;

// ============================================================================
// Text Box
// ============================================================================

/// Values for the text box form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBoxForm {
    /// Full name
    pub full_name: String,
    /// Email
    pub email: String,
    /// Current address
    pub current_address: String,
    /// Permanent address
    pub permanent_address: String,
}

/// `/text-box`
#[derive(Debug, Clone)]
pub struct TextBoxPage<'p> {
    page: &'p Page,
    /// Full name input
    pub full_name: Locator,
    /// Email input
    pub email: Locator,
    /// Current address textarea
    pub current_address: Locator,
    /// Permanent address textarea
    pub permanent_address: Locator,
    /// Submit button
    pub submit: Locator,
    /// Echo of the submitted values
    pub output: Locator,
}

impl<'p> TextBoxPage<'p> {
    /// Text box page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            full_name: Locator::placeholder("Full Name"),
            email: Locator::placeholder("name@example.com"),
            current_address: Locator::placeholder("Current Address"),
            permanent_address: Locator::css("#permanentAddress"),
            submit: Locator::role("button").name("Submit"),
            output: Locator::css("#output"),
        }
    }

    /// One echoed field (`name`, `email`, `currentAddress`, `permanentAddress`)
    #[must_use]
    pub fn output_field(&self, id: &str) -> Locator {
        self.output.css_within(format!("#{id}"))
    }

    /// Fill every field of `form`
    pub async fn fill_form(&self, form: &TextBoxForm) -> ProbeResult<()> {
        self.page.fill(&self.full_name, &form.full_name).await?;
        self.page.fill(&self.email, &form.email).await?;
        self.page.fill(&self.current_address, &form.current_address).await?;
        self.page.fill(&self.permanent_address, &form.permanent_address).await
    }

    /// Press Submit
    pub async fn submit_form(&self) -> ProbeResult<()> {
        self.page.click(&self.submit).await
    }
}

#[async_trait]
impl PageObject for TextBoxPage<'_> {
    fn path(&self) -> &str {
        "/text-box"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Check Box
// ============================================================================

/// Node of the check box tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    /// Display name
    pub name: &'static str,
    /// Names of the direct children
    pub children: &'static [&'static str],
}

/// The check box tree, parents before children
pub const CHECKBOX_TREE: [TreeNode; 17] = [
    TreeNode { name: "Home", children: &["Desktop", "Documents", "Downloads"] },
    TreeNode { name: "Desktop", children: &["Notes", "Commands"] },
    TreeNode { name: "Notes", children: &[] },
    TreeNode { name: "Commands", children: &[] },
    TreeNode { name: "Documents", children: &["WorkSpace", "Office"] },
    TreeNode { name: "WorkSpace", children: &["React", "Angular", "Veu"] },
    TreeNode { name: "React", children: &[] },
    TreeNode { name: "Angular", children: &[] },
    TreeNode { name: "Veu", children: &[] },
    TreeNode { name: "Office", children: &["Public", "Private", "Classified", "General"] },
    TreeNode { name: "Public", children: &[] },
    TreeNode { name: "Private", children: &[] },
    TreeNode { name: "Classified", children: &[] },
    TreeNode { name: "General", children: &[] },
    TreeNode { name: "Downloads", children: &["Word File.doc", "Excel File.doc"] },
    TreeNode { name: "Word File.doc", children: &[] },
    TreeNode { name: "Excel File.doc", children: &[] },
];

/// Node names grouped by depth, root level first
#[must_use]
pub fn tree_levels() -> Vec<Vec<&'static str>> {
    let mut levels = vec![vec!["Home"]];
    loop {
        let next: Vec<&'static str> = levels
            .last()
            .into_iter()
            .flatten()
            .filter_map(|name| CHECKBOX_TREE.iter().find(|n| n.name == *name))
            .flat_map(|n| n.children.iter().copied())
            .collect();
        if next.is_empty() {
            return levels;
        }
        levels.push(next);
    }
}

/// Result-panel token of a node: file extension dropped, spaces removed
#[must_use]
pub fn result_token(name: &str) -> String {
    let stem = name.split('.').next().unwrap_or(name);
    stem.split_whitespace().collect()
}

/// `/checkbox`
#[derive(Debug, Clone)]
pub struct CheckBoxPage<'p> {
    page: &'p Page,
    /// Expands every node
    pub expand_all: Locator,
    /// Collapses every node
    pub collapse_all: Locator,
    /// Expand/collapse toggles of rendered nodes
    pub toggles: Locator,
    /// Selection summary
    pub result: Locator,
}

impl<'p> CheckBoxPage<'p> {
    /// Check box page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            expand_all: Locator::label("Expand all"),
            collapse_all: Locator::label("Collapse all"),
            toggles: Locator::label("Toggle"),
            result: Locator::css("#result"),
        }
    }

    /// Title of a node
    #[must_use]
    pub fn node(&self, name: &str) -> Locator {
        Locator::text(name).exact()
    }

    /// Checkbox icon of a node
    #[must_use]
    pub fn checkbox(&self, name: &str) -> Locator {
        Locator::css("label")
            .has_text_matching(exact_text_pattern(name))
            .role_within("img")
            .first()
    }

    /// Expand the whole tree
    pub async fn expand_everything(&self) -> ProbeResult<()> {
        self.page.click(&self.expand_all).await
    }

    /// Collapse the whole tree
    pub async fn collapse_everything(&self) -> ProbeResult<()> {
        self.page.click(&self.collapse_all).await
    }

    /// Click the first rendered toggle (the root while collapsed)
    pub async fn toggle_root(&self) -> ProbeResult<()> {
        self.page.click(&self.toggles.clone().first()).await
    }

    /// Click a node's checkbox
    pub async fn toggle_check(&self, name: &str) -> ProbeResult<()> {
        self.page.click(&self.checkbox(name)).await
    }
}

#[async_trait]
impl PageObject for CheckBoxPage<'_> {
    fn path(&self) -> &str {
        "/checkbox"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Radio Button
// ============================================================================

/// Answers to "Do you like the site?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioChoice {
    /// "Yes"
    Yes,
    /// "Impressive"
    Impressive,
    /// "No" (always disabled)
    No,
}

impl RadioChoice {
    /// Label text
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::Impressive => "Impressive",
            Self::No => "No",
        }
    }

    /// Id of the radio input
    #[must_use]
    pub const fn input_id(self) -> &'static str {
        match self {
            Self::Yes => "yesRadio",
            Self::Impressive => "impressiveRadio",
            Self::No => "noRadio",
        }
    }
}

/// `/radio-button`
#[derive(Debug, Clone)]
pub struct RadioButtonPage<'p> {
    page: &'p Page,
    /// "You have selected ..." paragraph
    pub result: Locator,
}

impl<'p> RadioButtonPage<'p> {
    /// Radio button page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            result: Locator::text("You have selected"),
        }
    }

    /// Label of a choice
    #[must_use]
    pub fn option(&self, choice: RadioChoice) -> Locator {
        Locator::css(format!("label[for={}]", choice.input_id()))
    }

    /// Click a choice's label
    pub async fn choose(&self, choice: RadioChoice) -> ProbeResult<()> {
        self.page.click(&self.option(choice)).await
    }
}

#[async_trait]
impl PageObject for RadioButtonPage<'_> {
    fn path(&self) -> &str {
        "/radio-button"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Web Tables
// ============================================================================

/// A row of the web table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebTableRecord {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email
    pub email: String,
    /// Age
    pub age: u32,
    /// Salary
    pub salary: u64,
    /// Department
    pub department: String,
}

impl WebTableRecord {
    /// Cell texts in column order
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.age.to_string(),
            self.email.clone(),
            self.salary.to_string(),
            self.department.clone(),
        ]
    }
}

/// `/webtables`
#[derive(Debug, Clone)]
pub struct WebTablesPage<'p> {
    page: &'p Page,
    /// Opens the registration form
    pub add: Locator,
    /// Search box
    pub search: Locator,
    /// Registration form first name
    pub first_name: Locator,
    /// Registration form last name
    pub last_name: Locator,
    /// Registration form email
    pub email: Locator,
    /// Registration form age
    pub age: Locator,
    /// Registration form salary
    pub salary: Locator,
    /// Registration form department
    pub department: Locator,
    /// Registration form submit
    pub submit: Locator,
}

impl<'p> WebTablesPage<'p> {
    /// Web tables page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            add: Locator::role("button").name("Add").exact(),
            search: Locator::placeholder("Type to search"),
            first_name: Locator::placeholder("First Name"),
            last_name: Locator::placeholder("Last Name"),
            email: Locator::placeholder("name@example.com"),
            age: Locator::placeholder("Age"),
            salary: Locator::placeholder("Salary"),
            department: Locator::placeholder("Department"),
            submit: Locator::role("button").name("Submit"),
        }
    }

    /// Row whose content mentions `text`
    #[must_use]
    pub fn row(&self, text: &str) -> Locator {
        Locator::role("row").name(text)
    }

    /// Edit button of the row mentioning `text`
    #[must_use]
    pub fn edit_button(&self, text: &str) -> Locator {
        self.row(text).locator(Locator::title("Edit"))
    }

    /// Delete button of the row mentioning `text`
    #[must_use]
    pub fn delete_button(&self, text: &str) -> Locator {
        self.row(text).locator(Locator::title("Delete"))
    }

    async fn fill_registration(&self, record: &WebTableRecord) -> ProbeResult<()> {
        self.page.fill(&self.first_name, &record.first_name).await?;
        self.page.fill(&self.last_name, &record.last_name).await?;
        self.page.fill(&self.email, &record.email).await?;
        self.page.fill(&self.age, &record.age.to_string()).await?;
        self.page.fill(&self.salary, &record.salary.to_string()).await?;
        self.page.fill(&self.department, &record.department).await?;
        self.page.click(&self.submit).await
    }

    /// Add a row through the registration form
    pub async fn add_record(&self, record: &WebTableRecord) -> ProbeResult<()> {
        self.page.click(&self.add).await?;
        self.fill_registration(record).await
    }

    /// Replace the row mentioning `text` with `record`
    pub async fn edit_record(&self, text: &str, record: &WebTableRecord) -> ProbeResult<()> {
        self.page.click(&self.edit_button(text)).await?;
        self.fill_registration(record).await
    }

    /// Delete the row mentioning `text`
    pub async fn delete_record(&self, text: &str) -> ProbeResult<()> {
        self.page.click(&self.delete_button(text)).await
    }

    /// Filter rows by `text`
    pub async fn search_for(&self, text: &str) -> ProbeResult<()> {
        self.page.fill(&self.search, text).await
    }
}

#[async_trait]
impl PageObject for WebTablesPage<'_> {
    fn path(&self) -> &str {
        "/webtables"
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
    fn test_tree_levels() {
        let levels = tree_levels();
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[1], vec!["Desktop", "Documents", "Downloads"]);
        assert_eq!(levels[3], vec!["React", "Angular", "Veu", "Public", "Private", "Classified", "General"]);
        let total: usize = levels.iter().map(Vec::len).sum();
        assert_eq!(total, CHECKBOX_TREE.len());
    }

    #[test]
    fn test_result_token() {
        assert_eq!(result_token("Word File.doc"), "WordFile");
        assert_eq!(result_token("WorkSpace"), "WorkSpace");
    }

    #[test]
    fn test_record_cells_follow_column_order() {
        let record = WebTableRecord {
            first_name: "Test First Name".to_string(),
            last_name: "Test Last Name".to_string(),
            email: "test_name@example.com".to_string(),
            age: 22,
            salary: 333_300,
            department: "Department".to_string(),
        };
        assert_eq!(record.cells()[2], "22");
        assert_eq!(record.cells()[4], "333300");
    }
}
