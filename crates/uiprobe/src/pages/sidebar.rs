//! Left-hand navigation shared by every section page.

use super::exact_text_pattern;
use crate::locator::Locator;
use crate::page::Page;
use crate::result::ProbeResult;

/// Group headers of the sidebar
pub const GROUPS: [&str; 5] = [
    "Elements",
    "Forms",
    "Alerts, Frame & Windows",
    "Widgets",
    "Interactions",
];

/// The collapsible group menu on the left of every section page
#[derive(Debug, Clone, Copy)]
pub struct Sidebar<'p> {
    page: &'p Page,
}

impl<'p> Sidebar<'p> {
    /// Sidebar of `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Header that expands or collapses a group
    #[must_use]
    pub fn group(&self, name: &str) -> Locator {
        Locator::css(".left-pannel .group-header").has_text_matching(exact_text_pattern(name))
    }

    /// Menu entry of a section
    #[must_use]
    pub fn item(&self, name: &str) -> Locator {
        Locator::css(".left-pannel li").has_text_matching(exact_text_pattern(name))
    }

    /// Open `item`, expanding `group` first when the entry is collapsed
    pub async fn open(&self, group: &str, item: &str) -> ProbeResult<()> {
        let entry = self.item(item);
        if !self.page.is_visible(&entry).await? {
            self.page.click(&self.group(group)).await?;
        }
        self.page.click(&entry).await
    }
}
