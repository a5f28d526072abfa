//! The Interactions group: sortable, selectable and resizable.

use async_trait::async_trait;

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};

/// The two arrangements offered by the sortable and selectable pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Vertical list
    List,
    /// Three-column grid
    Grid,
}

impl Layout {
    /// Tab label
    #[must_use]
    pub const fn tab_name(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Grid => "Grid",
        }
    }

    /// Tab pane holding the items
    #[must_use]
    pub const fn pane(self) -> &'static str {
        match self {
            Self::List => "#demo-tabpane-list",
            Self::Grid => "#demo-tabpane-grid",
        }
    }
}

fn layout_tab(layout: Layout) -> Locator {
    Locator::role("tab").name(layout.tab_name()).exact()
}

fn layout_items(layout: Layout) -> Locator {
    Locator::css(layout.pane()).css_within(".list-group-item-action")
}

// ============================================================================
// Sortable
// ============================================================================

/// `/sortable`
#[derive(Debug, Clone)]
pub struct SortablePage<'p> {
    page: &'p Page,
}

impl<'p> SortablePage<'p> {
    /// Sortable page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Every item of a layout
    #[must_use]
    pub fn items(&self, layout: Layout) -> Locator {
        layout_items(layout)
    }

    /// Item at `index`
    #[must_use]
    pub fn item(&self, layout: Layout, index: usize) -> Locator {
        layout_items(layout).nth(index)
    }

    /// Switch to a layout's tab
    pub async fn show(&self, layout: Layout) -> ProbeResult<()> {
        self.page.click(&layout_tab(layout)).await
    }

    /// Drag the item at `from` onto the item at `to`
    pub async fn drag(&self, layout: Layout, from: usize, to: usize) -> ProbeResult<()> {
        self.page
            .drag_to(&self.item(layout, from), &self.item(layout, to))
            .await
    }

    /// Item texts in display order
    pub async fn order(&self, layout: Layout) -> ProbeResult<Vec<String>> {
        self.page.all_inner_texts(&self.items(layout)).await
    }
}

#[async_trait]
impl PageObject for SortablePage<'_> {
    fn path(&self) -> &str {
        "/sortable"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Selectable
// ============================================================================

/// `/selectable`
#[derive(Debug, Clone)]
pub struct SelectablePage<'p> {
    page: &'p Page,
}

impl<'p> SelectablePage<'p> {
    /// Selectable page on `page`
    #[must_use]
    pub const fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Item at `index`
    #[must_use]
    pub fn item(&self, layout: Layout, index: usize) -> Locator {
        layout_items(layout).nth(index)
    }

    /// Switch to a layout's tab
    pub async fn show(&self, layout: Layout) -> ProbeResult<()> {
        self.page.click(&layout_tab(layout)).await
    }

    /// Click an item, toggling its selection
    pub async fn toggle(&self, layout: Layout, index: usize) -> ProbeResult<()> {
        self.page.click(&self.item(layout, index)).await
    }
}

#[async_trait]
impl PageObject for SelectablePage<'_> {
    fn path(&self) -> &str {
        "/selectable"
    }

    fn page(&self) -> &Page {
        self.page
    }
}

// ============================================================================
// Resizable
// ============================================================================

/// `/resizable`
#[derive(Debug, Clone)]
pub struct ResizablePage<'p> {
    page: &'p Page,
    /// Box limited to 150x150 ..= 500x300
    pub restricted_box: Locator,
    /// Its drag handle
    pub handle: Locator,
}

impl<'p> ResizablePage<'p> {
    /// Resizable page on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        let restricted_box = Locator::css("#resizableBoxWithRestriction");
        let handle = restricted_box.css_within("span");
        Self {
            page,
            restricted_box,
            handle,
        }
    }

    /// Press the handle, move the pointer to `(x, y)` and release
    pub async fn drag_handle_to(&self, x: f64, y: f64) -> ProbeResult<()> {
        self.page.hover(&self.handle).await?;
        self.page.mouse_down().await?;
        self.page.mouse_move(x, y).await?;
        self.page.mouse_up().await
    }

    /// Inline `style` of the box
    pub async fn style(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .attribute(&self.restricted_box, "style")
            .await?
            .unwrap_or_default())
    }

    /// `(width, height)` in pixels, parsed from the inline style
    pub async fn size(&self) -> ProbeResult<(u32, u32)> {
        let style = self.style().await?;
        parse_box_style(&style)
            .ok_or_else(|| ProbeError::assertion("width and height in px", style))
    }
}

/// Parse `width: Wpx; height: Hpx;`
#[must_use]
pub fn parse_box_style(style: &str) -> Option<(u32, u32)> {
    let mut width = None;
    let mut height = None;
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let pixels = value.trim().strip_suffix("px").and_then(|v| v.parse().ok());
        match property.trim() {
            "width" => width = pixels,
            "height" => height = pixels,
            _ => {}
        }
    }
    Some((width?, height?))
}

#[async_trait]
impl PageObject for ResizablePage<'_> {
    fn path(&self) -> &str {
        "/resizable"
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
    fn test_parse_box_style() {
        assert_eq!(parse_box_style("width: 200px; height: 200px;"), Some((200, 200)));
        assert_eq!(parse_box_style("height:150px;width:500px"), Some((500, 150)));
        assert_eq!(parse_box_style("width: 200px;"), None);
        assert_eq!(parse_box_style("width: auto; height: 10px"), None);
    }
}
