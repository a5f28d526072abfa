//! Page objects for the demoqa practice site.
//!
//! Each object borrows the scenario's [`Page`](crate::page::Page), owns the
//! [`Locator`](crate::locator::Locator)s of its screen and exposes the
//! task-level operations scenarios are written in. Objects never cache
//! resolved elements, so constructing one is free and they can be created
//! per use.

pub mod alerts_frames_windows;
pub mod elements;
pub mod forms;
pub mod interactions;
pub mod sidebar;
pub mod widgets;

pub use alerts_frames_windows::{
    AlertsPage, BrowserWindowsPage, FramesPage, ModalDialogsPage, ModalSize, NestedFramesPage,
};
pub use elements::{CheckBoxPage, RadioButtonPage, RadioChoice, TextBoxForm, TextBoxPage, WebTableRecord, WebTablesPage};
pub use forms::{Gender, Hobby, PracticeFormPage, StudentRegistration, UserFormPage};
pub use interactions::{Layout, ResizablePage, SelectablePage, SortablePage};
pub use sidebar::Sidebar;
pub use widgets::{
    AccordionPage, AccordionSection, AutoCompletePage, DatePickerPage, MenuPage, ProgressBarPage,
    SelectMenuPage, SliderPage, TabsPage, ToolTipsPage,
};

/// Locator-safe anchored pattern for an exact full-text match
pub(crate) fn exact_text_pattern(text: &str) -> String {
    format!("^{}$", regex::escape(text))
}
