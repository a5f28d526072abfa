//! Student registration form (`/automation-practice-form`).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::locator::Locator;
use crate::page::{OneOrMany, Page};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};

/// Date format typed into the date-of-birth input
pub const DATE_INPUT_FORMAT: &str = "%d %b %Y";

/// Date format of the submission summary
pub const DATE_SUMMARY_FORMAT: &str = "%d %B,%Y";

/// Gender radio choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// "Male"
    Male,
    /// "Female"
    Female,
    /// "Other"
    Other,
}

impl Gender {
    /// Label text
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// Hobby checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hobby {
    /// "Sports"
    Sports,
    /// "Reading"
    Reading,
    /// "Music"
    Music,
}

impl Hobby {
    /// Label text
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sports => "Sports",
            Self::Reading => "Reading",
            Self::Music => "Music",
        }
    }
}

/// Everything the registration form asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegistration {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Gender
    pub gender: Gender,
    /// Ten-digit mobile number
    pub mobile: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Subjects typed into the autocomplete, in order
    pub subjects: Vec<String>,
    /// Hobbies to tick
    pub hobbies: Vec<Hobby>,
    /// Picture to upload, relative to the upload directory
    pub picture: PathBuf,
    /// Current address
    pub address: String,
    /// State
    pub state: String,
    /// City within the state
    pub city: String,
}

impl StudentRegistration {
    /// The reference student used by the form scenarios
    #[must_use]
    pub fn john_doe() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            gender: Gender::Male,
            mobile: "1234567890".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1987, 8, 17).unwrap_or_default(),
            subjects: vec!["Math".to_string(), "Chemistry".to_string()],
            hobbies: vec![Hobby::Sports, Hobby::Reading],
            picture: PathBuf::from("upload.txt"),
            address: "123 Main St, Springfield".to_string(),
            state: "Rajasthan".to_string(),
            city: "Jaipur".to_string(),
        }
    }

    /// Full name as the summary shows it
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The student registration form, under the name the form is usually filed as
pub type UserFormPage<'p> = PracticeFormPage<'p>;

/// The practice registration form
#[derive(Debug, Clone)]
pub struct PracticeFormPage<'p> {
    page: &'p Page,
    /// First name input
    pub first_name: Locator,
    /// Last name input
    pub last_name: Locator,
    /// Email input
    pub email: Locator,
    /// Mobile number input
    pub mobile: Locator,
    /// Date of birth input
    pub date_of_birth: Locator,
    /// Subjects chip container
    pub subjects_container: Locator,
    /// Subjects autocomplete input
    pub subjects_input: Locator,
    /// Picture upload input
    pub picture: Locator,
    /// Current address textarea
    pub current_address: Locator,
    /// State autocomplete input
    pub state_input: Locator,
    /// City autocomplete input
    pub city_input: Locator,
    /// Submit button
    pub submit: Locator,
    /// Confirmation modal title
    pub confirmation: Locator,
    /// Cells of the submission summary table
    pub summary_cells: Locator,
    /// Button that closes the confirmation modal
    pub close_confirmation: Locator,
}

impl<'p> PracticeFormPage<'p> {
    /// Form on `page`
    #[must_use]
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            first_name: Locator::placeholder("First Name"),
            last_name: Locator::placeholder("Last Name"),
            email: Locator::placeholder("name@example.com"),
            mobile: Locator::placeholder("Mobile Number"),
            date_of_birth: Locator::css("#dateOfBirthInput"),
            subjects_container: Locator::css(".subjects-auto-complete__value-container"),
            subjects_input: Locator::css("#subjectsInput"),
            picture: Locator::label("Select picture"),
            current_address: Locator::placeholder("Current Address"),
            state_input: Locator::css("#react-select-3-input"),
            city_input: Locator::css("#react-select-4-input"),
            submit: Locator::role("button").name("Submit"),
            confirmation: Locator::text("Thanks for submitting the form"),
            summary_cells: Locator::css(".modal-content tbody td"),
            close_confirmation: Locator::css("#closeLargeModal"),
        }
    }

    /// Radio label of a gender
    #[must_use]
    pub fn gender(&self, gender: Gender) -> Locator {
        Locator::text(gender.label()).exact()
    }

    /// Checkbox label of a hobby
    #[must_use]
    pub fn hobby(&self, hobby: &str) -> Locator {
        Locator::text(hobby).exact()
    }

    /// Chip of a chosen subject
    #[must_use]
    pub fn subject_chip(&self, subject: &str) -> Locator {
        self.subjects_container
            .css_within(".subjects-auto-complete__multi-value__label")
            .has_text(subject)
    }

    /// Type first and last name
    pub async fn fill_name(&self, first: &str, last: &str) -> ProbeResult<()> {
        self.page.fill(&self.first_name, first).await?;
        self.page.fill(&self.last_name, last).await
    }

    /// Type the email address
    pub async fn fill_email(&self, email: &str) -> ProbeResult<()> {
        self.page.fill(&self.email, email).await
    }

    /// Pick a gender
    pub async fn select_gender(&self, gender: Gender) -> ProbeResult<()> {
        self.page.click(&self.gender(gender)).await
    }

    /// Type the mobile number
    pub async fn fill_mobile(&self, mobile: &str) -> ProbeResult<()> {
        self.page.fill(&self.mobile, mobile).await
    }

    /// Type a date of birth and confirm it with Enter
    pub async fn fill_date_of_birth(&self, date: NaiveDate) -> ProbeResult<()> {
        self.page.click(&self.date_of_birth).await?;
        self.page
            .fill(&self.date_of_birth, &date.format(DATE_INPUT_FORMAT).to_string())
            .await?;
        self.page.press("Enter").await
    }

    /// Add subjects through the autocomplete, in order
    pub async fn fill_subjects(&self, subjects: impl Into<OneOrMany>) -> ProbeResult<()> {
        for subject in subjects.into() {
            self.page.click(&self.subjects_container).await?;
            self.page.fill(&self.subjects_input, &subject).await?;
            self.page.press("Enter").await?;
        }
        Ok(())
    }

    /// Tick hobbies by label; ticking twice leaves a hobby ticked
    pub async fn select_hobbies(&self, hobbies: impl Into<OneOrMany>) -> ProbeResult<()> {
        for hobby in hobbies.into() {
            self.page.check(&self.hobby(&hobby)).await?;
        }
        Ok(())
    }

    /// Attach a picture from the upload directory
    pub async fn upload_picture(&self, file: impl Into<PathBuf>) -> ProbeResult<()> {
        self.page.set_input_files(&self.picture, &[file.into()]).await
    }

    /// Type the current address
    pub async fn fill_current_address(&self, address: &str) -> ProbeResult<()> {
        self.page.fill(&self.current_address, address).await
    }

    /// Choose a state, then one of its cities
    pub async fn select_state_and_city(&self, state: &str, city: &str) -> ProbeResult<()> {
        self.page.fill(&self.state_input, state).await?;
        self.page.press("Enter").await?;
        self.page.fill(&self.city_input, city).await?;
        self.page.press("Enter").await
    }

    /// Press Submit
    pub async fn submit_form(&self) -> ProbeResult<()> {
        self.page.click(&self.submit).await
    }

    /// Fill every field of `student`, then submit
    pub async fn register(&self, student: &StudentRegistration) -> ProbeResult<()> {
        self.fill_name(&student.first_name, &student.last_name).await?;
        self.fill_email(&student.email).await?;
        self.select_gender(student.gender).await?;
        self.fill_mobile(&student.mobile).await?;
        self.fill_date_of_birth(student.date_of_birth).await?;
        self.fill_subjects(student.subjects.as_slice()).await?;
        let hobbies: Vec<&str> = student.hobbies.iter().map(|h| h.label()).collect();
        self.select_hobbies(hobbies).await?;
        self.upload_picture(student.picture.clone()).await?;
        self.fill_current_address(&student.address).await?;
        self.select_state_and_city(&student.state, &student.city).await?;
        self.submit_form().await
    }

    /// Label/value pairs of the submission summary
    pub async fn submission(&self) -> ProbeResult<BTreeMap<String, String>> {
        let cells = self.page.all_inner_texts(&self.summary_cells).await?;
        if cells.len() % 2 != 0 {
            return Err(ProbeError::assertion(
                "label/value pairs in the submission summary",
                format!("{} cells", cells.len()),
            ));
        }
        Ok(cells
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }

    /// Dismiss the confirmation modal
    pub async fn close_summary(&self) -> ProbeResult<()> {
        self.page.click(&self.close_confirmation).await
    }
}

#[async_trait]
impl PageObject for PracticeFormPage<'_> {
    fn path(&self) -> &str {
        "/automation-practice-form"
    }

    fn page(&self) -> &Page {
        self.page
    }

    fn page_name(&self) -> &str {
        "Practice Form"
    }
}
