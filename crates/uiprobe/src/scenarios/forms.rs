//! Forms: the student registration form.

use chrono::NaiveDate;
use futures::FutureExt;

use crate::expect::{ensure, ensure_eq, expect};
use crate::fixture::PathFixture;
use crate::harness::{Scenario, ScenarioGroup};
use crate::page::Page;
use crate::pages::forms::DATE_SUMMARY_FORMAT;
use crate::pages::{Gender, PracticeFormPage, StudentRegistration};
use crate::result::ProbeResult;

/// Scenario groups of the Forms section
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![practice_form()]
}

fn practice_form() -> ScenarioGroup {
    ScenarioGroup::new("Practice Form")
        .with_fixture(PathFixture::new("/automation-practice-form"))
        .scenario(Scenario::new("registers a student end to end", |page| {
            registers_end_to_end(page).boxed()
        }))
        .scenario(Scenario::new("summary repeats every field", |page| {
            summary_repeats_fields(page).boxed()
        }))
        .scenario(Scenario::new("summary can be closed", |page| {
            summary_closes(page).boxed()
        }))
        .scenario(Scenario::new("subjects accept one or many", |page| {
            subjects_one_or_many(page).boxed()
        }))
        .scenario(Scenario::new("incomplete registration is rejected", |page| {
            rejects_incomplete(page).boxed()
        }))
}

/// Field-by-field run with the literal values a visitor would type
async fn registers_end_to_end(page: &Page) -> ProbeResult<()> {
    let form = PracticeFormPage::new(page);
    form.fill_name("John", "Doe").await?;
    form.fill_email("john.doe@example.com").await?;
    form.select_gender(Gender::Male).await?;
    form.fill_mobile("1234567890").await?;
    form.fill_date_of_birth(NaiveDate::from_ymd_opt(1987, 8, 17).unwrap_or_default())
        .await?;
    form.fill_subjects(["Math", "Chemistry"]).await?;
    form.select_hobbies(["Sports", "Reading"]).await?;
    form.upload_picture("upload.txt").await?;
    form.fill_current_address("123 Main St, Springfield").await?;
    form.select_state_and_city("Rajasthan", "Jaipur").await?;
    form.submit_form().await?;

    expect(page, form.confirmation.clone()).to_be_visible().await
}

async fn summary_repeats_fields(page: &Page) -> ProbeResult<()> {
    let form = PracticeFormPage::new(page);
    let student = StudentRegistration::john_doe();
    form.register(&student).await?;
    expect(page, form.confirmation.clone()).to_be_visible().await?;

    let summary = form.submission().await?;
    let field = |label: &str| summary.get(label).cloned().unwrap_or_default();

    ensure_eq(student.full_name(), field("Student Name"))?;
    ensure_eq(student.email.clone(), field("Student Email"))?;
    ensure_eq(student.gender.label().to_string(), field("Gender"))?;
    ensure_eq(student.mobile.clone(), field("Mobile"))?;
    ensure_eq(
        student.date_of_birth.format(DATE_SUMMARY_FORMAT).to_string(),
        field("Date of Birth"),
    )?;
    let subjects = field("Subjects");
    ensure(
        subjects.contains("Maths") && subjects.contains("Chemistry"),
        "subjects Maths and Chemistry",
        &subjects,
    )?;
    ensure_eq("Sports, Reading".to_string(), field("Hobbies"))?;
    ensure_eq("upload.txt".to_string(), field("Picture"))?;
    ensure_eq(student.address.clone(), field("Address"))?;
    ensure_eq(
        format!("{} {}", student.state, student.city),
        field("State and City"),
    )
}

async fn summary_closes(page: &Page) -> ProbeResult<()> {
    let form = PracticeFormPage::new(page);
    form.register(&StudentRegistration::john_doe()).await?;
    expect(page, form.confirmation.clone()).to_be_visible().await?;
    form.close_summary().await?;
    expect(page, form.confirmation.clone()).to_be_hidden().await
}

async fn subjects_one_or_many(page: &Page) -> ProbeResult<()> {
    let form = PracticeFormPage::new(page);
    form.fill_subjects("Chemistry").await?;
    expect(page, form.subject_chip("Chemistry")).to_be_visible().await?;

    form.fill_subjects(vec!["English", "Physics"]).await?;
    for subject in ["Chemistry", "English", "Physics"] {
        expect(page, form.subject_chip(subject)).to_be_visible().await?;
    }
    Ok(())
}

async fn rejects_incomplete(page: &Page) -> ProbeResult<()> {
    let form = PracticeFormPage::new(page);
    form.fill_name("John", "").await?;
    form.fill_email("test@test.test").await?;
    form.submit_form().await?;

    expect(page, form.confirmation.clone()).to_be_hidden().await?;
    expect(page, form.email.clone())
        .to_have_class("field-error")
        .await
}
