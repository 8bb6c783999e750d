use std::num::NonZeroU8;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::assessment::agreements::AgreementRegistry;
use crate::assessment::domain::{
    Answer, AnswersPatch, AssessmentAnswers, ImmigrationStatus, RamqApplication,
    UniversityInsurance,
};
use crate::assessment::flow::AssessmentFlow;
use crate::assessment::session::{AssessmentContext, Session};
use crate::assessment::storage::{AssessmentStorage, InMemoryStorage, StorageError};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn family(size: u8) -> NonZeroU8 {
    NonZeroU8::new(size).expect("non-zero family size")
}

pub(super) fn flow() -> (AssessmentFlow<InMemoryStorage>, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::default());
    let flow = AssessmentFlow::new(Arc::new(AgreementRegistry::standard()), storage.clone());
    (flow, storage)
}

pub(super) fn quebec_session() -> (Session<InMemoryStorage>, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::default());
    let context = AssessmentContext::standard("quebec").expect("quebec rules available");
    let session = Session::new(context, storage.clone()).expect("session opens");
    (session, storage)
}

/// Answers a permanent resident from a country without an agreement gives on
/// step 3 after applying to RAMQ.
pub(super) fn permanent_resident_questions(submitted_on: &str) -> AnswersPatch {
    AnswersPatch {
        arrival_date: Some("2024-12-15".to_string()),
        ramq_application_submitted: Some(RamqApplication::Yes),
        ramq_submission_date: Some(submitted_on.to_string()),
        insurance_within_5_days: Some(Answer::Yes),
        ..AnswersPatch::default()
    }
}

pub(super) fn work_permit_questions(benefits: Answer, arrival_date: &str) -> AnswersPatch {
    AnswersPatch {
        employer_benefits: Some(benefits),
        arrival_date: Some(arrival_date.to_string()),
        ..AnswersPatch::default()
    }
}

pub(super) fn study_permit_questions() -> AnswersPatch {
    AnswersPatch {
        university_insurance: Some(UniversityInsurance::Mandatory),
        arrival_date: Some("2025-08-20".to_string()),
        ..AnswersPatch::default()
    }
}

pub(super) fn answers_for(status: ImmigrationStatus) -> AssessmentAnswers {
    AssessmentAnswers {
        immigration_status: status,
        country_of_origin: "Brazil".to_string(),
        ..AssessmentAnswers::default()
    }
}

/// Drive a fresh flow through status and country without triggering the
/// bilateral short-circuit.
pub(super) fn advance_to_step_three<S: AssessmentStorage>(
    flow: &mut AssessmentFlow<S>,
    status: ImmigrationStatus,
    country: &str,
) {
    flow.update(AnswersPatch::status(status))
        .expect("status accepted");
    flow.next_step().expect("advance to country");
    flow.update(AnswersPatch::country(country))
        .expect("country accepted");
    flow.next_step().expect("advance to step three");
}

/// Storage whose every call fails, for exercising error propagation.
#[derive(Debug, Default)]
pub(super) struct BrokenStorage;

impl AssessmentStorage for BrokenStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disk detached".to_string()))
    }

    fn write(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk detached".to_string()))
    }

    fn clear(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk detached".to_string()))
    }
}
