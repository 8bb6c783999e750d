use std::sync::Arc;

use super::common::*;
use crate::assessment::agreements::{AgreementCategory, AgreementSeverity};
use crate::assessment::domain::{
    Answer, AnswersPatch, AssessmentAnswers, ImmigrationStatus, Language, RamqApplication,
};
use crate::assessment::flow::FlowTransition;
use crate::assessment::session::{AssessmentContext, CoverageOutlook, Session, SessionError};
use crate::assessment::storage::{
    AssessmentSnapshot, AssessmentStorage, InMemoryStorage, ASSESSMENT_KEY, LANGUAGE_KEY,
};
use crate::assessment::waiting_period::WaitingPeriodError;

#[test]
fn language_is_read_back_from_storage() {
    let (mut session, storage) = quebec_session();
    assert_eq!(session.language(), Language::En);

    session.set_language(Language::Fr).expect("language saved");
    assert_eq!(
        storage.read(LANGUAGE_KEY).expect("read succeeds").as_deref(),
        Some("fr")
    );

    let context = AssessmentContext::standard("quebec").expect("quebec rules available");
    let reopened = Session::new(context, storage).expect("session opens");
    assert_eq!(reopened.language(), Language::Fr);
}

#[test]
fn unrecognized_stored_language_falls_back_to_english() {
    let storage = Arc::new(InMemoryStorage::default());
    storage
        .write(LANGUAGE_KEY, "de".to_string())
        .expect("write succeeds");

    let context = AssessmentContext::standard("quebec").expect("quebec rules available");
    let session = Session::new(context, storage).expect("session opens");
    assert_eq!(session.language(), Language::En);
}

#[test]
fn results_are_absent_before_submission() {
    let (session, _storage) = quebec_session();

    assert!(session
        .load_results_on(date(2025, 2, 1))
        .expect("load succeeds")
        .is_none());
}

#[test]
fn bilateral_success_reports_immediate_coverage() {
    let (mut session, _storage) = quebec_session();
    let flow = session.flow_mut();
    flow.update(AnswersPatch::status(ImmigrationStatus::PermanentResident))
        .expect("status accepted");
    flow.next_step().expect("advance");
    flow.update(AnswersPatch::country("France"))
        .expect("country accepted");

    let results = session
        .load_results_on(date(2025, 2, 1))
        .expect("load succeeds")
        .expect("results available");

    assert_eq!(results.outlook, CoverageOutlook::Immediate);
    assert_eq!(results.waiting_period_days, Some(0));
    assert_eq!(results.agreement.category, AgreementCategory::Full);
    assert_eq!(results.agreement_message.severity, AgreementSeverity::Success);
    assert_eq!(results.health_plan_name, "RAMQ");
    assert!(results.interim_options.is_empty());
    assert!(results.recommended_option.is_none());
}

#[test]
fn submitted_permanent_resident_waits_from_the_ramq_application() {
    let (mut session, _storage) = quebec_session();
    let flow = session.flow_mut();
    advance_to_step_three(flow, ImmigrationStatus::PermanentResident, "Brazil");
    flow.update(permanent_resident_questions("2025-01-05"))
        .expect("answers accepted");
    flow.next_step().expect("advance to family size");
    flow.update(AnswersPatch {
        family_size: Some(family(3)),
        ..AnswersPatch::default()
    })
    .expect("family size accepted");
    flow.next_step().expect("submit");

    let results = session
        .load_results_on(date(2025, 2, 1))
        .expect("load succeeds")
        .expect("results available");

    assert_eq!(results.waiting_period_days, Some(90));
    assert_eq!(results.agreement_message.severity, AgreementSeverity::Error);
    match &results.outlook {
        CoverageOutlook::Waiting { timeline } => {
            assert_eq!(timeline.reference_date, date(2025, 1, 5));
            assert_eq!(timeline.coverage_start_date, date(2025, 4, 5));
            assert_eq!(timeline.days_remaining, 63);
        }
        other => panic!("expected waiting outlook, got {other:?}"),
    }

    let prices: Vec<(&str, u32)> = results
        .interim_options
        .iter()
        .map(|priced| (priced.provider.id, priced.monthly_price))
        .collect();
    assert_eq!(
        prices,
        vec![
            ("manulife-coverme", 134),
            ("gms-newcomer", 150),
            ("blue-cross-quebec", 158),
            ("sun-life-personal", 209),
        ]
    );
    let pick = results.recommended_option.expect("recommendation present");
    assert_eq!(pick.provider.id, "gms-newcomer");
}

#[test]
fn elapsed_waiting_period_needs_no_interim_insurance() {
    let (session, storage) = quebec_session();
    let answers = AssessmentAnswers {
        arrival_date: "2024-01-01".to_string(),
        ramq_application_submitted: Some(RamqApplication::No),
        insurance_within_5_days: Some(Answer::Yes),
        ..answers_for(ImmigrationStatus::PermanentResident)
    };
    AssessmentSnapshot::Full(answers)
        .save(storage.as_ref())
        .expect("snapshot saved");

    let results = session
        .load_results_on(date(2025, 1, 1))
        .expect("load succeeds")
        .expect("results available");

    assert!(matches!(
        results.outlook,
        CoverageOutlook::Waiting { timeline } if timeline.is_eligible_now
    ));
    assert!(results.interim_options.is_empty());
}

#[test]
fn work_permit_holders_are_not_covered_in_quebec() {
    let (mut session, _storage) = quebec_session();
    let flow = session.flow_mut();
    advance_to_step_three(flow, ImmigrationStatus::WorkPermit, "Mexico");
    flow.update(work_permit_questions(Answer::Yes, ""))
        .expect("answers accepted");
    flow.next_step().expect("submit");

    let results = session
        .load_results()
        .expect("load succeeds")
        .expect("results available");

    assert_eq!(results.waiting_period_days, None);
    assert!(matches!(results.outlook, CoverageOutlook::NotEligible { .. }));
    assert!(!results.interim_options.is_empty());
    assert!(results
        .interim_options
        .iter()
        .all(|priced| priced.provider.target_statuses.contains(&ImmigrationStatus::WorkPermit)));
}

fn session_for(province: &str) -> (Session<InMemoryStorage>, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::default());
    let context = AssessmentContext::standard(province).expect("province rules available");
    let session = Session::new(context, storage.clone()).expect("session opens");
    (session, storage)
}

#[test]
fn work_permit_with_benefits_and_no_arrival_date_awaits_arrival_in_british_columbia() {
    let (mut session, _storage) = session_for("british_columbia");
    let flow = session.flow_mut();
    advance_to_step_three(flow, ImmigrationStatus::WorkPermit, "Mexico");
    flow.update(AnswersPatch {
        employer_benefits: Some(Answer::Yes),
        ..AnswersPatch::default()
    })
    .expect("answers accepted");
    assert_eq!(flow.next_step().expect("submit"), FlowTransition::Submitted);

    let results = session
        .load_results_on(date(2025, 6, 1))
        .expect("results derive without an arrival date")
        .expect("results available");

    assert_eq!(results.health_plan_name, "MSP");
    assert_eq!(results.waiting_period_days, Some(90));
    assert_eq!(results.outlook, CoverageOutlook::AwaitingArrival { days: 90 });
    assert!(results.outlook.needs_private_insurance());
    assert!(!results.interim_options.is_empty());
}

#[test]
fn work_permit_without_waiting_period_needs_no_interim_insurance_in_alberta() {
    let (mut session, _storage) = session_for("alberta");
    let flow = session.flow_mut();
    advance_to_step_three(flow, ImmigrationStatus::WorkPermit, "Mexico");
    flow.update(work_permit_questions(Answer::Yes, ""))
        .expect("answers accepted");
    flow.next_step().expect("submit");

    let results = session
        .load_results_on(date(2025, 6, 1))
        .expect("load succeeds")
        .expect("results available");

    assert_eq!(results.outlook, CoverageOutlook::AwaitingArrival { days: 0 });
    assert!(results.interim_options.is_empty());
    assert!(results.recommended_option.is_none());
}

#[test]
fn work_permit_arrival_date_still_drives_the_timeline() {
    let (mut session, _storage) = session_for("british_columbia");
    let flow = session.flow_mut();
    advance_to_step_three(flow, ImmigrationStatus::WorkPermit, "Mexico");
    flow.update(work_permit_questions(Answer::No, "2025-05-01"))
        .expect("answers accepted");
    flow.next_step().expect("submit");

    let results = session
        .load_results_on(date(2025, 6, 1))
        .expect("load succeeds")
        .expect("results available");

    match results.outlook {
        CoverageOutlook::Waiting { timeline } => {
            assert_eq!(timeline.coverage_start_date, date(2025, 7, 30));
            assert_eq!(timeline.days_remaining, 59);
        }
        other => panic!("expected waiting outlook, got {other:?}"),
    }
}

#[test]
fn empty_reference_date_propagates_invalid_date() {
    let (session, storage) = quebec_session();
    let answers = AssessmentAnswers {
        arrival_date: "2025-01-10".to_string(),
        ramq_application_submitted: Some(RamqApplication::Yes),
        ..answers_for(ImmigrationStatus::PermanentResident)
    };
    AssessmentSnapshot::Full(answers)
        .save(storage.as_ref())
        .expect("snapshot saved");

    match session.load_results_on(date(2025, 2, 1)) {
        Err(SessionError::WaitingPeriod(WaitingPeriodError::InvalidDate { value })) => {
            assert!(value.is_empty())
        }
        other => panic!("expected invalid date, got {other:?}"),
    }
}

#[test]
fn malformed_snapshot_is_a_storage_error() {
    let (session, storage) = quebec_session();
    storage
        .write(ASSESSMENT_KEY, "not json".to_string())
        .expect("write succeeds");

    assert!(matches!(
        session.load_results_on(date(2025, 2, 1)),
        Err(SessionError::Storage(_))
    ));
}

#[test]
fn start_over_discards_the_snapshot() {
    let (mut session, storage) = quebec_session();
    let flow = session.flow_mut();
    flow.update(AnswersPatch::status(ImmigrationStatus::PermanentResident))
        .expect("status accepted");
    flow.next_step().expect("advance");
    flow.update(AnswersPatch::country("Belgium"))
        .expect("country accepted");
    session.set_language(Language::Fr).expect("language saved");

    session.start_over().expect("reset succeeds");

    assert_eq!(session.flow().current_step(), 1);
    assert!(storage.read(ASSESSMENT_KEY).expect("read succeeds").is_none());
    assert_eq!(session.language(), Language::Fr);
    assert!(session
        .load_results_on(date(2025, 2, 1))
        .expect("load succeeds")
        .is_none());
}

#[test]
fn ontario_covers_permanent_residents_without_waiting() {
    let storage = Arc::new(InMemoryStorage::default());
    let context = AssessmentContext::standard("Ontario").expect("ontario rules available");
    let session = Session::new(context, storage.clone()).expect("session opens");
    let answers = AssessmentAnswers {
        arrival_date: "2025-03-01".to_string(),
        ..answers_for(ImmigrationStatus::PermanentResident)
    };
    AssessmentSnapshot::Full(answers)
        .save(storage.as_ref())
        .expect("snapshot saved");

    let results = session
        .load_results_on(date(2025, 3, 1))
        .expect("load succeeds")
        .expect("results available");

    assert_eq!(results.health_plan_name, "OHIP");
    assert_eq!(results.waiting_period_days, Some(0));
    assert!(!results.outlook.needs_private_insurance());
}

#[test]
fn unknown_province_is_rejected() {
    match AssessmentContext::standard("atlantis") {
        Err(SessionError::UnknownProvince(province)) => assert_eq!(province, "atlantis"),
        other => panic!("expected unknown province, got {other:?}"),
    }
}
