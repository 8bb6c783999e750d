//! Eligibility assessment core: waiting-period arithmetic, bilateral agreement
//! classification, province rules and the wizard flow that ties them together.
//!
//! Everything in here is synchronous and deterministic. The only mutable state is
//! the [`AssessmentAnswers`] owned by one [`AssessmentFlow`]; persistence goes
//! through the injected [`AssessmentStorage`].

pub mod agreements;
pub mod domain;
pub mod flow;
pub mod provinces;
pub mod session;
pub mod storage;
pub mod waiting_period;

#[cfg(test)]
mod tests;

pub use agreements::{
    message_for, waiting_period_days_for, AgreementCategory, AgreementMessage, AgreementRegistry,
    AgreementSeverity, AgreementStatus, AgreementTableError, BilateralAgreement,
    STANDARD_WAITING_PERIOD_DAYS,
};
pub use domain::{
    Answer, AnswersPatch, AssessmentAnswers, CoverageNeed, ImmigrationStatus, Language,
    RamqApplication, UniversityInsurance, UnknownIdentifier,
};
pub use flow::{
    is_step_valid, step_kind, total_steps, AssessmentFlow, FlowError, FlowOutcome, FlowTransition,
    FlowView, StepKind,
};
pub use provinces::{ProvinceCatalog, ProvinceRules, StatusEligibility};
pub use session::{
    AssessmentContext, AssessmentResults, CoverageOutlook, Session, SessionError,
};
pub use storage::{
    AssessmentSnapshot, AssessmentStorage, BilateralRecord, InMemoryStorage, StorageError,
    ASSESSMENT_KEY, LANGUAGE_KEY,
};
pub use waiting_period::{
    compute, compute_on, parse_reference_date, WaitingPeriodError, WaitingPeriodResult,
};
