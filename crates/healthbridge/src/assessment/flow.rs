//! Wizard flow controller.
//!
//! Step policy (status dependent):
//!
//! | status               | 1      | 2       | 3                      | 4           |
//! |----------------------|--------|---------|------------------------|-------------|
//! | permanent resident   | status | country | RAMQ questions         | family size |
//! | work permit          | status | country | employer benefits      |             |
//! | study permit         | status | country | university insurance   |             |
//! | visitor              | status | country | family size            |             |
//! | not chosen yet       | status | country | (invalid)              | family size |
//!
//! The step count is always derived from the answers through [`total_steps`];
//! it is never cached.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::agreements::AgreementRegistry;
use super::domain::{
    Answer, AnswersPatch, AssessmentAnswers, ImmigrationStatus, RamqApplication,
};
use super::storage::{
    AssessmentSnapshot, AssessmentStorage, BilateralRecord, StorageError, ASSESSMENT_KEY,
};

pub const FIRST_STEP: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ImmigrationStatus,
    CountryOfOrigin,
    PermanentResidentQuestions,
    WorkPermitQuestions,
    StudyPermitQuestions,
    FamilySize,
}

pub fn total_steps(answers: &AssessmentAnswers) -> u8 {
    match answers.immigration_status {
        ImmigrationStatus::PermanentResident | ImmigrationStatus::Unset => 4,
        ImmigrationStatus::WorkPermit
        | ImmigrationStatus::StudyPermit
        | ImmigrationStatus::Visitor => 3,
    }
}

/// Screen rendered for `step`, or `None` outside `1..=total_steps`.
pub fn step_kind(answers: &AssessmentAnswers, step: u8) -> Option<StepKind> {
    if step < FIRST_STEP || step > total_steps(answers) {
        return None;
    }

    let kind = match (step, answers.immigration_status) {
        (1, _) => StepKind::ImmigrationStatus,
        (2, _) => StepKind::CountryOfOrigin,
        (3, ImmigrationStatus::PermanentResident) => StepKind::PermanentResidentQuestions,
        (3, ImmigrationStatus::WorkPermit) => StepKind::WorkPermitQuestions,
        (3, ImmigrationStatus::StudyPermit) => StepKind::StudyPermitQuestions,
        (3, ImmigrationStatus::Visitor) => StepKind::FamilySize,
        (3, ImmigrationStatus::Unset) => return None,
        _ => StepKind::FamilySize,
    };
    Some(kind)
}

pub fn is_step_valid(answers: &AssessmentAnswers, step: u8) -> bool {
    match step_kind(answers, step) {
        Some(StepKind::ImmigrationStatus) => answers.immigration_status.is_set(),
        Some(StepKind::CountryOfOrigin) => answers.has_country(),
        Some(StepKind::PermanentResidentQuestions) => {
            answers.has_arrival_date()
                && answers.ramq_application_submitted.is_some()
                && answers.insurance_within_5_days.is_some()
                && (answers.ramq_application_submitted != Some(RamqApplication::Yes)
                    || answers.has_ramq_submission_date())
        }
        Some(StepKind::WorkPermitQuestions) => match answers.employer_benefits {
            Some(Answer::Yes) => true,
            Some(_) => answers.has_arrival_date(),
            None => false,
        },
        Some(StepKind::StudyPermitQuestions) => {
            answers.university_insurance.is_some() && answers.has_arrival_date()
        }
        // NonZeroU8 keeps the family size at one or more.
        Some(StepKind::FamilySize) => true,
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlowOutcome {
    Submitted { answers: AssessmentAnswers },
    BilateralSuccess { record: BilateralRecord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", content = "step", rename_all = "snake_case")]
pub enum FlowTransition {
    Step(u8),
    Submitted,
    BilateralShortCircuit,
}

impl FlowTransition {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Step(_))
    }
}

/// Plain data handed to the UI collaborator on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowView {
    pub current_step: u8,
    pub total_steps: u8,
    pub step: Option<StepKind>,
    pub is_step_valid: bool,
    pub can_proceed: bool,
    pub complete: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("step {step} is incomplete")]
    StepIncomplete { step: u8 },
    #[error("cannot submit: answers for step {step} are incomplete")]
    IncompleteAnswers { step: u8 },
    #[error("assessment already completed; start over to change answers")]
    AlreadyComplete,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One wizard session. Owns the answers exclusively and writes the terminal
/// snapshot through the injected storage.
pub struct AssessmentFlow<S> {
    answers: AssessmentAnswers,
    current_step: u8,
    outcome: Option<FlowOutcome>,
    registry: Arc<AgreementRegistry>,
    storage: Arc<S>,
}

impl<S> AssessmentFlow<S>
where
    S: AssessmentStorage,
{
    pub fn new(registry: Arc<AgreementRegistry>, storage: Arc<S>) -> Self {
        Self {
            answers: AssessmentAnswers::default(),
            current_step: FIRST_STEP,
            outcome: None,
            registry,
            storage,
        }
    }

    pub fn answers(&self) -> &AssessmentAnswers {
        &self.answers
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn total_steps(&self) -> u8 {
        total_steps(&self.answers)
    }

    pub fn outcome(&self) -> Option<&FlowOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_step_valid(&self, step: u8) -> bool {
        is_step_valid(&self.answers, step)
    }

    pub fn is_current_step_valid(&self) -> bool {
        self.is_step_valid(self.current_step)
    }

    /// The last step always proceeds because it triggers submission; earlier
    /// steps need their own answers.
    pub fn can_proceed(&self) -> bool {
        self.current_step == self.total_steps() || self.is_current_step_valid()
    }

    pub fn view(&self) -> FlowView {
        FlowView {
            current_step: self.current_step,
            total_steps: self.total_steps(),
            step: step_kind(&self.answers, self.current_step),
            is_step_valid: self.is_current_step_valid(),
            can_proceed: !self.is_complete() && self.can_proceed(),
            complete: self.is_complete(),
        }
    }

    /// Merge a user-input event into the answers.
    ///
    /// Picking a country that waives the waiting period while the status is
    /// permanent resident ends the wizard immediately with the abbreviated
    /// bilateral record.
    pub fn update(&mut self, patch: AnswersPatch) -> Result<FlowTransition, FlowError> {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }

        let selected_country = patch.country_of_origin.is_some();
        patch.apply_to(&mut self.answers);

        let total = self.total_steps();
        if self.current_step > total {
            self.current_step = total;
        }

        if selected_country
            && self.answers.immigration_status == ImmigrationStatus::PermanentResident
        {
            let agreement = self.registry.classify(&self.answers.country_of_origin);
            if agreement.waives_waiting_period() {
                return self.short_circuit();
            }
        }

        Ok(FlowTransition::Step(self.current_step))
    }

    pub fn next_step(&mut self) -> Result<FlowTransition, FlowError> {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }

        if !self.can_proceed() {
            warn!(step = self.current_step, "step incomplete; not advancing");
            return Err(FlowError::StepIncomplete {
                step: self.current_step,
            });
        }

        if self.current_step >= self.total_steps() {
            return self.submit();
        }

        self.current_step += 1;
        debug!(
            step = self.current_step,
            total = self.total_steps(),
            "advanced assessment step"
        );
        Ok(FlowTransition::Step(self.current_step))
    }

    /// Step back one screen, stopping at the first. Terminal outcomes stay put
    /// until [`AssessmentFlow::reset`].
    pub fn previous_step(&mut self) -> u8 {
        if !self.is_complete() && self.current_step > FIRST_STEP {
            self.current_step -= 1;
            debug!(step = self.current_step, "returned to previous step");
        }
        self.current_step
    }

    pub fn reset(&mut self) -> Result<(), FlowError> {
        self.storage.clear(ASSESSMENT_KEY)?;
        self.answers = AssessmentAnswers::default();
        self.current_step = FIRST_STEP;
        self.outcome = None;
        debug!("assessment reset");
        Ok(())
    }

    fn submit(&mut self) -> Result<FlowTransition, FlowError> {
        let total = self.total_steps();
        if let Some(step) = (FIRST_STEP..=total).find(|step| !self.is_step_valid(*step)) {
            warn!(step, "submission blocked by incomplete answers");
            return Err(FlowError::IncompleteAnswers { step });
        }

        AssessmentSnapshot::Full(self.answers.clone()).save(self.storage.as_ref())?;
        info!(
            status = self.answers.immigration_status.id(),
            steps = total,
            "assessment submitted"
        );

        self.outcome = Some(FlowOutcome::Submitted {
            answers: self.answers.clone(),
        });
        Ok(FlowTransition::Submitted)
    }

    fn short_circuit(&mut self) -> Result<FlowTransition, FlowError> {
        let record = BilateralRecord::new(
            self.answers.country_of_origin.clone(),
            self.answers.immigration_status,
        );
        AssessmentSnapshot::Bilateral(record.clone()).save(self.storage.as_ref())?;
        info!(
            country = %record.country_of_origin,
            step = self.current_step,
            "bilateral agreement waives waiting period; skipping remaining steps"
        );

        self.outcome = Some(FlowOutcome::BilateralSuccess { record });
        Ok(FlowTransition::BilateralShortCircuit)
    }
}
