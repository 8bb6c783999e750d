use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::agreements::{
    message_for, AgreementMessage, AgreementRegistry, AgreementTableError, BilateralAgreement,
};
use super::domain::{ImmigrationStatus, Language};
use super::flow::{is_step_valid, AssessmentFlow, FlowError};
use super::provinces::{ProvinceCatalog, ProvinceRules};
use super::storage::{AssessmentSnapshot, AssessmentStorage, StorageError, LANGUAGE_KEY};
use super::waiting_period::{compute_on, WaitingPeriodError, WaitingPeriodResult};
use crate::config::EligibilityConfig;
use crate::coverage::{recommended, PricedProvider, ProviderCatalog};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown province '{0}'")]
    UnknownProvince(String),
    #[error(transparent)]
    Agreements(#[from] AgreementTableError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    WaitingPeriod(#[from] WaitingPeriodError),
}

/// Read-only reference tables shared by every session.
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub agreements: Arc<AgreementRegistry>,
    pub province: Arc<ProvinceRules>,
    pub providers: Arc<ProviderCatalog>,
}

impl AssessmentContext {
    pub fn new(
        agreements: AgreementRegistry,
        province: ProvinceRules,
        providers: ProviderCatalog,
    ) -> Self {
        Self {
            agreements: Arc::new(agreements),
            province: Arc::new(province),
            providers: Arc::new(providers),
        }
    }

    /// Built-in tables for `province_id`.
    pub fn standard(province_id: &str) -> Result<Self, SessionError> {
        let province = ProvinceCatalog::standard()
            .get(province_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownProvince(province_id.to_string()))?;

        Ok(Self::new(
            AgreementRegistry::standard(),
            province,
            ProviderCatalog::standard(),
        ))
    }

    pub fn from_config(config: &EligibilityConfig) -> Result<Self, SessionError> {
        let mut context = Self::standard(&config.province)?;
        if let Some(path) = &config.agreements_csv {
            context.agreements = Arc::new(AgreementRegistry::from_path(path)?);
        }
        Ok(context)
    }
}

/// When public coverage starts for the submitted assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverageOutlook {
    Immediate,
    Waiting { timeline: WaitingPeriodResult },
    /// Eligible, but the answers carry no reference date yet (a work permit
    /// holder with employer benefits skips the arrival date).
    AwaitingArrival { days: u32 },
    NotEligible { notes: String },
}

impl CoverageOutlook {
    pub fn needs_private_insurance(&self) -> bool {
        match self {
            Self::Immediate => false,
            Self::Waiting { timeline } => !timeline.is_eligible_now,
            Self::AwaitingArrival { days } => *days > 0,
            Self::NotEligible { .. } => true,
        }
    }
}

/// Everything the results view renders, derived fresh from the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResults {
    pub snapshot: AssessmentSnapshot,
    pub immigration_status: ImmigrationStatus,
    pub health_plan_name: &'static str,
    pub agreement: BilateralAgreement,
    pub agreement_message: AgreementMessage,
    pub waiting_period_days: Option<u32>,
    pub outlook: CoverageOutlook,
    pub interim_options: Vec<PricedProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_option: Option<PricedProvider>,
}

/// Explicit session context: interface language plus the wizard state, with
/// persistence going through the injected storage.
pub struct Session<S> {
    language: Language,
    flow: AssessmentFlow<S>,
    storage: Arc<S>,
    context: AssessmentContext,
}

impl<S> Session<S>
where
    S: AssessmentStorage,
{
    pub fn new(context: AssessmentContext, storage: Arc<S>) -> Result<Self, SessionError> {
        let language = storage
            .read(LANGUAGE_KEY)?
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default();

        let flow = AssessmentFlow::new(context.agreements.clone(), storage.clone());

        Ok(Self {
            language,
            flow,
            storage,
            context,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), SessionError> {
        self.storage.write(LANGUAGE_KEY, language.code().to_string())?;
        self.language = language;
        Ok(())
    }

    pub fn context(&self) -> &AssessmentContext {
        &self.context
    }

    pub fn flow(&self) -> &AssessmentFlow<S> {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut AssessmentFlow<S> {
        &mut self.flow
    }

    pub fn start_over(&mut self) -> Result<(), SessionError> {
        self.flow.reset()?;
        Ok(())
    }

    pub fn load_results(&self) -> Result<Option<AssessmentResults>, SessionError> {
        self.load_results_on(Local::now().date_naive())
    }

    /// Read the stored snapshot back and derive the results as of `today`.
    /// `Ok(None)` means nothing was submitted and the caller should send the
    /// user back to the wizard.
    pub fn load_results_on(
        &self,
        today: NaiveDate,
    ) -> Result<Option<AssessmentResults>, SessionError> {
        let Some(snapshot) = AssessmentSnapshot::load(self.storage.as_ref())? else {
            debug!("no stored assessment; results unavailable");
            return Ok(None);
        };

        results_for(&self.context, snapshot, today).map(Some)
    }
}

fn results_for(
    context: &AssessmentContext,
    snapshot: AssessmentSnapshot,
    today: NaiveDate,
) -> Result<AssessmentResults, SessionError> {
    let province = context.province.as_ref();
    let status = snapshot.immigration_status();
    let country = snapshot.country_of_origin().to_string();
    let agreement = context.agreements.classify(&country);
    let agreement_message = message_for(Some(&agreement), &country);

    let (waiting_period_days, outlook) = match &snapshot {
        AssessmentSnapshot::Bilateral(_) => (Some(0), CoverageOutlook::Immediate),
        AssessmentSnapshot::Full(answers) => {
            match province.waiting_period_days(status, Some(&agreement)) {
                None => (
                    None,
                    CoverageOutlook::NotEligible {
                        notes: province.eligibility_for(status).notes.to_string(),
                    },
                ),
                // Step 3 is where the reference date is asked for.
                Some(days)
                    if answers.reference_date().trim().is_empty() && is_step_valid(answers, 3) =>
                {
                    (Some(days), CoverageOutlook::AwaitingArrival { days })
                }
                Some(days) => {
                    let timeline = compute_on(answers.reference_date(), days, today)?;
                    (Some(days), CoverageOutlook::Waiting { timeline })
                }
            }
        }
    };

    let interim_options = if outlook.needs_private_insurance() {
        context
            .providers
            .providers_for(province.id, status, snapshot.family_size())
    } else {
        Vec::new()
    };
    let recommended_option = recommended(&interim_options).cloned();

    Ok(AssessmentResults {
        snapshot,
        immigration_status: status,
        health_plan_name: province.health_plan_name,
        agreement,
        agreement_message,
        waiting_period_days,
        outlook,
        interim_options,
        recommended_option,
    })
}
