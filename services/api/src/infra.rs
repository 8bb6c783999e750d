use chrono::NaiveDate;
use healthbridge::assessment::{parse_reference_date, AssessmentContext};
use healthbridge::config::{AppConfig, EligibilityConfig};
use healthbridge::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reference tables for commands that run outside the HTTP server.
pub(crate) fn load_context(province: Option<String>) -> Result<AssessmentContext, AppError> {
    let mut eligibility = AppConfig::load()?.eligibility;
    if let Some(province) = province {
        eligibility.province = province;
    }
    context_for(&eligibility)
}

pub(crate) fn context_for(eligibility: &EligibilityConfig) -> Result<AssessmentContext, AppError> {
    let context = AssessmentContext::from_config(eligibility)?;
    debug!(
        province = context.province.id,
        agreements = context.agreements.len(),
        custom_table = eligibility.agreements_csv.is_some(),
        "eligibility tables loaded"
    );
    Ok(context)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_reference_date(raw).map_err(|err| err.to_string())
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
