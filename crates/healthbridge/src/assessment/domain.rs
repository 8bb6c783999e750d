use serde::{Deserialize, Serialize};
use std::num::NonZeroU8;
use std::str::FromStr;

/// Raised when an identifier coming from the UI or the CLI names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} identifier '{value}'")]
pub struct UnknownIdentifier {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImmigrationStatus {
    #[default]
    Unset,
    PermanentResident,
    WorkPermit,
    StudyPermit,
    Visitor,
}

impl ImmigrationStatus {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::PermanentResident => "permanent_resident",
            Self::WorkPermit => "work_permit",
            Self::StudyPermit => "study_permit",
            Self::Visitor => "visitor",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unset => "Not selected",
            Self::PermanentResident => "Permanent Resident",
            Self::WorkPermit => "Work Permit Holder",
            Self::StudyPermit => "International Student",
            Self::Visitor => "Visitor",
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl FromStr for ImmigrationStatus {
    type Err = UnknownIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "unset" => Ok(Self::Unset),
            "permanent_resident" | "pr" => Ok(Self::PermanentResident),
            "work_permit" => Ok(Self::WorkPermit),
            "study_permit" | "student" => Ok(Self::StudyPermit),
            "visitor" => Ok(Self::Visitor),
            _ => Err(UnknownIdentifier {
                kind: "immigration status",
                value: value.to_string(),
            }),
        }
    }
}

/// Three-way answer used by the benefits and insurance questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Unsure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RamqApplication {
    Yes,
    No,
    Planning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniversityInsurance {
    Mandatory,
    Optional,
    None,
    Unsure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageNeed {
    Emergency,
    Prescription,
    Dental,
    Vision,
    Mental,
    Physio,
}

impl CoverageNeed {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Emergency => "Emergency medical care",
            Self::Prescription => "Prescription medications",
            Self::Dental => "Dental care",
            Self::Vision => "Vision care",
            Self::Mental => "Mental health services",
            Self::Physio => "Physiotherapy",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Stored values other than `en`/`fr` are ignored rather than rejected.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }
}

pub(crate) fn default_family_size() -> NonZeroU8 {
    NonZeroU8::MIN
}

/// Answers accumulated across the wizard. Serialized as the flat snapshot the
/// results view reads back, so field names follow the stored camelCase keys.
///
/// Date answers are kept as the raw `YYYY-MM-DD` strings supplied by the UI; an
/// empty string means "not answered yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAnswers {
    #[serde(default)]
    pub immigration_status: ImmigrationStatus,
    #[serde(default)]
    pub country_of_origin: String,
    #[serde(default)]
    pub arrival_date: String,
    #[serde(default = "default_family_size")]
    pub family_size: NonZeroU8,
    #[serde(default)]
    pub employer_benefits: Option<Answer>,
    #[serde(default)]
    pub university_insurance: Option<UniversityInsurance>,
    #[serde(default)]
    pub coverage_needs: Vec<CoverageNeed>,
    #[serde(default)]
    pub ramq_application_submitted: Option<RamqApplication>,
    #[serde(default)]
    pub ramq_submission_date: String,
    #[serde(default)]
    pub ramq_card_received: Option<Answer>,
    #[serde(default, rename = "insuranceWithin5Days")]
    pub insurance_within_5_days: Option<Answer>,
    #[serde(default)]
    pub include_dental: bool,
    #[serde(default)]
    pub include_vision: bool,
    #[serde(default)]
    pub include_prescription: bool,
    #[serde(default)]
    pub include_emergency_travel: bool,
}

impl Default for AssessmentAnswers {
    fn default() -> Self {
        Self {
            immigration_status: ImmigrationStatus::Unset,
            country_of_origin: String::new(),
            arrival_date: String::new(),
            family_size: default_family_size(),
            employer_benefits: None,
            university_insurance: None,
            coverage_needs: Vec::new(),
            ramq_application_submitted: None,
            ramq_submission_date: String::new(),
            ramq_card_received: None,
            insurance_within_5_days: None,
            include_dental: false,
            include_vision: false,
            include_prescription: false,
            include_emergency_travel: false,
        }
    }
}

impl AssessmentAnswers {
    pub fn has_country(&self) -> bool {
        !self.country_of_origin.trim().is_empty()
    }

    pub fn has_arrival_date(&self) -> bool {
        !self.arrival_date.trim().is_empty()
    }

    pub fn has_ramq_submission_date(&self) -> bool {
        !self.ramq_submission_date.trim().is_empty()
    }

    /// Date the waiting period counts from. RAMQ counts from the application
    /// submission, so permanent residents who already applied use that date.
    pub fn reference_date(&self) -> &str {
        if self.immigration_status == ImmigrationStatus::PermanentResident
            && self.ramq_application_submitted == Some(RamqApplication::Yes)
        {
            &self.ramq_submission_date
        } else {
            &self.arrival_date
        }
    }
}

/// Partial update produced by one user-input event. Every `Some` field
/// overwrites the corresponding answer; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswersPatch {
    pub immigration_status: Option<ImmigrationStatus>,
    pub country_of_origin: Option<String>,
    pub arrival_date: Option<String>,
    pub family_size: Option<NonZeroU8>,
    pub employer_benefits: Option<Answer>,
    pub university_insurance: Option<UniversityInsurance>,
    pub coverage_needs: Option<Vec<CoverageNeed>>,
    pub ramq_application_submitted: Option<RamqApplication>,
    pub ramq_submission_date: Option<String>,
    pub ramq_card_received: Option<Answer>,
    #[serde(rename = "insuranceWithin5Days")]
    pub insurance_within_5_days: Option<Answer>,
    pub include_dental: Option<bool>,
    pub include_vision: Option<bool>,
    pub include_prescription: Option<bool>,
    pub include_emergency_travel: Option<bool>,
}

impl AnswersPatch {
    pub fn status(status: ImmigrationStatus) -> Self {
        Self {
            immigration_status: Some(status),
            ..Self::default()
        }
    }

    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country_of_origin: Some(country.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, answers: &mut AssessmentAnswers) {
        let Self {
            immigration_status,
            country_of_origin,
            arrival_date,
            family_size,
            employer_benefits,
            university_insurance,
            coverage_needs,
            ramq_application_submitted,
            ramq_submission_date,
            ramq_card_received,
            insurance_within_5_days,
            include_dental,
            include_vision,
            include_prescription,
            include_emergency_travel,
        } = self;

        if let Some(value) = immigration_status {
            answers.immigration_status = value;
        }
        if let Some(value) = country_of_origin {
            answers.country_of_origin = value;
        }
        if let Some(value) = arrival_date {
            answers.arrival_date = value;
        }
        if let Some(value) = family_size {
            answers.family_size = value;
        }
        if let Some(value) = employer_benefits {
            answers.employer_benefits = Some(value);
        }
        if let Some(value) = university_insurance {
            answers.university_insurance = Some(value);
        }
        if let Some(value) = coverage_needs {
            answers.coverage_needs = value;
        }
        if let Some(value) = ramq_application_submitted {
            answers.ramq_application_submitted = Some(value);
        }
        if let Some(value) = ramq_submission_date {
            answers.ramq_submission_date = value;
        }
        if let Some(value) = ramq_card_received {
            answers.ramq_card_received = Some(value);
        }
        if let Some(value) = insurance_within_5_days {
            answers.insurance_within_5_days = Some(value);
        }
        if let Some(value) = include_dental {
            answers.include_dental = value;
        }
        if let Some(value) = include_vision {
            answers.include_vision = value;
        }
        if let Some(value) = include_prescription {
            answers.include_prescription = value;
        }
        if let Some(value) = include_emergency_travel {
            answers.include_emergency_travel = value;
        }
    }
}
