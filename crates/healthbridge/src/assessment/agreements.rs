use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Standard RAMQ waiting period applied when no agreement waives it.
pub const STANDARD_WAITING_PERIOD_DAYS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementCategory {
    Full,
    Partial,
    None,
}

impl AgreementCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "Full agreement",
            Self::Partial => "Partial agreement",
            Self::None => "No agreement",
        }
    }
}

/// Social-security agreement between Quebec and a country of origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilateralAgreement {
    pub has_agreement: bool,
    pub category: AgreementCategory,
    pub waiting_period_waived: bool,
    pub documents_required: Vec<String>,
    pub notes: String,
}

impl BilateralAgreement {
    /// Classification for every country missing from the table.
    pub fn no_agreement() -> Self {
        Self {
            has_agreement: false,
            category: AgreementCategory::None,
            waiting_period_waived: false,
            documents_required: Vec::new(),
            notes: "No agreement - standard waiting period applies".to_string(),
        }
    }

    pub fn waives_waiting_period(&self) -> bool {
        self.category == AgreementCategory::Full && self.waiting_period_waived
    }
}

/// Waiting period implied by an agreement: zero when fully waived, otherwise
/// the standard 90 days.
pub fn waiting_period_days_for(agreement: &BilateralAgreement) -> u32 {
    if agreement.waives_waiting_period() {
        0
    } else {
        STANDARD_WAITING_PERIOD_DAYS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementSeverity {
    Success,
    Warning,
    Error,
}

impl AgreementSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgreementMessage {
    pub text: String,
    pub severity: AgreementSeverity,
}

/// Headline shown next to the country picker. Full agreements that keep the
/// waiting period share the partial warning severity.
pub fn message_for(agreement: Option<&BilateralAgreement>, country_name: &str) -> AgreementMessage {
    let Some(agreement) = agreement else {
        return AgreementMessage {
            text: "Unable to determine bilateral agreement status".to_string(),
            severity: AgreementSeverity::Error,
        };
    };

    if agreement.waives_waiting_period() {
        return AgreementMessage {
            text: format!(
                "Excellent! {country_name} has a social security agreement with Quebec. You may be able to skip the 3-month waiting period. You'll need to provide your {country_name} social security certificate when applying for RAMQ."
            ),
            severity: AgreementSeverity::Success,
        };
    }

    match agreement.category {
        AgreementCategory::Full => AgreementMessage {
            text: format!(
                "{country_name} has a social security agreement with Quebec, but it does not waive the 3-month waiting period. Keep your {country_name} social security certificate for your RAMQ application."
            ),
            severity: AgreementSeverity::Warning,
        },
        AgreementCategory::Partial => AgreementMessage {
            text: format!(
                "{country_name} has a partial agreement with Quebec. Your eligibility for a reduced waiting period will depend on your specific {country_name} social security coverage. Individual assessment required."
            ),
            severity: AgreementSeverity::Warning,
        },
        AgreementCategory::None => AgreementMessage {
            text: format!(
                "{country_name} does not have a social security agreement with Quebec. The standard 3-month waiting period will apply to your RAMQ coverage."
            ),
            severity: AgreementSeverity::Error,
        },
    }
}

/// Lookup state for the country picker. `agreement` stays empty until a
/// country is actually selected, which is distinct from "no agreement".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgreementStatus {
    pub country: String,
    pub agreement: Option<BilateralAgreement>,
}

impl AgreementStatus {
    pub fn is_classified(&self) -> bool {
        self.agreement.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgreementTableError {
    #[error("failed to read agreement table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid agreement table data: {0}")]
    Csv(#[from] csv::Error),
    #[error("agreement table row has an empty country")]
    MissingCountry,
    #[error("agreement for {country} waives the waiting period without a full agreement")]
    WaiverWithoutFullAgreement { country: String },
    #[error("agreement for {country} marks has_agreement inconsistently with category {category:?}")]
    InconsistentAgreement {
        country: String,
        category: AgreementCategory,
    },
    #[error("country {0} appears more than once in the agreement table")]
    DuplicateCountry(String),
}

#[derive(Debug, Deserialize)]
struct AgreementRow {
    country: String,
    category: AgreementCategory,
    waiting_period_waived: bool,
    #[serde(default)]
    documents_required: String,
    #[serde(default)]
    notes: String,
}

impl AgreementRow {
    fn into_entry(self) -> (String, BilateralAgreement) {
        let documents_required = self
            .documents_required
            .split(';')
            .map(str::trim)
            .filter(|document| !document.is_empty())
            .map(str::to_string)
            .collect();

        let agreement = BilateralAgreement {
            has_agreement: self.category != AgreementCategory::None,
            category: self.category,
            waiting_period_waived: self.waiting_period_waived,
            documents_required,
            notes: self.notes.trim().to_string(),
        };
        (self.country.trim().to_string(), agreement)
    }
}

/// Read-only table of bilateral agreements keyed by exact country name.
#[derive(Debug, Clone)]
pub struct AgreementRegistry {
    agreements: HashMap<String, BilateralAgreement>,
}

impl AgreementRegistry {
    pub fn standard() -> Self {
        let agreements = standard_agreements().into_iter().collect();
        Self { agreements }
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, AgreementTableError>
    where
        I: IntoIterator<Item = (String, BilateralAgreement)>,
    {
        let mut agreements = HashMap::new();
        for (country, agreement) in entries {
            if country.is_empty() {
                return Err(AgreementTableError::MissingCountry);
            }
            if agreement.waiting_period_waived && agreement.category != AgreementCategory::Full {
                return Err(AgreementTableError::WaiverWithoutFullAgreement { country });
            }
            if agreement.has_agreement == (agreement.category == AgreementCategory::None) {
                return Err(AgreementTableError::InconsistentAgreement {
                    country,
                    category: agreement.category,
                });
            }
            if agreements.contains_key(&country) {
                return Err(AgreementTableError::DuplicateCountry(country));
            }
            agreements.insert(country, agreement);
        }

        Ok(Self { agreements })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AgreementTableError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AgreementTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for row in csv_reader.deserialize::<AgreementRow>() {
            entries.push(row?.into_entry());
        }

        let registry = Self::from_entries(entries)?;
        tracing::debug!(countries = registry.len(), "loaded bilateral agreement table");
        Ok(registry)
    }

    /// Exact, case-sensitive lookup. Unknown countries are the common case and
    /// classify as [`BilateralAgreement::no_agreement`].
    pub fn classify(&self, country: &str) -> BilateralAgreement {
        self.agreements
            .get(country)
            .cloned()
            .unwrap_or_else(BilateralAgreement::no_agreement)
    }

    /// Lookup that keeps "nothing selected yet" apart from a real classification.
    pub fn status(&self, country: &str) -> AgreementStatus {
        let agreement = if country.trim().is_empty() {
            None
        } else {
            Some(self.classify(country))
        };

        AgreementStatus {
            country: country.to_string(),
            agreement,
        }
    }

    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = self.agreements.keys().map(String::as_str).collect();
        countries.sort_unstable();
        countries
    }

    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

impl Default for AgreementRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn full_waiver(country: &str, adjective: &str) -> (String, BilateralAgreement) {
    (
        country.to_string(),
        BilateralAgreement {
            has_agreement: true,
            category: AgreementCategory::Full,
            waiting_period_waived: true,
            documents_required: vec![
                format!("{adjective} social security certificate"),
                format!("Proof of coverage from {country}"),
            ],
            notes: "Full social security agreement - no waiting period with proper documentation"
                .to_string(),
        },
    )
}

fn partial(country: &str, first_document: &str) -> (String, BilateralAgreement) {
    (
        country.to_string(),
        BilateralAgreement {
            has_agreement: true,
            category: AgreementCategory::Partial,
            waiting_period_waived: false,
            documents_required: vec![
                first_document.to_string(),
                "Specific coverage documentation".to_string(),
            ],
            notes: "Partial agreement - case by case evaluation required".to_string(),
        },
    )
}

fn standard_agreements() -> Vec<(String, BilateralAgreement)> {
    vec![
        full_waiver("France", "French"),
        full_waiver("Belgium", "Belgian"),
        full_waiver("Denmark", "Danish"),
        full_waiver("Finland", "Finnish"),
        full_waiver("Greece", "Greek"),
        full_waiver("Luxembourg", "Luxembourg"),
        full_waiver("Norway", "Norwegian"),
        full_waiver("Portugal", "Portuguese"),
        full_waiver("Sweden", "Swedish"),
        full_waiver("Austria", "Austrian"),
        partial("Germany", "German social security forms"),
        partial("Netherlands", "Dutch social security certificate"),
        partial("Italy", "Italian social security certificate"),
    ]
}
