use super::agreements::BilateralAgreement;
use super::domain::ImmigrationStatus;
use serde::Serialize;

/// Public coverage rule for one immigration status within a province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEligibility {
    pub eligible: bool,
    pub waiting_period_days: u32,
    pub notes: &'static str,
}

impl StatusEligibility {
    const fn eligible(waiting_period_days: u32, notes: &'static str) -> Self {
        Self {
            eligible: true,
            waiting_period_days,
            notes,
        }
    }

    const fn not_eligible(notes: &'static str) -> Self {
        Self {
            eligible: false,
            waiting_period_days: 0,
            notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceRules {
    pub id: &'static str,
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub health_plan_name: &'static str,
    pub waiting_period_days: u32,
    pub application_url: &'static str,
    eligibility_by_status: Vec<(ImmigrationStatus, StatusEligibility)>,
}

impl ProvinceRules {
    /// Statuses missing from the table are treated as not covered.
    pub fn eligibility_for(&self, status: ImmigrationStatus) -> StatusEligibility {
        self.eligibility_by_status
            .iter()
            .find(|(candidate, _)| *candidate == status)
            .map(|(_, eligibility)| eligibility.clone())
            .unwrap_or_else(|| {
                StatusEligibility::not_eligible("Status not covered by the provincial plan")
            })
    }

    /// Days before public coverage starts, or `None` when the status never
    /// qualifies. A waiving agreement removes the waiting period entirely.
    pub fn waiting_period_days(
        &self,
        status: ImmigrationStatus,
        agreement: Option<&BilateralAgreement>,
    ) -> Option<u32> {
        let eligibility = self.eligibility_for(status);
        if !eligibility.eligible {
            return None;
        }

        if agreement.is_some_and(BilateralAgreement::waives_waiting_period) {
            Some(0)
        } else {
            Some(eligibility.waiting_period_days)
        }
    }
}

/// Read-only province table loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProvinceCatalog {
    provinces: Vec<ProvinceRules>,
}

impl ProvinceCatalog {
    pub fn standard() -> Self {
        Self {
            provinces: standard_provinces(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ProvinceRules> {
        let id = id.trim();
        self.provinces
            .iter()
            .find(|province| province.id.eq_ignore_ascii_case(id))
    }

    pub fn provinces(&self) -> &[ProvinceRules] {
        &self.provinces
    }
}

impl Default for ProvinceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_provinces() -> Vec<ProvinceRules> {
    use ImmigrationStatus::{PermanentResident, StudyPermit, Visitor, WorkPermit};

    vec![
        ProvinceRules {
            id: "quebec",
            name: "Quebec",
            abbreviation: "QC",
            health_plan_name: "RAMQ",
            waiting_period_days: 90,
            application_url: "https://www.ramq.gouv.qc.ca/en/citizens/health-insurance/register",
            eligibility_by_status: vec![
                (
                    PermanentResident,
                    StatusEligibility::eligible(
                        90,
                        "Waiting period counts from the RAMQ application date",
                    ),
                ),
                (
                    WorkPermit,
                    StatusEligibility::not_eligible(
                        "Work permit holders must keep private insurance for their entire stay",
                    ),
                ),
                (
                    StudyPermit,
                    StatusEligibility::not_eligible(
                        "Students rely on university or private insurance unless an agreement applies",
                    ),
                ),
                (
                    Visitor,
                    StatusEligibility::not_eligible("Visitors need travel medical insurance"),
                ),
            ],
        },
        ProvinceRules {
            id: "ontario",
            name: "Ontario",
            abbreviation: "ON",
            health_plan_name: "OHIP",
            waiting_period_days: 0,
            application_url: "https://www.ontario.ca/page/apply-ohip-and-get-health-card",
            eligibility_by_status: vec![
                (
                    PermanentResident,
                    StatusEligibility::eligible(0, "Coverage starts once the application is approved"),
                ),
                (
                    WorkPermit,
                    StatusEligibility::eligible(0, "Requires a full-time work permit of six months or more"),
                ),
                (
                    StudyPermit,
                    StatusEligibility::not_eligible("Students are covered by UHIP instead of OHIP"),
                ),
                (
                    Visitor,
                    StatusEligibility::not_eligible("Visitors need travel medical insurance"),
                ),
            ],
        },
        ProvinceRules {
            id: "british_columbia",
            name: "British Columbia",
            abbreviation: "BC",
            health_plan_name: "MSP",
            waiting_period_days: 90,
            application_url: "https://www2.gov.bc.ca/gov/content/health/health-drug-coverage/msp",
            eligibility_by_status: vec![
                (
                    PermanentResident,
                    StatusEligibility::eligible(90, "Balance of the arrival month plus two months"),
                ),
                (
                    WorkPermit,
                    StatusEligibility::eligible(90, "Requires a work permit of six months or more"),
                ),
                (
                    StudyPermit,
                    StatusEligibility::eligible(90, "Requires a study permit of six months or more"),
                ),
                (
                    Visitor,
                    StatusEligibility::not_eligible("Visitors need travel medical insurance"),
                ),
            ],
        },
        ProvinceRules {
            id: "alberta",
            name: "Alberta",
            abbreviation: "AB",
            health_plan_name: "AHCIP",
            waiting_period_days: 0,
            application_url: "https://www.alberta.ca/ahcip-how-to-apply",
            eligibility_by_status: vec![
                (
                    PermanentResident,
                    StatusEligibility::eligible(0, "Coverage starts on the date of arrival"),
                ),
                (
                    WorkPermit,
                    StatusEligibility::eligible(0, "Requires a work permit of twelve months or more"),
                ),
                (
                    StudyPermit,
                    StatusEligibility::eligible(0, "Requires a study permit of twelve months or more"),
                ),
                (
                    Visitor,
                    StatusEligibility::not_eligible("Visitors need travel medical insurance"),
                ),
            ],
        },
    ]
}
