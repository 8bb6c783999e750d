//! Interim private insurance catalog consulted once the waiting period is known.
//!
//! Kept apart from the eligibility core: nothing here influences the waiting
//! period or the wizard flow.

use std::num::NonZeroU8;

use serde::Serialize;

use crate::assessment::ImmigrationStatus;

/// Visual identity of an insurer, keyed by enum instead of by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderBrand {
    Gms,
    BlueCross,
    Manulife,
    SunLife,
    GuardMe,
    Generic,
}

impl ProviderBrand {
    /// Unrecognized names fall back to [`ProviderBrand::Generic`].
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "gms" => Self::Gms,
            "bluecross" | "quebecbluecross" => Self::BlueCross,
            "manulife" => Self::Manulife,
            "sunlife" => Self::SunLife,
            "guardme" => Self::GuardMe,
            _ => Self::Generic,
        }
    }

    pub const fn accent_color(self) -> &'static str {
        match self {
            Self::Gms => "#0b5394",
            Self::BlueCross => "#0072ce",
            Self::Manulife => "#00a758",
            Self::SunLife => "#ffcb05",
            Self::GuardMe => "#e4002b",
            Self::Generic => "#6b7280",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Gms | Self::BlueCross => "shield",
            Self::Manulife | Self::SunLife => "heart",
            Self::GuardMe => "graduation-cap",
            Self::Generic => "building",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Primary,
    Supplementary,
    Gap,
    Travel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
    MostPopular,
    BestValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageFeatures {
    pub emergency_medical: &'static str,
    pub prescription_drugs: bool,
    pub dental: bool,
    pub vision: bool,
    pub physio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsuranceProvider {
    pub id: &'static str,
    pub name: &'static str,
    pub brand: ProviderBrand,
    /// Individual monthly premium in whole dollars.
    pub monthly_price: u32,
    pub coverage: CoverageFeatures,
    pub provinces: Vec<&'static str>,
    pub target_statuses: Vec<ImmigrationStatus>,
    pub tag: Option<ProviderTag>,
    pub insurance_type: InsuranceType,
    pub quote_url: &'static str,
}

impl InsuranceProvider {
    fn serves(&self, province: &str, status: ImmigrationStatus) -> bool {
        self.provinces
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(province.trim()))
            && (self.target_statuses.is_empty() || self.target_statuses.contains(&status))
    }
}

/// Provider with its premium scaled to the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedProvider {
    pub provider: InsuranceProvider,
    pub monthly_price: u32,
}

/// Household premium: 1x, 1.6x, 2.2x, 2.8x for one to four people, then
/// another 0.4x per extra member, rounded to the nearest dollar.
pub fn family_price(base_price: u32, family_size: NonZeroU8) -> u32 {
    let size = u64::from(family_size.get());
    let multiplier_tenths: u64 = match size {
        1 => 10,
        2 => 16,
        3 => 22,
        4 => 28,
        extra => 28 + (extra - 4) * 4,
    };

    let scaled = (u64::from(base_price) * multiplier_tenths + 5) / 10;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Most popular first, then best value, then the cheapest listed option.
pub fn recommended(providers: &[PricedProvider]) -> Option<&PricedProvider> {
    providers
        .iter()
        .find(|priced| priced.provider.tag == Some(ProviderTag::MostPopular))
        .or_else(|| {
            providers
                .iter()
                .find(|priced| priced.provider.tag == Some(ProviderTag::BestValue))
        })
        .or_else(|| providers.first())
}

#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Vec<InsuranceProvider>,
}

impl ProviderCatalog {
    pub fn standard() -> Self {
        Self {
            providers: standard_providers(),
        }
    }

    pub fn providers(&self) -> &[InsuranceProvider] {
        &self.providers
    }

    /// Providers selling in `province` to `status`, cheapest first.
    pub fn providers_for(
        &self,
        province: &str,
        status: ImmigrationStatus,
        family_size: NonZeroU8,
    ) -> Vec<PricedProvider> {
        let mut priced: Vec<PricedProvider> = self
            .providers
            .iter()
            .filter(|provider| provider.serves(province, status))
            .map(|provider| PricedProvider {
                monthly_price: family_price(provider.monthly_price, family_size),
                provider: provider.clone(),
            })
            .collect();

        priced.sort_by_key(|entry| entry.monthly_price);
        priced
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_providers() -> Vec<InsuranceProvider> {
    use ImmigrationStatus::{PermanentResident, StudyPermit, Visitor, WorkPermit};

    vec![
        InsuranceProvider {
            id: "gms-newcomer",
            name: "GMS Newcomers to Canada",
            brand: ProviderBrand::Gms,
            monthly_price: 68,
            coverage: CoverageFeatures {
                emergency_medical: "$150,000",
                prescription_drugs: true,
                dental: false,
                vision: false,
                physio: true,
            },
            provinces: vec!["quebec", "ontario", "british_columbia", "alberta"],
            target_statuses: vec![PermanentResident, WorkPermit],
            tag: Some(ProviderTag::MostPopular),
            insurance_type: InsuranceType::Gap,
            quote_url: "https://www.gms.ca/newcomers",
        },
        InsuranceProvider {
            id: "blue-cross-quebec",
            name: "Blue Cross Quebec",
            brand: ProviderBrand::BlueCross,
            monthly_price: 72,
            coverage: CoverageFeatures {
                emergency_medical: "$200,000",
                prescription_drugs: true,
                dental: true,
                vision: false,
                physio: true,
            },
            provinces: vec!["quebec"],
            target_statuses: vec![PermanentResident, WorkPermit, Visitor],
            tag: None,
            insurance_type: InsuranceType::Gap,
            quote_url: "https://www.qc.bluecross.ca/en/travel-insurance",
        },
        InsuranceProvider {
            id: "manulife-coverme",
            name: "Manulife CoverMe",
            brand: ProviderBrand::Manulife,
            monthly_price: 61,
            coverage: CoverageFeatures {
                emergency_medical: "$100,000",
                prescription_drugs: true,
                dental: false,
                vision: false,
                physio: false,
            },
            provinces: vec!["quebec", "ontario", "british_columbia", "alberta"],
            target_statuses: vec![PermanentResident, WorkPermit, Visitor],
            tag: Some(ProviderTag::BestValue),
            insurance_type: InsuranceType::Gap,
            quote_url: "https://www.coverme.com/visitors-to-canada",
        },
        InsuranceProvider {
            id: "sun-life-personal",
            name: "Sun Life Personal Health",
            brand: ProviderBrand::SunLife,
            monthly_price: 95,
            coverage: CoverageFeatures {
                emergency_medical: "Unlimited",
                prescription_drugs: true,
                dental: true,
                vision: true,
                physio: true,
            },
            provinces: vec!["quebec", "ontario", "british_columbia", "alberta"],
            target_statuses: vec![PermanentResident, WorkPermit],
            tag: None,
            insurance_type: InsuranceType::Primary,
            quote_url: "https://www.sunlife.ca/en/health/",
        },
        InsuranceProvider {
            id: "guard-me-student",
            name: "guard.me International Student",
            brand: ProviderBrand::GuardMe,
            monthly_price: 54,
            coverage: CoverageFeatures {
                emergency_medical: "$2,000,000",
                prescription_drugs: true,
                dental: false,
                vision: false,
                physio: false,
            },
            provinces: vec!["quebec", "ontario", "british_columbia", "alberta"],
            target_statuses: vec![StudyPermit],
            tag: None,
            insurance_type: InsuranceType::Primary,
            quote_url: "https://www.guard.me/",
        },
    ]
}
