use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Add;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tabled::Tabled;

/// A data row exactly as it appears in the CSV, before any validation.
///
/// Every column is optional so that a short or sparse row still
/// deserializes; the loader decides whether it is usable.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "name")]
    pub name: Option<String>,
    #[serde(rename = "confirmed")]
    pub confirmed: Option<String>,
    #[serde(rename = "discharged")]
    pub discharged: Option<String>,
    #[serde(rename = "deceased")]
    pub deceased: Option<String>,
    #[serde(rename = "suspected")]
    pub suspected: Option<String>,
    #[serde(rename = "updatedAtDate")]
    pub updated_at_date: Option<String>,
}

/// One validated row: a region's four counts on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionObservation {
    pub region_name: String,
    pub confirmed: u64,
    pub discharged: u64,
    pub deceased: u64,
    pub suspected: u64,
    pub observed_date: NaiveDate,
}

impl RegionObservation {
    pub fn metric(&self, metric: MetricFilter) -> u64 {
        match metric {
            MetricFilter::Confirmed => self.confirmed,
            MetricFilter::Discharged => self.discharged,
            MetricFilter::Deceased => self.deceased,
            MetricFilter::Suspected => self.suspected,
        }
    }

    pub fn totals(&self) -> RegionTotals {
        RegionTotals {
            confirmed: self.confirmed,
            discharged: self.discharged,
            deceased: self.deceased,
            suspected: self.suspected,
        }
    }
}

/// Which of the four tracked counts is displayed and colored.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MetricFilter {
    #[default]
    Confirmed,
    #[strum(to_string = "discharged", serialize = "cured")]
    #[serde(alias = "cured")]
    Discharged,
    #[strum(to_string = "deceased", serialize = "death")]
    #[serde(alias = "death")]
    Deceased,
    Suspected,
}

/// The four counts of a region (or of a whole slice) taken together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionTotals {
    pub confirmed: u64,
    pub discharged: u64,
    pub deceased: u64,
    pub suspected: u64,
}

impl RegionTotals {
    pub fn get(&self, metric: MetricFilter) -> u64 {
        match metric {
            MetricFilter::Confirmed => self.confirmed,
            MetricFilter::Discharged => self.discharged,
            MetricFilter::Deceased => self.deceased,
            MetricFilter::Suspected => self.suspected,
        }
    }
}

/// Element-wise sum. Each field saturates at `u64::MAX` instead of
/// wrapping, so an absurd feed can pin a total at the ceiling but never
/// make it smaller than any of its parts.
impl Add for RegionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            confirmed: self.confirmed.saturating_add(rhs.confirmed),
            discharged: self.discharged.saturating_add(rhs.discharged),
            deceased: self.deceased.saturating_add(rhs.deceased),
            suspected: self.suspected.saturating_add(rhs.suspected),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SliceRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Confirmed")]
    #[tabled(rename = "Confirmed")]
    pub confirmed: String,
    #[serde(rename = "Discharged")]
    #[tabled(rename = "Discharged")]
    pub discharged: String,
    #[serde(rename = "Deceased")]
    #[tabled(rename = "Deceased")]
    pub deceased: String,
    #[serde(rename = "Suspected")]
    #[tabled(rename = "Suspected")]
    pub suspected: String,
    #[serde(rename = "Fill")]
    #[tabled(rename = "Fill")]
    pub fill: String,
}

#[derive(Debug, Serialize)]
pub struct SliceSummary {
    pub requested_date: Option<NaiveDate>,
    pub effective_date: Option<NaiveDate>,
    pub date_corrected: bool,
    pub metric: MetricFilter,
    pub total_regions: usize,
    /// `None` until a non-empty slice exists.
    pub totals: Option<RegionTotals>,
}
