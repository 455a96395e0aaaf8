//! Date slicing and per-region grouping.
//!
//! Records are grouped by calendar date, one date is selected, and that
//! date's records are keyed by [`RegionKey`]. All groupings preserve the
//! order in which keys were first seen in the source.

use crate::region::{normalize_region_name, RegionKey};
use crate::types::RegionObservation;
use crate::util::date_key;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Records grouped by observation date, in first-seen date order.
#[derive(Debug, Default)]
pub struct DateGroups<'a> {
    groups: Vec<(NaiveDate, Vec<&'a RegionObservation>)>,
    index: HashMap<String, usize>,
}

impl<'a> DateGroups<'a> {
    pub fn get(&self, date: NaiveDate) -> Option<&[&'a RegionObservation]> {
        self.index
            .get(&date_key(date))
            .map(|&i| self.groups[i].1.as_slice())
    }

    /// The first date in insertion order.
    pub fn first(&self) -> Option<(NaiveDate, &[&'a RegionObservation])> {
        self.groups.first().map(|(d, recs)| (*d, recs.as_slice()))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.groups.iter().map(|(d, _)| *d)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn group_by_date(records: &[RegionObservation]) -> DateGroups<'_> {
    let mut out = DateGroups::default();
    for r in records {
        let key = date_key(r.observed_date);
        let idx = *out.index.entry(key).or_insert_with(|| {
            out.groups.push((r.observed_date, Vec::new()));
            out.groups.len() - 1
        });
        out.groups[idx].1.push(r);
    }
    out
}

/// One date's observations keyed by region, in first-seen order.
///
/// Holds at most one observation per key. When two observations share a
/// key the first one inserted is kept; the feed lists the newest update
/// for a day first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSlice {
    entries: Vec<(RegionKey, RegionObservation)>,
    index: HashMap<RegionKey, usize>,
}

impl DateSlice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present. Returns whether the
    /// observation was stored.
    pub fn insert(&mut self, key: RegionKey, obs: RegionObservation) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, obs));
        true
    }

    pub fn get(&self, key: &RegionKey) -> Option<&RegionObservation> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionKey, &RegionObservation)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &RegionObservation> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observations back out of the slice, in key order of first insertion.
    pub fn flatten(&self) -> Vec<RegionObservation> {
        self.values().cloned().collect()
    }
}

impl<'a> FromIterator<&'a RegionObservation> for DateSlice {
    fn from_iter<I: IntoIterator<Item = &'a RegionObservation>>(iter: I) -> Self {
        let mut slice = Self::new();
        for obs in iter {
            slice.insert(normalize_region_name(&obs.region_name), obs.clone());
        }
        slice
    }
}

/// Result of selecting a date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceOutcome {
    pub slice: DateSlice,
    /// The date the slice belongs to; `None` only for an empty dataset.
    pub effective_date: Option<NaiveDate>,
    /// Set when the requested date was absent and another date was used.
    /// Callers must move their date selection to `effective_date`.
    pub corrected: bool,
}

/// Select the requested date's records and key them by region.
///
/// When the requested date (or no date) has no records, the first date in
/// source order is used instead and the outcome is flagged as corrected.
pub fn slice_and_group_by_region(
    records: &[RegionObservation],
    requested: Option<NaiveDate>,
) -> SliceOutcome {
    let by_date = group_by_date(records);

    if let Some(date) = requested {
        if let Some(group) = by_date.get(date) {
            return SliceOutcome {
                slice: group.iter().copied().collect(),
                effective_date: Some(date),
                corrected: false,
            };
        }
    }

    let Some((fallback, group)) = by_date.first() else {
        return SliceOutcome::default();
    };
    match requested {
        Some(date) => log::warn!("no data for {date}, switching to {fallback}"),
        None => log::debug!("no date requested, using {fallback}"),
    }
    SliceOutcome {
        slice: group.iter().copied().collect(),
        effective_date: Some(fallback),
        corrected: true,
    }
}

/// Distinct observation dates, ascending.
pub fn available_dates(records: &[RegionObservation]) -> Vec<NaiveDate> {
    records
        .iter()
        .map(|r| r.observed_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
