//! Region lookups and whole-slice sums over a [`DateSlice`].

use crate::aggregate::DateSlice;
use crate::region::normalize_region_name;
use crate::types::{MetricFilter, RegionObservation, RegionTotals};
use serde::Serialize;

/// A resolved metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolved {
    Count(u64),
    /// Nothing to sum yet: the slice is empty.
    NotLoaded,
}

impl Resolved {
    pub fn count(self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(n),
            Self::NotLoaded => None,
        }
    }
}

/// Find the first region whose key starts with the normalized query.
///
/// Matching by prefix lets `武汉` find `武汉市` and a map feature named
/// `内蒙古` find the slice's `内蒙古` entry whatever suffix the feed used.
/// Ties go to the earlier key in slice order.
pub fn find_by_prefix<'s>(slice: &'s DateSlice, query: &str) -> Option<&'s RegionObservation> {
    let prefix = normalize_region_name(query);
    if prefix.is_empty() {
        return None;
    }
    slice
        .iter()
        .find(|(key, _)| key.starts_with(&prefix))
        .map(|(_, obs)| obs)
}

/// All four metrics summed over the slice; `None` for an empty slice.
///
/// Sums saturate at `u64::MAX` (see [`RegionTotals`]'s `Add`).
pub fn summarize(slice: &DateSlice) -> Option<RegionTotals> {
    if slice.is_empty() {
        return None;
    }
    Some(
        slice
            .values()
            .map(RegionObservation::totals)
            .fold(RegionTotals::default(), |acc, t| acc + t),
    )
}

/// Resolve a metric for a region, or for the whole slice when no region is
/// selected.
///
/// An unmatched region resolves to zero. The whole-slice sum of an empty
/// slice is [`Resolved::NotLoaded`], not zero.
pub fn resolve(slice: &DateSlice, query: Option<&str>, metric: MetricFilter) -> Resolved {
    match query {
        Some(name) => {
            let count = find_by_prefix(slice, name).map_or(0, |o| o.metric(metric));
            Resolved::Count(count)
        }
        None => match summarize(slice) {
            Some(totals) => Resolved::Count(totals.get(metric)),
            None => Resolved::NotLoaded,
        },
    }
}

/// Data for the display board: the selected region's counts, or the
/// slice totals when nothing is selected.
///
/// `None` means there is nothing to show yet (unmatched region or empty
/// slice).
pub fn board_totals(slice: &DateSlice, query: Option<&str>) -> Option<RegionTotals> {
    match query {
        Some(name) => find_by_prefix(slice, name).map(RegionObservation::totals),
        None => summarize(slice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::slice_and_group_by_region;
    use chrono::NaiveDate;

    fn obs(
        name: &str,
        confirmed: u64,
        discharged: u64,
        deceased: u64,
        suspected: u64,
    ) -> RegionObservation {
        RegionObservation {
            region_name: name.to_string(),
            confirmed,
            discharged,
            deceased,
            suspected,
            observed_date: NaiveDate::from_ymd_opt(2020, 1, 25).unwrap(),
        }
    }

    fn sample_slice() -> DateSlice {
        let records = vec![
            obs("湖北省", 100, 10, 5, 0),
            obs("广东省", 20, 2, 0, 7),
            obs("内蒙古自治区", 3, 0, 0, 1),
        ];
        slice_and_group_by_region(&records, None).slice
    }

    #[test]
    fn resolves_exact_key() {
        let slice = sample_slice();
        let hubei = resolve(&slice, Some("湖北"), MetricFilter::Confirmed);
        assert_eq!(hubei, Resolved::Count(100));
        let hubei_full = resolve(&slice, Some("湖北省"), MetricFilter::Deceased);
        assert_eq!(hubei_full, Resolved::Count(5));
    }

    #[test]
    fn resolves_unambiguous_prefix_like_full_key() {
        let slice = sample_slice();
        let full = resolve(&slice, Some("内蒙古"), MetricFilter::Suspected);
        let prefix = resolve(&slice, Some("内蒙"), MetricFilter::Suspected);
        assert_eq!(full, Resolved::Count(1));
        assert_eq!(prefix, full);
    }

    #[test]
    fn unmatched_region_is_zero() {
        let slice = sample_slice();
        let tibet = resolve(&slice, Some("西藏"), MetricFilter::Confirmed);
        assert_eq!(tibet, Resolved::Count(0));
        let suffix_only = resolve(&slice, Some("市"), MetricFilter::Confirmed);
        assert_eq!(suffix_only, Resolved::Count(0));
    }

    #[test]
    fn ambiguous_prefix_takes_first_key_in_slice_order() {
        let records = vec![obs("海南省", 9, 0, 0, 0), obs("海口市", 4, 0, 0, 0)];
        let slice = slice_and_group_by_region(&records, None).slice;
        let first = resolve(&slice, Some("海"), MetricFilter::Confirmed);
        assert_eq!(first, Resolved::Count(9));
    }

    #[test]
    fn aggregate_is_exact_sum() {
        let slice = sample_slice();
        let total = |metric| resolve(&slice, None, metric);
        assert_eq!(total(MetricFilter::Confirmed), Resolved::Count(123));
        assert_eq!(total(MetricFilter::Discharged), Resolved::Count(12));
        assert_eq!(total(MetricFilter::Suspected), Resolved::Count(8));
        let expected = RegionTotals {
            confirmed: 123,
            discharged: 12,
            deceased: 5,
            suspected: 8,
        };
        assert_eq!(summarize(&slice), Some(expected));
    }

    #[test]
    fn aggregate_saturates_instead_of_overflowing() {
        let records = vec![
            obs("湖北省", u64::MAX, 0, 0, 0),
            obs("广东省", 1, 0, 0, 0),
        ];
        let slice = slice_and_group_by_region(&records, None).slice;
        let total = resolve(&slice, None, MetricFilter::Confirmed);
        assert_eq!(total, Resolved::Count(u64::MAX));
        assert_eq!(board_totals(&slice, None).unwrap().confirmed, u64::MAX);
    }

    #[test]
    fn empty_slice_aggregate_is_not_loaded() {
        let slice = DateSlice::new();
        let total = resolve(&slice, None, MetricFilter::Confirmed);
        assert_eq!(total, Resolved::NotLoaded);
        assert_eq!(summarize(&slice), None);
        let hubei = resolve(&slice, Some("湖北"), MetricFilter::Confirmed);
        assert_eq!(hubei, Resolved::Count(0));
    }

    #[test]
    fn board_shows_region_or_totals() {
        let slice = sample_slice();
        assert_eq!(board_totals(&slice, Some("广东")).unwrap().suspected, 7);
        assert_eq!(board_totals(&slice, None).unwrap().confirmed, 123);
        assert_eq!(board_totals(&slice, Some("台湾")), None);
    }
}
