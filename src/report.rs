use crate::aggregate::{DateSlice, SliceOutcome};
use crate::resolve::summarize;
use crate::scale::ColorScale;
use crate::types::{MetricFilter, RegionObservation, SliceRow, SliceSummary};
use crate::util::format_int;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Detail rows for a slice, highest value of `metric` first.
///
/// Ties are broken by region name so the table is stable between runs.
pub fn slice_rows(slice: &DateSlice, metric: MetricFilter, scale: &ColorScale) -> Vec<SliceRow> {
    let mut sorted: Vec<(&str, &RegionObservation)> = slice
        .iter()
        .map(|(key, obs)| (key.as_str(), obs))
        .collect();
    sorted.sort_by(|a, b| match b.1.metric(metric).cmp(&a.1.metric(metric)) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });

    sorted
        .into_iter()
        .map(|(key, obs)| SliceRow {
            region: key.to_string(),
            confirmed: format_int(obs.confirmed),
            discharged: format_int(obs.discharged),
            deceased: format_int(obs.deceased),
            suspected: format_int(obs.suspected),
            fill: scale.color(obs.metric(metric) as f64).to_string(),
        })
        .collect()
}

pub fn slice_summary(
    outcome: &SliceOutcome,
    requested_date: Option<NaiveDate>,
    metric: MetricFilter,
) -> SliceSummary {
    SliceSummary {
        requested_date,
        effective_date: outcome.effective_date,
        date_corrected: outcome.corrected,
        metric,
        total_regions: outcome.slice.len(),
        totals: summarize(&outcome.slice),
    }
}
