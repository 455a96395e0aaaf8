//! The user's current selection, as an explicit value.
//!
//! Aggregation never reads selection state on its own: callers pass a
//! [`ViewState`] in. Query-string conversion happens only at the edges,
//! via [`ViewState::from_query`] on entry and [`ViewState::to_query`] on
//! change.

use crate::aggregate::SliceOutcome;
use crate::types::MetricFilter;
use crate::util::{date_key, parse_date_safe};
use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Base used to parse bare query strings; only the query part matters.
const QUERY_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub date: Option<NaiveDate>,
    pub metric: MetricFilter,
    /// Hovered or pinned region on the current map.
    pub region: Option<String>,
    /// Province whose city map is shown; `None` for the national map.
    pub province: Option<String>,
}

impl ViewState {
    /// Read a selection from a query string such as
    /// `?date=2020-01-25&filter=deceased&province=湖北`.
    ///
    /// Missing or malformed values keep their defaults.
    pub fn from_query(query: &str) -> Self {
        let mut state = Self::default();
        state.apply_query(query);
        state
    }

    /// Overlay the values present in `query` onto this state.
    ///
    /// Keys that are absent, empty or unparsable leave the current value
    /// alone, so a state seeded from settings keeps those settings.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.trim_start_matches('?');
        let Ok(mut url) = Url::parse(QUERY_BASE) else {
            return;
        };
        url.set_query(Some(query));

        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "date" => {
                    if let Some(date) = parse_date_safe(Some(value)) {
                        self.date = Some(date);
                    }
                }
                "filter" => {
                    if let Ok(metric) = value.parse() {
                        self.metric = metric;
                    }
                }
                "region" => self.region = Some(value.to_string()),
                "province" => self.province = Some(value.to_string()),
                _ => {}
            }
        }
    }

    /// Write the selection back as a query string (without the `?`).
    pub fn to_query(&self) -> String {
        let Ok(mut url) = Url::parse(QUERY_BASE) else {
            return String::new();
        };
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(date) = self.date {
                pairs.append_pair("date", &date_key(date));
            }
            pairs.append_pair("filter", self.metric.as_ref());
            if let Some(province) = &self.province {
                pairs.append_pair("province", province);
            }
            if let Some(region) = &self.region {
                pairs.append_pair("region", region);
            }
        }
        url.query().unwrap_or_default().to_string()
    }

    /// Move the date selection to the date the aggregator actually used.
    /// Returns whether the state changed.
    pub fn reconcile(&mut self, outcome: &SliceOutcome) -> bool {
        if outcome.corrected && outcome.effective_date != self.date {
            self.date = outcome.effective_date;
            return true;
        }
        false
    }
}
