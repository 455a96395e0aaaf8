//! Dataset ownership and derived views.
//!
//! Loads may overlap. Each one takes a ticket from a [`LoadSequencer`];
//! a result is applied only if its ticket is still the newest issued, so a
//! slow stale load cannot replace a fresher dataset.

use crate::aggregate::{available_dates, slice_and_group_by_region, SliceOutcome};
use crate::loader::{self, Dataset, DatasetSource, LoadError};
use crate::region::{Province, RegionError};
use crate::resolve::{board_totals, resolve, Resolved};
use crate::scale::{scale_for_slice, ColorScale, ScaleLevel, ScaleOptions};
use crate::state::ViewState;
use crate::types::RegionTotals;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Sequence number of one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    /// A newer request was issued after this one; the value was dropped.
    Stale,
}

/// Keeps only the result of the most recently issued request.
#[derive(Debug)]
pub struct LoadSequencer<T> {
    issued: AtomicU64,
    current: Mutex<Option<(LoadTicket, Arc<T>)>>,
}

impl<T> Default for LoadSequencer<T> {
    fn default() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }
}

impl<T> LoadSequencer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> LoadTicket {
        LoadTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest_issued()
    }

    /// Store `value` if `ticket` is the newest issued.
    pub fn complete(&self, ticket: LoadTicket, value: T) -> Applied {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.is_latest(ticket) {
            log::debug!(
                "discarding stale load #{} (latest is #{})",
                ticket.0,
                self.latest_issued()
            );
            return Applied::Stale;
        }
        *current = Some((ticket, Arc::new(value)));
        Applied::Current
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, v)| Arc::clone(v))
    }
}

/// Everything a renderer needs for one (dataset, date, metric) triple.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub outcome: SliceOutcome,
    pub scale: ColorScale,
    pub level: ScaleLevel,
    /// Board data; `None` while nothing matches or nothing is loaded.
    pub board: Option<RegionTotals>,
    /// The selected metric for the selected region, or the slice total.
    pub headline: Resolved,
}

/// One map: a sequenced dataset plus the options used to color it.
#[derive(Debug)]
pub struct Dashboard {
    level: ScaleLevel,
    scale_options: ScaleOptions,
    datasets: LoadSequencer<Dataset>,
}

impl Dashboard {
    pub fn new(level: ScaleLevel, scale_options: ScaleOptions) -> Self {
        Self {
            level,
            scale_options,
            datasets: LoadSequencer::new(),
        }
    }

    /// Dashboard for one province's city map.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnknownProvince`] when `name` is not a
    /// province; the city view cannot be shown without its data file.
    pub fn province_view(
        name: &str,
        data_dir: &Path,
        scale_options: ScaleOptions,
    ) -> Result<(Self, DatasetSource), RegionError> {
        let province = Province::require(name)?;
        let path: PathBuf = province.data_path(data_dir);
        Ok((
            Self::new(ScaleLevel::Province, scale_options),
            DatasetSource::File(path),
        ))
    }

    pub fn level(&self) -> ScaleLevel {
        self.level
    }

    pub fn sequencer(&self) -> &LoadSequencer<Dataset> {
        &self.datasets
    }

    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.datasets.current()
    }

    /// Load `source` and install it unless a newer load was started in
    /// the meantime. A failed load keeps the previous dataset.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the dataset could not be read.
    pub async fn load(&self, source: DatasetSource) -> Result<Applied, LoadError> {
        let ticket = self.datasets.issue();
        let dataset = loader::load(source).await?;
        Ok(self.datasets.complete(ticket, dataset))
    }

    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.dataset()
            .map(|d| available_dates(&d.records))
            .unwrap_or_default()
    }

    /// Derive the view for `state`, correcting its date if the requested
    /// day has no data. `None` until a dataset is loaded.
    pub fn view(&self, state: &mut ViewState) -> Option<DashboardView> {
        let dataset = self.dataset()?;
        let outcome = slice_and_group_by_region(&dataset.records, state.date);
        state.reconcile(&outcome);

        let scale = scale_for_slice(
            &self.scale_options,
            &outcome.slice,
            state.metric,
            self.level,
        );
        let region = state.region.as_deref();
        Some(DashboardView {
            board: board_totals(&outcome.slice, region),
            headline: resolve(&outcome.slice, region, state.metric),
            scale,
            level: self.level,
            outcome,
        })
    }
}
