//! Regional epidemic statistics over time.
//!
//! Loads a daily per-region CSV feed (confirmed, discharged, deceased and
//! suspected counts), selects one day, keys that day's rows by region and
//! derives what a choropleth needs: per-region values, whole-slice totals
//! and per-metric color scales.

pub mod aggregate;
pub mod config;
pub mod loader;
pub mod output;
pub mod region;
pub mod report;
pub mod resolve;
pub mod scale;
pub mod session;
pub mod state;
pub mod types;
pub mod util;

pub use aggregate::{slice_and_group_by_region, DateSlice, SliceOutcome};
pub use loader::{load, Dataset, DatasetSource, LoadError};
pub use region::{normalize_region_name, Province, RegionError, RegionKey};
pub use resolve::{resolve, Resolved};
pub use scale::{build_scale, ColorScale, Rgb, ScaleLevel};
pub use session::{Dashboard, LoadSequencer};
pub use state::ViewState;
pub use types::{MetricFilter, RegionObservation, RegionTotals};
