use crate::types::{RawRow, RegionObservation};
use crate::util::{format_int, parse_count_safe, parse_date_safe};
use csv::ReaderBuilder;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Failures that prevent a dataset from being read at all.
///
/// Bad rows are not in here: they are dropped and counted in
/// [`LoadReport`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("header is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("invalid dataset locator: {0:?}")]
    InvalidLocator(String),
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(reqwest::Url),
}

impl DatasetSource {
    /// Interpret a locator: `http://` and `https://` are URLs, anything
    /// else is a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidLocator`] for an empty locator or an
    /// unparsable URL.
    pub fn parse(locator: &str) -> Result<Self, LoadError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(LoadError::InvalidLocator(locator.to_string()));
        }
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return reqwest::Url::parse(locator)
                .map(Self::Url)
                .map_err(|_| LoadError::InvalidLocator(locator.to_string()));
        }
        Ok(Self::File(PathBuf::from(locator)))
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

/// Columns every dataset header must carry, in any order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "confirmed",
    "discharged",
    "deceased",
    "suspected",
    "updatedAtDate",
];

/// A successfully loaded dataset. Records keep source-file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Arc<[RegionObservation]>,
    pub report: LoadReport,
    pub source: DatasetSource,
}

/// Validate one raw row. `None` means the row is dropped.
fn observation_from_row(row: RawRow) -> Option<RegionObservation> {
    let region_name = row
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())?;
    Some(RegionObservation {
        region_name: region_name.to_string(),
        confirmed: parse_count_safe(row.confirmed.as_deref())?,
        discharged: parse_count_safe(row.discharged.as_deref())?,
        deceased: parse_count_safe(row.deceased.as_deref())?,
        suspected: parse_count_safe(row.suspected.as_deref())?,
        observed_date: parse_date_safe(row.updated_at_date.as_deref())?,
    })
}

/// Parse a CSV stream with a header row into observations.
///
/// Rows with a missing name, metric or date, or with a value that does not
/// coerce, are skipped. The header itself must name every column in
/// [`REQUIRED_COLUMNS`]; a file without one is rejected rather than read
/// as an empty dataset.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] if the header cannot be read and
/// [`LoadError::MissingColumns`] if it lacks a required column.
pub fn parse_observations<R: Read>(
    reader: R,
) -> Result<(Vec<RegionObservation>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h.trim() == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    let mut total_rows = 0usize;
    let mut dropped_rows = 0usize;
    let mut records: Vec<RegionObservation> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("row {total_rows}: unreadable ({e})");
                dropped_rows += 1;
                continue;
            }
        };
        match observation_from_row(row) {
            Some(obs) => records.push(obs),
            None => {
                log::debug!("row {total_rows}: missing or non-numeric field");
                dropped_rows += 1;
            }
        }
    }

    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        dropped_rows,
    };
    Ok((records, report))
}

async fn read_source(source: &DatasetSource) -> Result<Vec<u8>, LoadError> {
    match source {
        DatasetSource::File(path) => {
            tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })
        }
        DatasetSource::Url(url) => {
            let response = reqwest::get(url.clone()).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Read and parse a dataset from a file or URL.
///
/// # Errors
///
/// Returns [`LoadError`] when the resource cannot be read or its header
/// is unreadable or incomplete. An empty result is not an error.
pub async fn load(source: DatasetSource) -> Result<Dataset, LoadError> {
    log::info!("Loading dataset from {source}");
    let bytes = read_source(&source).await?;
    let (records, report) = parse_observations(bytes.as_slice())?;
    log::info!(
        "Loaded {} rows from {source} ({} kept, {} dropped)",
        format_int(report.total_rows),
        format_int(report.kept_rows),
        format_int(report.dropped_rows)
    );
    Ok(Dataset {
        records: records.into(),
        report,
        source,
    })
}
