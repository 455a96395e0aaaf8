use chrono::NaiveDate;
use epimap::loader::{self, DatasetSource, LoadError};
use epimap::scale::{fill_for_region, ColorRamp, ScaleOptions};
use epimap::session::Applied;
use epimap::{Dashboard, MetricFilter, Resolved, ScaleLevel, ViewState};
use std::path::{Path, PathBuf};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn national() -> DatasetSource {
    DatasetSource::File(data_dir().join("provinces.csv"))
}

fn province_dir() -> PathBuf {
    data_dir().join("provinces")
}

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2020, 1, d)
}

#[tokio::test]
async fn loads_national_file_in_source_order() {
    let dataset = loader::load(national()).await.unwrap();
    assert_eq!(dataset.report.kept_rows, 7);
    assert_eq!(dataset.report.dropped_rows, 0);
    assert_eq!(dataset.records[0].region_name, "湖北省");
    assert_eq!(dataset.records[0].observed_date, day(26).unwrap());
}

#[tokio::test]
async fn missing_file_is_a_load_failure() {
    let missing = DatasetSource::File(data_dir().join("nope.csv"));
    let err = loader::load(missing).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[tokio::test]
async fn headerless_file_is_a_load_failure() {
    let dir = std::env::temp_dir().join("epimap-headerless-test");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("provinces.csv");
    tokio::fs::write(&path, "湖北省,100,0,10,5,2020-01-25\n").await.unwrap();

    let dashboard = Dashboard::new(ScaleLevel::Nation, ScaleOptions::default());
    let err = dashboard.load(DatasetSource::File(path)).await.unwrap_err();
    assert!(matches!(err, LoadError::MissingColumns { .. }));
    assert!(dashboard.dataset().is_none());
}

#[tokio::test]
async fn nation_view_for_requested_day() {
    let dashboard = Dashboard::new(ScaleLevel::Nation, ScaleOptions::default());
    assert_eq!(dashboard.load(national()).await.unwrap(), Applied::Current);

    let mut state = ViewState {
        date: day(25),
        ..ViewState::default()
    };
    let view = dashboard.view(&mut state).unwrap();
    assert!(!view.outcome.corrected);
    assert_eq!(view.outcome.slice.len(), 3);
    assert_eq!(view.headline, Resolved::Count(729 + 98 + 104));
    assert_eq!(view.scale.domain(), [98.0, 729.0]);
    assert_eq!(state.date, day(25));
}

#[tokio::test]
async fn absent_day_corrects_the_selection() {
    let dashboard = Dashboard::new(ScaleLevel::Nation, ScaleOptions::default());
    dashboard.load(national()).await.unwrap();

    let mut state = ViewState::from_query("date=2020-01-27&filter=deceased&region=湖北");
    let view = dashboard.view(&mut state).unwrap();
    assert!(view.outcome.corrected);
    assert_eq!(state.date, day(26));
    assert_eq!(view.headline, Resolved::Count(52));
    assert_eq!(view.board.unwrap().confirmed, 1052);
    assert!(state.to_query().starts_with("date=2020-01-26&filter=deceased"));
}

#[tokio::test]
async fn failed_reload_keeps_previous_dataset() {
    let dashboard = Dashboard::new(ScaleLevel::Nation, ScaleOptions::default());
    dashboard.load(national()).await.unwrap();
    let missing = DatasetSource::File(data_dir().join("nope.csv"));
    assert!(dashboard.load(missing).await.is_err());
    assert_eq!(dashboard.dataset().unwrap().records.len(), 7);
}

#[tokio::test]
async fn stale_load_cannot_overwrite_newer_one() {
    let dashboard = Dashboard::new(ScaleLevel::Nation, ScaleOptions::default());
    let stale_ticket = dashboard.sequencer().issue();

    let (_, city_source) =
        Dashboard::province_view("湖北", &province_dir(), ScaleOptions::default()).unwrap();
    assert_eq!(dashboard.load(city_source).await.unwrap(), Applied::Current);

    let late = loader::load(national()).await.unwrap();
    let applied = dashboard.sequencer().complete(stale_ticket, late);
    assert_eq!(applied, Applied::Stale);
    assert_eq!(dashboard.dataset().unwrap().records[0].region_name, "武汉");
}

#[tokio::test]
async fn province_view_colors_cities() {
    let (dashboard, source) =
        Dashboard::province_view("湖北省", &province_dir(), ScaleOptions::default()).unwrap();
    dashboard.load(source).await.unwrap();

    let mut state = ViewState {
        date: day(26),
        metric: MetricFilter::Confirmed,
        region: Some("武汉市".to_string()),
        province: Some("湖北".to_string()),
    };
    let view = dashboard.view(&mut state).unwrap();
    assert_eq!(view.level, ScaleLevel::Province);
    assert_eq!(view.scale.domain(), [0.0, 698.0]);
    assert_eq!(view.headline, Resolved::Count(698));

    let ramp = ColorRamp::for_metric(MetricFilter::Confirmed);
    let fill = |name| fill_for_region(&view.outcome.slice, &view.scale, state.metric, name);
    let wuhan = fill("武汉市");
    let unknown = fill("十堰市");
    assert_eq!(wuhan, ramp.high);
    assert_eq!(unknown, ramp.low);
}
