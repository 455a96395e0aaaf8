// Command-line front end.
//
// - `show` prints the display board and the detail table for one day.
// - `export` writes the same table as CSV and a JSON summary.
// - `dates` lists the days present in the dataset.
// With `--province` every command works on that province's city data
// instead of the national file.
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use epimap::config::Config;
use epimap::loader::DatasetSource;
use epimap::report::{slice_rows, slice_summary};
use epimap::scale::ScaleLevel;
use epimap::session::{Dashboard, DashboardView};
use epimap::state::ViewState;
use epimap::types::{MetricFilter, RegionTotals};
use epimap::util::{date_key, format_int};
use epimap::{output, Resolved};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "epimap", about = "Regional epidemic statistics by day")]
struct Cli {
    /// Settings file (defaults to ./epimap.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// National dataset path or URL; overrides the settings file.
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the board totals and the region table.
    Show {
        #[command(flatten)]
        view: ViewArgs,
        /// Maximum number of table rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Write the region table and a summary to files.
    Export {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the dates available in the dataset.
    Dates {
        #[arg(long)]
        province: Option<String>,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Day to show (YYYY-MM-DD); falls back to an available day.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// confirmed, discharged, deceased or suspected.
    #[arg(long)]
    metric: Option<MetricFilter>,
    /// Region to single out on the board; prefixes are accepted.
    #[arg(long)]
    region: Option<String>,
    /// Show this province's cities instead of the nation.
    #[arg(long)]
    province: Option<String>,
    /// Initial selection as a URL query string, e.g. `date=2020-01-25&filter=cured`.
    #[arg(long)]
    query: Option<String>,
}

impl ViewArgs {
    /// Settings first, then the query string, then individual flags.
    fn into_state(self, config: &Config) -> ViewState {
        let mut state = ViewState {
            metric: config.metric,
            ..ViewState::default()
        };
        if let Some(query) = self.query.as_deref() {
            state.apply_query(query);
        }
        if self.date.is_some() {
            state.date = self.date;
        }
        if let Some(metric) = self.metric {
            state.metric = metric;
        }
        if self.region.is_some() {
            state.region = self.region;
        }
        if self.province.is_some() {
            state.province = self.province;
        }
        state
    }
}

/// Build the dashboard for the nation or for one province, and load it.
///
/// An unknown province stops here: there is no city file to show.
async fn open_dashboard(
    config: &Config,
    province: Option<&str>,
) -> Result<Dashboard, Box<dyn Error>> {
    let (dashboard, source) = match province {
        Some(name) => Dashboard::province_view(name, &config.province_data_dir, config.scale)?,
        None => (
            Dashboard::new(ScaleLevel::Nation, config.scale),
            DatasetSource::parse(&config.data)?,
        ),
    };
    dashboard.load(source).await?;
    Ok(dashboard)
}

fn board_line(metric: MetricFilter, totals: Option<RegionTotals>) -> String {
    let cell = |m: MetricFilter| {
        let marker = if m == metric { "*" } else { " " };
        let value = totals.map_or_else(|| "-".to_string(), |t| format_int(t.get(m)));
        format!("{marker}{m}: {value}")
    };
    [
        MetricFilter::Confirmed,
        MetricFilter::Discharged,
        MetricFilter::Deceased,
        MetricFilter::Suspected,
    ]
    .into_iter()
    .map(cell)
    .collect::<Vec<_>>()
    .join("  ")
}

fn print_board(state: &ViewState, view: &DashboardView) {
    let area = match (&state.province, &state.region) {
        (Some(p), Some(r)) => format!("{p} / {r}"),
        (Some(p), None) => p.clone(),
        (None, Some(r)) => r.clone(),
        (None, None) => "全国".to_string(),
    };
    let day = view
        .outcome
        .effective_date
        .map_or_else(|| "-".to_string(), date_key);
    println!("{area} - {} ({day})", state.metric);
    if view.outcome.corrected {
        println!("Note: requested date has no data; showing {day}.");
    }
    match view.headline {
        Resolved::Count(n) => println!("{}: {}", state.metric, format_int(n)),
        Resolved::NotLoaded => println!("{}: no data yet", state.metric),
    }
    println!("{}\n", board_line(state.metric, view.board));
}

/// Handle `show`: board plus a markdown preview of the region table.
async fn handle_show(config: &Config, args: ViewArgs, rows: usize) -> Result<(), Box<dyn Error>> {
    let mut state = args.into_state(config);
    let dashboard = open_dashboard(config, state.province.as_deref()).await?;
    let Some(view) = dashboard.view(&mut state) else {
        println!("Error: no dataset loaded.");
        return Ok(());
    };

    print_board(&state, &view);
    let table = slice_rows(&view.outcome.slice, state.metric, &view.scale);
    let note = format!("top {rows} by {}", state.metric);
    output::preview_table("Regions", Some(&note), &table, rows);
    println!("Link: ?{}", state.to_query());
    Ok(())
}

/// Handle `export`: writes the full region table and/or the summary.
async fn handle_export(
    config: &Config,
    args: ViewArgs,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut state = args.into_state(config);
    let requested = state.date;
    let dashboard = open_dashboard(config, state.province.as_deref()).await?;
    let Some(view) = dashboard.view(&mut state) else {
        println!("Error: no dataset loaded.");
        return Ok(());
    };

    if let Some(path) = csv {
        let table = slice_rows(&view.outcome.slice, state.metric, &view.scale);
        output::write_csv(&path, &table)?;
        println!("Region table exported to {}", path.display());
    }
    if let Some(path) = json {
        let summary = slice_summary(&view.outcome, requested, state.metric);
        output::write_json(&path, &summary)?;
        println!("Summary exported to {}", path.display());
    }
    Ok(())
}

/// Handle `dates`: one available day per line, oldest first.
async fn handle_dates(config: &Config, province: Option<&str>) -> Result<(), Box<dyn Error>> {
    let dashboard = open_dashboard(config, province).await?;
    for day in dashboard.available_dates() {
        println!("{}", date_key(day));
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data = data;
    }

    match cli.command {
        Command::Show { view, rows } => handle_show(&config, view, rows).await,
        Command::Export { view, csv, json } => handle_export(&config, view, csv, json).await,
        Command::Dates { province } => handle_dates(&config, province.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(query: Option<&str>) -> ViewArgs {
        ViewArgs {
            date: None,
            metric: None,
            region: None,
            province: None,
            query: query.map(str::to_string),
        }
    }

    fn config_with(metric: MetricFilter) -> Config {
        Config {
            metric,
            ..Config::default()
        }
    }

    #[test]
    fn query_without_filter_keeps_configured_metric() {
        let config = config_with(MetricFilter::Deceased);
        let state = args(Some("date=2020-01-25&region=湖北")).into_state(&config);
        assert_eq!(state.metric, MetricFilter::Deceased);
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2020, 1, 25));
        assert_eq!(state.region.as_deref(), Some("湖北"));
    }

    #[test]
    fn query_filter_beats_configured_metric() {
        let config = config_with(MetricFilter::Deceased);
        let state = args(Some("filter=cured")).into_state(&config);
        assert_eq!(state.metric, MetricFilter::Discharged);
    }

    #[test]
    fn metric_flag_beats_query_filter() {
        let config = config_with(MetricFilter::Deceased);
        let mut view = args(Some("filter=cured"));
        view.metric = Some(MetricFilter::Suspected);
        assert_eq!(view.into_state(&config).metric, MetricFilter::Suspected);
    }

    #[test]
    fn no_query_uses_configured_metric() {
        let state = args(None).into_state(&config_with(MetricFilter::Suspected));
        assert_eq!(state.metric, MetricFilter::Suspected);
        assert_eq!(state.date, None);
    }
}
