use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}
