//! `timeseries.csv` rendering.
//!
//! Columns: `date,lambda_exo,mu_a,mu_d_T{T},rho_gen_T{T},q_T{T},backlog,dcr_W{W}`.
//! Unobservable values are empty cells; rates carry four decimals.

use crate::engine::DailyRecord;
use csv::Writer as CsvWriter;
use std::io::Write;

/// File name inside the output directory and the archive.
pub const TIMESERIES_FILE_NAME: &str = "timeseries.csv";

/// Header row for a given horizon and window.
pub fn header(horizon_days: i64, window_days: i64) -> Vec<String> {
    vec![
        "date".to_string(),
        "lambda_exo".to_string(),
        "mu_a".to_string(),
        format!("mu_d_T{}", horizon_days),
        format!("rho_gen_T{}", horizon_days),
        format!("q_T{}", horizon_days),
        "backlog".to_string(),
        format!("dcr_W{}", window_days),
    ]
}

fn count_cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn rate_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

fn row(record: &DailyRecord) -> [String; 8] {
    [
        record.date.format("%Y-%m-%d").to_string(),
        record.arrivals.to_string(),
        record.attempts.to_string(),
        count_cell(record.stuck),
        count_cell(record.bounced),
        rate_cell(record.stick_rate),
        record.backlog.to_string(),
        rate_cell(record.clearance_ratio),
    ]
}

/// Write the timeseries to any sink.
pub fn write_timeseries<W: Write>(
    sink: W,
    records: &[DailyRecord],
    horizon_days: i64,
    window_days: i64,
) -> Result<W, csv::Error> {
    let mut writer = CsvWriter::from_writer(sink);
    writer.write_record(header(horizon_days, window_days))?;
    for record in records {
        writer.write_record(row(record))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Render the timeseries to bytes.
pub fn render_timeseries(
    records: &[DailyRecord],
    horizon_days: i64,
    window_days: i64,
) -> Result<Vec<u8>, csv::Error> {
    write_timeseries(Vec::new(), records, horizon_days, window_days)
}
