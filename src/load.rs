use crate::error::{AnalysisError, Result};
use crate::structs::{SeasonSummary, TemperatureRecord};
use chrono::NaiveDate;
use csv::Writer;
use log::{debug, warn};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns the historical CSV must provide. Extra columns are ignored.
const REQUIRED_COLUMNS: [&str; 3] = ["city", "timestamp", "temperature"];

/// One row of the historical CSV as uploaded. Unknown columns (including a
/// precomputed `season`, which some exports carry) are dropped on read;
/// the season is always re-derived from the timestamp.
#[derive(Debug, Deserialize)]
struct RawRow {
    city: String,
    timestamp: String,
    temperature: f64,
}

/// Reads historical temperature records from a CSV file.
///
/// # Arguments
/// * `input_path` - Path to the CSV file with `city`, `timestamp`, `temperature` columns
///
/// # Returns
/// Returns all parseable records, with seasons derived from each timestamp.
///
/// # Errors
/// Returns `MissingColumn` if a required column is absent from the header,
/// or an I/O error if the file cannot be opened.
pub fn read_records(input_path: &Path) -> Result<Vec<TemperatureRecord>> {
    debug!("Reading CSV file: {}", input_path.display());
    let file = File::open(input_path)?;
    read_records_from(file)
}

/// Reads historical temperature records from any byte source.
///
/// Validates the header before touching any row so a malformed file fails
/// with the missing column's name rather than a generic parse error. Rows
/// with unparsable dates or implausible temperatures are skipped, not fatal.
pub fn read_records_from<R: Read>(input: R) -> Result<Vec<TemperatureRecord>> {
    let mut reader = csv::Reader::from_reader(input);

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(AnalysisError::MissingColumn(required.to_string()));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<RawRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unparsable row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let date = match NaiveDate::parse_from_str(&row.timestamp, DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                warn!("Skipping row with bad timestamp: {}", row.timestamp);
                skipped += 1;
                continue;
            }
        };

        if clean_temp(row.temperature).is_none() {
            skipped += 1;
            continue;
        }

        records.push(TemperatureRecord::new(row.city, date, row.temperature));
    }

    debug!("Loaded {} records, skipped {}", records.len(), skipped);
    Ok(records)
}

/// Validates a temperature reading.
///
/// A reading must be finite and within plausible Earth surface bounds
/// (-100°C to 70°C, Antarctica to Death Valley). Returns `None` for values
/// that should be filtered out.
fn clean_temp(temp: f64) -> Option<f64> {
    if !temp.is_finite() {
        return None;
    }
    if !(-100.0..=70.0).contains(&temp) {
        return None;
    }
    Some(temp)
}

/// Writes per-city/per-season statistics to a CSV file with formatted numeric values.
///
/// # Arguments
/// * `summaries` - Slice of SeasonSummary rows, one per (city, season) group
/// * `output_path` - Path where the CSV file will be created
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_summary_csv(summaries: &[SeasonSummary], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["City", "Season", "Mean", "Std_Dev", "Count"])?;

    for row in summaries {
        writer.write_record(&[
            row.city.to_string(),
            row.season.to_string(),
            format!("{:.2}", row.mean),
            row.std.map(|s| format!("{:.2}", s)).unwrap_or_default(),
            row.count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes per-city/per-season statistics to a pretty-formatted JSON file.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_summary_json(summaries: &[SeasonSummary], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, summaries)?;
    Ok(())
}

/// Writes flagged outlier records to a CSV file.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_outliers_csv(outliers: &[TemperatureRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["City", "Timestamp", "Temperature", "Season"])?;

    for record in outliers {
        writer.write_record(&[
            record.city.to_string(),
            record.date.format(DATE_FORMAT).to_string(),
            format!("{:.2}", record.temperature),
            record.season.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes a smoothed trend series to a CSV file for plotting.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_trend_csv(series: &[(NaiveDate, f64)], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["Timestamp", "Temperature"])?;

    for (date, temp) in series {
        writer.write_record(&[
            date.format(DATE_FORMAT).to_string(),
            format!("{:.2}", temp),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Season;

    #[test]
    fn test_reads_required_columns_and_derives_season() {
        let csv = "city,timestamp,temperature\n\
                   Paris,2024-01-15,3.5\n\
                   Paris,2024-07-01,21.0\n";
        let records = read_records_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "Paris");
        assert_eq!(records[0].season, Season::Winter);
        assert_eq!(records[1].season, Season::Summer);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "city,timestamp,temperature,season,source\n\
                   London,2024-04-02,11.0,winter,manual\n";
        let records = read_records_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        // season comes from the timestamp, not the bogus column
        assert_eq!(records[0].season, Season::Spring);
    }

    #[test]
    fn test_missing_column_fails_fast_with_name() {
        let csv = "city,temperature\nParis,3.5\n";
        let err = read_records_from(csv.as_bytes()).unwrap_err();
        match err {
            AnalysisError::MissingColumn(name) => assert_eq!(name, "timestamp"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let csv = "city,timestamp,temperature\n\
                   Paris,2024-01-15,3.5\n\
                   Paris,not-a-date,4.0\n\
                   Paris,2024-01-17,not-a-number\n\
                   Paris,2024-01-18,999.0\n";
        let records = read_records_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].temperature, 3.5);
    }
}
