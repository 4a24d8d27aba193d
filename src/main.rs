use clap::Parser;
use lib::{
    AnalysisConfig, AnalysisError, ApiSession, SimpleLogger, aggregate, classify, detect_outliers,
    read_records, smooth, summarize, write_outliers_csv, write_summary_csv, write_summary_json,
    write_trend_csv,
};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file with historical city/timestamp/temperature data
    #[arg(short, long)]
    input_file: PathBuf,

    /// Output base name (will create dir containing .csv and .json files)
    #[arg(short, long, default_value = "output")]
    output: String,

    /// City to analyze in detail (outliers, smoothed trend, live reading)
    #[arg(short, long)]
    city: Option<String>,

    /// Smoothing window for the trend line, in observations
    #[arg(long, default_value_t = 30)]
    window: usize,

    /// Outlier detection threshold (standard deviations)
    #[arg(long, default_value_t = 2.0)]
    threshold: f64,

    /// OpenWeatherMap API key for classifying the current temperature
    #[arg(long)]
    api_key: Option<String>,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), AnalysisError> {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).unwrap();

    // Acquire CLI args
    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    let config = AnalysisConfig {
        threshold: args.threshold,
        window: args.window,
    };

    // UI
    println!("Climatrend! Seasonal Temperature Analysis");
    debug!(
        "Input file: {} | Threshold: {} std devs | Window: {}",
        args.input_file.display(),
        config.threshold,
        config.window
    );

    // Load historical data
    println!("Loading historical data...");
    let load_start = Instant::now();
    let records = read_records(&args.input_file)?;
    println!(
        "Loaded {} records in {:.2?}",
        records.len(),
        load_start.elapsed()
    );

    let cities: BTreeSet<&str> = records.iter().map(|r| r.city.as_str()).collect();
    println!("Cities in dataset: {}", cities.len());
    debug!(
        "Cities: {}",
        cities.iter().copied().collect::<Vec<_>>().join(", ")
    );

    // Compute per-city/per-season statistics
    let stats_start = Instant::now();
    let aggregates = aggregate(&records);
    let summaries = summarize(&aggregates);
    println!(
        "Computed {} (city, season) aggregates in {:.2?}",
        summaries.len(),
        stats_start.elapsed()
    );

    // Create output directory
    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    debug!("Created output directory: {}", output_dir.display());

    let summary_csv = output_dir.join("summary.csv");
    let summary_json = output_dir.join("summary.json");
    write_summary_csv(&summaries, &summary_csv)?;
    write_summary_json(&summaries, &summary_json)?;
    println!("Wrote seasonal statistics to {}", output_dir.display());

    // Per-city analysis
    if let Some(city) = &args.city {
        if !cities.contains(city.as_str()) {
            warn!("City '{}' not present in the dataset", city);
        } else {
            println!("\nSeasonal statistics for {}:", city);
            println!("{:<8} {:>10} {:>10} {:>8}", "Season", "Mean", "Std Dev", "Count");
            for row in summaries.iter().filter(|s| &s.city == city) {
                let std = row
                    .std
                    .map(|s| format!("{:>10.2}", s))
                    .unwrap_or_else(|| format!("{:>10}", "-"));
                println!(
                    "{:<8} {:>10.2} {} {:>8}",
                    row.season.to_string(),
                    row.mean,
                    std,
                    row.count
                );
            }

            let mut city_records: Vec<_> =
                records.iter().filter(|r| &r.city == city).cloned().collect();
            city_records.sort_by_key(|r| r.date);

            let outliers = detect_outliers(&city_records, &aggregates, config.threshold)?;
            println!(
                "Flagged {} outliers among {} records for {}",
                outliers.len(),
                city_records.len(),
                city
            );
            write_outliers_csv(&outliers, &output_dir.join("outliers.csv"))?;

            let series: Vec<_> = city_records
                .iter()
                .map(|r| (r.date, r.temperature))
                .collect();
            let trend = smooth(&series, config.window);
            if trend.is_empty() {
                warn!(
                    "Not enough records ({}) for a window of {}; no trend written",
                    series.len(),
                    config.window
                );
            } else {
                write_trend_csv(&trend, &output_dir.join("trend.csv"))?;
                debug!("Trend series: {} points", trend.len());
            }

            // Live reading, only with a key
            if let Some(api_key) = args.api_key.clone() {
                report_live_reading(city, api_key, &aggregates, config.threshold);
            }
        }
    } else if args.api_key.is_some() {
        println!("Select a city with --city to classify its current temperature");
    }

    println!("\nAnalysis completed in {:.2?}", total_start.elapsed());
    Ok(())
}

/// Fetches and classifies the current temperature for one city. Every
/// failure here is reported and swallowed: a dead API or a city with no
/// usable history must not abort the historical analysis.
fn report_live_reading(
    city: &str,
    api_key: String,
    aggregates: &lib::AggregateMap,
    threshold: f64,
) {
    let mut session = ApiSession::new(api_key);
    match session.validate() {
        Ok(true) => debug!("API key accepted"),
        Ok(false) => {
            warn!("API key rejected; skipping live reading");
            return;
        }
        Err(e) => {
            warn!("Could not validate API key: {}", e);
            return;
        }
    }

    let reading = match session.current(city) {
        Ok(reading) => reading,
        Err(e) => {
            warn!("Live reading for {} failed: {}", city, e);
            return;
        }
    };
    println!(
        "\nCurrent temperature in {}: {:.1}°C",
        reading.city, reading.temperature
    );

    match classify(&reading, aggregates, threshold) {
        Ok(verdict) if verdict.is_outlier => {
            println!(
                "This temperature is ANOMALOUS for {} in {}",
                verdict.season, reading.city
            );
        }
        Ok(verdict) => {
            println!(
                "This temperature is normal for {} in {}",
                verdict.season, reading.city
            );
        }
        Err(e @ AnalysisError::MissingAggregate { .. })
        | Err(e @ AnalysisError::InsufficientSamples { .. }) => {
            println!("Cannot classify: {}", e);
        }
        Err(e) => warn!("Classification failed: {}", e),
    }
}
