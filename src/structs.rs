use crate::error::{AnalysisError, Result};
use chrono::{Datelike, NaiveDate};
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Calendar season, fixed month mapping:
/// {12,1,2} winter, {3,4,5} spring, {6,7,8} summer, {9,10,11} autumn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Maps a calendar month (1-12) to its season.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidMonth` for months outside 1-12.
    pub fn from_month(month: u32) -> Result<Season> {
        match month {
            12 | 1 | 2 => Ok(Season::Winter),
            3..=5 => Ok(Season::Spring),
            6..=8 => Ok(Season::Summer),
            9..=11 => Ok(Season::Autumn),
            other => Err(AnalysisError::InvalidMonth(other)),
        }
    }

    /// Season of a calendar date. Infallible: chrono months are always 1-12.
    pub fn of_date(date: NaiveDate) -> Season {
        Self::from_month(date.month()).expect("chrono month is always 1-12")
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
        }
    }
}

/// A single temperature observation for one city on one date.
///
/// Historical records are built by `load::read_records`; live records are
/// synthesized from an OpenWeatherMap response in `weather::fetch_current`.
/// The `season` field is always derived from `date` by the constructor,
/// never read from input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureRecord {
    pub city: String,
    pub date: NaiveDate,
    pub temperature: f64,
    pub season: Season,
}

impl TemperatureRecord {
    pub fn new(city: String, date: NaiveDate, temperature: f64) -> Self {
        let season = Season::of_date(date);
        Self {
            city,
            date,
            temperature,
            season,
        }
    }
}

/// Mean and spread of temperature for one (city, season) group.
///
/// `std` is the sample standard deviation (n-1 denominator) and is `None`
/// when the group holds fewer than 2 records - a single observation carries
/// no spread information, so such groups are excluded from outlier
/// detection and live classification reports InsufficientSamples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalAggregate {
    pub mean: f64,
    pub std: Option<f64>,
    pub count: u32,
}

/// Flattened report row: one (city, season) aggregate for CSV/JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonSummary {
    pub city: String,
    pub season: Season,
    pub mean: f64,
    pub std: Option<f64>,
    pub count: u32,
}

/// Configuration for the analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Outlier threshold in standard deviations
    pub threshold: f64,
    /// Smoothing window in observations (days for daily data)
    pub window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            window: 30,
        }
    }
}
