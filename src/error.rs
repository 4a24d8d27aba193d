use crate::structs::Season;
use crate::weather::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("No statistics for {city} in {season}")]
    MissingAggregate { city: String, season: Season },
    #[error("Insufficient history for {city} in {season}: {count} sample(s)")]
    InsufficientSamples {
        city: String,
        season: Season,
        count: u32,
    },
    #[error("Weather API Error: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
