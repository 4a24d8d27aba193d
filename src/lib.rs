pub mod classify;
pub mod error;
pub mod load;
pub mod smooth;
pub mod stats;
pub mod structs;
pub mod weather;

// Re-export public API
pub use classify::{Classification, classify};
pub use error::{AnalysisError, Result};
pub use load::{
    read_records, read_records_from, write_outliers_csv, write_summary_csv, write_summary_json,
    write_trend_csv,
};
pub use smooth::smooth;
pub use stats::{AggregateMap, aggregate, detect_outliers, is_outlier, summarize};
pub use structs::{
    AnalysisConfig, Season, SeasonSummary, SeasonalAggregate, SimpleLogger, TemperatureRecord,
};
pub use weather::{ApiError, ApiSession, fetch_current};
