use crate::error::{AnalysisError, Result};
use crate::stats::{self, AggregateMap};
use crate::structs::{Season, TemperatureRecord};

/// Verdict for one live reading against the historical statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub season: Season,
    pub is_outlier: bool,
}

/// Classifies a live reading as seasonally normal or anomalous.
///
/// The season is re-derived from the reading's date, then the outlier rule
/// is applied against the precomputed (city, season) aggregate.
///
/// # Errors
///
/// Returns `MissingAggregate` when the city was never observed in that
/// season - an expected, recoverable condition (new city, or a city seen
/// only in other seasons) that callers must surface as "cannot classify",
/// never as a false "normal". Returns `InsufficientSamples` when the group
/// exists but holds a single record, so its spread is undefined.
pub fn classify(
    reading: &TemperatureRecord,
    aggregates: &AggregateMap,
    threshold: f64,
) -> Result<Classification> {
    let season = Season::of_date(reading.date);
    let key = (reading.city.clone(), season);

    let aggregate = aggregates
        .get(&key)
        .ok_or_else(|| AnalysisError::MissingAggregate {
            city: reading.city.clone(),
            season,
        })?;

    match stats::is_outlier(reading.temperature, aggregate, threshold) {
        Some(is_outlier) => Ok(Classification { season, is_outlier }),
        None => Err(AnalysisError::InsufficientSamples {
            city: reading.city.clone(),
            season,
            count: aggregate.count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use chrono::NaiveDate;

    fn record(city: &str, ymd: (i32, u32, u32), temp: f64) -> TemperatureRecord {
        let date = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap();
        TemperatureRecord::new(city.to_string(), date, temp)
    }

    fn paris_winter_history() -> AggregateMap {
        aggregate(&[
            record("Paris", (2023, 12, 20), 3.0),
            record("Paris", (2024, 1, 10), 4.0),
            record("Paris", (2024, 2, 5), 5.0),
        ])
    }

    #[test]
    fn test_normal_reading_within_two_std() {
        let aggregates = paris_winter_history();
        let reading = record("Paris", (2025, 1, 15), 4.5);
        let verdict = classify(&reading, &aggregates, 2.0).unwrap();
        assert_eq!(verdict.season, Season::Winter);
        assert!(!verdict.is_outlier);
    }

    #[test]
    fn test_extreme_reading_is_anomalous() {
        let aggregates = paris_winter_history();
        let reading = record("Paris", (2025, 1, 15), 25.0);
        let verdict = classify(&reading, &aggregates, 2.0).unwrap();
        assert!(verdict.is_outlier);
    }

    #[test]
    fn test_unseen_city_is_missing_aggregate_not_normal() {
        let aggregates = paris_winter_history();
        let reading = record("Reykjavik", (2025, 1, 15), 1.0);
        let err = classify(&reading, &aggregates, 2.0).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingAggregate { .. }));
    }

    #[test]
    fn test_city_seen_only_in_other_seasons_cannot_classify() {
        let aggregates = paris_winter_history();
        // history has Paris winters only, reading is a summer date
        let reading = record("Paris", (2025, 7, 15), 20.0);
        let err = classify(&reading, &aggregates, 2.0).unwrap_err();
        match err {
            AnalysisError::MissingAggregate { season, .. } => {
                assert_eq!(season, Season::Summer)
            }
            other => panic!("expected MissingAggregate, got {:?}", other),
        }
    }

    #[test]
    fn test_single_sample_group_is_insufficient() {
        let aggregates = aggregate(&[record("Paris", (2024, 1, 10), 4.0)]);
        let reading = record("Paris", (2025, 1, 15), 30.0);
        let err = classify(&reading, &aggregates, 2.0).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientSamples { count: 1, .. }
        ));
    }
}
