use crate::error::{AnalysisError, Result};
use crate::structs::{Season, SeasonSummary, SeasonalAggregate, TemperatureRecord};
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

/// Per-(city, season) statistics, keyed for O(1) lookup during outlier
/// detection and live classification.
pub type AggregateMap = HashMap<(String, Season), SeasonalAggregate>;

/// Groups records by (city, season) and computes mean and sample standard
/// deviation for each group.
///
/// Group statistics are computed with Welford's online algorithm to keep
/// floating-point error bounded on large groups, and in parallel across
/// groups. Input records are not mutated; the whole map is recomputed from
/// scratch on every call.
///
/// An empty input yields an empty map. Groups with a single record get
/// `std = None` (see `SeasonalAggregate`).
pub fn aggregate(records: &[TemperatureRecord]) -> AggregateMap {
    let mut groups: HashMap<(String, Season), Vec<f64>> = HashMap::new();
    for record in records {
        groups
            .entry((record.city.clone(), record.season))
            .or_default()
            .push(record.temperature);
    }

    debug!("Found {} (city, season) groups", groups.len());

    let entries: Vec<_> = groups.into_iter().collect();
    entries
        .into_par_iter()
        .map(|(key, temps)| {
            let (mean, std) = welford(&temps);
            (
                key,
                SeasonalAggregate {
                    mean,
                    std,
                    count: temps.len() as u32,
                },
            )
        })
        .collect()
}

/// Welford running mean and M2; sample std (n-1) only when n >= 2.
fn welford(values: &[f64]) -> (f64, Option<f64>) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &value) in values.iter().enumerate() {
        let n = (i + 1) as f64;
        let delta = value - mean;
        mean += delta / n;
        m2 += delta * (value - mean);
    }
    let std = if values.len() >= 2 {
        Some((m2 / (values.len() - 1) as f64).sqrt())
    } else {
        None
    };
    (mean, std)
}

/// The per-record outlier rule shared by historical detection and live
/// classification: a reading is an outlier iff its absolute deviation from
/// the group mean strictly exceeds `threshold` standard deviations.
///
/// Returns `None` when the group's std is undefined (single sample) - the
/// caller decides whether that means "skip" or "cannot classify". A zero
/// std degenerates to "anything not exactly equal to the mean": with strict
/// `>` an exact match is still not flagged.
pub fn is_outlier(temperature: f64, aggregate: &SeasonalAggregate, threshold: f64) -> Option<bool> {
    aggregate
        .std
        .map(|std| (temperature - aggregate.mean).abs() > threshold * std)
}

/// Flags records whose temperature deviates from their (city, season) mean
/// by more than `threshold` standard deviations.
///
/// # Errors
///
/// Returns `MissingAggregate` if a record references a group absent from
/// `aggregates`. This cannot happen when the map was computed from the same
/// dataset, but a silent drop would hide the mismatch, so it is an explicit
/// error instead.
pub fn detect_outliers(
    records: &[TemperatureRecord],
    aggregates: &AggregateMap,
    threshold: f64,
) -> Result<Vec<TemperatureRecord>> {
    let mut outliers = Vec::new();
    for record in records {
        let key = (record.city.clone(), record.season);
        let aggregate =
            aggregates
                .get(&key)
                .ok_or_else(|| AnalysisError::MissingAggregate {
                    city: record.city.clone(),
                    season: record.season,
                })?;
        // single-sample groups have no spread and are excluded from detection
        if is_outlier(record.temperature, aggregate, threshold) == Some(true) {
            outliers.push(record.clone());
        }
    }
    debug!(
        "Flagged {} outliers out of {} records",
        outliers.len(),
        records.len()
    );
    Ok(outliers)
}

/// Flattens the aggregate map into report rows sorted by city, then by
/// calendar season order.
pub fn summarize(aggregates: &AggregateMap) -> Vec<SeasonSummary> {
    let mut rows: Vec<SeasonSummary> = aggregates
        .iter()
        .map(|((city, season), aggregate)| SeasonSummary {
            city: city.clone(),
            season: *season,
            mean: aggregate.mean,
            std: aggregate.std,
            count: aggregate.count,
        })
        .collect();

    rows.sort_by(|a, b| a.city.cmp(&b.city).then_with(|| a.season.cmp(&b.season)));
    rows
}
