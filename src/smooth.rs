use chrono::NaiveDate;

/// Centered moving average over an ordered temperature series.
///
/// For each index `i` the output value is the mean of `window` consecutive
/// input values centered on `i`. For even windows the extra element falls on
/// the LEFT of the center: the window covers `[i - window/2, i + window - 1 - window/2]`.
/// Positions near the boundaries where a full window does not fit are
/// dropped, so the output is `window - 1` elements shorter than the input.
///
/// The input must already be sorted by date; this function does not sort.
/// Returns an empty series when `window` is 0 or exceeds the input length.
pub fn smooth(series: &[(NaiveDate, f64)], window: usize) -> Vec<(NaiveDate, f64)> {
    if window == 0 || window > series.len() {
        return Vec::new();
    }

    let left = window / 2;
    let right = window - 1 - left;

    (left..series.len() - right)
        .map(|i| {
            let sum: f64 = series[i - left..=i + right].iter().map(|(_, t)| t).sum();
            (series[i].0, sum / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                (date, v)
            })
            .collect()
    }

    #[test]
    fn test_output_is_window_minus_one_shorter() {
        let input = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(smooth(&input, 1).len(), 5);
        assert_eq!(smooth(&input, 3).len(), 3);
        assert_eq!(smooth(&input, 5).len(), 1);
    }

    #[test]
    fn test_window_larger_than_input_is_empty() {
        let input = series(&[1.0, 2.0, 3.0]);
        assert!(smooth(&input, 4).is_empty());
        assert!(smooth(&input, 0).is_empty());
    }

    #[test]
    fn test_constant_series_stays_constant() {
        let input = series(&[7.5; 10]);
        let smoothed = smooth(&input, 5);
        assert_eq!(smoothed.len(), 6);
        for (_, value) in smoothed {
            assert!((value - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_odd_window_centers_on_index() {
        let input = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let smoothed = smooth(&input, 3);
        // output keeps the center dates
        assert_eq!(smoothed[0].0, input[1].0);
        assert!((smoothed[0].1 - 2.0).abs() < 1e-12);
        assert!((smoothed[1].1 - 3.0).abs() < 1e-12);
        assert!((smoothed[2].1 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_even_window_is_left_biased() {
        let input = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let smoothed = smooth(&input, 4);
        // window for the first output index (2) covers indices 0..=3
        assert_eq!(smoothed.len(), 2);
        assert_eq!(smoothed[0].0, input[2].0);
        assert!((smoothed[0].1 - 2.5).abs() < 1e-12);
        assert!((smoothed[1].1 - 3.5).abs() < 1e-12);
    }
}
