//! Dose-rate aggregation for a station reading.
//!
//! The network publishes µSv/h; everything exported is nSv/h rounded to an
//! integer (half-to-even, as the published integration rounds).

use crate::model::{RadiationSummary, StationReading};

/// Converts µSv/h to whole nSv/h.
pub fn to_nanosieverts(microsieverts_per_hour: f64) -> i64 {
    (microsieverts_per_hour * 1000.0).round_ties_even() as i64
}

/// Latest/min/max/avg over the reading's samples.
///
/// Returns `None` when the reading holds no finite values; callers treat
/// that as "no data" and keep their previous summary.
pub fn summarize(reading: &StationReading) -> Option<RadiationSummary> {
    let values: Vec<f64> = reading
        .samples
        .iter()
        .map(|s| s.microsieverts_per_hour)
        .filter(|v| v.is_finite())
        .collect();

    let latest = *values.last()?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;

    Some(RadiationSummary {
        latest: to_nanosieverts(latest),
        min: to_nanosieverts(min),
        max: to_nanosieverts(max),
        avg: to_nanosieverts(avg),
        sample_count: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RadiationSample;

    fn reading(values: &[f64]) -> StationReading {
        StationReading {
            station_id: "17".to_string(),
            window_start_ms: 0,
            window_end_ms: 7_200_000,
            samples: values
                .iter()
                .enumerate()
                .map(|(i, v)| RadiationSample {
                    timestamp_ms: i as i64 * 3_600_000,
                    microsieverts_per_hour: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_conversion_rounds_to_whole_nanosieverts() {
        assert_eq!(to_nanosieverts(0.094), 94);
        assert_eq!(to_nanosieverts(0.1014), 101);
        assert_eq!(to_nanosieverts(0.0996), 100);
    }

    #[test]
    fn test_summary_over_samples() {
        let summary = summarize(&reading(&[0.090, 0.110, 0.100])).unwrap();
        assert_eq!(summary.latest, 100);
        assert_eq!(summary.min, 90);
        assert_eq!(summary.max, 110);
        assert_eq!(summary.avg, 100);
        assert_eq!(summary.sample_count, 3);
    }

    #[test]
    fn test_avg_lies_between_min_and_max() {
        let samples = [0.081, 0.133, 0.097, 0.102, 0.119];
        let summary = summarize(&reading(&samples)).unwrap();
        assert!(summary.min <= summary.avg && summary.avg <= summary.max);
        assert_eq!(summary.latest, to_nanosieverts(0.119));
    }

    #[test]
    fn test_single_sample_sets_every_field() {
        let summary = summarize(&reading(&[0.123])).unwrap();
        assert_eq!((summary.latest, summary.min, summary.max, summary.avg), (123, 123, 123, 123));
    }

    #[test]
    fn test_empty_reading_has_no_summary() {
        assert_eq!(summarize(&reading(&[])), None);
        assert_eq!(summarize(&reading(&[f64::NAN])), None);
    }
}
