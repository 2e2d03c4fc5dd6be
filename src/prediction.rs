use crate::models::SubjectMetric;
use crate::numeric::{finite_or_zero, mean, round2};

/// Share of the observed trend carried into the next score.
pub const TREND_WEIGHT: f64 = 0.5;

/// Half-weighted linear extrapolation from the latest score, clamped to a
/// valid percentage.
pub fn predicted_score(latest: f64, trend: f64) -> f64 {
    round2(finite_or_zero(latest + trend * TREND_WEIGHT).clamp(0.0, 100.0))
}

pub fn predict(metrics: Vec<SubjectMetric>) -> Vec<SubjectMetric> {
    metrics
        .into_iter()
        .map(|metric| SubjectMetric {
            predicted: predicted_score(metric.latest, metric.trend),
            ..metric
        })
        .collect()
}

pub fn overall_average(metrics: &[SubjectMetric]) -> f64 {
    let averages: Vec<f64> = metrics.iter().map(|metric| metric.average).collect();
    round2(mean(&averages))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(subject: &str, average: f64, latest: f64, trend: f64) -> SubjectMetric {
        SubjectMetric {
            subject: subject.to_string(),
            average,
            trend,
            latest,
            predicted: 0.0,
        }
    }

    #[test]
    fn extrapolates_half_the_trend() {
        let predicted = predict(vec![metric("Math", 70.0, 80.0, 20.0)]);
        assert_eq!(predicted[0].predicted, 90.0);
        assert_eq!(predicted[0].average, 70.0);
    }

    #[test]
    fn prediction_stays_within_percentage_range() {
        for trend in [-1_000.0, -250.0, -3.0, 0.0, 3.0, 250.0, 1_000.0] {
            for latest in [0.0, 12.5, 50.0, 99.0, 100.0] {
                let predicted = predicted_score(latest, trend);
                assert!((0.0..=100.0).contains(&predicted), "{latest} {trend} -> {predicted}");
            }
        }
        assert_eq!(predicted_score(95.0, 30.0), 100.0);
        assert_eq!(predicted_score(10.0, -40.0), 0.0);
        assert_eq!(predicted_score(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn overall_average_of_subject_averages() {
        let metrics = vec![metric("Math", 90.0, 90.0, 0.0), metric("Art", 65.56, 60.0, 0.0)];
        assert_eq!(overall_average(&metrics), 77.78);
        assert_eq!(overall_average(&[]), 0.0);
    }
}
