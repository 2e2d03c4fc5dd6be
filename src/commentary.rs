use crate::models::SubjectMetric;

pub const STRONG_SUBJECT_AVERAGE: f64 = 85.0;
pub const WEAK_SUBJECT_AVERAGE: f64 = 75.0;
pub const NO_DATA_MESSAGE: &str = "No performance data available yet.";

fn overall_band(overall_average: f64) -> Option<String> {
    let phrase = match overall_average {
        a if a >= 90.0 => "Excellent overall performance",
        a if a >= 80.0 => "Very good overall performance",
        a if a >= 70.0 => "Good overall performance",
        a if a > 0.0 => "Overall performance needs improvement",
        _ => return None,
    };
    Some(format!("{phrase}, averaging {overall_average:.2}% across all subjects."))
}

fn trend_phrase(overall_trend: f64, overall_average: f64) -> Option<&'static str> {
    match overall_trend {
        t if t > 2.0 => Some("Scores are improving significantly across recent exams."),
        t if t > 0.0 => Some("Scores show a slight upward trend."),
        t if t < -2.0 => Some("Scores are declining across recent exams and need attention."),
        _ if overall_average > 0.0 => Some("Scores have remained stable across recent exams."),
        _ => None,
    }
}

fn subject_list(label: &str, metrics: &[SubjectMetric], keep: impl Fn(&SubjectMetric) -> bool) -> Option<String> {
    let subjects: Vec<&str> = metrics
        .iter()
        .filter(|metric| keep(*metric))
        .map(|metric| metric.subject.as_str())
        .collect();
    if subjects.is_empty() {
        None
    } else {
        Some(format!("{label}: {}.", subjects.join(", ")))
    }
}

/// Ordered observations for the dashboard: overall band, trend, then the
/// strong, weak and improving subject lists.
pub fn generate_commentary(overall_average: f64, overall_trend: f64, metrics: &[SubjectMetric]) -> Vec<String> {
    let mut commentary: Vec<String> = [
        overall_band(overall_average),
        trend_phrase(overall_trend, overall_average).map(str::to_string),
        subject_list("Strong performance in", metrics, |m| m.average >= STRONG_SUBJECT_AVERAGE),
        subject_list("Areas needing attention", metrics, |m| m.average < WEAK_SUBJECT_AVERAGE),
        subject_list("Predicted improvements in", metrics, |m| m.predicted > m.latest),
    ]
    .into_iter()
    .flatten()
    .collect();

    if commentary.is_empty() {
        commentary.push(NO_DATA_MESSAGE.to_string());
    }
    commentary
}
