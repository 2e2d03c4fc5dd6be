use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::models::{AssessmentRecord, SubjectMetric};
use crate::numeric::{finite_or_zero, mean, round2};

pub fn grade_for(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B",
        p if p >= 60.0 => "C",
        p if p >= 50.0 => "D",
        _ => "F",
    }
}

/// Exams that carry both a percentage and a timestamp, oldest first. The sort
/// is stable, so exams sharing a timestamp keep the order they were fetched in.
pub fn chronological(exams: &[AssessmentRecord]) -> Vec<(&AssessmentRecord, f64)> {
    let mut scored: Vec<(&AssessmentRecord, DateTime<Utc>, f64)> = exams
        .iter()
        .filter_map(|exam| Some((exam, exam.created_at?, exam.percentage?)))
        .collect();
    scored.sort_by_key(|(_, created_at, _)| *created_at);
    scored
        .into_iter()
        .map(|(exam, _, percentage)| (exam, percentage))
        .collect()
}

/// Per-subject average, latest score and first-to-last trend.
///
/// `predicted` is left at zero here; [`crate::prediction::predict`] fills it.
#[instrument(skip_all, fields(exams = exams.len()))]
pub fn aggregate_subjects(exams: &[AssessmentRecord]) -> Vec<SubjectMetric> {
    let mut by_subject: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (exam, percentage) in chronological(exams) {
        by_subject
            .entry(exam.subject.as_str())
            .or_default()
            .push(percentage);
    }

    by_subject
        .into_iter()
        .map(|(subject, scores)| subject_metric(subject, &scores))
        .collect()
}

fn subject_metric(subject: &str, scores: &[f64]) -> SubjectMetric {
    let latest = scores.last().copied().unwrap_or(0.0);
    let trend = match (scores.first(), scores.len()) {
        (Some(first), len) if len >= 2 => finite_or_zero(latest - first),
        _ => 0.0,
    };

    SubjectMetric {
        subject: subject.to_string(),
        average: round2(mean(scores)),
        trend,
        latest,
        predicted: 0.0,
    }
}

/// Mean of successive deltas across every exam regardless of subject.
pub fn overall_trend(exams: &[AssessmentRecord]) -> f64 {
    let scores: Vec<f64> = chronological(exams)
        .into_iter()
        .map(|(_, percentage)| percentage)
        .collect();
    if scores.len() < 2 {
        return 0.0;
    }

    let deltas: Vec<f64> = scores.windows(2).map(|pair| pair[1] - pair[0]).collect();
    finite_or_zero(mean(&deltas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn exam(subject: &str, percentage: Option<f64>, day: i64) -> AssessmentRecord {
        AssessmentRecord {
            id: format!("{subject}-{day}"),
            student_id: "s1".to_string(),
            subject: subject.to_string(),
            exam_type: "Unit Test".to_string(),
            total_marks: 100.0,
            marks_obtained: percentage,
            percentage,
            grade: percentage.map(|p| grade_for(p).to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap() + Duration::days(day)),
        }
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(grade_for(100.0), "A+");
        assert_eq!(grade_for(90.0), "A+");
        assert_eq!(grade_for(89.99), "A");
        assert_eq!(grade_for(80.0), "A");
        assert_eq!(grade_for(70.0), "B");
        assert_eq!(grade_for(60.0), "C");
        assert_eq!(grade_for(50.0), "D");
        assert_eq!(grade_for(49.5), "F");
        assert_eq!(grade_for(0.0), "F");
    }

    #[test]
    fn grade_is_monotonic_over_range() {
        let rank = |grade: &str| ["F", "D", "C", "B", "A", "A+"].iter().position(|g| *g == grade);
        let mut previous = rank(grade_for(0.0));
        for step in 0..=1000 {
            let current = rank(grade_for(step as f64 / 10.0));
            assert!(current.is_some());
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn aggregates_in_chronological_order() {
        // Fetched newest first; aggregation must still see 60 before 80.
        let exams = vec![exam("Math", Some(80.0), 2), exam("Math", Some(60.0), 1)];
        let metrics = aggregate_subjects(&exams);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].average, 70.0);
        assert_eq!(metrics[0].latest, 80.0);
        assert_eq!(metrics[0].trend, 20.0);
    }

    #[test]
    fn single_exam_has_no_trend() {
        let metrics = aggregate_subjects(&[exam("Science", Some(77.0), 1)]);
        assert_eq!(metrics[0].trend, 0.0);
        assert_eq!(metrics[0].latest, 77.0);
    }

    #[test]
    fn null_percentages_are_skipped() {
        let exams = vec![
            exam("Math", None, 1),
            exam("Math", Some(50.0), 2),
            exam("History", None, 3),
        ];
        let metrics = aggregate_subjects(&exams);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].subject, "Math");
        assert_eq!(metrics[0].trend, 0.0);
    }

    #[test]
    fn equal_timestamps_keep_fetch_order() {
        let exams = vec![exam("Math", Some(40.0), 1), exam("Math", Some(90.0), 1)];
        let metrics = aggregate_subjects(&exams);
        assert_eq!(metrics[0].latest, 90.0);
        assert_eq!(metrics[0].trend, 50.0);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let exams = vec![
            exam("Math", Some(72.0), 1),
            exam("English", Some(64.0), 2),
            exam("Math", Some(81.0), 3),
        ];
        assert_eq!(aggregate_subjects(&exams), aggregate_subjects(&exams));
    }

    #[test]
    fn overall_trend_is_mean_of_successive_deltas() {
        let exams = vec![
            exam("Math", Some(60.0), 1),
            exam("English", Some(70.0), 2),
            exam("Math", Some(65.0), 3),
        ];
        // (+10, -5) / 2
        assert_eq!(overall_trend(&exams), 2.5);
        assert_eq!(overall_trend(&exams[..1]), 0.0);
        assert_eq!(overall_trend(&[]), 0.0);
    }

    #[test]
    fn undated_exams_stay_out_of_trend() {
        let mut undated = exam("Math", Some(10.0), 0);
        undated.created_at = None;
        let exams = vec![exam("Math", Some(60.0), 1), undated, exam("Math", Some(80.0), 2)];

        let metrics = aggregate_subjects(&exams);
        assert_eq!(metrics[0].average, 70.0);
        assert_eq!(metrics[0].latest, 80.0);
        assert_eq!(metrics[0].trend, 20.0);
        assert_eq!(overall_trend(&exams), 20.0);
    }

    #[test]
    fn exam_with_marks_but_no_percentage_is_not_scored() {
        let mut marks_only = exam("Math", None, 2);
        marks_only.marks_obtained = Some(20.0);
        marks_only.total_marks = 25.0;
        let exams = vec![exam("Math", Some(60.0), 1), marks_only, exam("Math", Some(80.0), 3)];

        let metrics = aggregate_subjects(&exams);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].average, 70.0);
        assert_eq!(metrics[0].latest, 80.0);
        assert_eq!(metrics[0].trend, 20.0);
        assert_eq!(overall_trend(&exams), 20.0);
    }
}
