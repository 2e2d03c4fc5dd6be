use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, instrument};

use crate::models::{
    AssessmentRecord, NormalizedRecordSet, ProgressReport, QualityReview, QuizRecord,
    RawExamRecord, RawProgressReport, RawQualityReview, RawQuizRecord, RawRecordSet, RawValue,
};
use crate::subjects::grade_for;

/// Coerces every record kind into its typed form.
///
/// Records without a subject or student id are dropped. A missing or
/// unreadable percentage stays null rather than being rebuilt from marks, and
/// an exam without a readable timestamp is kept with `created_at: None`.
/// Nothing here fails.
#[instrument(skip_all, fields(
    exams = raw.exams.len(),
    quizzes = raw.quizzes.len(),
    reports = raw.progress_reports.len(),
    reviews = raw.quality_reviews.len(),
))]
pub fn normalize(raw: RawRecordSet) -> NormalizedRecordSet {
    let exams: Vec<AssessmentRecord> = raw
        .exams
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_exam(index, record))
        .collect();
    let quizzes: Vec<QuizRecord> = raw
        .quizzes
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_quiz(index, record))
        .collect();
    let progress_reports: Vec<ProgressReport> = raw
        .progress_reports
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_progress_report(index, record))
        .collect();
    let quality_reviews: Vec<QualityReview> = raw
        .quality_reviews
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_quality_review(index, record))
        .collect();

    debug!(
        exams = exams.len(),
        quizzes = quizzes.len(),
        reports = progress_reports.len(),
        reviews = quality_reviews.len(),
        "normalized record set"
    );

    NormalizedRecordSet {
        exams,
        quizzes,
        progress_reports,
        quality_reviews,
    }
}

pub fn coerce_number(value: Option<&RawValue>) -> Option<f64> {
    let number = match value? {
        RawValue::Number(number) => *number,
        RawValue::Text(text) => {
            let trimmed = text.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            trimmed.parse::<f64>().ok()?
        }
    };
    number.is_finite().then_some(number)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn in_percent_range(value: f64) -> Option<f64> {
    (0.0..=100.0).contains(&value).then_some(value)
}

fn normalize_exam(index: usize, record: RawExamRecord) -> Option<AssessmentRecord> {
    let Some(student_id) = non_blank(record.student_id) else {
        debug!(index, "dropping exam without student id");
        return None;
    };
    let Some(subject) = non_blank(record.subject) else {
        debug!(index, "dropping exam without subject");
        return None;
    };
    let created_at = record.created_at.as_deref().and_then(parse_timestamp);
    if created_at.is_none() {
        debug!(index, %subject, "exam has no readable timestamp, kept out of trend ordering");
    }

    let total_marks = coerce_number(record.total_marks.as_ref()).unwrap_or(0.0);
    let marks_obtained = coerce_number(record.marks_obtained.as_ref());
    let percentage = coerce_number(record.percentage.as_ref()).and_then(in_percent_range);
    let grade = non_blank(record.grade).or_else(|| percentage.map(|p| grade_for(p).to_string()));

    Some(AssessmentRecord {
        id: non_blank(record.id).unwrap_or_else(|| format!("exam-{index}")),
        student_id,
        subject,
        exam_type: non_blank(record.exam_type).unwrap_or_default(),
        total_marks,
        marks_obtained,
        percentage,
        grade,
        created_at,
    })
}

fn normalize_quiz(index: usize, record: RawQuizRecord) -> Option<QuizRecord> {
    let Some(student_id) = non_blank(record.student_id) else {
        debug!(index, "dropping quiz without student id");
        return None;
    };
    let Some(subject) = non_blank(record.subject) else {
        debug!(index, "dropping quiz without subject");
        return None;
    };
    let Some(rubric_score) = coerce_number(record.rubric_score.as_ref()) else {
        debug!(index, %subject, "dropping quiz without a rubric score");
        return None;
    };

    Some(QuizRecord {
        id: non_blank(record.id).unwrap_or_else(|| format!("quiz-{index}")),
        student_id,
        subject,
        rubric_score,
        date: record.date.as_deref().and_then(parse_timestamp),
    })
}

fn normalize_progress_report(index: usize, record: RawProgressReport) -> Option<ProgressReport> {
    let Some(student_id) = non_blank(record.student_id) else {
        debug!(index, "dropping progress report without student id");
        return None;
    };

    Some(ProgressReport {
        student_id,
        date: record.date.as_deref().and_then(parse_timestamp),
        uniform_compliance: non_blank(record.uniform_compliance),
        homework_completion: non_blank(record.homework_completion),
        class_discipline: non_blank(record.class_discipline),
        punctuality: non_blank(record.punctuality),
        behavior: non_blank(record.behavior),
    })
}

fn normalize_quality_review(index: usize, record: RawQualityReview) -> Option<QualityReview> {
    let (Some(student_id), Some(subject)) = (non_blank(record.student_id), non_blank(record.subject))
    else {
        debug!(index, "dropping quality review without student id or subject");
        return None;
    };
    let dimension = |value: Option<RawValue>| coerce_number(value.as_ref()).and_then(in_percent_range);

    Some(QualityReview {
        student_id,
        subject,
        completeness: dimension(record.completeness),
        accuracy: dimension(record.accuracy),
        clarity: dimension(record.clarity),
        feedback: dimension(record.feedback),
        presentation: dimension(record.presentation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<RawValue> {
        Some(RawValue::Text(value.to_string()))
    }

    fn exam(subject: Option<&str>, percentage: Option<RawValue>) -> RawExamRecord {
        RawExamRecord {
            id: Some("e1".to_string()),
            student_id: Some("s1".to_string()),
            subject: subject.map(str::to_string),
            exam_type: Some("Midterm".to_string()),
            total_marks: Some(RawValue::Number(100.0)),
            marks_obtained: None,
            percentage,
            grade: None,
            created_at: Some("2026-02-02".to_string()),
        }
    }

    #[test]
    fn coerces_text_numbers() {
        assert_eq!(coerce_number(text(" 72.5 ").as_ref()), Some(72.5));
        assert_eq!(coerce_number(text("85%").as_ref()), Some(85.0));
        assert_eq!(coerce_number(text("n/a").as_ref()), None);
        assert_eq!(coerce_number(Some(&RawValue::Number(f64::NAN))), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let date = parse_timestamp("2026-02-02").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-02-02T00:00:00+00:00");
        let spaced = parse_timestamp("2026-02-02 08:30:00").unwrap();
        assert_eq!(spaced.to_rfc3339(), "2026-02-02T08:30:00+00:00");
        let offset = parse_timestamp("2026-02-02T10:00:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2026-02-02T08:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn drops_records_missing_subject_or_student() {
        let mut orphan = exam(Some("Math"), text("70"));
        orphan.student_id = Some("  ".to_string());
        let raw = RawRecordSet {
            exams: vec![exam(None, text("70")), orphan, exam(Some("Math"), text("70"))],
            quizzes: vec![RawQuizRecord {
                id: None,
                student_id: Some("s1".to_string()),
                subject: None,
                rubric_score: Some(RawValue::Number(8.0)),
                date: None,
            }],
            ..Default::default()
        };

        let normalized = normalize(raw);
        assert_eq!(normalized.exams.len(), 1);
        assert!(normalized.quizzes.is_empty());
    }

    #[test]
    fn keeps_exams_with_unusable_percentage_as_null() {
        let raw = RawRecordSet {
            exams: vec![exam(Some("Math"), text("absent")), exam(Some("Art"), text("140"))],
            ..Default::default()
        };

        let normalized = normalize(raw);
        assert_eq!(normalized.exams.len(), 2);
        assert!(normalized.exams.iter().all(|e| e.percentage.is_none()));
        assert!(normalized.exams.iter().all(|e| e.grade.is_none()));
    }

    #[test]
    fn null_percentage_is_not_rebuilt_from_marks() {
        let mut record = exam(Some("Math"), None);
        record.total_marks = Some(RawValue::Number(50.0));
        record.marks_obtained = text("41");
        let normalized = normalize(RawRecordSet {
            exams: vec![record],
            ..Default::default()
        });

        let exam = &normalized.exams[0];
        assert_eq!(exam.marks_obtained, Some(41.0));
        assert_eq!(exam.percentage, None);
        assert_eq!(exam.grade, None);
    }

    #[test]
    fn grade_is_filled_from_present_percentage() {
        let normalized = normalize(RawRecordSet {
            exams: vec![exam(Some("Math"), text("82"))],
            ..Default::default()
        });
        assert_eq!(normalized.exams[0].grade.as_deref(), Some("A"));
    }

    #[test]
    fn undated_exams_are_kept() {
        let mut blank = exam(Some("Math"), text("90"));
        blank.created_at = None;
        let mut garbled = exam(Some("Math"), text("70"));
        garbled.created_at = Some("next tuesday".to_string());
        let normalized = normalize(RawRecordSet {
            exams: vec![blank, garbled],
            ..Default::default()
        });

        assert_eq!(normalized.exams.len(), 2);
        assert!(normalized.exams.iter().all(|e| e.created_at.is_none()));
    }

    #[test]
    fn keeps_stored_grade() {
        let mut record = exam(Some("Math"), text("95"));
        record.grade = Some("A".to_string());
        let normalized = normalize(RawRecordSet {
            exams: vec![record],
            ..Default::default()
        });
        assert_eq!(normalized.exams[0].grade.as_deref(), Some("A"));
    }

    #[test]
    fn quality_dimensions_outside_range_become_null() {
        let review = RawQualityReview {
            student_id: Some("s1".to_string()),
            subject: Some("Math".to_string()),
            completeness: Some(RawValue::Number(90.0)),
            accuracy: Some(RawValue::Number(120.0)),
            clarity: text("75"),
            feedback: None,
            presentation: text("-5"),
        };
        let normalized = normalize(RawRecordSet {
            quality_reviews: vec![review],
            ..Default::default()
        });

        let review = &normalized.quality_reviews[0];
        assert_eq!(review.completeness, Some(90.0));
        assert_eq!(review.accuracy, None);
        assert_eq!(review.clarity, Some(75.0));
        assert_eq!(review.presentation, None);
    }
}
