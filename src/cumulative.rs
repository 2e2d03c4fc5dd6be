use std::collections::BTreeMap;

use tracing::instrument;

use crate::models::{AssessmentRecord, CumulativeResult, QuizRecord, TermMark};
use crate::numeric::{finite_or_zero, mean, round_half_up};

pub const QUIZ_WEIGHT: f64 = 0.2;
pub const MID_TERM_WEIGHT: f64 = 0.3;
pub const FINAL_TERM_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMatch {
    #[default]
    Exact,
    /// Trims both sides and ignores ASCII and Unicode case.
    IgnoreCase,
}

/// Exam-type strings that identify the two term exams on a report card.
///
/// Stored exam types are not uniform across record sources, so the
/// vocabulary is configuration rather than a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermLabels {
    pub mid_term: Vec<String>,
    pub final_term: Vec<String>,
    pub matching: LabelMatch,
}

impl Default for TermLabels {
    fn default() -> Self {
        Self {
            mid_term: vec!["Midterm".to_string()],
            final_term: vec!["Final".to_string()],
            matching: LabelMatch::Exact,
        }
    }
}

impl TermLabels {
    pub fn is_mid_term(&self, exam_type: &str) -> bool {
        self.matches_any(&self.mid_term, exam_type)
    }

    pub fn is_final_term(&self, exam_type: &str) -> bool {
        self.matches_any(&self.final_term, exam_type)
    }

    fn matches_any(&self, labels: &[String], exam_type: &str) -> bool {
        labels.iter().any(|label| match self.matching {
            LabelMatch::Exact => label == exam_type,
            LabelMatch::IgnoreCase => label.trim().to_lowercase() == exam_type.trim().to_lowercase(),
        })
    }
}

#[derive(Default)]
struct SubjectInputs<'a> {
    quiz_scores: Vec<f64>,
    exams: Vec<&'a AssessmentRecord>,
}

fn term_mark(exam: &AssessmentRecord) -> TermMark {
    TermMark {
        marks_obtained: exam.marks_obtained,
        total_marks: exam.total_marks,
        grade: exam.grade.clone(),
    }
}

pub fn cumulative_score(quiz_average: f64, mid_term: Option<&TermMark>, final_term: Option<&TermMark>) -> f64 {
    let marks = |term: Option<&TermMark>| term.and_then(|t| t.marks_obtained).unwrap_or(0.0);
    round_half_up(
        quiz_average * QUIZ_WEIGHT
            + marks(mid_term) * MID_TERM_WEIGHT
            + marks(final_term) * FINAL_TERM_WEIGHT,
    )
}

/// Report-card rows, one per subject seen in either exams or quizzes.
///
/// A subject missing one or both term exams still gets a row; the missing
/// terms simply contribute nothing to the weighted score. Exams without a
/// timestamp take part like any other.
#[instrument(skip_all, fields(exams = exams.len(), quizzes = quizzes.len()))]
pub fn compose_cumulative(
    exams: &[AssessmentRecord],
    quizzes: &[QuizRecord],
    labels: &TermLabels,
) -> Vec<CumulativeResult> {
    let mut by_subject: BTreeMap<&str, SubjectInputs> = BTreeMap::new();
    for exam in exams {
        by_subject.entry(exam.subject.as_str()).or_default().exams.push(exam);
    }
    for quiz in quizzes {
        by_subject
            .entry(quiz.subject.as_str())
            .or_default()
            .quiz_scores
            .push(quiz.rubric_score);
    }

    by_subject
        .into_iter()
        .map(|(subject, inputs)| {
            let quiz_average = mean(&inputs.quiz_scores);
            let mid_term = inputs
                .exams
                .iter()
                .find(|exam| labels.is_mid_term(&exam.exam_type))
                .map(|exam| term_mark(exam));
            let final_term = inputs
                .exams
                .iter()
                .find(|exam| labels.is_final_term(&exam.exam_type))
                .map(|exam| term_mark(exam));

            CumulativeResult {
                subject: subject.to_string(),
                quiz_average,
                quiz_count: inputs.quiz_scores.len(),
                cumulative_score: cumulative_score(quiz_average, mid_term.as_ref(), final_term.as_ref()),
                mid_term,
                final_term,
            }
        })
        .collect()
}
