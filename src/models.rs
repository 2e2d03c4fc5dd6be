use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A numeric field as it arrives from a record source, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    #[serde(alias = "full_name")]
    pub full_name: String,
    #[serde(alias = "class_name")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExamRecord {
    pub id: Option<String>,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub exam_type: Option<String>,
    pub total_marks: Option<RawValue>,
    pub marks_obtained: Option<RawValue>,
    pub percentage: Option<RawValue>,
    pub grade: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuizRecord {
    pub id: Option<String>,
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub rubric_score: Option<RawValue>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProgressReport {
    pub student_id: Option<String>,
    pub date: Option<String>,
    pub uniform_compliance: Option<String>,
    pub homework_completion: Option<String>,
    pub class_discipline: Option<String>,
    pub punctuality: Option<String>,
    pub behavior: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQualityReview {
    pub student_id: Option<String>,
    pub subject: Option<String>,
    pub completeness: Option<RawValue>,
    pub accuracy: Option<RawValue>,
    pub clarity: Option<RawValue>,
    pub feedback: Option<RawValue>,
    pub presentation: Option<RawValue>,
}

/// Everything fetched for one student, exactly as the source returned it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecordSet {
    pub exams: Vec<RawExamRecord>,
    pub quizzes: Vec<RawQuizRecord>,
    pub progress_reports: Vec<RawProgressReport>,
    pub quality_reviews: Vec<RawQualityReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub exam_type: String,
    pub total_marks: f64,
    pub marks_obtained: Option<f64>,
    pub percentage: Option<f64>,
    pub grade: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub rubric_score: f64,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub student_id: String,
    pub date: Option<DateTime<Utc>>,
    pub uniform_compliance: Option<String>,
    pub homework_completion: Option<String>,
    pub class_discipline: Option<String>,
    pub punctuality: Option<String>,
    pub behavior: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReview {
    pub student_id: String,
    pub subject: String,
    pub completeness: Option<f64>,
    pub accuracy: Option<f64>,
    pub clarity: Option<f64>,
    pub feedback: Option<f64>,
    pub presentation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecordSet {
    pub exams: Vec<AssessmentRecord>,
    pub quizzes: Vec<QuizRecord>,
    pub progress_reports: Vec<ProgressReport>,
    pub quality_reviews: Vec<QualityReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetric {
    pub subject: String,
    pub average: f64,
    pub trend: f64,
    pub latest: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermMark {
    pub marks_obtained: Option<f64>,
    pub total_marks: f64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeResult {
    pub subject: String,
    pub quiz_average: f64,
    pub quiz_count: usize,
    pub mid_term: Option<TermMark>,
    pub final_term: Option<TermMark>,
    pub cumulative_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralScore {
    pub date: Option<DateTime<Utc>>,
    pub uniform_compliance: u8,
    pub homework_completion: u8,
    pub class_discipline: u8,
    pub punctuality: u8,
    pub behavior: u8,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub subject: String,
    pub review_count: usize,
    pub completeness: f64,
    pub accuracy: f64,
    pub clarity: f64,
    pub feedback: f64,
    pub presentation: f64,
    pub overall: f64,
}

/// The dashboard view for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub subject_metrics: Vec<SubjectMetric>,
    pub overall_average: f64,
    pub overall_trend: f64,
    pub behavioral_scores: Vec<BehavioralScore>,
    pub behavioral_average: f64,
    pub quality_scores: Vec<QualityScore>,
    pub commentary: Vec<String>,
}
