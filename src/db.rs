use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    RawExamRecord, RawProgressReport, RawQualityReview, RawQuizRecord, RawValue, Student,
};
use crate::source::{RecordSource, SourceError};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("schema migrated");
    Ok(())
}

const AVERY: &str = "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2";
const JULES: &str = "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc";

fn seed_date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid date")
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        (Uuid::parse_str(AVERY)?, "Avery Lee", Some("Grade 8 - Blue")),
        (Uuid::parse_str(JULES)?, "Jules Moreno", Some("Grade 8 - Blue")),
    ];

    for (id, name, class_name) in students {
        sqlx::query(
            r#"
            INSERT INTO school_performance.students (id, full_name, class_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET full_name = EXCLUDED.full_name, class_name = EXCLUDED.class_name
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(class_name)
        .execute(pool)
        .await?;
    }

    let exams = vec![
        ("seed-exam-001", AVERY, "Mathematics", "Unit Test", 50.0, Some(31.0), seed_date(2026, 1, 12)?),
        ("seed-exam-002", AVERY, "Mathematics", "Midterm", 100.0, Some(72.0), seed_date(2026, 2, 9)?),
        ("seed-exam-003", AVERY, "Mathematics", "Final", 100.0, Some(84.0), seed_date(2026, 3, 23)?),
        ("seed-exam-004", AVERY, "English", "Midterm", 100.0, Some(88.0), seed_date(2026, 2, 10)?),
        ("seed-exam-005", AVERY, "English", "Final", 100.0, Some(91.0), seed_date(2026, 3, 24)?),
        ("seed-exam-006", AVERY, "Science", "Midterm", 100.0, Some(64.0), seed_date(2026, 2, 11)?),
        ("seed-exam-007", AVERY, "Science", "Final", 100.0, None, seed_date(2026, 3, 25)?),
        ("seed-exam-008", JULES, "Mathematics", "Midterm", 100.0, Some(91.0), seed_date(2026, 2, 9)?),
        ("seed-exam-009", JULES, "Mathematics", "Final", 100.0, Some(86.0), seed_date(2026, 3, 23)?),
    ];

    for (source_key, student, subject, exam_type, total_marks, marks, date) in exams {
        let percentage = marks.map(|m: f64| m / total_marks * 100.0);
        let created_at: DateTime<Utc> = date.and_hms_opt(9, 0, 0).context("invalid time")?.and_utc();
        sqlx::query(
            r#"
            INSERT INTO school_performance.exams
            (id, student_id, subject, exam_type, total_marks, marks_obtained, percentage, source_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::parse_str(student)?)
        .bind(subject)
        .bind(exam_type)
        .bind(total_marks)
        .bind(marks)
        .bind(percentage)
        .bind(source_key)
        .bind(created_at)
        .execute(pool)
        .await?;
    }

    let quizzes = vec![
        ("seed-quiz-001", AVERY, "Mathematics", 7.0, seed_date(2026, 1, 20)?),
        ("seed-quiz-002", AVERY, "Mathematics", 8.5, seed_date(2026, 2, 17)?),
        ("seed-quiz-003", AVERY, "English", 9.0, seed_date(2026, 1, 21)?),
        ("seed-quiz-004", AVERY, "Science", 6.0, seed_date(2026, 1, 22)?),
        ("seed-quiz-005", JULES, "Mathematics", 9.5, seed_date(2026, 1, 20)?),
    ];

    for (source_key, student, subject, rubric_score, quiz_date) in quizzes {
        sqlx::query(
            r#"
            INSERT INTO school_performance.quizzes
            (id, student_id, subject, rubric_score, quiz_date, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::parse_str(student)?)
        .bind(subject)
        .bind(rubric_score)
        .bind(quiz_date)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let reports = vec![
        (
            "seed-report-001",
            AVERY,
            seed_date(2026, 2, 1)?,
            ["Excellent", "Good", "Very Good", "Satisfactory", "Good"],
        ),
        (
            "seed-report-002",
            AVERY,
            seed_date(2026, 3, 1)?,
            ["Excellent", "Needs Improvement", "Good", "Good", "Excellent"],
        ),
    ];

    for (source_key, student, report_date, [uniform, homework, discipline, punctuality, behavior]) in reports {
        sqlx::query(
            r#"
            INSERT INTO school_performance.progress_reports
            (id, student_id, report_date, uniform_compliance, homework_completion,
             class_discipline, punctuality, behavior, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::parse_str(student)?)
        .bind(report_date)
        .bind(uniform)
        .bind(homework)
        .bind(discipline)
        .bind(punctuality)
        .bind(behavior)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let reviews = vec![
        ("seed-review-001", AVERY, "Mathematics", [85.0, 78.0, 80.0, 90.0, 70.0]),
        ("seed-review-002", AVERY, "English", [92.0, 88.0, 95.0, 85.0, 90.0]),
    ];

    for (source_key, student, subject, [completeness, accuracy, clarity, feedback, presentation]) in reviews {
        sqlx::query(
            r#"
            INSERT INTO school_performance.quality_reviews
            (id, student_id, subject, completeness, accuracy, clarity, feedback, presentation, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::parse_str(student)?)
        .bind(subject)
        .bind(completeness)
        .bind(accuracy)
        .bind(clarity)
        .bind(feedback)
        .bind(presentation)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    info!("seed data inserted");
    Ok(())
}

/// Record source backed by the `school_performance` Postgres schema.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn student_uuid(student_id: &str) -> Result<Uuid, SourceError> {
    Uuid::parse_str(student_id.trim()).map_err(|_| SourceError::NotFound {
        id: student_id.to_string(),
    })
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl RecordSource for PgSource {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, SourceError> {
        let id = student_uuid(student_id)?;
        let row = sqlx::query(
            "SELECT id, full_name, class_name FROM school_performance.students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| SourceError::NotFound {
            id: student_id.to_string(),
        })?;

        Ok(Student {
            id: row.try_get::<Uuid, _>("id")?.to_string(),
            full_name: row.try_get("full_name")?,
            class_name: row.try_get("class_name")?,
        })
    }

    async fn fetch_exams(&self, student_id: &str) -> Result<Vec<RawExamRecord>, SourceError> {
        let rows = sqlx::query(
            "SELECT id, student_id, subject, exam_type, total_marks, marks_obtained, \
             percentage, grade, created_at \
             FROM school_performance.exams WHERE student_id = $1 ORDER BY created_at",
        )
        .bind(student_uuid(student_id)?)
        .fetch_all(&self.pool)
        .await?;

        let mut exams = Vec::with_capacity(rows.len());
        for row in rows {
            let total_marks: f64 = row.try_get("total_marks")?;
            let marks_obtained: Option<f64> = row.try_get("marks_obtained")?;
            let percentage: Option<f64> = row.try_get("percentage")?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            exams.push(RawExamRecord {
                id: Some(row.try_get::<Uuid, _>("id")?.to_string()),
                student_id: Some(row.try_get::<Uuid, _>("student_id")?.to_string()),
                subject: row.try_get("subject")?,
                exam_type: row.try_get("exam_type")?,
                total_marks: Some(RawValue::Number(total_marks)),
                marks_obtained: marks_obtained.map(RawValue::Number),
                percentage: percentage.map(RawValue::Number),
                grade: row.try_get("grade")?,
                created_at: Some(created_at.to_rfc3339()),
            });
        }
        Ok(exams)
    }

    async fn fetch_quizzes(&self, student_id: &str) -> Result<Vec<RawQuizRecord>, SourceError> {
        let rows = sqlx::query(
            "SELECT id, student_id, subject, rubric_score, quiz_date \
             FROM school_performance.quizzes WHERE student_id = $1 ORDER BY quiz_date",
        )
        .bind(student_uuid(student_id)?)
        .fetch_all(&self.pool)
        .await?;

        let mut quizzes = Vec::with_capacity(rows.len());
        for row in rows {
            let rubric_score: f64 = row.try_get("rubric_score")?;
            quizzes.push(RawQuizRecord {
                id: Some(row.try_get::<Uuid, _>("id")?.to_string()),
                student_id: Some(row.try_get::<Uuid, _>("student_id")?.to_string()),
                subject: row.try_get("subject")?,
                rubric_score: Some(RawValue::Number(rubric_score)),
                date: date_text(row.try_get("quiz_date")?),
            });
        }
        Ok(quizzes)
    }

    async fn fetch_progress_reports(&self, student_id: &str) -> Result<Vec<RawProgressReport>, SourceError> {
        let rows = sqlx::query(
            "SELECT student_id, report_date, uniform_compliance, homework_completion, \
             class_discipline, punctuality, behavior \
             FROM school_performance.progress_reports WHERE student_id = $1 ORDER BY report_date",
        )
        .bind(student_uuid(student_id)?)
        .fetch_all(&self.pool)
        .await?;

        let mut reports = Vec::with_capacity(rows.len());
        for row in rows {
            reports.push(RawProgressReport {
                student_id: Some(row.try_get::<Uuid, _>("student_id")?.to_string()),
                date: date_text(row.try_get("report_date")?),
                uniform_compliance: row.try_get("uniform_compliance")?,
                homework_completion: row.try_get("homework_completion")?,
                class_discipline: row.try_get("class_discipline")?,
                punctuality: row.try_get("punctuality")?,
                behavior: row.try_get("behavior")?,
            });
        }
        Ok(reports)
    }

    async fn fetch_quality_reviews(&self, student_id: &str) -> Result<Vec<RawQualityReview>, SourceError> {
        let rows = sqlx::query(
            "SELECT student_id, subject, completeness, accuracy, clarity, feedback, presentation \
             FROM school_performance.quality_reviews WHERE student_id = $1",
        )
        .bind(student_uuid(student_id)?)
        .fetch_all(&self.pool)
        .await?;

        let mut reviews = Vec::with_capacity(rows.len());
        for row in rows {
            let dimension = |column: &str| -> Result<Option<RawValue>, sqlx::Error> {
                Ok(row.try_get::<Option<f64>, _>(column)?.map(RawValue::Number))
            };
            reviews.push(RawQualityReview {
                student_id: Some(row.try_get::<Uuid, _>("student_id")?.to_string()),
                subject: row.try_get("subject")?,
                completeness: dimension("completeness")?,
                accuracy: dimension("accuracy")?,
                clarity: dimension("clarity")?,
                feedback: dimension("feedback")?,
                presentation: dimension("presentation")?,
            });
        }
        Ok(reviews)
    }
}
