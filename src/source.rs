use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    RawExamRecord, RawProgressReport, RawQualityReview, RawQuizRecord, RawRecordSet, Student,
};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("student not found: {id}")]
    NotFound { id: String },

    #[error("record source unavailable: {0}")]
    Transport(String),

    #[error("malformed data in {location}: {message}")]
    Malformed { location: String, message: String },
}

impl From<sqlx::Error> for SourceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => SourceError::Malformed {
                location: format!("column {index}"),
                message: source.to_string(),
            },
            other => SourceError::Transport(other.to_string()),
        }
    }
}

/// Where raw records for a single student come from.
///
/// Implementations do the I/O; the engine only ever sees the returned rows.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, SourceError>;
    async fn fetch_exams(&self, student_id: &str) -> Result<Vec<RawExamRecord>, SourceError>;
    async fn fetch_quizzes(&self, student_id: &str) -> Result<Vec<RawQuizRecord>, SourceError>;
    async fn fetch_progress_reports(&self, student_id: &str) -> Result<Vec<RawProgressReport>, SourceError>;
    async fn fetch_quality_reviews(&self, student_id: &str) -> Result<Vec<RawQualityReview>, SourceError>;
}

/// Fetches everything recorded for one student as an independent snapshot.
pub async fn load_snapshot<S: RecordSource>(
    source: &S,
    student_id: &str,
) -> Result<(Student, RawRecordSet), SourceError> {
    let student = source.fetch_student(student_id).await?;
    let records = RawRecordSet {
        exams: source.fetch_exams(student_id).await?,
        quizzes: source.fetch_quizzes(student_id).await?,
        progress_reports: source.fetch_progress_reports(student_id).await?,
        quality_reviews: source.fetch_quality_reviews(student_id).await?,
    };

    debug!(
        student_id,
        exams = records.exams.len(),
        quizzes = records.quizzes.len(),
        reports = records.progress_reports.len(),
        reviews = records.quality_reviews.len(),
        "loaded snapshot"
    );

    Ok((student, records))
}

/// Reads records from a directory of CSV exports, one file per record kind.
///
/// A missing file is an empty table. Rows that cannot be decoded are skipped
/// with a warning.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub const STUDENTS: &'static str = "students.csv";
    pub const EXAMS: &'static str = "exams.csv";
    pub const QUIZZES: &'static str = "quizzes.csv";
    pub const PROGRESS_REPORTS: &'static str = "progress_reports.csv";
    pub const QUALITY_REVIEWS: &'static str = "quality_reviews.csv";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_rows<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, SourceError> {
        let path = self.dir.join(file);
        if !path.exists() {
            debug!(path = %path.display(), "no export file, treating as empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|err| SourceError::Transport(format!("{}: {err}", path.display())))?;

        let mut rows = Vec::new();
        for (line, result) in reader.deserialize::<T>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(err) => warn!(file, row = line + 1, %err, "skipping unreadable row"),
            }
        }
        Ok(rows)
    }

    fn rows_for<T: DeserializeOwned>(
        &self,
        file: &str,
        student_id: &str,
        owner: impl Fn(&T) -> Option<&str>,
    ) -> Result<Vec<T>, SourceError> {
        Ok(self
            .read_rows::<T>(file)?
            .into_iter()
            .filter(|row| owner(row).map(str::trim) == Some(student_id))
            .collect())
    }
}

impl RecordSource for CsvDirSource {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, SourceError> {
        self.read_rows::<Student>(Self::STUDENTS)?
            .into_iter()
            .find(|student| student.id == student_id)
            .ok_or_else(|| SourceError::NotFound {
                id: student_id.to_string(),
            })
    }

    async fn fetch_exams(&self, student_id: &str) -> Result<Vec<RawExamRecord>, SourceError> {
        self.rows_for(Self::EXAMS, student_id, |row: &RawExamRecord| row.student_id.as_deref())
    }

    async fn fetch_quizzes(&self, student_id: &str) -> Result<Vec<RawQuizRecord>, SourceError> {
        self.rows_for(Self::QUIZZES, student_id, |row: &RawQuizRecord| row.student_id.as_deref())
    }

    async fn fetch_progress_reports(&self, student_id: &str) -> Result<Vec<RawProgressReport>, SourceError> {
        self.rows_for(Self::PROGRESS_REPORTS, student_id, |row: &RawProgressReport| {
            row.student_id.as_deref()
        })
    }

    async fn fetch_quality_reviews(&self, student_id: &str) -> Result<Vec<RawQualityReview>, SourceError> {
        self.rows_for(Self::QUALITY_REVIEWS, student_id, |row: &RawQualityReview| {
            row.student_id.as_deref()
        })
    }
}
