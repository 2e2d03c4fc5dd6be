use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use scholar_performance_engine::cumulative::{LabelMatch, TermLabels};
use scholar_performance_engine::db::{self, PgSource};
use scholar_performance_engine::models::{RawRecordSet, Student};
use scholar_performance_engine::source::{load_snapshot, CsvDirSource};
use scholar_performance_engine::{engine, logging, normalize, report};

#[derive(Parser)]
#[command(name = "scholar-performance")]
#[command(about = "Student performance aggregation and prediction", long_about = None)]
struct Cli {
    /// Read records from a directory of CSV exports instead of Postgres
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct LabelArgs {
    /// Exam type counted as the mid-term (repeatable)
    #[arg(long = "mid-label", default_value = "Midterm")]
    mid_labels: Vec<String>,
    /// Exam type counted as the final term (repeatable)
    #[arg(long = "final-label", default_value = "Final")]
    final_labels: Vec<String>,
    /// Match exam types without regard to case or surrounding whitespace
    #[arg(long)]
    ignore_label_case: bool,
}

impl From<LabelArgs> for TermLabels {
    fn from(args: LabelArgs) -> Self {
        TermLabels {
            mid_term: args.mid_labels,
            final_term: args.final_labels,
            matching: if args.ignore_label_case {
                LabelMatch::IgnoreCase
            } else {
                LabelMatch::Exact
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Subject metrics, predictions, behavior and commentary for a student
    Dashboard {
        #[arg(long)]
        student: String,
    },
    /// Weighted cumulative results per subject
    ReportCard {
        #[arg(long)]
        student: String,
        #[command(flatten)]
        labels: LabelArgs,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        student: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        labels: LabelArgs,
    },
}

async fn fetch(data: Option<&PathBuf>, student_id: &str) -> anyhow::Result<(Student, RawRecordSet)> {
    let snapshot = match data {
        Some(dir) => load_snapshot(&CsvDirSource::new(dir), student_id).await,
        None => load_snapshot(&PgSource::new(pool().await?), student_id).await,
    };
    snapshot.with_context(|| format!("failed to load records for student {student_id}"))
}

async fn pool() -> anyhow::Result<sqlx::PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set when --data is not given")?;
    db::connect(&database_url).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Dashboard { student } => {
            let (student, raw) = fetch(cli.data.as_ref(), &student).await?;
            let dashboard = engine::analyze(&normalize(raw));

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            println!(
                "{} overall average {:.2}% (trend {:+.2})",
                student.full_name, dashboard.overall_average, dashboard.overall_trend
            );
            for metric in &dashboard.subject_metrics {
                println!(
                    "- {}: average {:.2}, latest {:.2}, trend {:+.2}, predicted {:.2}",
                    metric.subject, metric.average, metric.latest, metric.trend, metric.predicted
                );
            }
            if !dashboard.behavioral_scores.is_empty() {
                println!("Behavioral average {:.1}", dashboard.behavioral_average);
            }
            for line in &dashboard.commentary {
                println!("* {line}");
            }
        }
        Commands::ReportCard { student, labels } => {
            let (student, raw) = fetch(cli.data.as_ref(), &student).await?;
            let results = engine::report_card(&normalize(raw), &labels.into());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            if results.is_empty() {
                println!("No exams or quizzes recorded for {}.", student.full_name);
                return Ok(());
            }

            println!("Report card for {}:", student.full_name);
            for result in &results {
                println!(
                    "- {}: quizzes {:.2} ({}), cumulative {:.0}",
                    result.subject, result.quiz_average, result.quiz_count, result.cumulative_score
                );
            }
        }
        Commands::Report { student, out, labels } => {
            let (student, raw) = fetch(cli.data.as_ref(), &student).await?;
            let records = normalize(raw);
            let dashboard = engine::analyze(&records);
            let results = engine::report_card(&records, &labels.into());
            let report = report::build_report(&student, &dashboard, &results);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(student = %student.id, path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
