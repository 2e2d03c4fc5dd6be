use std::fmt::Write;

use crate::models::{CumulativeResult, Dashboard, Student, TermMark};

fn term_cell(term: Option<&TermMark>) -> String {
    match term {
        Some(term) => {
            let marks = term
                .marks_obtained
                .map(|m| format!("{m:.0}"))
                .unwrap_or_else(|| "N/A".to_string());
            let grade = term.grade.as_deref().unwrap_or("N/A");
            format!("{marks}/{:.0} ({grade})", term.total_marks)
        }
        None => "-".to_string(),
    }
}

pub fn build_report(
    student: &Student,
    dashboard: &Dashboard,
    report_card: &[CumulativeResult],
) -> String {
    let mut output = String::new();
    let class_label = student.class_name.as_deref().unwrap_or("unassigned class");

    let _ = writeln!(output, "# Student Performance Report");
    let _ = writeln!(output, "Generated for {} ({}, {})", student.full_name, student.id, class_label);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Overall average {:.2}% with a trend of {:+.2} points per exam.",
        dashboard.overall_average, dashboard.overall_trend
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Commentary");
    for line in &dashboard.commentary {
        let _ = writeln!(output, "- {line}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subject Metrics");
    if dashboard.subject_metrics.is_empty() {
        let _ = writeln!(output, "No graded exams recorded.");
    } else {
        let _ = writeln!(output, "| Subject | Average | Latest | Trend | Predicted |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for metric in &dashboard.subject_metrics {
            let _ = writeln!(
                output,
                "| {} | {:.2} | {:.2} | {:+.2} | {:.2} |",
                metric.subject, metric.average, metric.latest, metric.trend, metric.predicted
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Report Card");
    if report_card.is_empty() {
        let _ = writeln!(output, "No exams or quizzes recorded.");
    } else {
        let _ = writeln!(output, "| Subject | Quizzes | Mid-term | Final | Cumulative |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for result in report_card {
            let _ = writeln!(
                output,
                "| {} | {:.2} ({}) | {} | {} | {:.0} |",
                result.subject,
                result.quiz_average,
                result.quiz_count,
                term_cell(result.mid_term.as_ref()),
                term_cell(result.final_term.as_ref()),
                result.cumulative_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Behavior");
    if dashboard.behavioral_scores.is_empty() {
        let _ = writeln!(output, "No progress reports recorded.");
    } else {
        for score in &dashboard.behavioral_scores {
            let date = score
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            let _ = writeln!(
                output,
                "- {date}: overall {:.1} (uniform {}, homework {}, discipline {}, punctuality {}, behavior {})",
                score.overall,
                score.uniform_compliance,
                score.homework_completion,
                score.class_discipline,
                score.punctuality,
                score.behavior
            );
        }
        let _ = writeln!(output, "Average behavioral score {:.1}.", dashboard.behavioral_average);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Rechecking Quality");
    if dashboard.quality_scores.is_empty() {
        let _ = writeln!(output, "No quality reviews recorded.");
    } else {
        for quality in &dashboard.quality_scores {
            let _ = writeln!(
                output,
                "- {}: overall {:.2} across {} reviews",
                quality.subject, quality.overall, quality.review_count
            );
        }
    }

    output
}
