use tracing::{debug, instrument};

use crate::behavior::{behavioral_average, map_behavioral};
use crate::commentary::generate_commentary;
use crate::cumulative::{compose_cumulative, TermLabels};
use crate::models::{CumulativeResult, Dashboard, NormalizedRecordSet};
use crate::prediction::{overall_average, predict};
use crate::quality::summarize_quality;
use crate::subjects::{aggregate_subjects, overall_trend};

/// Builds the dashboard view from one student's normalized records.
#[instrument(skip_all)]
pub fn analyze(records: &NormalizedRecordSet) -> Dashboard {
    let subject_metrics = predict(aggregate_subjects(&records.exams));
    let overall_average = overall_average(&subject_metrics);
    let overall_trend = overall_trend(&records.exams);
    let behavioral_scores = map_behavioral(&records.progress_reports);
    let behavioral_average = behavioral_average(&behavioral_scores);
    let quality_scores = summarize_quality(&records.quality_reviews);
    let commentary = generate_commentary(overall_average, overall_trend, &subject_metrics);

    debug!(
        subjects = subject_metrics.len(),
        overall_average,
        overall_trend,
        "dashboard computed"
    );

    Dashboard {
        subject_metrics,
        overall_average,
        overall_trend,
        behavioral_scores,
        behavioral_average,
        quality_scores,
        commentary,
    }
}

pub fn report_card(records: &NormalizedRecordSet, labels: &TermLabels) -> Vec<CumulativeResult> {
    compose_cumulative(&records.exams, &records.quizzes, labels)
}
