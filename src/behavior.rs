use crate::models::{BehavioralScore, ProgressReport};
use crate::numeric::{mean, round_to};

pub const NEUTRAL_SCORE: u8 = 6;

/// Qualitative ratings recognised in progress reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorRating {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl BehaviorRating {
    /// Checked in this order; the first rating whose phrase appears wins, so
    /// "Very Good" lands on `Good` and never on a later entry.
    pub const PRIORITY: [BehaviorRating; 4] = [
        BehaviorRating::Excellent,
        BehaviorRating::Good,
        BehaviorRating::Satisfactory,
        BehaviorRating::NeedsImprovement,
    ];

    pub fn phrase(self) -> &'static str {
        match self {
            BehaviorRating::Excellent => "excellent",
            BehaviorRating::Good => "good",
            BehaviorRating::Satisfactory => "satisfactory",
            BehaviorRating::NeedsImprovement => "needs improvement",
        }
    }

    pub fn score(self) -> u8 {
        match self {
            BehaviorRating::Excellent => 10,
            BehaviorRating::Good => 8,
            BehaviorRating::Satisfactory => 6,
            BehaviorRating::NeedsImprovement => 4,
        }
    }

    pub fn classify(text: &str) -> Option<BehaviorRating> {
        let lowered = text.to_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|rating| lowered.contains(rating.phrase()))
    }
}

pub fn map_score(text: Option<&str>) -> u8 {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(BehaviorRating::classify)
        .map(BehaviorRating::score)
        .unwrap_or(NEUTRAL_SCORE)
}

pub fn build_behavioral_score(report: &ProgressReport) -> BehavioralScore {
    let uniform_compliance = map_score(report.uniform_compliance.as_deref());
    let homework_completion = map_score(report.homework_completion.as_deref());
    let class_discipline = map_score(report.class_discipline.as_deref());
    let punctuality = map_score(report.punctuality.as_deref());
    let behavior = map_score(report.behavior.as_deref());

    let scores = [
        uniform_compliance,
        homework_completion,
        class_discipline,
        punctuality,
        behavior,
    ]
    .map(f64::from);

    BehavioralScore {
        date: report.date,
        uniform_compliance,
        homework_completion,
        class_discipline,
        punctuality,
        behavior,
        overall: round_to(mean(&scores), 1),
    }
}

pub fn map_behavioral(reports: &[ProgressReport]) -> Vec<BehavioralScore> {
    reports.iter().map(build_behavioral_score).collect()
}

pub fn behavioral_average(scores: &[BehavioralScore]) -> f64 {
    let overall: Vec<f64> = scores.iter().map(|score| score.overall).collect();
    round_to(mean(&overall), 1)
}
