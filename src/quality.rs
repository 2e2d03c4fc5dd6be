use std::collections::BTreeMap;

use crate::models::{QualityReview, QualityScore};
use crate::numeric::{mean_present, round2};

/// Per-subject means of the rechecking dimensions.
///
/// Each dimension averages only the reviews that scored it; `overall` is the
/// mean of the dimensions that had any score at all.
pub fn summarize_quality(reviews: &[QualityReview]) -> Vec<QualityScore> {
    let mut by_subject: BTreeMap<&str, Vec<&QualityReview>> = BTreeMap::new();
    for review in reviews {
        by_subject.entry(review.subject.as_str()).or_default().push(review);
    }

    by_subject
        .into_iter()
        .map(|(subject, reviews)| {
            let dimension = |pick: fn(&QualityReview) -> Option<f64>| {
                mean_present(reviews.iter().map(|review| pick(*review)))
            };
            let dimensions = [
                dimension(|r| r.completeness),
                dimension(|r| r.accuracy),
                dimension(|r| r.clarity),
                dimension(|r| r.feedback),
                dimension(|r| r.presentation),
            ];
            let overall = mean_present(dimensions).unwrap_or(0.0);
            let [completeness, accuracy, clarity, feedback, presentation] =
                dimensions.map(|value| round2(value.unwrap_or(0.0)));

            QualityScore {
                subject: subject.to_string(),
                review_count: reviews.len(),
                completeness,
                accuracy,
                clarity,
                feedback,
                presentation,
                overall: round2(overall),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(subject: &str, scores: [Option<f64>; 5]) -> QualityReview {
        let [completeness, accuracy, clarity, feedback, presentation] = scores;
        QualityReview {
            student_id: "s1".to_string(),
            subject: subject.to_string(),
            completeness,
            accuracy,
            clarity,
            feedback,
            presentation,
        }
    }

    #[test]
    fn averages_each_dimension_per_subject() {
        let reviews = vec![
            review("Math", [Some(80.0), Some(90.0), Some(70.0), Some(60.0), Some(100.0)]),
            review("Math", [Some(100.0), Some(70.0), None, Some(80.0), Some(90.0)]),
            review("English", [Some(50.0); 5]),
        ];
        let summary = summarize_quality(&reviews);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].subject, "English");
        assert_eq!(summary[0].overall, 50.0);

        let math = &summary[1];
        assert_eq!(math.review_count, 2);
        assert_eq!(math.completeness, 90.0);
        assert_eq!(math.clarity, 70.0);
        assert_eq!(math.presentation, 95.0);
        // (90 + 80 + 70 + 70 + 95) / 5
        assert_eq!(math.overall, 81.0);
    }

    #[test]
    fn unscored_dimensions_are_left_out_of_overall() {
        let summary = summarize_quality(&[review("Art", [Some(60.0), None, None, None, Some(80.0)])]);
        assert_eq!(summary[0].accuracy, 0.0);
        assert_eq!(summary[0].overall, 70.0);
    }

    #[test]
    fn no_reviews_no_rows() {
        assert!(summarize_quality(&[]).is_empty());
    }
}
