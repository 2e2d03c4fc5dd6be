//! Per-student performance aggregation: subject metrics, trend-based
//! prediction, report-card composition, behavioral scoring and commentary.
//!
//! The engine modules are pure functions over record snapshots. Fetching
//! records is left to a [`source::RecordSource`].

pub mod behavior;
pub mod commentary;
pub mod cumulative;
pub mod db;
pub mod engine;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod numeric;
pub mod prediction;
pub mod quality;
pub mod report;
pub mod source;
pub mod subjects;

pub use behavior::{map_behavioral, map_score};
pub use commentary::generate_commentary;
pub use cumulative::{compose_cumulative, LabelMatch, TermLabels};
pub use engine::{analyze, report_card};
pub use normalize::normalize;
pub use prediction::predict;
pub use subjects::aggregate_subjects;
