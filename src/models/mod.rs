pub mod catalog;
pub mod record;
pub mod stats;

pub use catalog::CatalogExercise;
pub use record::{
  exercise_key, parse_session_date, RecordId, Rpe, SetRecord, SetSubmission, DEFAULT_MUSCLE_GROUP,
};
pub use stats::{AnalysisEntry, ProgressStats};
