use serde::{Deserialize, Serialize};

/// Exercise from the backend's canonical dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExercise {
  pub name: String,
  pub category: Option<String>,
  /// Bodyweight counts toward the load (pull-ups, dips, ...)
  pub body_weight: bool,
  #[serde(default)]
  pub synonyms: Vec<String>,
}
