use serde::{Deserialize, Serialize};

use super::record::{Rpe, SetRecord};

/// One row of the backend's progress analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
  pub exercise: String,
  pub rpe: Option<Rpe>,
  /// Change over the analysed window, in percent
  pub percent: Option<f64>,
  pub value: Option<f64>,
}

/// Stats payload after normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
  pub analysis: Vec<AnalysisEntry>,
  /// Free-text coach analysis, when the backend sends one
  pub summary: Option<String>,
  /// Strength-score samples used for charting
  pub samples: Vec<SetRecord>,
}
