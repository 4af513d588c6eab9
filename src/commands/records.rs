//! Personal-best views and the set entry points

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::api::ApiError;
use crate::estimator::format_score;
use crate::models::{RecordId, Rpe, SetRecord, SetSubmission};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpeLevelView {
  pub rpe: Rpe,
  pub id: RecordId,
  pub load_kg: f64,
  pub reps: u32,
  pub date: Option<NaiveDate>,
  pub estimated_score: f64,
  /// One decimal, ready to display
  pub score_label: String,
}

impl From<(Rpe, &SetRecord)> for RpeLevelView {
  fn from((rpe, record): (Rpe, &SetRecord)) -> Self {
    Self {
      rpe,
      id: record.id,
      load_kg: record.load_kg,
      reps: record.reps,
      date: record.date,
      estimated_score: record.estimated_score,
      score_label: format_score(record.estimated_score),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseView {
  pub exercise: String,
  /// Highest RPE first
  pub levels: Vec<RpeLevelView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleGroupView {
  pub muscle_group: String,
  pub exercises: Vec<ExerciseView>,
}

/// Personal bests grouped by muscle group, in first-seen order
pub fn get_personal_bests(session: &Session) -> Vec<MuscleGroupView> {
  session
    .personal_bests()
    .iter()
    .map(|(muscle_group, exercises)| MuscleGroupView {
      muscle_group: muscle_group.to_string(),
      exercises: exercises
        .map(|bests| ExerciseView {
          exercise: bests.exercise.clone(),
          levels: bests
            .levels_descending()
            .into_iter()
            .map(RpeLevelView::from)
            .collect(),
        })
        .collect(),
    })
    .collect()
}

/// Save a set, then reload and return the personal bests.
///
/// Only the save can fail. A failed reload keeps the cache with the new set
/// in it.
pub async fn submit_set(
  session: &mut Session,
  submission: SetSubmission,
) -> Result<Vec<MuscleGroupView>, ApiError> {
  session.submit(submission).await?;
  refresh(session).await;
  Ok(get_personal_bests(session))
}

/// Delete a saved set, then reload and return the personal bests
pub async fn delete_set(
  session: &mut Session,
  id: RecordId,
) -> Result<Vec<MuscleGroupView>, ApiError> {
  session.delete(id).await?;
  refresh(session).await;
  Ok(get_personal_bests(session))
}

async fn refresh(session: &mut Session) {
  if let Err(e) = session.load().await {
    warn!("Showing cached records, reload failed: {}", e);
  }
}

/// Bodyweight to prefill the entry form with
pub async fn get_last_body_weight(session: &Session) -> Result<Option<f64>, ApiError> {
  session.last_body_weight().await
}
