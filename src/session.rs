//! Client data cache for the signed-in user
//!
//! `Session` is the explicit context object that owns the user's record
//! collection and stats. Derived views (personal bests, progression) are
//! computed from it on demand. Mutating operations take `&mut self`, so a
//! reader never sees records from one load next to stats from another.

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tracing::{info, warn};

use crate::api::{ApiError, GymApi, NavigationHandle};
use crate::config::ClientConfig;
use crate::estimator::ExerciseClassifier;
use crate::history::HistoryFeed;
use crate::models::{
  CatalogExercise, ProgressStats, RecordId, Rpe, SetRecord, SetSubmission, DEFAULT_MUSCLE_GROUP,
};
use crate::progression::{self, ProgressionSeries};
use crate::records::{self, PersonalBests};

pub struct Session {
  user_id: String,
  api: GymApi,
  classifier: ExerciseClassifier,
  records: Vec<SetRecord>,
  stats: Option<ProgressStats>,
  loaded_at: Option<DateTime<Utc>>,
}

impl Session {
  pub fn new(config: &ClientConfig, user_id: impl Into<String>) -> Result<Self, ApiError> {
    let classifier = ExerciseClassifier::with_extra(&config.self_loaded_exercises);
    Self::with_classifier(config, user_id, classifier)
  }

  pub fn with_classifier(
    config: &ClientConfig,
    user_id: impl Into<String>,
    classifier: ExerciseClassifier,
  ) -> Result<Self, ApiError> {
    Ok(Self {
      user_id: user_id.into(),
      api: GymApi::new(config)?,
      classifier,
      records: Vec::new(),
      stats: None,
      loaded_at: None,
    })
  }

  pub fn user_id(&self) -> &str {
    &self.user_id
  }

  pub fn records(&self) -> &[SetRecord] {
    &self.records
  }

  pub fn stats(&self) -> Option<&ProgressStats> {
    self.stats.as_ref()
  }

  pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
    self.loaded_at
  }

  pub fn classifier(&self) -> &ExerciseClassifier {
    &self.classifier
  }

  /// Handle for cancelling this session's in-flight requests on navigation
  pub fn navigation(&self) -> NavigationHandle {
    self.api.navigation()
  }

  /// -------------------------------------------------------------------------
  /// Loading
  /// -------------------------------------------------------------------------

  /// Fetch records and stats together and replace both, or neither.
  ///
  /// Local placeholder ids from earlier submissions are dropped here, since
  /// the backend's collection replaces the cached one wholesale.
  pub async fn load(&mut self) -> Result<(), ApiError> {
    let result = tokio::try_join!(
      self.api.fetch_records(&self.user_id),
      self.api.fetch_stats(&self.user_id),
    );

    let (records, stats) = match result {
      Ok(data) => data,
      Err(e) => {
        warn!(user_id = %self.user_id, "Failed to load session data: {}", e);
        return Err(e);
      }
    };

    self.records = records;
    self.stats = Some(stats);
    self.loaded_at = Some(Utc::now());

    info!(
      user_id = %self.user_id,
      records = self.records.len(),
      "Session data loaded"
    );
    Ok(())
  }

  /// -------------------------------------------------------------------------
  /// Submitting and Deleting
  /// -------------------------------------------------------------------------

  /// Save a set and prepend it to the cached records.
  ///
  /// The score is estimated unless the submission carries one. A rejection
  /// (unknown exercise) or any other failure leaves the cache untouched.
  pub async fn submit(&mut self, submission: SetSubmission) -> Result<&[SetRecord], ApiError> {
    let record = self.prepare(submission);

    let saved = match self.api.submit_set(&self.user_id, &record).await {
      Ok(saved) => saved,
      Err(e) => {
        warn!(exercise = %record.exercise, "Failed to save set: {}", e);
        return Err(e);
      }
    };

    info!(
      exercise = %saved.exercise,
      id = %saved.id,
      score = saved.estimated_score,
      "Set saved"
    );

    // Samples run oldest first, the record list newest first
    if let Some(stats) = self.stats.as_mut() {
      stats.samples.push(saved.clone());
    }
    self.records.insert(0, saved);
    Ok(&self.records)
  }

  fn prepare(&self, submission: SetSubmission) -> SetRecord {
    let estimated_score = submission
      .estimated_score
      .filter(|score| score.is_finite())
      .unwrap_or_else(|| {
        self.classifier.estimate(
          &submission.exercise,
          submission.load_kg,
          submission.body_weight_kg,
          submission.reps,
          submission.rpe,
        )
      });

    let muscle_group = submission
      .muscle_group
      .map(|m| m.trim().to_string())
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| DEFAULT_MUSCLE_GROUP.to_string());

    SetRecord {
      id: RecordId::new_local(),
      exercise: submission.exercise.trim().to_string(),
      muscle_group,
      load_kg: submission.load_kg,
      body_weight_kg: submission.body_weight_kg,
      reps: submission.reps,
      rpe: Rpe::new(submission.rpe),
      date: Some(submission.date),
      estimated_score,
    }
  }

  /// Delete a saved set and drop it from the cache
  pub async fn delete(&mut self, id: RecordId) -> Result<(), ApiError> {
    let server_id = id.server_id().ok_or(ApiError::UnsyncedRecord(id))?;

    if let Err(e) = self.api.delete_set(server_id).await {
      warn!(id = server_id, "Failed to delete set: {}", e);
      return Err(e);
    }

    self.records.retain(|r| r.id != id);
    if let Some(stats) = self.stats.as_mut() {
      stats.samples.retain(|r| r.id != id);
    }
    info!(id = server_id, "Set deleted");
    Ok(())
  }

  /// -------------------------------------------------------------------------
  /// Secondary Fetches
  /// -------------------------------------------------------------------------

  /// Bodyweight to prefill the entry form with
  pub async fn last_body_weight(&self) -> Result<Option<f64>, ApiError> {
    self.api.fetch_last_body_weight(&self.user_id).await
  }

  /// Fetch a catalog page and learn its bodyweight movements
  pub async fn exercise_catalog(&mut self, page: u32) -> Result<Vec<CatalogExercise>, ApiError> {
    let entries = self.api.fetch_catalog(page).await?;
    let learned = self.classifier.learn_catalog(&entries);
    if learned > 0 {
      info!(learned, "Learned bodyweight exercises from catalog");
    }
    Ok(entries)
  }

  pub fn history(&self, exercise: &str, rpe: Rpe) -> HistoryFeed {
    HistoryFeed::new(exercise, rpe)
  }

  pub async fn load_more_history(&self, feed: &mut HistoryFeed) -> Result<usize, ApiError> {
    feed.load_more(&self.api, &self.user_id).await
  }

  /// -------------------------------------------------------------------------
  /// Derived Views
  /// -------------------------------------------------------------------------

  pub fn personal_bests(&self) -> PersonalBests {
    records::aggregate(&self.records)
  }

  /// Strength-score samples when stats are loaded, otherwise the records
  fn series_source(&self) -> &[SetRecord] {
    match &self.stats {
      Some(stats) if !stats.samples.is_empty() => &stats.samples,
      _ => &self.records,
    }
  }

  /// The series source in logging order, oldest first
  fn chronological_source(&self) -> Cow<'_, [SetRecord]> {
    match &self.stats {
      Some(stats) if !stats.samples.is_empty() => Cow::Borrowed(stats.samples.as_slice()),
      _ => Cow::Owned(self.records.iter().rev().cloned().collect()),
    }
  }

  pub fn exercises_in_focus_order(&self) -> Vec<String> {
    progression::exercises_in_focus_order(self.series_source())
  }

  pub fn progression(&self, exercise: &str) -> ProgressionSeries {
    let analysis = self
      .stats
      .as_ref()
      .map(|s| s.analysis.as_slice())
      .unwrap_or_default();
    progression::select_series(&self.chronological_source(), analysis, exercise)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
