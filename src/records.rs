//! Personal-best aggregation
//!
//! Projects the flat set history into muscle group -> exercise -> RPE level
//! -> best set. The projection is rebuilt from scratch on every call and
//! never mutated in place.

use indexmap::map::Values;
use indexmap::IndexMap;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::{exercise_key, Rpe, SetRecord, DEFAULT_MUSCLE_GROUP};

/// ---------------------------------------------------------------------------
/// Aggregated Views
/// ---------------------------------------------------------------------------

/// Best set per RPE level for one exercise
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseBests {
  /// Display name of the first record seen
  pub exercise: String,
  /// No ordering guarantee; use `levels_descending` to render
  pub by_rpe: HashMap<Rpe, SetRecord>,
}

impl ExerciseBests {
  pub fn best_for(&self, rpe: Rpe) -> Option<&SetRecord> {
    self.by_rpe.get(&rpe)
  }

  /// Levels sorted by descending RPE, the order cards are shown in
  pub fn levels_descending(&self) -> Vec<(Rpe, &SetRecord)> {
    let mut levels: Vec<(Rpe, &SetRecord)> =
      self.by_rpe.iter().map(|(rpe, record)| (*rpe, record)).collect();
    levels.sort_by(|a, b| b.0.cmp(&a.0));
    levels
  }
}

/// Personal bests for the whole history.
///
/// Muscle groups and exercises keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalBests {
  groups: IndexMap<String, IndexMap<String, ExerciseBests>>,
}

impl PersonalBests {
  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  pub fn muscle_groups(&self) -> impl Iterator<Item = &str> {
    self.groups.keys().map(String::as_str)
  }

  /// Exercises for a muscle group, in first-seen order
  pub fn exercises(&self, muscle_group: &str) -> impl Iterator<Item = &ExerciseBests> {
    self
      .groups
      .get(muscle_group)
      .into_iter()
      .flat_map(|exercises| exercises.values())
  }

  pub fn get(&self, muscle_group: &str, exercise: &str) -> Option<&ExerciseBests> {
    self.groups.get(muscle_group)?.get(&exercise_key(exercise))
  }

  /// Iterate `(muscle_group, exercises)` pairs in first-seen order
  pub fn iter(&self) -> impl Iterator<Item = (&str, Values<'_, String, ExerciseBests>)> {
    self
      .groups
      .iter()
      .map(|(muscle, exercises)| (muscle.as_str(), exercises.values()))
  }
}

/// ---------------------------------------------------------------------------
/// Aggregation
/// ---------------------------------------------------------------------------

/// Build personal bests in one pass over the records.
///
/// For records sharing (exercise, RPE) the heavier load wins, then more reps
/// at equal load. Exact ties keep the record seen first.
pub fn aggregate(records: &[SetRecord]) -> PersonalBests {
  let mut groups: IndexMap<String, IndexMap<String, ExerciseBests>> = IndexMap::new();

  for record in records {
    let muscle_group = if record.muscle_group.trim().is_empty() {
      DEFAULT_MUSCLE_GROUP.to_string()
    } else {
      record.muscle_group.clone()
    };

    let bests = groups
      .entry(muscle_group)
      .or_default()
      .entry(exercise_key(&record.exercise))
      .or_insert_with(|| ExerciseBests {
        exercise: record.exercise.clone(),
        by_rpe: HashMap::new(),
      });

    match bests.by_rpe.entry(record.rpe) {
      Entry::Vacant(slot) => {
        slot.insert(record.clone());
      }
      Entry::Occupied(mut slot) => {
        if beats(record, slot.get()) {
          slot.insert(record.clone());
        }
      }
    }
  }

  PersonalBests { groups }
}

fn beats(candidate: &SetRecord, current: &SetRecord) -> bool {
  candidate.load_kg > current.load_kg
    || (candidate.load_kg == current.load_kg && candidate.reps > current.reps)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
