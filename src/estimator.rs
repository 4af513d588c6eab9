//! Estimated one-rep-max
//!
//! Epley-style estimate with an RPE correction: reps left in the tank are
//! added back so a sub-maximal set scores as if taken to RPE 10. Movements
//! that lift the body (pull-ups, dips, lunges, ...) count bodyweight as load.

use crate::models::{exercise_key, CatalogExercise};

/// ---------------------------------------------------------------------------
/// Self-loaded Vocabulary
/// ---------------------------------------------------------------------------

/// Matched as lowercase substrings of the exercise name
const SELF_LOADED_EXERCISES: &[&str] = &[
  "pull up",
  "pull-up",
  "pullup",
  "chin up",
  "chin-up",
  "chinup",
  "dip",
  "push up",
  "push-up",
  "pushup",
  "lunge",
  "muscle up",
  "muscle-up",
  "inverted row",
  // Names used by the backend's dictionary
  "dominadas",
  "domindas supinas",
  "fondos",
  "flexiones",
  "zancadas",
  "australiana",
];

/// Whether bodyweight counts toward the load for this exercise
pub fn is_self_loaded(exercise: &str) -> bool {
  let name = exercise_key(exercise);
  SELF_LOADED_EXERCISES.iter().any(|ex| name.contains(ex))
}

/// ---------------------------------------------------------------------------
/// Estimation
/// ---------------------------------------------------------------------------

/// Estimated 1RM rounded to one decimal.
///
/// Never fails: non-finite inputs are treated as 0 and a set with no
/// effective load or no reps scores `0.0`.
pub fn estimate(exercise: &str, load_kg: f64, body_weight_kg: f64, reps: u32, rpe: f64) -> f64 {
  compute(is_self_loaded(exercise), load_kg, body_weight_kg, reps, rpe)
}

fn compute(self_loaded: bool, load_kg: f64, body_weight_kg: f64, reps: u32, rpe: f64) -> f64 {
  let load = finite_or_zero(load_kg);
  let body_weight = finite_or_zero(body_weight_kg);
  let rpe = finite_or_zero(rpe).clamp(0.0, 10.0);

  let effective_load = if self_loaded { load + body_weight } else { load };
  if effective_load <= 0.0 || reps == 0 {
    return 0.0;
  }

  let virtual_reps = f64::from(reps) + (10.0 - rpe);
  round_one_decimal(effective_load * (1.0 + virtual_reps / 30.0))
}

fn finite_or_zero(value: f64) -> f64 {
  if value.is_finite() {
    value
  } else {
    0.0
  }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// Display form used across the app ("98.7", "0.0")
pub fn format_score(score: f64) -> String {
  format!("{:.1}", score)
}

/// ---------------------------------------------------------------------------
/// Configurable Classifier
/// ---------------------------------------------------------------------------

/// Self-loaded vocabulary extended at runtime.
///
/// Starts from the built-in list and grows with names from configuration and
/// from catalog entries flagged as bodyweight movements.
#[derive(Debug, Clone, Default)]
pub struct ExerciseClassifier {
  extra: Vec<String>,
}

impl ExerciseClassifier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_extra<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut classifier = Self::new();
    for name in names {
      classifier.add(name.as_ref());
    }
    classifier
  }

  /// Returns false when the name was empty or already known
  pub fn add(&mut self, name: &str) -> bool {
    let key = exercise_key(name);
    if key.is_empty() || self.extra.contains(&key) {
      return false;
    }
    self.extra.push(key);
    true
  }

  /// Adds every bodyweight entry (and its synonyms). Returns how many names were new.
  pub fn learn_catalog(&mut self, entries: &[CatalogExercise]) -> usize {
    let mut added = 0;
    for entry in entries.iter().filter(|e| e.body_weight) {
      for name in std::iter::once(&entry.name).chain(entry.synonyms.iter()) {
        if self.add(name) {
          added += 1;
        }
      }
    }
    added
  }

  pub fn is_self_loaded(&self, exercise: &str) -> bool {
    if is_self_loaded(exercise) {
      return true;
    }
    let name = exercise_key(exercise);
    self.extra.iter().any(|ex| name.contains(ex.as_str()))
  }

  pub fn estimate(
    &self,
    exercise: &str,
    load_kg: f64,
    body_weight_kg: f64,
    reps: u32,
    rpe: f64,
  ) -> f64 {
    compute(self.is_self_loaded(exercise), load_kg, body_weight_kg, reps, rpe)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bench_press_at_rpe_8() {
    // 80 * (1 + (5 + 2) / 30) = 98.67
    let score = estimate("Bench Press", 80.0, 0.0, 5, 8.0);
    assert_eq!(score, 98.7);
    assert_eq!(format_score(score), "98.7");
  }

  #[test]
  fn test_zero_load_external_exercise_scores_zero() {
    for reps in [1, 5, 12] {
      for rpe in [5.0, 7.5, 10.0] {
        assert_eq!(estimate("Squat", 0.0, 0.0, reps, rpe), 0.0);
        // Bodyweight is ignored for barbell work
        assert_eq!(estimate("Squat", 0.0, 80.0, reps, rpe), 0.0);
      }
    }
    assert_eq!(format_score(0.0), "0.0");
  }

  #[test]
  fn test_pull_ups_count_bodyweight() {
    let score = estimate("Pull-ups", 0.0, 70.0, 5, 8.0);
    assert!(score > 0.0);
    assert_eq!(score, 86.3);
  }

  #[test]
  fn test_weighted_dips_add_both_loads() {
    // (20 + 70) * (1 + 3 / 30) = 99.0
    assert_eq!(estimate("Weighted Dips", 20.0, 70.0, 3, 10.0), 99.0);
  }

  #[test]
  fn test_zero_reps_scores_zero() {
    assert_eq!(estimate("Deadlift", 180.0, 0.0, 0, 9.0), 0.0);
  }

  #[test]
  fn test_non_finite_inputs_are_coerced() {
    assert_eq!(estimate("Squat", f64::NAN, 0.0, 5, 8.0), 0.0);
    assert_eq!(estimate("Dominadas", f64::NAN, 70.0, 5, 10.0), 81.7);
    // NaN RPE counts as 0: ten extra virtual reps
    assert_eq!(estimate("Squat", 100.0, 0.0, 5, f64::NAN), 150.0);
  }

  #[test]
  fn test_monotonic_in_load_bodyweight_and_reps() {
    let mut previous = 0.0;
    for load in 0..40 {
      let score = estimate("Squat", f64::from(load) * 5.0, 0.0, 5, 8.0);
      assert!(score >= previous);
      previous = score;
    }

    let mut previous = 0.0;
    for body_weight in 0..40 {
      let score = estimate("Chin-ups", 10.0, f64::from(body_weight) * 2.5, 5, 8.0);
      assert!(score >= previous);
      previous = score;
    }

    let mut previous = 0.0;
    for reps in 0..20 {
      let score = estimate("Overhead Press", 50.0, 0.0, reps, 9.0);
      assert!(score >= previous);
      previous = score;
    }
  }

  #[test]
  fn test_lexical_variants_are_self_loaded() {
    for name in ["Pull Ups", "pullups", "Muscle-Up", "Walking Lunges", "Ring Dips", "Push-ups"] {
      assert!(is_self_loaded(name), "{} should be self-loaded", name);
    }
    for name in ["Bench Press", "Back Squat", "Romanian Deadlift"] {
      assert!(!is_self_loaded(name), "{} should not be self-loaded", name);
    }
  }

  #[test]
  fn test_classifier_extends_vocabulary() {
    let mut classifier = ExerciseClassifier::with_extra(["Nordic Curl"]);
    assert!(classifier.is_self_loaded("nordic curl"));
    assert!(classifier.is_self_loaded("Pull-ups"));
    assert!(!classifier.is_self_loaded("Pistol Squat"));

    let learned = classifier.learn_catalog(&[
      CatalogExercise {
        name: "Pistol Squat".into(),
        category: Some("Pierna".into()),
        body_weight: true,
        synonyms: vec!["Sentadilla a una pierna".into(), "pistol squat".into()],
      },
      CatalogExercise {
        name: "Leg Press".into(),
        category: Some("Pierna".into()),
        body_weight: false,
        synonyms: vec![],
      },
    ]);

    assert_eq!(learned, 2);
    assert!(classifier.is_self_loaded("Pistol Squat"));
    assert!(classifier.is_self_loaded("Sentadilla a una pierna"));
    assert!(!classifier.is_self_loaded("Leg Press"));
    assert_eq!(classifier.estimate("Pistol Squat", 0.0, 60.0, 6, 9.0), 74.0);
    assert_eq!(estimate("Pistol Squat", 0.0, 60.0, 6, 9.0), 0.0);
  }

  #[test]
  fn test_classifier_ignores_blank_and_duplicate_names() {
    let mut classifier = ExerciseClassifier::new();
    assert!(!classifier.add("   "));
    assert!(classifier.add("Hanging Leg Raise"));
    assert!(!classifier.add("hanging leg raise"));
  }
}
