//! Test utilities shared by the unit tests
//!
//! This module provides:
//! - Set record factories
//! - Backend payload builders for mockito servers
//! - A session wired to a mock server

use crate::config::ClientConfig;
use crate::estimator::ExerciseClassifier;
use crate::models::{parse_session_date, RecordId, Rpe, SetRecord};
use crate::session::Session;
use serde_json::{json, Value};
use std::time::Duration;

/// ---------------------------------------------------------------------------
/// Record Factories
/// ---------------------------------------------------------------------------

/// A chest-day set with sensible defaults. Override fields with struct update
/// syntax: `SetRecord { load_kg: 100.0, ..record(1, "Squat") }`.
pub fn record(id: i64, exercise: &str) -> SetRecord {
  SetRecord {
    id: RecordId::Server(id),
    exercise: exercise.to_string(),
    muscle_group: "Chest".to_string(),
    load_kg: 80.0,
    body_weight_kg: 0.0,
    reps: 5,
    rpe: Rpe::new(8.0),
    date: parse_session_date("2024-01-01"),
    estimated_score: 98.7,
  }
}

/// A set with the fields the aggregator looks at
pub fn lift(id: i64, exercise: &str, load_kg: f64, reps: u32, rpe: f64) -> SetRecord {
  SetRecord {
    load_kg,
    reps,
    rpe: Rpe::new(rpe),
    ..record(id, exercise)
  }
}

/// A set with the fields the progression analyzer looks at
pub fn session(id: i64, exercise: &str, date: &str, score: f64) -> SetRecord {
  SetRecord {
    date: parse_session_date(date),
    estimated_score: score,
    ..record(id, exercise)
  }
}

/// ---------------------------------------------------------------------------
/// Backend Payloads
/// ---------------------------------------------------------------------------

/// `analisis/ver_records` body grouped the way the backend groups it
pub fn records_body(rows: &[(&str, &str, f64, u32, f64, &str)]) -> String {
  let data: Vec<Value> = rows
    .iter()
    .enumerate()
    .map(|(i, (exercise, muscle, load, reps, rpe, date))| {
      json!({
        "ejercicio": exercise,
        "records_por_rpe": [{
          "id": i as i64 + 1,
          "RPE": rpe,
          "Peso (kg)": load,
          "Repeticiones": reps,
          "Fecha": date,
          "Musculo": muscle,
        }]
      })
    })
    .collect();

  json!({ "status": "success", "data": data }).to_string()
}

/// `analisis/progreso` body with one analysis row per exercise
pub fn stats_body(samples: &[(&str, &str, f64)]) -> String {
  let records: Vec<Value> = samples
    .iter()
    .map(|(exercise, date, score)| json!({ "ejercicio": exercise, "fecha": date, "puntosFuerza": score }))
    .collect();

  json!({
    "status": "success",
    "analisis": [{ "ejercicio": "Squat", "rpe": 8, "porcentaje": 4.5, "valor_numerico": 142.0 }],
    "records": records,
  })
  .to_string()
}

/// ---------------------------------------------------------------------------
/// Session Wiring
/// ---------------------------------------------------------------------------

pub fn test_config(base_url: &str) -> ClientConfig {
  ClientConfig::new(base_url, Duration::from_secs(5)).expect("mock server url should parse")
}

pub fn test_session(base_url: &str) -> Session {
  Session::new(&test_config(base_url), "user-1").expect("session should build")
}

pub fn test_session_with_classifier(base_url: &str, classifier: ExerciseClassifier) -> Session {
  Session::with_classifier(&test_config(base_url), "user-1", classifier)
    .expect("session should build")
}
