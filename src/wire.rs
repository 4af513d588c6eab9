//! Backend payload normalization
//!
//! The backend names the same field differently per endpoint (`Peso (kg)`,
//! `peso`, `peso_kg`; `RPE`, `rpe`; `RM`, `rm`, `puntosFuerza`) and sometimes
//! sends numbers as strings. Everything is read as `serde_json::Value` and
//! mapped into the canonical models here, so no wire shape leaks further.
//! Missing optional fields are defaulted, never rejected.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::estimator;
use crate::models::{
  parse_session_date, AnalysisEntry, CatalogExercise, ProgressStats, RecordId, Rpe, SetRecord,
  DEFAULT_MUSCLE_GROUP,
};

/// ---------------------------------------------------------------------------
/// Field Aliases
/// ---------------------------------------------------------------------------

const ID: &[&str] = &["id"];
const EXERCISE: &[&str] = &["ejercicio", "exercise", "nombre"];
const MUSCLE: &[&str] = &["Musculo", "musculo", "muscle_group", "categoria"];
const LOAD: &[&str] = &["Peso (kg)", "peso", "peso_kg", "load_kg"];
const BODY_WEIGHT: &[&str] = &["peso_corporal", "Peso corporal", "body_weight_kg"];
const REPS: &[&str] = &["Repeticiones", "repeticiones", "reps"];
const RPE: &[&str] = &["RPE", "rpe"];
const DATE: &[&str] = &["Fecha", "fecha", "date"];
const SCORE: &[&str] = &["RM", "rm", "puntosFuerza", "estimated_score"];

/// First present, non-null field among the aliases
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
  names
    .iter()
    .filter_map(|name| obj.get(*name))
    .find(|value| !value.is_null())
}

fn number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }
  .filter(|n| n.is_finite())
}

fn text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn num_field(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
  field(obj, names).and_then(number)
}

fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
  field(obj, names).and_then(text)
}

fn record_id(obj: &Map<String, Value>) -> Option<RecordId> {
  match field(obj, ID)? {
    Value::Number(n) => n.as_i64().map(RecordId::Server),
    Value::String(s) => s.trim().parse::<i64>().ok().map(RecordId::Server),
    _ => None,
  }
}

/// ---------------------------------------------------------------------------
/// Set Records
/// ---------------------------------------------------------------------------

/// Fields inherited from an enclosing group (`{ejercicio, records_por_rpe}`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupContext<'a> {
  pub exercise: Option<&'a str>,
  pub muscle_group: Option<&'a str>,
}

/// Normalize one set.
///
/// Returns `None` only when the value is not an object or no exercise name can
/// be found, since a set without an exercise cannot be grouped or charted.
/// A missing score is estimated from the other fields.
pub fn normalize_set(value: &Value, ctx: GroupContext<'_>) -> Option<SetRecord> {
  normalize_set_with(value, ctx, None)
}

/// Normalize a set, taking any field the payload lacks from `fallback`
pub fn normalize_set_with(
  value: &Value,
  ctx: GroupContext<'_>,
  fallback: Option<&SetRecord>,
) -> Option<SetRecord> {
  let obj = value.as_object()?;

  let exercise = text_field(obj, EXERCISE)
    .or_else(|| ctx.exercise.map(String::from))
    .or_else(|| fallback.map(|f| f.exercise.clone()));
  let Some(exercise) = exercise else {
    debug!("Skipping set without an exercise name");
    return None;
  };

  let muscle_group = text_field(obj, MUSCLE)
    .or_else(|| ctx.muscle_group.map(String::from))
    .or_else(|| fallback.map(|f| f.muscle_group.clone()))
    .unwrap_or_else(|| DEFAULT_MUSCLE_GROUP.to_string());

  let load_kg = num_field(obj, LOAD)
    .or_else(|| fallback.map(|f| f.load_kg))
    .unwrap_or(0.0);
  let body_weight_kg = num_field(obj, BODY_WEIGHT)
    .or_else(|| fallback.map(|f| f.body_weight_kg))
    .unwrap_or(0.0);
  let reps = num_field(obj, REPS)
    .map(|r| r.max(0.0).trunc() as u32)
    .or_else(|| fallback.map(|f| f.reps))
    .unwrap_or(0);
  let rpe_value = num_field(obj, RPE)
    .or_else(|| fallback.map(|f| f.rpe.value()))
    .unwrap_or(0.0);
  let date = field(obj, DATE)
    .and_then(Value::as_str)
    .and_then(parse_session_date)
    .or_else(|| fallback.and_then(|f| f.date));

  let estimated_score = num_field(obj, SCORE)
    .or_else(|| fallback.map(|f| f.estimated_score))
    .unwrap_or_else(|| estimator::estimate(&exercise, load_kg, body_weight_kg, reps, rpe_value));

  let id = record_id(obj)
    .or_else(|| fallback.map(|f| f.id))
    .unwrap_or_else(RecordId::new_local);

  Some(SetRecord {
    id,
    exercise,
    muscle_group,
    load_kg,
    body_weight_kg,
    reps,
    rpe: Rpe::new(rpe_value),
    date,
    estimated_score,
  })
}

/// Flatten a personal-records payload into sets.
///
/// Accepts the grouped form `[{ejercicio, records_por_rpe: [...]}]` as well as
/// a flat array of sets.
pub fn normalize_records(data: &Value) -> Vec<SetRecord> {
  let Some(items) = data.as_array() else {
    return Vec::new();
  };

  let mut records = Vec::new();
  for item in items {
    let Some(obj) = item.as_object() else {
      continue;
    };

    match obj.get("records_por_rpe").and_then(Value::as_array) {
      Some(rows) => {
        let exercise = text_field(obj, EXERCISE);
        let muscle_group = text_field(obj, MUSCLE);
        let ctx = GroupContext {
          exercise: exercise.as_deref(),
          muscle_group: muscle_group.as_deref(),
        };
        records.extend(rows.iter().filter_map(|row| normalize_set(row, ctx)));
      }
      None => records.extend(normalize_set(item, GroupContext::default())),
    }
  }
  records
}

/// History rows arrive either as a bare array or under `records`
pub fn normalize_history(body: &Value) -> Vec<SetRecord> {
  let rows = if body.is_array() {
    body
  } else {
    match body.get("records") {
      Some(rows) => rows,
      None => return Vec::new(),
    }
  };
  normalize_records(rows)
}

/// ---------------------------------------------------------------------------
/// Stats
/// ---------------------------------------------------------------------------

pub fn normalize_stats(body: &Value) -> ProgressStats {
  let mut stats = ProgressStats::default();

  match body.get("analisis") {
    Some(Value::String(summary)) if !summary.trim().is_empty() => {
      stats.summary = Some(summary.trim().to_string());
    }
    Some(Value::Array(rows)) => {
      stats.analysis = rows.iter().filter_map(normalize_analysis_entry).collect();
    }
    _ => {}
  }

  if let Some(samples) = body.get("records") {
    stats.samples = normalize_records(samples);
  }
  stats
}

fn normalize_analysis_entry(value: &Value) -> Option<AnalysisEntry> {
  let obj = value.as_object()?;
  Some(AnalysisEntry {
    exercise: text_field(obj, EXERCISE)?,
    rpe: num_field(obj, RPE).map(Rpe::new),
    percent: num_field(obj, &["porcentaje", "percent"]),
    value: num_field(obj, &["valor_numerico", "value"]),
  })
}

/// ---------------------------------------------------------------------------
/// Bodyweight and Catalog
/// ---------------------------------------------------------------------------

/// Bodyweight from the last logged entry; arrays use their first element
pub fn normalize_body_weight(data: &Value) -> Option<f64> {
  let entry = match data {
    Value::Array(items) => items.first()?,
    other => other,
  };
  entry
    .as_object()
    .and_then(|obj| num_field(obj, BODY_WEIGHT))
    .filter(|kg| *kg > 0.0)
}

/// Catalog entries, either a flat array or grouped as `{category: [...]}`
pub fn normalize_catalog(data: &Value) -> Vec<CatalogExercise> {
  match data {
    Value::Array(items) => items
      .iter()
      .filter_map(|item| normalize_catalog_entry(item, None))
      .collect(),
    Value::Object(groups) => groups
      .iter()
      .filter_map(|(category, items)| items.as_array().map(|items| (category, items)))
      .flat_map(|(category, items)| {
        items
          .iter()
          .filter_map(move |item| normalize_catalog_entry(item, Some(category.as_str())))
      })
      .collect(),
    _ => Vec::new(),
  }
}

fn normalize_catalog_entry(value: &Value, group: Option<&str>) -> Option<CatalogExercise> {
  let obj = value.as_object()?;
  let synonyms = obj
    .get("sinonimos")
    .and_then(Value::as_array)
    .map(|items| items.iter().filter_map(text).collect())
    .unwrap_or_default();

  Some(CatalogExercise {
    name: text_field(obj, &["nombre", "name", "ejercicio"])?,
    category: text_field(obj, &["categoria", "category"]).or_else(|| group.map(String::from)),
    body_weight: obj
      .get("peso_corporal")
      .and_then(Value::as_bool)
      .unwrap_or(false),
    synonyms,
  })
}

/// ---------------------------------------------------------------------------
/// Outgoing Bodies
/// ---------------------------------------------------------------------------

/// Body for `rendimiento/guardar_marca`
#[derive(Debug, Clone, Serialize)]
pub struct SubmitSetBody<'a> {
  pub user_id: &'a str,
  pub ejercicio: &'a str,
  pub musculo: &'a str,
  pub peso: f64,
  pub peso_corporal: f64,
  pub repeticiones: u32,
  pub rpe: f64,
  pub rm: f64,
  /// ISO date
  pub fecha: String,
}

impl<'a> SubmitSetBody<'a> {
  pub fn from_record(user_id: &'a str, record: &'a SetRecord) -> Self {
    Self {
      user_id,
      ejercicio: &record.exercise,
      musculo: &record.muscle_group,
      peso: record.load_kg,
      peso_corporal: record.body_weight_kg,
      repeticiones: record.reps,
      rpe: record.rpe.value(),
      rm: record.estimated_score,
      fecha: record
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default(),
    }
  }
}

/// Body for `rendimiento/borrar_marca`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSetBody {
  pub id: i64,
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
