use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Muscle group used when a record arrives without one
pub const DEFAULT_MUSCLE_GROUP: &str = "Other";

/// ---------------------------------------------------------------------------
/// Record Identity
/// ---------------------------------------------------------------------------

/// Identity of a logged set.
///
/// `Server` ids come from the backend and are authoritative. `Local` ids are
/// opaque placeholders for sets the backend echoed back without an id; they
/// disappear on the next full load, when the backend's ids replace them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordId {
  Server(i64),
  Local(Uuid),
}

impl RecordId {
  pub fn new_local() -> Self {
    Self::Local(Uuid::new_v4())
  }

  pub fn is_local(&self) -> bool {
    matches!(self, Self::Local(_))
  }

  pub fn server_id(&self) -> Option<i64> {
    match self {
      Self::Server(id) => Some(*id),
      Self::Local(_) => None,
    }
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Server(id) => write!(f, "{}", id),
      Self::Local(key) => write!(f, "local-{}", key),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Perceived Exertion
/// ---------------------------------------------------------------------------

/// RPE stored in half-point steps, clamped to [0, 10].
///
/// Half-point storage gives RPE a total order and a hashable key, which the
/// personal-best grouping relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rpe(u8);

impl Rpe {
  pub const MAX: Rpe = Rpe(20);

  /// Rounds to the nearest half point. Non-finite input becomes 0.
  pub fn new(value: f64) -> Self {
    if !value.is_finite() {
      return Self(0);
    }
    let halves = (value * 2.0).round().clamp(0.0, 20.0);
    Self(halves as u8)
  }

  pub fn value(self) -> f64 {
    f64::from(self.0) / 2.0
  }
}

impl From<f64> for Rpe {
  fn from(value: f64) -> Self {
    Self::new(value)
  }
}

impl fmt::Display for Rpe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0 % 2 == 0 {
      write!(f, "{}", self.0 / 2)
    } else {
      write!(f, "{}.5", self.0 / 2)
    }
  }
}

impl Serialize for Rpe {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_f64(self.value())
  }
}

impl<'de> Deserialize<'de> for Rpe {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    f64::deserialize(deserializer).map(Rpe::new)
  }
}

/// ---------------------------------------------------------------------------
/// Set Record
/// ---------------------------------------------------------------------------

/// One logged set in canonical shape. Wire payloads are normalized into this
/// in `crate::wire` and nothing downstream sees the backend's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
  pub id: RecordId,
  pub exercise: String,
  pub muscle_group: String,
  pub load_kg: f64,
  pub body_weight_kg: f64,
  pub reps: u32,
  pub rpe: Rpe,
  pub date: Option<NaiveDate>,
  pub estimated_score: f64,
}

impl SetRecord {
  /// Case-insensitive exercise comparison
  pub fn matches_exercise(&self, name: &str) -> bool {
    exercise_key(&self.exercise) == exercise_key(name)
  }
}

/// Key used to compare exercise names
pub fn exercise_key(name: &str) -> String {
  name.trim().to_lowercase()
}

/// Parse a session date as the backend sends it.
///
/// Strings containing `/` are read as DD/MM/YYYY, anything else as ISO
/// (a plain date or an RFC 3339 timestamp).
pub fn parse_session_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if raw.contains('/') {
    return NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok();
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    .or_else(|| {
      NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
    })
}

/// ---------------------------------------------------------------------------
/// Set Submission (form data)
/// ---------------------------------------------------------------------------

/// A set as entered by the user, before the backend has seen it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSubmission {
  pub exercise: String,
  #[serde(default)]
  pub muscle_group: Option<String>,
  #[serde(default)]
  pub load_kg: f64,
  #[serde(default)]
  pub body_weight_kg: f64,
  pub reps: u32,
  pub rpe: f64,
  pub date: NaiveDate,
  /// Left empty to have the session estimate it
  #[serde(default)]
  pub estimated_score: Option<f64>,
}
