//! Backend API client
//!
//! Every endpoint answers with a `status` discriminator. Non-2xx responses are
//! hard failures; a 2xx body whose status is not `"success"` is a business
//! failure carrying the backend's `message`. Nothing here retries.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::models::{CatalogExercise, ProgressStats, RecordId, Rpe, SetRecord};
use crate::wire::{self, DeleteSetBody, GroupContext, SubmitSetBody};

/// ---------------------------------------------------------------------------
/// Endpoints
/// ---------------------------------------------------------------------------

const STATS_PATH: &str = "analisis/progreso";
const RECORDS_PATH: &str = "analisis/ver_records";
const HISTORY_PATH: &str = "analisis/historial_ejercicio";
const BODY_WEIGHT_PATH: &str = "analisis/ultimo_peso_corporal";
const SUBMIT_PATH: &str = "rendimiento/guardar_marca";
const DELETE_PATH: &str = "rendimiento/borrar_marca";
const CATALOG_PATH: &str = "rendimiento/catalogo-ejercicios/";

const UNKNOWN_EXERCISE_MESSAGE: &str =
  "Exercise is not in the exercise dictionary, ask the administrator to add it";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("Request timed out")]
  Timeout,

  #[error("Request cancelled")]
  Cancelled,

  #[error("Server returned {status}: {body}")]
  Http { status: u16, body: String },

  /// Validation failure on submit (unknown exercise). Not transient.
  #[error("{0}")]
  Rejected(String),

  /// 2xx response whose status was not "success"
  #[error("{0}")]
  Business(String),

  #[error("Failed to parse response: {0}")]
  Parse(String),

  #[error("Record {0} has not been saved to the backend yet")]
  UnsyncedRecord(RecordId),

  #[error("Invalid endpoint: {0}")]
  Endpoint(String),
}

impl ApiError {
  /// Whether a manual retry could succeed without changing the input
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Request(_) | Self::Timeout)
      || matches!(self, Self::Http { status, .. } if *status >= 500)
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      ApiError::Timeout
    } else {
      ApiError::Request(e.to_string())
    }
  }
}

impl From<url::ParseError> for ApiError {
  fn from(e: url::ParseError) -> Self {
    ApiError::Endpoint(e.to_string())
  }
}

impl Serialize for ApiError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Cancellation
/// ---------------------------------------------------------------------------

/// Cancels in-flight requests when the user navigates away.
///
/// Cloning shares the same generation counter. Requests started after a
/// `navigate()` call are not affected by it.
#[derive(Debug, Clone)]
pub struct NavigationHandle {
  generation: Arc<watch::Sender<u64>>,
}

impl NavigationHandle {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(0);
    Self {
      generation: Arc::new(tx),
    }
  }

  pub fn navigate(&self) {
    self.generation.send_modify(|g| *g = g.wrapping_add(1));
    debug!("Navigation: cancelling in-flight requests");
  }

  pub fn generation(&self) -> u64 {
    *self.generation.borrow()
  }

  fn subscribe(&self) -> watch::Receiver<u64> {
    self.generation.subscribe()
  }
}

impl Default for NavigationHandle {
  fn default() -> Self {
    Self::new()
  }
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GymApi {
  client: Client,
  config: ClientConfig,
  navigation: NavigationHandle,
}

impl GymApi {
  pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self {
      client,
      config: config.clone(),
      navigation: NavigationHandle::new(),
    })
  }

  pub fn navigation(&self) -> NavigationHandle {
    self.navigation.clone()
  }

  /// Progress analysis and strength-score samples
  pub async fn fetch_stats(&self, user_id: &str) -> Result<ProgressStats, ApiError> {
    let body = self
      .get_json(STATS_PATH, &[("user_id", user_id.to_string())])
      .await?;
    check_status(&body, "Failed to load progress")?;
    Ok(wire::normalize_stats(&body))
  }

  /// Personal records, flattened into sets
  pub async fn fetch_records(&self, user_id: &str) -> Result<Vec<SetRecord>, ApiError> {
    let body = self
      .get_json(RECORDS_PATH, &[("user_id", user_id.to_string())])
      .await?;
    check_status(&body, "Failed to load records")?;
    Ok(body.get("data").map(wire::normalize_records).unwrap_or_default())
  }

  /// One page of detailed history for an exercise at an RPE level
  pub async fn fetch_history(
    &self,
    user_id: &str,
    exercise: &str,
    rpe: Rpe,
    page: u32,
  ) -> Result<Vec<SetRecord>, ApiError> {
    let body = self
      .get_json(
        HISTORY_PATH,
        &[
          ("ejercicio", exercise.to_string()),
          ("rpe_target", rpe.to_string()),
          ("page", page.to_string()),
          ("user_id", user_id.to_string()),
        ],
      )
      .await?;

    // This endpoint may answer with a bare array and no status at all
    if body.get("status").is_some() {
      check_status(&body, "Failed to load history")?;
    }
    Ok(wire::normalize_history(&body))
  }

  /// Bodyweight from the user's most recent entry
  pub async fn fetch_last_body_weight(&self, user_id: &str) -> Result<Option<f64>, ApiError> {
    let body = self
      .get_json(BODY_WEIGHT_PATH, &[("user_id", user_id.to_string())])
      .await?;
    check_status(&body, "Failed to load bodyweight")?;
    let data = body.get("data").unwrap_or(&body);
    Ok(wire::normalize_body_weight(data))
  }

  pub async fn fetch_catalog(&self, page: u32) -> Result<Vec<CatalogExercise>, ApiError> {
    let body = self
      .get_json(CATALOG_PATH, &[("page", page.to_string())])
      .await?;
    check_status(&body, "Failed to load the exercise catalog")?;
    Ok(body.get("data").map(wire::normalize_catalog).unwrap_or_default())
  }

  /// Save a set. The backend's echo is merged over the submitted values.
  pub async fn submit_set(&self, user_id: &str, record: &SetRecord) -> Result<SetRecord, ApiError> {
    let url = self.config.endpoint(SUBMIT_PATH)?;
    let payload = SubmitSetBody::from_record(user_id, record);
    debug!(exercise = %record.exercise, "POST {}", SUBMIT_PATH);

    let request = async {
      let response = self.client.post(url).json(&payload).send().await?;

      let status = response.status();
      if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
          .ok()
          .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
          .unwrap_or_else(|| UNKNOWN_EXERCISE_MESSAGE.to_string());
        return Err(ApiError::Rejected(message));
      }

      read_body(response, SUBMIT_PATH).await
    };

    let body = self.cancellable(request).await.inspect_err(|e| {
      if let ApiError::Rejected(message) = e {
        warn!(exercise = %record.exercise, "Set rejected by backend: {}", message);
      }
    })?;
    check_status(&body, "Failed to save the set")?;

    let data = match body.get("data") {
      Some(Value::Array(rows)) => rows.first().cloned(),
      Some(other) => Some(other.clone()),
      None => None,
    }
    .unwrap_or_else(|| Value::Object(Map::new()));

    Ok(
      wire::normalize_set_with(&data, GroupContext::default(), Some(record))
        .unwrap_or_else(|| record.clone()),
    )
  }

  pub async fn delete_set(&self, id: i64) -> Result<(), ApiError> {
    let url = self.config.endpoint(DELETE_PATH)?;
    debug!(id, "POST {}", DELETE_PATH);

    let request = async {
      let response = self.client.post(url).json(&DeleteSetBody { id }).send().await?;
      read_body(response, DELETE_PATH).await
    };
    let body = self.cancellable(request).await?;
    check_status(&body, "Failed to delete the set")
  }

  /// -------------------------------------------------------------------------
  /// Request Helpers
  /// -------------------------------------------------------------------------

  async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
    let url = self.config.endpoint(path)?;
    debug!("GET {}", path);

    let request = async {
      let response = self.client.get(url).query(query).send().await?;
      read_body(response, path).await
    };
    self.cancellable(request).await
  }

  /// Race a request (send and body read) against navigation away from the view
  async fn cancellable<T, F>(&self, request: F) -> Result<T, ApiError>
  where
    F: Future<Output = Result<T, ApiError>>,
  {
    let mut navigation = self.navigation.subscribe();
    tokio::select! {
      result = request => result,
      Ok(()) = navigation.changed() => Err(ApiError::Cancelled),
    }
  }
}

async fn read_body(response: Response, path: &str) -> Result<Value, ApiError> {
  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Request to {} failed", path);
    return Err(ApiError::Http {
      status: status.as_u16(),
      body,
    });
  }

  let text = response.text().await?;
  serde_json::from_str(&text).map_err(|e| {
    warn!(
      "Failed to parse {} response: {} (first 200 chars: {})",
      path,
      e,
      &text.chars().take(200).collect::<String>()
    );
    ApiError::Parse(e.to_string())
  })
}

fn check_status(body: &Value, fallback: &str) -> Result<(), ApiError> {
  match body.get("status").and_then(Value::as_str) {
    Some("success") => Ok(()),
    _ => {
      let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string();
      warn!("Backend reported failure: {}", message);
      Err(ApiError::Business(message))
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
