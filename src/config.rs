use serde::Serialize;
use std::env;
use std::time::Duration;
use url::Url;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const BASE_URL_VAR: &str = "GYM_API_BASE_URL";
const TIMEOUT_VAR: &str = "GYM_REQUEST_TIMEOUT_SECS";
const SELF_LOADED_VAR: &str = "GYM_SELF_LOADED_EXERCISES";
const USER_ID_VAR: &str = "GYM_USER_ID";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Invalid configuration for {var}: {reason}")]
  InvalidConfig { var: String, reason: String },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Client Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Always ends with `/` so endpoint paths join under it
  pub base_url: Url,
  pub request_timeout: Duration,
  /// Extra names treated as bodyweight movements by the estimator
  pub self_loaded_exercises: Vec<String>,
}

impl ClientConfig {
  pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ConfigError> {
    if request_timeout.is_zero() {
      return Err(ConfigError::InvalidConfig {
        var: TIMEOUT_VAR.into(),
        reason: "timeout must be greater than zero".into(),
      });
    }

    Ok(Self {
      base_url: parse_base_url(base_url)?,
      request_timeout,
      self_loaded_exercises: Vec::new(),
    })
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    let base_url =
      env::var(BASE_URL_VAR).map_err(|_| ConfigError::MissingConfig(BASE_URL_VAR.into()))?;

    let timeout_secs = match env::var(TIMEOUT_VAR) {
      Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidConfig {
        var: TIMEOUT_VAR.into(),
        reason: e.to_string(),
      })?,
      Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    let mut config = Self::new(&base_url, Duration::from_secs(timeout_secs))?;
    config.self_loaded_exercises = env::var(SELF_LOADED_VAR)
      .map(|raw| parse_name_list(&raw))
      .unwrap_or_default();

    Ok(config)
  }

  /// Absolute URL for a path relative to the API base
  pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
    self.base_url.join(path.trim_start_matches('/'))
  }
}

/// User the binary acts for
pub fn user_id_from_env() -> Result<String, ConfigError> {
  env::var(USER_ID_VAR)
    .ok()
    .map(|id| id.trim().to_string())
    .filter(|id| !id.is_empty())
    .ok_or_else(|| ConfigError::MissingConfig(USER_ID_VAR.into()))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
  let invalid = |reason: String| ConfigError::InvalidConfig {
    var: BASE_URL_VAR.into(),
    reason,
  };

  let mut raw = raw.trim().to_string();
  if !raw.ends_with('/') {
    raw.push('/');
  }

  let url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(invalid(format!("unsupported scheme '{}'", other))),
  }
}

fn parse_name_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(String::from)
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_from_env_defaults() {
    temp_env::with_vars(
      [
        (BASE_URL_VAR, Some("https://api.example.com/webhook")),
        (TIMEOUT_VAR, None),
        (SELF_LOADED_VAR, None),
      ],
      || {
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.example.com/webhook/");
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert!(config.self_loaded_exercises.is_empty());
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_reads_overrides() {
    temp_env::with_vars(
      [
        (BASE_URL_VAR, Some("http://localhost:5678/")),
        (TIMEOUT_VAR, Some("3")),
        (SELF_LOADED_VAR, Some("Nordic Curl, ,Pistol Squat")),
      ],
      || {
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.self_loaded_exercises, vec!["Nordic Curl", "Pistol Squat"]);
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_missing_base_url() {
    temp_env::with_var_unset(BASE_URL_VAR, || {
      let err = ClientConfig::from_env().unwrap_err();
      assert!(matches!(err, ConfigError::MissingConfig(ref var) if var == BASE_URL_VAR));
    });
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_bad_timeout() {
    temp_env::with_vars(
      [(BASE_URL_VAR, Some("http://localhost:5678")), (TIMEOUT_VAR, Some("soon"))],
      || {
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { .. }));
      },
    );

    temp_env::with_vars(
      [(BASE_URL_VAR, Some("http://localhost:5678")), (TIMEOUT_VAR, Some("0"))],
      || {
        assert!(ClientConfig::from_env().is_err());
      },
    );
  }

  #[test]
  #[serial]
  fn test_user_id_from_env() {
    temp_env::with_var(USER_ID_VAR, Some(" abc-123 "), || {
      assert_eq!(user_id_from_env().unwrap(), "abc-123");
    });
    temp_env::with_var(USER_ID_VAR, Some("   "), || {
      assert!(user_id_from_env().is_err());
    });
  }

  #[test]
  fn test_rejects_non_http_scheme() {
    let err = ClientConfig::new("ftp://files.example.com", Duration::from_secs(1)).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Invalid configuration for GYM_API_BASE_URL: unsupported scheme 'ftp'"
    );
  }

  #[test]
  fn test_endpoint_joins_under_base_path() {
    let config = ClientConfig::new("https://api.example.com/webhook", Duration::from_secs(1)).unwrap();
    assert_eq!(
      config.endpoint("analisis/progreso").unwrap().as_str(),
      "https://api.example.com/webhook/analisis/progreso"
    );
    assert_eq!(
      config.endpoint("/rendimiento/guardar_marca").unwrap().as_str(),
      "https://api.example.com/webhook/rendimiento/guardar_marca"
    );
  }
}
