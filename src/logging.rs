//! Tracing subscriber setup
//!
//! Logs go to stderr so the binary's JSON output on stdout stays clean.

use std::env;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

fn directive(raw: &str, fallback: tracing::Level) -> tracing_subscriber::filter::Directive {
  raw.parse().unwrap_or_else(|_| fallback.into())
}

/// Filter from `RUST_LOG` (default `info`) with HTTP client noise capped at warn
pub fn env_filter() -> EnvFilter {
  env::var("RUST_LOG")
    .map_or_else(|_| EnvFilter::new(DEFAULT_LEVEL), EnvFilter::new)
    .add_directive(directive("hyper=warn", tracing::Level::WARN))
    .add_directive(directive("hyper_util=warn", tracing::Level::WARN))
    .add_directive(directive("reqwest=warn", tracing::Level::WARN))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
  let layer = fmt::layer()
    .compact()
    .with_target(false)
    .with_writer(io::stderr);

  tracing_subscriber::registry()
    .with(env_filter())
    .with(layer)
    .try_init()
    .ok();
}
