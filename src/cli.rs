//! Command-line shell over the `commands` facade
//!
//! Every subcommand prints its view as JSON on stdout.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use crate::api::ApiError;
use crate::commands;
use crate::config::{self, ClientConfig, ConfigError};
use crate::models::{parse_session_date, RecordId, SetSubmission};
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error("Invalid date '{0}', expected YYYY-MM-DD or DD/MM/YYYY")]
  InvalidDate(String),

  #[error("Failed to write output: {0}")]
  Output(#[from] serde_json::Error),

  #[error("Failed to start runtime: {0}")]
  Runtime(#[from] std::io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "gym-log", about = "Weightlifting log: personal bests, estimated 1RM and fatigue")]
pub struct Cli {
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Load records and stats and print the dashboard
  Dashboard {
    /// Exercise to chart; defaults to the first one logged
    #[arg(long)]
    exercise: Option<String>,
  },

  /// Log a set
  Log {
    exercise: String,
    #[arg(long)]
    load: f64,
    #[arg(long)]
    reps: u32,
    #[arg(long)]
    rpe: f64,
    #[arg(long, default_value_t = 0.0)]
    body_weight: f64,
    #[arg(long)]
    muscle: Option<String>,
    /// Session date, defaults to today
    #[arg(long)]
    date: Option<String>,
  },

  /// Delete a saved set by its backend id
  Delete { id: i64 },

  /// Detailed history for an exercise at one RPE level
  History {
    exercise: String,
    rpe: f64,
    /// Pages of ten rows to fetch
    #[arg(long, default_value_t = 1)]
    pages: u32,
  },

  /// Bodyweight from the last logged set
  BodyWeight,

  /// One page of the exercise catalog
  Catalog {
    #[arg(long, default_value_t = 1)]
    page: u32,
  },
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
  Ok(serde_json::to_string_pretty(value)?)
}

fn session_date(raw: Option<&str>) -> Result<NaiveDate, CliError> {
  match raw {
    Some(raw) => parse_session_date(raw).ok_or_else(|| CliError::InvalidDate(raw.to_string())),
    None => Ok(Local::now().date_naive()),
  }
}

async fn execute(command: Command) -> Result<(), CliError> {
  let config = ClientConfig::from_env()?;
  let user_id = config::user_id_from_env()?;
  let mut session = Session::new(&config, user_id)?;

  println!("{}", dispatch(&mut session, command).await?);
  Ok(())
}

/// Run a command against the session and render its view
async fn dispatch(session: &mut Session, command: Command) -> Result<String, CliError> {
  match command {
    Command::Dashboard { exercise } => {
      let view = commands::load_dashboard(session, exercise.as_deref()).await?;
      to_json(&view)
    }
    Command::Log {
      exercise,
      load,
      reps,
      rpe,
      body_weight,
      muscle,
      date,
    } => {
      let submission = SetSubmission {
        exercise,
        muscle_group: muscle,
        load_kg: load,
        body_weight_kg: body_weight,
        reps,
        rpe,
        date: session_date(date.as_deref())?,
        estimated_score: None,
      };
      let view = commands::records::submit_set(session, submission).await?;
      to_json(&view)
    }
    Command::Delete { id } => {
      let view = commands::records::delete_set(session, RecordId::Server(id)).await?;
      to_json(&view)
    }
    Command::History {
      exercise,
      rpe,
      pages,
    } => {
      let mut feed = commands::history::open_history(session, &exercise, rpe).await?;
      for _ in 1..pages {
        if !feed.has_more() {
          break;
        }
        feed = commands::history::load_more_history(session, feed).await?;
      }
      to_json(&feed)
    }
    Command::BodyWeight => {
      let weight = commands::records::get_last_body_weight(session).await?;
      to_json(&weight)
    }
    Command::Catalog { page } => {
      let entries = session.exercise_catalog(page).await?;
      to_json(&entries)
    }
  }
}

/// Parse arguments and run one command to completion
pub fn run(cli: Cli) -> Result<(), CliError> {
  let command = cli.command.unwrap_or(Command::Dashboard { exercise: None });
  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?;

  runtime.block_on(execute(command)).inspect_err(|e| error!("{}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{records_body, test_session};
  use mockito::Matcher;
  use serde_json::json;

  #[test]
  fn test_log_arguments() {
    let cli = Cli::try_parse_from([
      "gym-log", "log", "Bench Press", "--load", "80", "--reps", "5", "--rpe", "8.5",
    ])
    .unwrap();

    match cli.command {
      Some(Command::Log { exercise, load, reps, rpe, body_weight, .. }) => {
        assert_eq!(exercise, "Bench Press");
        assert_eq!((load, reps, rpe, body_weight), (80.0, 5, 8.5, 0.0));
      }
      other => panic!("unexpected command: {:?}", other),
    }
  }

  #[test]
  fn test_no_subcommand_means_dashboard() {
    let cli = Cli::try_parse_from(["gym-log"]).unwrap();
    assert!(cli.command.is_none());
  }

  #[test]
  fn test_session_date_formats() {
    assert_eq!(
      session_date(Some("15/03/2024")).unwrap(),
      NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    );
    assert!(matches!(session_date(Some("yesterday")), Err(CliError::InvalidDate(_))));
  }

  #[tokio::test]
  async fn test_log_posts_before_any_reload() {
    let mut server = mockito::Server::new_async().await;
    let save = server
      .mock("POST", "/rendimiento/guardar_marca")
      .match_body(Matcher::PartialJson(json!({ "ejercicio": "Squat", "rm": 123.3 })))
      .with_status(200)
      .with_body(json!({ "status": "success" }).to_string())
      .expect(1)
      .create_async()
      .await;
    server
      .mock("GET", "/analisis/ver_records")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(records_body(&[]))
      .create_async()
      .await;
    server
      .mock("GET", "/analisis/progreso")
      .match_query(Matcher::Any)
      .with_status(500)
      .create_async()
      .await;

    let mut session = test_session(&server.url());
    let command = Command::Log {
      exercise: "Squat".into(),
      load: 100.0,
      reps: 5,
      rpe: 8.0,
      body_weight: 0.0,
      muscle: Some("Legs".into()),
      date: Some("2024-03-15".into()),
    };

    let output = dispatch(&mut session, command).await.unwrap();
    save.assert_async().await;
    assert!(output.contains("\"Legs\""));
  }
}
