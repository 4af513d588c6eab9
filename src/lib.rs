pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod estimator;
pub mod history;
pub mod logging;
pub mod models;
pub mod progression;
pub mod records;
pub mod session;
pub mod wire;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use std::process::ExitCode;

pub fn run() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  logging::init();

  match cli::run(cli::Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(_) => ExitCode::FAILURE,
  }
}
