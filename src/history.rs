//! Detailed history for one exercise at one RPE level
//!
//! The backend pages history ten rows at a time. A short page means there is
//! nothing left. Rows already seen are dropped so a shifted page (a set logged
//! between requests) does not duplicate entries.

use serde::Serialize;
use tracing::debug;

use crate::api::{ApiError, GymApi};
use crate::models::{RecordId, Rpe, SetRecord};

/// Rows per page, fixed by the backend
pub const HISTORY_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryFeed {
  exercise: String,
  rpe: Rpe,
  next_page: u32,
  has_more: bool,
  entries: Vec<SetRecord>,
}

impl HistoryFeed {
  pub fn new(exercise: impl Into<String>, rpe: Rpe) -> Self {
    Self {
      exercise: exercise.into(),
      rpe,
      next_page: 1,
      has_more: true,
      entries: Vec::new(),
    }
  }

  pub fn entries(&self) -> &[SetRecord] {
    &self.entries
  }

  pub fn has_more(&self) -> bool {
    self.has_more
  }

  /// Fetch the next page. Returns how many new entries were added.
  pub async fn load_more(&mut self, api: &GymApi, user_id: &str) -> Result<usize, ApiError> {
    if !self.has_more {
      return Ok(0);
    }
    let page = api
      .fetch_history(user_id, &self.exercise, self.rpe, self.next_page)
      .await?;
    Ok(self.absorb(page))
  }

  fn absorb(&mut self, page: Vec<SetRecord>) -> usize {
    self.has_more = page.len() == HISTORY_PAGE_SIZE;
    self.next_page += 1;

    let before = self.entries.len();
    for row in page {
      if !self.entries[..before].iter().any(|seen| same_row(seen, &row)) {
        self.entries.push(row);
      }
    }

    let added = self.entries.len() - before;
    debug!(
      exercise = %self.exercise,
      rpe = %self.rpe,
      added,
      has_more = self.has_more,
      "History page loaded"
    );
    added
  }
}

/// Rows match on the backend id. Rows without one (local placeholder ids are
/// minted per normalization) match on their contents instead.
fn same_row(a: &SetRecord, b: &SetRecord) -> bool {
  match (a.id, b.id) {
    (RecordId::Server(x), RecordId::Server(y)) => x == y,
    (RecordId::Local(_), RecordId::Local(_)) => {
      a.date == b.date
        && a.load_kg == b.load_kg
        && a.body_weight_kg == b.body_weight_kg
        && a.reps == b.reps
        && a.rpe == b.rpe
    }
    _ => false,
  }
}
