use crate::api::ApiError;
use crate::history::HistoryFeed;
use crate::models::Rpe;
use crate::session::Session;

/// Open the history for an exercise at an RPE level and load its first page
pub async fn open_history(
  session: &Session,
  exercise: &str,
  rpe: f64,
) -> Result<HistoryFeed, ApiError> {
  let mut feed = session.history(exercise, Rpe::new(rpe));
  session.load_more_history(&mut feed).await?;
  Ok(feed)
}

/// Append the next page; a finished feed is returned unchanged
pub async fn load_more_history(
  session: &Session,
  mut feed: HistoryFeed,
) -> Result<HistoryFeed, ApiError> {
  session.load_more_history(&mut feed).await?;
  Ok(feed)
}
