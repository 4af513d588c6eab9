pub mod history;
pub mod progression;
pub mod records;

use serde::Serialize;

use crate::api::ApiError;
use crate::session::Session;

use progression::ProgressionView;
use records::MuscleGroupView;

/// Everything the main screen shows after a load
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
  pub user_id: String,
  pub personal_bests: Vec<MuscleGroupView>,
  pub exercises: Vec<String>,
  pub progression: Option<ProgressionView>,
  pub summary: Option<String>,
}

/// Refresh the session and build the dashboard
pub async fn load_dashboard(
  session: &mut Session,
  exercise_in_focus: Option<&str>,
) -> Result<DashboardView, ApiError> {
  session.load().await?;
  Ok(dashboard(session, exercise_in_focus))
}

/// Dashboard from whatever the session currently holds
pub fn dashboard(session: &Session, exercise_in_focus: Option<&str>) -> DashboardView {
  DashboardView {
    user_id: session.user_id().to_string(),
    personal_bests: records::get_personal_bests(session),
    exercises: session.exercises_in_focus_order(),
    progression: progression::get_progression(session, exercise_in_focus),
    summary: session.stats().and_then(|s| s.summary.clone()),
  }
}
