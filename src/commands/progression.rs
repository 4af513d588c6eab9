//! Progression chart and fatigue banner for the exercise in focus

use serde::Serialize;

use crate::models::AnalysisEntry;
use crate::progression::{FatigueSignal, ProgressionPoint};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueView {
    pub title: String,
    pub message: String,
    pub drop_percent: f64,
}

impl FatigueView {
    fn new(exercise: &str, signal: &FatigueSignal) -> Self {
        Self {
            title: signal.title(exercise),
            message: signal.message.clone(),
            drop_percent: signal.drop_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionView {
    pub exercise: String,
    pub points: Vec<ProgressionPoint>,
    pub analysis: Vec<AnalysisEntry>,
    pub fatigue: Option<FatigueView>,
}

/// Chart data for an exercise, or the default focus when none is given.
/// None when the session has nothing to chart.
pub fn get_progression(session: &Session, exercise: Option<&str>) -> Option<ProgressionView> {
    let exercise = match exercise {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => session.exercises_in_focus_order().into_iter().next()?,
    };

    let series = session.progression(&exercise);
    if series.is_empty() && series.analysis.is_empty() {
        return None;
    }

    Some(ProgressionView {
        fatigue: series
            .fatigue
            .as_ref()
            .map(|signal| FatigueView::new(&series.exercise, signal)),
        exercise: series.exercise,
        points: series.points,
        analysis: series.analysis,
    })
}
