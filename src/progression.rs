//! Progression analysis for the exercise in focus
//!
//! Builds the chart series for one exercise from the cached history, attaches
//! the backend's analysis rows for that exercise, and runs a three-session
//! decline check as a fatigue hint.
//!
//! Key principles:
//! - Pure views over the records, recomputed whenever focus or data changes
//! - Insufficient data yields no signal rather than an error
//! - The decline check is a heuristic, not a statistical test

use chrono::NaiveDate;
use serde::Serialize;

use crate::estimator::round_one_decimal;
use crate::models::{exercise_key, AnalysisEntry, Rpe, SetRecord};

/// Sessions inspected by the decline check
const FATIGUE_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
/// Progression Point: one session on the chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionPoint {
    pub date: Option<NaiveDate>,
    pub estimated_score: f64,
    pub load_kg: f64,
    pub reps: u32,
    pub rpe: Rpe,
}

impl From<&SetRecord> for ProgressionPoint {
    fn from(record: &SetRecord) -> Self {
        Self {
            date: record.date,
            estimated_score: record.estimated_score,
            load_kg: record.load_kg,
            reps: record.reps,
            rpe: record.rpe,
        }
    }
}

// ---------------------------------------------------------------------------
/// Fatigue Signal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueSignal {
    /// Drop from the oldest to the newest of the three sessions, in percent
    pub drop_percent: f64,
    /// Scores of the three sessions, most recent first
    pub recent_scores: [f64; FATIGUE_WINDOW],
    pub message: String,
}

impl FatigueSignal {
    pub fn title(&self, exercise: &str) -> String {
        format!("Fatigue detected in {}", exercise)
    }
}

/// Three consecutive declining sessions, most recent lowest.
///
/// Points may come in any order; they are ranked by date here. Among sessions
/// on the same day (or without a date) the one later in the slice counts as
/// more recent.
pub fn detect_fatigue(points: &[ProgressionPoint]) -> Option<FatigueSignal> {
    if points.len() < FATIGUE_WINDOW {
        return None;
    }

    let mut recent: Vec<&ProgressionPoint> = points.iter().rev().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let newest = recent[0].estimated_score;
    let middle = recent[1].estimated_score;
    let oldest = recent[2].estimated_score;

    if !(newest < middle && middle < oldest) || oldest <= 0.0 {
        return None;
    }

    let drop_percent = round_one_decimal((oldest - newest) / oldest * 100.0);
    Some(FatigueSignal {
        drop_percent,
        recent_scores: [newest, middle, oldest],
        message: format!(
            "Estimated 1RM dropped {:.1}% over the last {} sessions. Consider lowering the intensity or taking a rest day.",
            drop_percent, FATIGUE_WINDOW
        ),
    })
}

// ---------------------------------------------------------------------------
/// Progression Series: chart data for the exercise in focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSeries {
    pub exercise: String,
    /// Ascending by date; undated sessions first
    pub points: Vec<ProgressionPoint>,
    /// Backend analysis rows for this exercise
    pub analysis: Vec<AnalysisEntry>,
    pub fatigue: Option<FatigueSignal>,
}

impl ProgressionSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&ProgressionPoint> {
        self.points.last()
    }
}

/// Filter the history to one exercise and merge in its analysis rows.
///
/// `records` must be in logging order, oldest first. The date sort is stable,
/// so sets from the same day keep that order and the last one logged stays
/// the most recent.
pub fn select_series(
    records: &[SetRecord],
    analysis: &[AnalysisEntry],
    exercise_in_focus: &str,
) -> ProgressionSeries {
    let key = exercise_key(exercise_in_focus);

    let mut sessions: Vec<&SetRecord> = records
        .iter()
        .filter(|r| r.matches_exercise(exercise_in_focus))
        .collect();
    sessions.sort_by(|a, b| a.date.cmp(&b.date));

    let points: Vec<ProgressionPoint> = sessions.into_iter().map(ProgressionPoint::from).collect();
    let fatigue = detect_fatigue(&points);

    ProgressionSeries {
        exercise: exercise_in_focus.to_string(),
        points,
        analysis: analysis
            .iter()
            .filter(|entry| exercise_key(&entry.exercise) == key)
            .cloned()
            .collect(),
        fatigue,
    }
}

/// Distinct exercise names in first-seen order; the first is the default focus
pub fn exercises_in_focus_order(records: &[SetRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut names = Vec::new();
    for record in records {
        let key = exercise_key(&record.exercise);
        if !key.is_empty() && !seen.contains(&key) {
            seen.push(key);
            names.push(record.exercise.clone());
        }
    }
    names
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::session;

    fn points(scores: &[(&str, f64)]) -> Vec<ProgressionPoint> {
        scores
            .iter()
            .enumerate()
            .map(|(i, (date, score))| ProgressionPoint::from(&session(i as i64, "Squat", date, *score)))
            .collect()
    }

    #[test]
    fn test_three_declining_sessions_raise_fatigue() {
        // Oldest to newest: 100, 95, 90
        let series = points(&[("2024-03-01", 100.0), ("2024-03-04", 95.0), ("2024-03-07", 90.0)]);
        let signal = detect_fatigue(&series).expect("declining sessions should signal");
        assert_eq!(signal.drop_percent, 10.0);
        assert_eq!(signal.recent_scores, [90.0, 95.0, 100.0]);
        assert!(signal.message.contains("10.0%"));
        assert_eq!(signal.title("Squat"), "Fatigue detected in Squat");
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let series = points(&[("07/03/2024", 90.0), ("01/03/2024", 100.0), ("04/03/2024", 95.0)]);
        let signal = detect_fatigue(&series).unwrap();
        assert_eq!(signal.drop_percent, 10.0);
    }

    #[test]
    fn test_improving_sessions_do_not_signal() {
        let series = points(&[("2024-03-01", 90.0), ("2024-03-04", 95.0), ("2024-03-07", 100.0)]);
        assert_eq!(detect_fatigue(&series), None);
    }

    #[test]
    fn test_plateau_does_not_signal() {
        let series = points(&[("2024-03-01", 100.0), ("2024-03-04", 95.0), ("2024-03-07", 95.0)]);
        assert_eq!(detect_fatigue(&series), None);
    }

    #[test]
    fn test_needs_three_sessions() {
        assert_eq!(detect_fatigue(&[]), None);
        let series = points(&[("2024-03-01", 100.0), ("2024-03-04", 90.0)]);
        assert_eq!(detect_fatigue(&series), None);
    }

    #[test]
    fn test_only_last_three_sessions_count() {
        // Older improvement is irrelevant, last three decline
        let series = points(&[
            ("2024-02-01", 80.0),
            ("2024-02-10", 120.0),
            ("2024-02-20", 110.0),
            ("2024-03-01", 100.0),
        ]);
        let signal = detect_fatigue(&series).unwrap();
        // (120 - 100) / 120 = 16.67%
        assert_eq!(signal.drop_percent, 16.7);
    }

    #[test]
    fn test_select_series_filters_and_sorts() {
        let records = vec![
            session(1, "Squat", "2024-03-07", 90.0),
            session(2, "Bench Press", "2024-03-05", 70.0),
            session(3, "squat", "01/03/2024", 100.0),
            session(4, "Squat", "2024-03-04", 95.0),
        ];
        let analysis = vec![
            AnalysisEntry {
                exercise: "SQUAT".into(),
                rpe: Some(Rpe::new(8.0)),
                percent: Some(-10.0),
                value: Some(90.0),
            },
            AnalysisEntry {
                exercise: "Bench Press".into(),
                rpe: None,
                percent: Some(2.0),
                value: Some(70.0),
            },
        ];

        let series = select_series(&records, &analysis, "Squat");
        let scores: Vec<f64> = series.points.iter().map(|p| p.estimated_score).collect();
        assert_eq!(scores, vec![100.0, 95.0, 90.0]);
        assert_eq!(series.analysis.len(), 1);
        assert_eq!(series.analysis[0].percent, Some(-10.0));
        assert_eq!(series.fatigue.as_ref().map(|f| f.drop_percent), Some(10.0));
        assert_eq!(series.latest().map(|p| p.estimated_score), Some(90.0));
    }

    #[test]
    fn test_select_series_undated_first() {
        let records = vec![
            session(1, "Row", "2024-03-07", 90.0),
            session(2, "Row", "not a date", 60.0),
        ];
        let series = select_series(&records, &[], "Row");
        assert_eq!(series.points[0].date, None);
        assert_eq!(series.points[1].estimated_score, 90.0);
    }

    #[test]
    fn test_select_series_unknown_exercise_is_empty() {
        let records = vec![session(1, "Row", "2024-03-07", 90.0)];
        let series = select_series(&records, &[], "Deadlift");
        assert!(series.is_empty());
        assert_eq!(series.fatigue, None);
    }

    #[test]
    fn test_exercises_in_focus_order() {
        let records = vec![
            session(1, "Squat", "2024-03-07", 90.0),
            session(2, "Bench Press", "2024-03-05", 70.0),
            session(3, "squat", "2024-03-01", 100.0),
            session(4, "Row", "2024-03-04", 60.0),
        ];
        assert_eq!(
            exercises_in_focus_order(&records),
            vec!["Squat".to_string(), "Bench Press".to_string(), "Row".to_string()]
        );
    }
}
