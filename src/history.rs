use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::workout::progress::WorkoutLog;

/// How many AI insights a student keeps
pub const MAX_INSIGHTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
    Missed,
}

/// Day -> completion status, the adherence calendar
pub type CompletionHistory = BTreeMap<NaiveDate, CompletionStatus>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePerformance {
    pub last_weight: f64,
    pub last_reps: u32,
    #[serde(default)]
    pub history: Vec<PerformanceEntry>,
}

/// Per-exercise time series, appended to only when a workout is finished
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceHistory {
    exercises: BTreeMap<String, ExercisePerformance>,
}

impl PerformanceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, exercise_id: &str) -> Option<&ExercisePerformance> {
        self.exercises.get(exercise_id)
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    /// Fold a finished workout's logs in under `date`.
    /// Only logs with both a positive weight and a positive rep count are
    /// kept; the rest never touch the "last" values. Returns entries appended.
    pub fn record_logs(&mut self, logs: &[WorkoutLog], date: NaiveDate) -> usize {
        let mut appended = 0;
        for log in logs {
            let weight = parse_weight(log.weight.as_deref());
            let reps = parse_reps(log.reps.as_deref());
            if weight <= 0.0 || reps == 0 {
                continue;
            }
            let perf = self.exercises.entry(log.exercise_id.clone()).or_default();
            perf.history.push(PerformanceEntry { date, weight, reps });
            perf.last_weight = weight;
            perf.last_reps = reps;
            appended += 1;
        }
        appended
    }

    /// Drop every entry recorded on `date` and recompute the "last" values
    pub fn remove_date(&mut self, date: NaiveDate) {
        for perf in self.exercises.values_mut() {
            perf.history.retain(|entry| entry.date != date);
            match perf.history.last() {
                Some(last) => {
                    perf.last_weight = last.weight;
                    perf.last_reps = last.reps;
                }
                None => {
                    perf.last_weight = 0.0;
                    perf.last_reps = 0;
                }
            }
        }
    }

    /// Heaviest weight ever logged for an exercise
    pub fn best_weight(&self, exercise_id: &str) -> Option<f64> {
        self.get(exercise_id)?
            .history
            .iter()
            .map(|e| e.weight)
            .fold(None, |best, w| Some(best.map_or(w, |b: f64| b.max(w))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    PendingApproval,
    Approved,
    Rejected,
}

/// AI feedback on a finished workout awaiting trainer review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWorkoutAnalysis {
    pub analysis: String,
    pub status: AnalysisStatus,
}

impl PostWorkoutAnalysis {
    /// Wrap generated text for review; error-looking text is not stored
    pub fn pending(analysis: &str) -> Option<Self> {
        let trimmed = analysis.trim();
        if trimmed.is_empty() || trimmed.to_lowercase().starts_with("erro") {
            return None;
        }
        Some(PostWorkoutAnalysis {
            analysis: trimmed.to_string(),
            status: AnalysisStatus::PendingApproval,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Suggestion,
    Warning,
    Achievement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveInsight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_exercise_id: Option<String>,
}

/// Append insights whose message is new, keeping only the newest MAX_INSIGHTS.
/// Returns how many were added.
pub fn merge_insights(existing: &mut Vec<ProactiveInsight>, incoming: Vec<ProactiveInsight>) -> usize {
    let mut added = 0;
    for insight in incoming {
        if existing.iter().any(|i| i.message == insight.message) {
            continue;
        }
        existing.push(insight);
        added += 1;
    }
    if existing.len() > MAX_INSIGHTS {
        let overflow = existing.len() - MAX_INSIGHTS;
        existing.drain(..overflow);
    }
    added
}

/// Lenient float: "22,5kg" -> 22.5, garbage -> 0
pub fn parse_weight(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let normalized = raw.trim().replace(',', ".");
    let mut seen_dot = false;
    let numeric: String = normalized
        .chars()
        .take_while(|c| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                return true;
            }
            c.is_ascii_digit()
        })
        .collect();
    numeric.parse().unwrap_or(0.0)
}

/// Lenient integer: "12 reps" -> 12, garbage -> 0
pub fn parse_reps(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 0 };
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
