use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use crate::history::{CompletionHistory, PerformanceHistory, PostWorkoutAnalysis, ProactiveInsight};
use crate::workout::model::WorkoutPlan;
use crate::workout::progress::{lenient_progress, CurrentWorkoutProgress};

/// Student record as kept by the plan store.
/// Only training data is modelled; profile and anamnesis fields ride along in
/// `extra` so a read-modify-write never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub personal_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_plan: Option<WorkoutPlan>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_history: CompletionHistory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub performance_history: PerformanceHistory,
    #[serde(default, deserialize_with = "lenient_progress")]
    pub current_workout_progress: Option<CurrentWorkoutProgress>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_workout_analyses: BTreeMap<NaiveDate, PostWorkoutAnalysis>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_insights: Vec<ProactiveInsight>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Student {
    pub fn new<S: Into<String>>(id: S, name: S) -> Self {
        Student {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            personal_id: String::new(),
            available_days: Vec::new(),
            workout_plan: None,
            completion_history: CompletionHistory::new(),
            performance_history: PerformanceHistory::new(),
            current_workout_progress: None,
            post_workout_analyses: BTreeMap::new(),
            ai_insights: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn workout_plan(&self) -> &[crate::workout::model::Workout] {
        self.workout_plan.as_deref().unwrap_or(&[])
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_plan: Option<WorkoutPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_history: Option<CompletionHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_history: Option<PerformanceHistory>,
    /// `Some(None)` clears the stored progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_workout_progress: Option<Option<CurrentWorkoutProgress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_workout_analyses: Option<BTreeMap<NaiveDate, PostWorkoutAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<Vec<ProactiveInsight>>,
}

impl StudentUpdate {
    pub fn progress(progress: Option<CurrentWorkoutProgress>) -> Self {
        StudentUpdate {
            current_workout_progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StudentUpdate::default()
    }

    pub fn apply_to(self, student: &mut Student) {
        if let Some(plan) = self.workout_plan {
            student.workout_plan = Some(plan);
        }
        if let Some(history) = self.completion_history {
            student.completion_history = history;
        }
        if let Some(history) = self.performance_history {
            student.performance_history = history;
        }
        if let Some(progress) = self.current_workout_progress {
            student.current_workout_progress = progress;
        }
        if let Some(analyses) = self.post_workout_analyses {
            student.post_workout_analyses = analyses;
        }
        if let Some(insights) = self.ai_insights {
            student.ai_insights = insights;
        }
    }
}

/// JSON columns may hold null; treat it like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
