use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use crate::workout::model::Workout;

/// Position inside a workout: block, exercise within the block, set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub block: usize,
    pub exercise: usize,
    pub set: usize,
}

impl Cursor {
    pub const START: Cursor = Cursor { block: 0, exercise: 0, set: 0 };

    pub fn new(block: usize, exercise: usize, set: usize) -> Self {
        Cursor { block, exercise, set }
    }
}

/// One logged (or skipped-with-telemetry) set attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub block_id: String,
    pub exercise_id: String,
    pub set_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
}

/// Resumable cursor plus the append-only log of the running session.
/// This is the exact JSON shape persisted with the student record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgressState {
    pub active_block_index: usize,
    pub active_exercise_in_block_index: usize,
    pub current_set_index: usize,
    #[serde(default)]
    pub logs: Vec<WorkoutLog>,
}

impl WorkoutProgressState {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            block: self.active_block_index,
            exercise: self.active_exercise_in_block_index,
            set: self.current_set_index,
        }
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.active_block_index = cursor.block;
        self.active_exercise_in_block_index = cursor.exercise;
        self.current_set_index = cursor.set;
    }

    /// Check the cursor still addresses an existing block and exercise
    pub fn check_against(&self, workout: &Workout) -> Result<(), ProgressIssue> {
        let block = workout.blocks.get(self.active_block_index).ok_or(
            ProgressIssue::BlockOutOfRange {
                index: self.active_block_index,
                len: workout.blocks.len(),
            },
        )?;
        if self.active_exercise_in_block_index >= block.exercises.len() {
            return Err(ProgressIssue::ExerciseOutOfRange {
                block: self.active_block_index,
                index: self.active_exercise_in_block_index,
                len: block.exercises.len(),
            });
        }
        Ok(())
    }

    /// Keep the logs but restart the cursor when it no longer fits `workout`
    pub fn repaired_for(mut self, workout: &Workout) -> Self {
        if let Err(issue) = self.check_against(workout) {
            tracing::warn!(
                workout_id = %workout.id,
                issue = %issue,
                logs = self.logs.len(),
                "Stored progress does not fit workout, restarting cursor"
            );
            self.set_cursor(Cursor::START);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressIssue {
    #[error("block index {index} out of range ({len} blocks)")]
    BlockOutOfRange { index: usize, len: usize },
    #[error("exercise index {index} out of range in block {block} ({len} exercises)")]
    ExerciseOutOfRange { block: usize, index: usize, len: usize },
}

/// Progress tagged with the workout and day it belongs to, so a new day's
/// workout never resumes yesterday's cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWorkoutProgress {
    pub workout_id: String,
    pub date: NaiveDate,
    pub progress: WorkoutProgressState,
}

impl CurrentWorkoutProgress {
    pub fn belongs_to(&self, workout_id: &str, date: NaiveDate) -> bool {
        self.workout_id == workout_id && self.date == date
    }
}

/// Store-boundary decoding: a malformed progress blob is dropped instead of
/// failing the whole student record.
pub(crate) fn lenient_progress<'de, D>(deserializer: D) -> Result<Option<CurrentWorkoutProgress>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };
    match serde_json::from_value::<CurrentWorkoutProgress>(value) {
        Ok(progress) => Ok(Some(progress)),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed currentWorkoutProgress");
            Ok(None)
        }
    }
}
