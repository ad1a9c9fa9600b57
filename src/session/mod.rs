//! A workout being performed by one student on one day.
//!
//! `WorkoutSession` drives a [`Sequencer`] and mirrors its progress into the
//! plan store after every transition. The in-memory transition always happens
//! first; a failed write is kept in `last_error` and retried on the next one.

pub mod sync;

use std::sync::Arc;
use chrono::NaiveDate;
use crate::error::CoachError;
use crate::history::{merge_insights, CompletionStatus, PostWorkoutAnalysis, ProactiveInsight};
use crate::metrics::Metrics;
use crate::store::PlanStore;
use crate::student::StudentUpdate;
use crate::workout::model::{workout_for_date, Workout};
use crate::workout::progress::{Cursor, CurrentWorkoutProgress, WorkoutLog, WorkoutProgressState};
use crate::workout::sequencer::{Sequencer, SequencerState, Transition};

pub use sync::{ProgressSync, SyncOutcome};

/// What `finish` wrote back to the student record
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedWorkout {
    pub workout_id: String,
    pub date: NaiveDate,
    pub logs: Vec<WorkoutLog>,
    /// Performance entries appended (logs with weight or reps)
    pub entries_recorded: usize,
}

pub struct WorkoutSession<S: PlanStore + ?Sized> {
    store: Arc<S>,
    student_id: String,
    date: NaiveDate,
    sequencer: Sequencer,
    sync: ProgressSync,
    metrics: Metrics,
    resumed: bool,
    last_error: Option<CoachError>,
}

impl<S: PlanStore + ?Sized> WorkoutSession<S> {
    /// Open `workout` for `date`. Stored progress is resumed only when it is
    /// tagged with the same workout and day; otherwise the workout starts over.
    pub async fn open(
        store: Arc<S>,
        student_id: &str,
        workout: Workout,
        date: NaiveDate,
        metrics: Metrics,
    ) -> Result<Self, CoachError> {
        let student = store.fetch_student(student_id).await?;

        let stored = student
            .current_workout_progress
            .filter(|p| p.belongs_to(&workout.id, date));
        let resumed = stored.is_some();
        let progress = match &stored {
            Some(tagged) => tagged.progress.clone().repaired_for(&workout),
            None => WorkoutProgressState::fresh(),
        };

        let sequencer = Sequencer::resume(workout, progress);
        let mut session = WorkoutSession {
            store,
            student_id: student_id.to_string(),
            date,
            sequencer,
            sync: ProgressSync::new(student_id, metrics.clone()),
            metrics,
            resumed,
            last_error: None,
        };

        if let Some(tagged) = stored {
            if tagged == session.tagged_progress() {
                session.sync.assume_stored(&tagged);
            }
        }

        tracing::info!(
            student_id = student_id,
            workout_id = %session.sequencer.workout().id,
            date = %date,
            resumed = resumed,
            logs = session.sequencer.logs().len(),
            "Workout session opened"
        );
        Ok(session)
    }

    /// Open whatever the student's plan schedules on `date`
    pub async fn open_scheduled(
        store: Arc<S>,
        student_id: &str,
        date: NaiveDate,
        metrics: Metrics,
    ) -> Result<Self, CoachError> {
        let student = store.fetch_student(student_id).await?;
        let workout = workout_for_date(student.workout_plan(), date)
            .cloned()
            .ok_or_else(|| CoachError::not_found(format!("workout on {}", date))
                .with_context(format!("student: {}", student_id)))?;
        Self::open(store, student_id, workout, date, metrics).await
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn cursor(&self) -> Cursor {
        self.sequencer.cursor()
    }

    /// True when stored progress for this workout and day was picked up
    pub fn was_resumed(&self) -> bool {
        self.resumed
    }

    /// Most recent persistence failure, cleared by the next successful write
    pub fn last_error(&self) -> Option<&CoachError> {
        self.last_error.as_ref()
    }

    pub fn tagged_progress(&self) -> CurrentWorkoutProgress {
        CurrentWorkoutProgress {
            workout_id: self.sequencer.workout().id.clone(),
            date: self.date,
            progress: self.sequencer.progress(),
        }
    }

    pub async fn log_set(&mut self, weight: Option<String>, reps: Option<String>) -> Transition {
        let before = self.sequencer.logs().len();
        let transition = self.sequencer.log_set(weight, reps);
        if self.sequencer.logs().len() > before {
            self.metrics.record_set_logged();
        }
        self.persist().await;
        transition
    }

    pub async fn skip_exercise(&mut self) -> Transition {
        let transition = self.sequencer.skip_exercise();
        if matches!(transition, Transition::Advanced(_) | Transition::Finished) {
            self.metrics.record_set_skipped();
        }
        self.persist().await;
        transition
    }

    pub async fn finish_rest(&mut self) -> Option<Cursor> {
        let cursor = self.sequencer.finish_rest();
        self.persist().await;
        cursor
    }

    /// Best-effort write of the current progress
    async fn persist(&mut self) -> Option<SyncOutcome> {
        let tagged = self.tagged_progress();
        match self.sync.sync(self.store.as_ref(), &tagged).await {
            Ok(outcome) => {
                self.last_error = None;
                Some(outcome)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    /// Leave without finishing; the progress is written so a later `open`
    /// on the same day resumes here.
    pub async fn close(&mut self) -> Result<WorkoutProgressState, CoachError> {
        let snapshot = self.sequencer.close_session();
        let tagged = self.tagged_progress();
        self.sync.sync(self.store.as_ref(), &tagged).await?;
        self.last_error = None;
        tracing::info!(
            student_id = %self.student_id,
            workout_id = %tagged.workout_id,
            logs = snapshot.logs.len(),
            "Workout session closed"
        );
        Ok(snapshot)
    }

    /// Confirmed end of the workout: fold the logs into the performance
    /// history, mark the day completed and clear the stored progress, all in
    /// one update. If that update fails the stored progress is untouched and
    /// the workout can be reopened and finished again.
    pub async fn finish(self) -> Result<FinishedWorkout, CoachError> {
        let workout_id = self.sequencer.workout().id.clone();
        let logs = self.sequencer.finish();

        let student = self.store.fetch_student(&self.student_id).await?;
        let mut performance = student.performance_history;
        let entries_recorded = performance.record_logs(&logs, self.date);
        let mut completion = student.completion_history;
        completion.insert(self.date, CompletionStatus::Completed);

        let update = StudentUpdate {
            performance_history: Some(performance),
            completion_history: Some(completion),
            current_workout_progress: Some(None),
            ..Default::default()
        };
        if let Err(e) = self.store.update_student(&self.student_id, update).await {
            self.metrics.record_persistence_failure();
            tracing::warn!(
                student_id = %self.student_id,
                workout_id = %workout_id,
                error = %e,
                "Failed to save finished workout"
            );
            return Err(e);
        }

        tracing::info!(
            student_id = %self.student_id,
            workout_id = %workout_id,
            date = %self.date,
            logs = logs.len(),
            entries = entries_recorded,
            "Workout finished"
        );
        Ok(FinishedWorkout {
            workout_id,
            date: self.date,
            logs,
            entries_recorded,
        })
    }
}

/// Undo a day: drop its completion mark, its performance entries and any
/// stored progress.
pub async fn reset_day<S>(store: &S, student_id: &str, date: NaiveDate) -> Result<(), CoachError>
where
    S: PlanStore + ?Sized,
{
    let student = store.fetch_student(student_id).await?;
    let mut completion = student.completion_history;
    completion.remove(&date);
    let mut performance = student.performance_history;
    performance.remove_date(date);

    store
        .update_student(student_id, StudentUpdate {
            completion_history: Some(completion),
            performance_history: Some(performance),
            current_workout_progress: Some(None),
            ..Default::default()
        })
        .await?;
    tracing::info!(student_id = student_id, date = %date, "Workout day reset");
    Ok(())
}

/// Store generated feedback for trainer review. Returns false when the text
/// looks like an error message and nothing was stored.
pub async fn record_post_workout_analysis<S>(
    store: &S,
    student_id: &str,
    date: NaiveDate,
    analysis: &str,
) -> Result<bool, CoachError>
where
    S: PlanStore + ?Sized,
{
    let Some(entry) = PostWorkoutAnalysis::pending(analysis) else {
        tracing::debug!(student_id = student_id, "Skipping unusable post-workout analysis");
        return Ok(false);
    };
    let student = store.fetch_student(student_id).await?;
    let mut analyses = student.post_workout_analyses;
    analyses.insert(date, entry);
    store
        .update_student(student_id, StudentUpdate {
            post_workout_analyses: Some(analyses),
            ..Default::default()
        })
        .await?;
    Ok(true)
}

/// Merge new insights into the student's list. Returns how many were new.
pub async fn record_insights<S>(
    store: &S,
    student_id: &str,
    insights: Vec<ProactiveInsight>,
) -> Result<usize, CoachError>
where
    S: PlanStore + ?Sized,
{
    let student = store.fetch_student(student_id).await?;
    let mut merged = student.ai_insights;
    let added = merge_insights(&mut merged, insights);
    if added == 0 {
        return Ok(0);
    }
    store
        .update_student(student_id, StudentUpdate {
            ai_insights: Some(merged),
            ..Default::default()
        })
        .await?;
    Ok(added)
}
