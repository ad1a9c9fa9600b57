use sha2::{Digest, Sha256};
use crate::error::CoachError;
use crate::logging::log_progress_write;
use crate::metrics::Metrics;
use crate::store::PlanStore;
use crate::student::StudentUpdate;
use crate::workout::progress::CurrentWorkoutProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Written,
    /// Same bytes as the last successful write; no store call made
    Unchanged,
}

/// Compare-before-write adapter between a session and the plan store.
/// The fingerprint only moves on a successful write, so a failed write is
/// retried by the next sync even when the progress has not changed since.
#[derive(Debug)]
pub struct ProgressSync {
    student_id: String,
    last_written: Option<String>,
    metrics: Metrics,
}

pub fn fingerprint(progress: &CurrentWorkoutProgress) -> Result<String, CoachError> {
    let bytes = serde_json::to_vec(progress)
        .map_err(|e| CoachError::new(
            format!("Failed to serialize progress: {}", e),
            "json_serialize"
        ))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

impl ProgressSync {
    pub fn new<S: Into<String>>(student_id: S, metrics: Metrics) -> Self {
        ProgressSync {
            student_id: student_id.into(),
            last_written: None,
            metrics,
        }
    }

    /// Treat `progress` as already stored (it was just read from the store)
    pub fn assume_stored(&mut self, progress: &CurrentWorkoutProgress) {
        self.last_written = fingerprint(progress).ok();
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub async fn sync<S>(&mut self, store: &S, progress: &CurrentWorkoutProgress) -> Result<SyncOutcome, CoachError>
    where
        S: PlanStore + ?Sized,
    {
        let print = fingerprint(progress)?;
        if self.last_written.as_deref() == Some(print.as_str()) {
            self.metrics.record_write_suppressed();
            log_progress_write(&self.student_id, false);
            return Ok(SyncOutcome::Unchanged);
        }

        match store
            .update_student(&self.student_id, StudentUpdate::progress(Some(progress.clone())))
            .await
        {
            Ok(()) => {
                self.last_written = Some(print);
                self.metrics.record_progress_write();
                log_progress_write(&self.student_id, true);
                Ok(SyncOutcome::Written)
            }
            Err(e) => {
                self.metrics.record_persistence_failure();
                tracing::warn!(
                    student_id = %self.student_id,
                    workout_id = %progress.workout_id,
                    error = %e,
                    "Failed to persist workout progress"
                );
                Err(e.with_context(format!("student: {}", self.student_id)))
            }
        }
    }

    /// Forget the last write, e.g. after the stored progress was cleared
    pub fn reset(&mut self) {
        self.last_written = None;
    }
}
