#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::metrics::Metrics;
    use crate::session::sync::{fingerprint, ProgressSync, SyncOutcome};
    use crate::store::{MemoryStore, PlanStore};
    use crate::student::Student;
    use crate::workout::progress::{Cursor, CurrentWorkoutProgress, WorkoutProgressState};

    fn tagged(set: usize) -> CurrentWorkoutProgress {
        let mut progress = WorkoutProgressState::fresh();
        progress.set_cursor(Cursor::new(0, 0, set));
        CurrentWorkoutProgress {
            workout_id: "w1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            progress,
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        assert_eq!(fingerprint(&tagged(1)).unwrap(), fingerprint(&tagged(1)).unwrap());
        assert_ne!(fingerprint(&tagged(1)).unwrap(), fingerprint(&tagged(2)).unwrap());
        assert_eq!(fingerprint(&tagged(0)).unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_identical_write_is_suppressed() {
        let store = MemoryStore::with_student(Student::new("s1", "Ana"));
        let metrics = Metrics::new();
        let mut sync = ProgressSync::new("s1", metrics.clone());

        assert_eq!(sync.sync(&store, &tagged(1)).await.unwrap(), SyncOutcome::Written);
        assert_eq!(sync.sync(&store, &tagged(1)).await.unwrap(), SyncOutcome::Unchanged);
        assert_eq!(sync.sync(&store, &tagged(2)).await.unwrap(), SyncOutcome::Written);

        assert_eq!(store.student_writes(), 2);
        assert_eq!(Metrics::get(&metrics.progress_writes), 2);
        assert_eq!(Metrics::get(&metrics.progress_writes_suppressed), 1);

        let stored = store.fetch_student("s1").await.unwrap();
        assert_eq!(stored.current_workout_progress, Some(tagged(2)));
    }

    #[tokio::test]
    async fn test_failed_write_is_retried() {
        let store = MemoryStore::with_student(Student::new("s1", "Ana"));
        let metrics = Metrics::new();
        let mut sync = ProgressSync::new("s1", metrics.clone());

        store.set_fail_writes(true);
        let err = sync.sync(&store, &tagged(1)).await.unwrap_err();
        assert_eq!(err.stage, "store");
        assert_eq!(Metrics::get(&metrics.persistence_failures), 1);

        store.set_fail_writes(false);
        assert_eq!(sync.sync(&store, &tagged(1)).await.unwrap(), SyncOutcome::Written);
        assert_eq!(store.student_writes(), 1);
    }

    #[tokio::test]
    async fn test_assume_stored_and_reset() {
        let store = MemoryStore::with_student(Student::new("s1", "Ana"));
        let mut sync = ProgressSync::new("s1", Metrics::new());

        sync.assume_stored(&tagged(3));
        assert_eq!(sync.sync(&store, &tagged(3)).await.unwrap(), SyncOutcome::Unchanged);

        sync.reset();
        assert_eq!(sync.sync(&store, &tagged(3)).await.unwrap(), SyncOutcome::Written);
    }

    #[tokio::test]
    async fn test_unknown_student_is_an_error() {
        let store = MemoryStore::new();
        let mut sync = ProgressSync::new("ghost", Metrics::new());
        let err = sync.sync(&store, &tagged(0)).await.unwrap_err();
        assert!(err.message.contains("not found"));
        assert_eq!(err.context.as_deref(), Some("student: ghost"));
    }
}
