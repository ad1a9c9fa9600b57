use std::sync::Arc;
use chrono::NaiveDate;
use fitcoach_lib::history::{AnalysisStatus, CompletionStatus, InsightType, ProactiveInsight};
use fitcoach_lib::metrics::Metrics;
use fitcoach_lib::session::{self, WorkoutSession};
use fitcoach_lib::store::{MemoryStore, PlanStore};
use fitcoach_lib::student::Student;
use fitcoach_lib::workout::{Cursor, CurrentWorkoutProgress, SequencerState, Transition, Workout, WorkoutProgressState};

/// 2024-03-04 is a Monday
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn plan() -> Vec<Workout> {
    serde_json::from_value(serde_json::json!([
        {
            "id": "w-mon",
            "day": "Segunda-feira",
            "label": "Treino A",
            "muscleGroups": ["Peito"],
            "blocks": [
                {
                    "id": "b1",
                    "type": "single",
                    "restAfterBlock": "90s",
                    "exercises": [
                        {"id": "i1", "exerciseId": "supino", "sets": "2", "reps": "10", "rest": "45s"}
                    ]
                },
                {
                    "id": "b2",
                    "type": "biset",
                    "restAfterBlock": "90s",
                    "exercises": [
                        {"id": "i2", "exerciseId": "crucifixo", "sets": 2, "reps": "12", "rest": "30s"},
                        {"id": "i3", "exerciseId": "flexao", "sets": "2", "reps": "15", "rest": "30s"}
                    ]
                }
            ]
        },
        {
            "id": "w-wed",
            "day": "Quarta-feira",
            "label": "Treino B",
            "blocks": [
                {"id": "b1", "exercises": [{"id": "i1", "exerciseId": "agachamento", "sets": "3", "reps": "8"}]}
            ]
        }
    ]))
    .unwrap()
}

fn store_with_student() -> Arc<MemoryStore> {
    let mut student = Student::new("s1", "Ana");
    student.available_days = vec!["Segunda-feira".to_string(), "Quarta-feira".to_string()];
    student.workout_plan = Some(plan());
    Arc::new(MemoryStore::with_student(student))
}

fn weight(w: &str) -> Option<String> {
    Some(w.to_string())
}

#[tokio::test]
async fn test_full_workout_updates_history() {
    let store = store_with_student();
    let metrics = Metrics::new();
    let mut session = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), metrics.clone())
        .await
        .unwrap();
    assert!(!session.was_resumed());
    assert_eq!(session.sequencer().workout().id, "w-mon");

    let mut finished = false;
    while !finished {
        match session.log_set(weight("20"), weight("10")).await {
            Transition::Rest { .. } => {
                session.finish_rest().await;
            }
            Transition::Finished => finished = true,
            Transition::Advanced(_) => {}
            Transition::Exited => panic!("unexpected exit"),
        }
    }
    assert!(session.last_error().is_none());

    let stored = store.student("s1").unwrap();
    let in_progress = stored.current_workout_progress.unwrap();
    assert_eq!(in_progress.workout_id, "w-mon");
    assert_eq!(in_progress.progress.logs.len(), 6);

    let summary = session.finish().await.unwrap();
    assert_eq!(summary.logs.len(), 6);
    assert_eq!(summary.entries_recorded, 6);

    let student = store.student("s1").unwrap();
    assert!(student.current_workout_progress.is_none());
    assert_eq!(student.completion_history.get(&monday()), Some(&CompletionStatus::Completed));
    assert_eq!(student.performance_history.get("supino").unwrap().history.len(), 2);
    assert_eq!(student.performance_history.get("flexao").unwrap().last_reps, 10);
    assert_eq!(Metrics::get(&metrics.sets_logged), 6);
}

#[tokio::test]
async fn test_close_and_resume_same_day() {
    let store = store_with_student();
    let mut session = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), Metrics::new())
        .await
        .unwrap();

    session.log_set(weight("20"), weight("10")).await;
    assert!(matches!(session.state(), SequencerState::Resting { duration_secs: 45, .. }));
    let snapshot = session.close().await.unwrap();
    assert_eq!(snapshot.cursor(), Cursor::new(0, 0, 1));
    drop(session);

    let writes_before = store.student_writes();
    let resumed = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), Metrics::new())
        .await
        .unwrap();
    assert!(resumed.was_resumed());
    assert_eq!(resumed.state(), SequencerState::Active(Cursor::new(0, 0, 1)));
    assert_eq!(resumed.sequencer().logs().len(), 1);
    assert_eq!(store.student_writes(), writes_before);
}

#[tokio::test]
async fn test_stale_progress_starts_fresh() {
    let store = store_with_student();
    let mut old = WorkoutProgressState::fresh();
    old.set_cursor(Cursor::new(1, 1, 1));
    store
        .update_student("s1", fitcoach_lib::student::StudentUpdate::progress(Some(CurrentWorkoutProgress {
            workout_id: "w-mon".to_string(),
            date: monday() - chrono::Duration::days(7),
            progress: old,
        })))
        .await
        .unwrap();

    let session = WorkoutSession::open_scheduled(store, "s1", monday(), Metrics::new())
        .await
        .unwrap();
    assert!(!session.was_resumed());
    assert_eq!(session.cursor(), Cursor::START);
}

#[tokio::test]
async fn test_misfit_progress_is_repaired() {
    let store = store_with_student();
    let mut progress = WorkoutProgressState::fresh();
    progress.set_cursor(Cursor::new(9, 0, 0));
    progress.logs.push(fitcoach_lib::workout::WorkoutLog {
        block_id: "b1".to_string(),
        exercise_id: "supino".to_string(),
        set_index: 0,
        weight: weight("20"),
        reps: weight("10"),
    });
    store
        .update_student("s1", fitcoach_lib::student::StudentUpdate::progress(Some(CurrentWorkoutProgress {
            workout_id: "w-mon".to_string(),
            date: monday(),
            progress,
        })))
        .await
        .unwrap();

    let session = WorkoutSession::open_scheduled(store, "s1", monday(), Metrics::new())
        .await
        .unwrap();
    assert!(session.was_resumed());
    assert_eq!(session.state(), SequencerState::Active(Cursor::START));
    assert_eq!(session.sequencer().logs().len(), 1);
}

#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let store = store_with_student();
    let metrics = Metrics::new();
    let mut session = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), metrics.clone())
        .await
        .unwrap();

    store.set_fail_writes(true);
    let t = session.log_set(weight("20"), weight("10")).await;
    assert!(matches!(t, Transition::Rest { duration_secs: 45, .. }));
    assert!(session.last_error().is_some());
    assert_eq!(session.sequencer().logs().len(), 1);
    assert!(store.student("s1").unwrap().current_workout_progress.is_none());

    store.set_fail_writes(false);
    session.finish_rest().await;
    assert!(session.last_error().is_none());
    let stored = store.student("s1").unwrap().current_workout_progress.unwrap();
    assert_eq!(stored.progress.logs.len(), 1);
    assert_eq!(Metrics::get(&metrics.persistence_failures), 1);
}

#[tokio::test]
async fn test_skip_is_persisted_without_log() {
    let store = store_with_student();
    let metrics = Metrics::new();
    let mut session = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), metrics.clone())
        .await
        .unwrap();

    assert_eq!(session.skip_exercise().await, Transition::Advanced(Cursor::new(0, 0, 1)));
    let stored = store.student("s1").unwrap().current_workout_progress.unwrap();
    assert_eq!(stored.progress.cursor(), Cursor::new(0, 0, 1));
    assert!(stored.progress.logs.is_empty());
    assert_eq!(Metrics::get(&metrics.sets_skipped), 1);
}

#[tokio::test]
async fn test_no_workout_scheduled() {
    let store = store_with_student();
    let tuesday = monday().succ_opt().unwrap();
    let result = WorkoutSession::open_scheduled(store, "s1", tuesday, Metrics::new()).await;
    let err = result.err().unwrap();
    assert_eq!(err.stage, "store");
}

#[tokio::test]
async fn test_reset_day_undoes_finish() {
    let store = store_with_student();
    let mut session = WorkoutSession::open_scheduled(store.clone(), "s1", monday(), Metrics::new())
        .await
        .unwrap();
    session.log_set(weight("30"), weight("8")).await;
    session.finish().await.unwrap();

    session::reset_day(store.as_ref(), "s1", monday()).await.unwrap();
    let student = store.student("s1").unwrap();
    assert!(student.completion_history.is_empty());
    assert!(student.performance_history.get("supino").unwrap().history.is_empty());
    assert!(student.current_workout_progress.is_none());
}

#[tokio::test]
async fn test_analysis_and_insights_are_recorded() {
    let store = store_with_student();

    let stored = session::record_post_workout_analysis(store.as_ref(), "s1", monday(), "Boa evolução no supino.")
        .await
        .unwrap();
    assert!(stored);
    let skipped = session::record_post_workout_analysis(store.as_ref(), "s1", monday(), "Erro de IA")
        .await
        .unwrap();
    assert!(!skipped);

    let student = store.student("s1").unwrap();
    let analysis = &student.post_workout_analyses[&monday()];
    assert_eq!(analysis.status, AnalysisStatus::PendingApproval);
    assert_eq!(analysis.analysis, "Boa evolução no supino.");

    let insight = ProactiveInsight {
        kind: InsightType::Achievement,
        message: "Novo recorde no supino".to_string(),
        related_exercise_id: Some("supino".to_string()),
    };
    let added = session::record_insights(store.as_ref(), "s1", vec![insight.clone()]).await.unwrap();
    assert_eq!(added, 1);
    let again = session::record_insights(store.as_ref(), "s1", vec![insight]).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(store.student("s1").unwrap().ai_insights.len(), 1);
}
