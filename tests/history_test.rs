#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::history::{
        merge_insights, parse_reps, parse_weight, AnalysisStatus, InsightType, PerformanceHistory,
        PostWorkoutAnalysis, ProactiveInsight, MAX_INSIGHTS,
    };
    use crate::student::{Student, StudentUpdate};
    use crate::workout::progress::WorkoutLog;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn log(exercise_id: &str, weight: Option<&str>, reps: Option<&str>) -> WorkoutLog {
        WorkoutLog {
            block_id: "b1".to_string(),
            exercise_id: exercise_id.to_string(),
            set_index: 0,
            weight: weight.map(str::to_string),
            reps: reps.map(str::to_string),
        }
    }

    fn insight(message: &str) -> ProactiveInsight {
        ProactiveInsight {
            kind: InsightType::Suggestion,
            message: message.to_string(),
            related_exercise_id: None,
        }
    }

    #[test]
    fn test_lenient_number_parsing() {
        assert_eq!(parse_weight(Some("22,5")), 22.5);
        assert_eq!(parse_weight(Some("40kg")), 40.0);
        assert_eq!(parse_weight(Some("pesado")), 0.0);
        assert_eq!(parse_weight(None), 0.0);
        assert_eq!(parse_reps(Some("12 reps")), 12);
        assert_eq!(parse_reps(Some("falha")), 0);
    }

    #[test]
    fn test_record_logs_needs_weight_and_reps() {
        let mut history = PerformanceHistory::new();
        let logs = vec![
            log("supino", Some("40"), Some("10")),
            log("supino", Some("42,5"), Some("8")),
            log("prancha", None, Some("45")),
            log("remada", None, None),
            log("remada", Some("abc"), Some("")),
        ];

        assert_eq!(history.record_logs(&logs, day(4)), 2);

        let supino = history.get("supino").unwrap();
        assert_eq!(supino.history.len(), 2);
        assert_eq!(supino.last_weight, 42.5);
        assert_eq!(supino.last_reps, 8);
        assert!(history.get("prancha").is_none());
        assert!(history.get("remada").is_none());
        assert_eq!(history.best_weight("supino"), Some(42.5));

        let partial = vec![
            log("supino", None, Some("12")),
            log("supino", Some("0"), Some("12")),
            log("supino", Some("45"), None),
            log("supino", Some("45"), Some("0")),
        ];
        assert_eq!(history.record_logs(&partial, day(6)), 0);

        let supino = history.get("supino").unwrap();
        assert_eq!(supino.history.len(), 2);
        assert_eq!(supino.last_weight, 42.5);
        assert_eq!(supino.last_reps, 8);
    }

    #[test]
    fn test_remove_date_recomputes_last_values() {
        let mut history = PerformanceHistory::new();
        history.record_logs(&[log("supino", Some("40"), Some("10"))], day(4));
        history.record_logs(&[log("supino", Some("45"), Some("6"))], day(6));

        history.remove_date(day(6));
        let supino = history.get("supino").unwrap();
        assert_eq!(supino.history.len(), 1);
        assert_eq!(supino.last_weight, 40.0);
        assert_eq!(supino.last_reps, 10);

        history.remove_date(day(4));
        let supino = history.get("supino").unwrap();
        assert!(supino.history.is_empty());
        assert_eq!(supino.last_weight, 0.0);
    }

    #[test]
    fn test_post_workout_analysis_pending() {
        let analysis = PostWorkoutAnalysis::pending("  Bom volume hoje.  ").unwrap();
        assert_eq!(analysis.analysis, "Bom volume hoje.");
        assert_eq!(analysis.status, AnalysisStatus::PendingApproval);
        assert!(PostWorkoutAnalysis::pending("Erro: cota excedida").is_none());
        assert!(PostWorkoutAnalysis::pending("").is_none());

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["status"], "pending_approval");
    }

    #[test]
    fn test_merge_insights_dedupes_and_caps() {
        let mut existing = vec![insight("a"), insight("b")];
        let added = merge_insights(&mut existing, vec![insight("b"), insight("c")]);
        assert_eq!(added, 1);
        assert_eq!(existing.len(), 3);

        let many: Vec<ProactiveInsight> = (0..12).map(|i| insight(&format!("n{}", i))).collect();
        merge_insights(&mut existing, many);
        assert_eq!(existing.len(), MAX_INSIGHTS);
        assert_eq!(existing.last().unwrap().message, "n11");
        assert_eq!(existing.first().unwrap().message, "n2");
    }

    #[test]
    fn test_student_record_tolerates_nulls_and_bad_progress() {
        let json = serde_json::json!({
            "id": "s1",
            "name": "Ana",
            "availableDays": null,
            "completionHistory": {"2024-03-04": "completed"},
            "performanceHistory": null,
            "currentWorkoutProgress": {"workoutId": "w1", "progress": "garbage"},
            "anamnesis": {"goal": "hipertrofia"}
        });
        let student: Student = serde_json::from_value(json).unwrap();
        assert!(student.available_days.is_empty());
        assert_eq!(student.completion_history.len(), 1);
        assert!(student.current_workout_progress.is_none());
        assert_eq!(student.extra["anamnesis"]["goal"], "hipertrofia");

        let back = serde_json::to_value(&student).unwrap();
        assert_eq!(back["anamnesis"]["goal"], "hipertrofia");
        assert_eq!(back["completionHistory"]["2024-03-04"], "completed");
    }

    #[test]
    fn test_student_update_clears_progress() {
        let mut student = Student::new("s1", "Ana");
        student.available_days = vec!["Segunda-feira".to_string()];
        let update = StudentUpdate::progress(None);
        assert!(!update.is_empty());
        update.apply_to(&mut student);
        assert!(student.current_workout_progress.is_none());
        assert_eq!(student.available_days.len(), 1);
        assert!(StudentUpdate::default().is_empty());
    }
}
