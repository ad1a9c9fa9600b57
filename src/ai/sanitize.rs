//! Coercion of model-generated plans into well-formed workouts.
//!
//! Anything that cannot be followed is dropped rather than repaired: a
//! workout without day or label, an exercise without `exerciseId`, a block
//! left with no exercises, a workout left with no blocks.

use rand::Rng;
use serde_json::{Map, Value};
use crate::workout::model::{
    BlockType, DurationType, Exercise, RoutineItem, Workout, WorkoutBlock, WorkoutDay,
};

pub const DEFAULT_SETS: &str = "3";
pub const DEFAULT_REPS: &str = "12";
pub const DEFAULT_REST: &str = "60s";
pub const DEFAULT_REST_AFTER_BLOCK: &str = "90s";

/// String or number as text, anything else is `default`
fn ensure_string(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    Some(ensure_string(value, "")).filter(|s| !s.trim().is_empty())
}

fn ensure_array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

fn generated_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let salt: u32 = rand::thread_rng().gen();
    format!("{}-{}-{:08x}", prefix, millis, salt)
}

fn id_or_generated(value: Option<&Value>, prefix: &str) -> String {
    non_empty_string(value).unwrap_or_else(|| generated_id(prefix))
}

fn sanitize_exercise(ex: &Map<String, Value>) -> Option<Exercise> {
    let exercise_id = non_empty_string(ex.get("exerciseId"))?;
    let duration_type = match ensure_string(ex.get("durationType"), "reps").as_str() {
        "time" => DurationType::Time,
        _ => DurationType::Reps,
    };
    Some(Exercise {
        id: id_or_generated(ex.get("id"), "inst"),
        exercise_id,
        sets: ensure_string(ex.get("sets"), DEFAULT_SETS),
        reps: ensure_string(ex.get("reps"), DEFAULT_REPS),
        rest: Some(ensure_string(ex.get("rest"), DEFAULT_REST)),
        duration_type,
        observation: non_empty_string(ex.get("observation")),
        target_weight: ex.get("targetWeight").and_then(Value::as_f64),
        target_reps: ex
            .get("targetReps")
            .and_then(Value::as_u64)
            .and_then(|r| u32::try_from(r).ok()),
    })
}

fn sanitize_block(block: &Map<String, Value>) -> Option<WorkoutBlock> {
    let exercises: Vec<Exercise> = ensure_array(block.get("exercises"))
        .iter()
        .filter_map(Value::as_object)
        .filter_map(sanitize_exercise)
        .collect();
    if exercises.is_empty() {
        return None;
    }

    let block_type = serde_json::from_value::<BlockType>(Value::String(
        ensure_string(block.get("type"), "single").to_lowercase(),
    ))
    .unwrap_or_default();

    Some(WorkoutBlock {
        id: id_or_generated(block.get("id"), "block"),
        block_type,
        exercises,
        rest_after_block: Some(ensure_string(block.get("restAfterBlock"), DEFAULT_REST_AFTER_BLOCK)),
    })
}

fn sanitize_routine(value: Option<&Value>) -> Option<Vec<RoutineItem>> {
    let items: Vec<RoutineItem> = ensure_array(value)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            Some(RoutineItem {
                exercise_id: non_empty_string(item.get("exerciseId"))?,
                duration: ensure_string(item.get("duration"), ""),
            })
        })
        .collect();
    Some(items).filter(|items| !items.is_empty())
}

fn sanitize_workout(workout: &Map<String, Value>) -> Option<Workout> {
    let day_label = non_empty_string(workout.get("day"))?;
    let Some(day) = WorkoutDay::from_label(&day_label) else {
        tracing::debug!(day = %day_label, "Dropping generated workout with unknown day");
        return None;
    };
    let label = non_empty_string(workout.get("label"))?;

    let blocks: Vec<WorkoutBlock> = ensure_array(workout.get("blocks"))
        .iter()
        .filter_map(Value::as_object)
        .filter_map(sanitize_block)
        .collect();
    if blocks.is_empty() {
        return None;
    }

    Some(Workout {
        id: id_or_generated(workout.get("id"), "workout"),
        day,
        label,
        muscle_groups: ensure_array(workout.get("muscleGroups"))
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        blocks,
        warmup: sanitize_routine(workout.get("warmup")),
        cooldown: sanitize_routine(workout.get("cooldown")),
    })
}

/// Keep every usable workout of a generated plan. A non-array plan is empty.
pub fn sanitize_workout_plan(plan: &Value) -> Vec<Workout> {
    let Some(workouts) = plan.as_array() else {
        tracing::warn!("Generated workout plan is not an array");
        return Vec::new();
    };

    let sanitized: Vec<Workout> = workouts
        .iter()
        .filter_map(Value::as_object)
        .filter_map(sanitize_workout)
        .collect();

    if sanitized.len() < workouts.len() {
        tracing::info!(
            received = workouts.len(),
            kept = sanitized.len(),
            "Dropped unusable workouts from generated plan"
        );
    }
    sanitized
}
