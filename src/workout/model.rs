use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

/// Rest used whenever a rest string is missing or unparseable
pub const DEFAULT_REST_SECS: u32 = 60;

/// Weekday label a workout is scheduled on.
/// Serialized with the labels trainers type into plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutDay {
    #[serde(rename = "Segunda-feira")]
    Monday,
    #[serde(rename = "Terça-feira")]
    Tuesday,
    #[serde(rename = "Quarta-feira")]
    Wednesday,
    #[serde(rename = "Quinta-feira")]
    Thursday,
    #[serde(rename = "Sexta-feira")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl WorkoutDay {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutDay::Monday => "Segunda-feira",
            WorkoutDay::Tuesday => "Terça-feira",
            WorkoutDay::Wednesday => "Quarta-feira",
            WorkoutDay::Thursday => "Quinta-feira",
            WorkoutDay::Friday => "Sexta-feira",
            WorkoutDay::Saturday => "Sábado",
            WorkoutDay::Sunday => "Domingo",
        }
    }

    /// Case-insensitive match against a label
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        [
            WorkoutDay::Monday,
            WorkoutDay::Tuesday,
            WorkoutDay::Wednesday,
            WorkoutDay::Thursday,
            WorkoutDay::Friday,
            WorkoutDay::Saturday,
            WorkoutDay::Sunday,
        ]
        .into_iter()
        .find(|d| d.label().to_lowercase() == wanted)
    }
}

impl From<Weekday> for WorkoutDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => WorkoutDay::Monday,
            Weekday::Tue => WorkoutDay::Tuesday,
            Weekday::Wed => WorkoutDay::Wednesday,
            Weekday::Thu => WorkoutDay::Thursday,
            Weekday::Fri => WorkoutDay::Friday,
            Weekday::Sat => WorkoutDay::Saturday,
            Weekday::Sun => WorkoutDay::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Single,
    Biset,
    Superset,
    Triset,
}

impl BlockType {
    /// Multi-exercise blocks run one set of every exercise per round
    pub fn is_round_robin(&self) -> bool {
        !matches!(self, BlockType::Single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    #[default]
    Reps,
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineItem {
    pub exercise_id: String,
    pub duration: String,
}

/// One exercise as prescribed inside a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    /// Catalog reference
    pub exercise_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sets: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(default)]
    pub duration_type: DurationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
}

impl Exercise {
    pub fn total_sets(&self) -> usize {
        parse_sets(&self.sets)
    }

    pub fn rest_secs(&self) -> u32 {
        parse_rest_secs(self.rest.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutBlock {
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_after_block: Option<String>,
}

impl WorkoutBlock {
    pub fn rest_after_block_secs(&self) -> u32 {
        parse_rest_secs(self.rest_after_block.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub day: WorkoutDay,
    pub label: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<WorkoutBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<Vec<RoutineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<Vec<RoutineItem>>,
}

impl Workout {
    pub fn has_warmup(&self) -> bool {
        self.warmup.as_ref().is_some_and(|w| !w.is_empty())
    }

    pub fn has_cooldown(&self) -> bool {
        self.cooldown.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// A student's weekly plan, one workout per scheduled weekday
pub type WorkoutPlan = Vec<Workout>;

/// Workout scheduled on the weekday of `date`, if any
pub fn workout_for_date(plan: &[Workout], date: NaiveDate) -> Option<&Workout> {
    let day = WorkoutDay::from(date.weekday());
    plan.iter().find(|w| w.day == day)
}

/// Leading decimal digits of `raw`, ignoring leading whitespace.
/// "45s" -> 45, "4 sets" -> 4, "abc" -> None.
fn leading_digits(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Set count bound for the set loop; non-numeric means no sets
pub fn parse_sets(raw: &str) -> usize {
    leading_digits(raw).unwrap_or(0) as usize
}

/// Rest seconds from strings like "45s"; anything unparseable is 60
pub fn parse_rest_secs(raw: Option<&str>) -> u32 {
    raw.and_then(leading_digits).unwrap_or(DEFAULT_REST_SECS)
}

/// Accepts a JSON string or number, anything else becomes empty
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
