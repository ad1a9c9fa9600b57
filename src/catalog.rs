use std::collections::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Equipment {
    #[serde(rename = "maquina")]
    Machine,
    #[serde(rename = "barra")]
    Barbell,
    #[serde(rename = "halteres")]
    Dumbbells,
    #[serde(rename = "peso corporal")]
    Bodyweight,
    #[serde(rename = "kettlebell")]
    Kettlebell,
    #[serde(rename = "elastico")]
    Band,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "iniciante")]
    Beginner,
    #[serde(rename = "intermediario")]
    Intermediate,
    #[serde(rename = "avancado")]
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MuscleGroups {
    pub primary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<String>>,
}

/// Display metadata for one catalog exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif_url: Option<String>,
    #[serde(default)]
    pub tutorial: String,
    pub equipment: Equipment,
    #[serde(default)]
    pub muscle_groups: MuscleGroups,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub contraindications: Vec<String>,
}

/// id -> details lookup table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseCatalog {
    entries: HashMap<String, ExerciseDetails>,
}

impl ExerciseCatalog {
    pub fn new(entries: HashMap<String, ExerciseDetails>) -> Self {
        ExerciseCatalog { entries }
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseDetails> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn insert(&mut self, id: String, details: ExerciseDetails) {
        self.entries.insert(id, details);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name, falling back to the raw id for unknown exercises
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or(id)
    }

    /// Entries whose primary muscle groups include `group`, sorted by name
    pub fn by_primary_muscle(&self, group: &str) -> Vec<(&str, &ExerciseDetails)> {
        let wanted = group.to_lowercase();
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, d)| d.muscle_groups.primary.iter().any(|g| g.to_lowercase() == wanted))
            .map(|(id, d)| (id.as_str(), d))
            .collect();
        found.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        found
    }
}

/// Catalog id for a free-form exercise name: "Supino Reto com Halteres" -> "supino-reto-halteres".
/// Connectors are dropped, spaces become dashes, anything outside [a-z0-9_-] is removed.
pub fn exercise_id_for_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace(" com ", " ");
    let dashed: String = lowered
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let mut id = String::with_capacity(dashed.len());
    for c in dashed.chars() {
        if c == '-' && id.ends_with('-') {
            continue;
        }
        id.push(c);
    }
    id.trim_matches('-').to_string()
}
