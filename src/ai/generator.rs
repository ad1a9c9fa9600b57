use std::collections::BTreeMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::ai::client::{GeminiBackend, GenerationRequest, GenerativeBackend};
use crate::ai::json::extract_json;
use crate::ai::keys::ApiKeyManager;
use crate::ai::sanitize::sanitize_workout_plan;
use crate::catalog::{exercise_id_for_name, ExerciseDetails};
use crate::config::AiConfig;
use crate::error::{AiError, CoachError};
use crate::history::{PostWorkoutAnalysis, ProactiveInsight};
use crate::metrics::Metrics;
use crate::store::PlanStore;
use crate::student::Student;
use crate::workout::model::Workout;

/// What a generation call is for; used in logs and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTask {
    WorkoutPlan,
    PlanAnalysis,
    SplitSuggestion,
    ExerciseModification,
    ExerciseGeneration,
    Periodization,
    WeeklySummary,
    MealSuggestion,
    ProgressionInsights,
    PostWorkoutAnalysis,
    AnamnesisAnalysis,
}

impl GenerationTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationTask::WorkoutPlan => "workout_plan",
            GenerationTask::PlanAnalysis => "plan_analysis",
            GenerationTask::SplitSuggestion => "split_suggestion",
            GenerationTask::ExerciseModification => "exercise_modification",
            GenerationTask::ExerciseGeneration => "exercise_generation",
            GenerationTask::Periodization => "periodization",
            GenerationTask::WeeklySummary => "weekly_summary",
            GenerationTask::MealSuggestion => "meal_suggestion",
            GenerationTask::ProgressionInsights => "progression_insights",
            GenerationTask::PostWorkoutAnalysis => "post_workout_analysis",
            GenerationTask::AnamnesisAnalysis => "anamnesis_analysis",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitDay {
    day_of_week: String,
    #[serde(default)]
    muscle_groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Replacement {
    #[serde(default)]
    exercise_id: Option<String>,
}

/// Generative-AI collaborator with API key rotation.
///
/// A quota failure rotates to the next key and retries once; every other
/// failure, or a second quota failure, is returned as a `CoachError` with
/// stage "ai".
pub struct AiGenerator<B: GenerativeBackend> {
    backend: B,
    keys: Mutex<ApiKeyManager>,
    metrics: Metrics,
}

impl AiGenerator<GeminiBackend> {
    /// Gemini backend with keys from `config` and `GEMINI_API_KEY`
    pub fn from_config(config: &AiConfig, metrics: Metrics) -> Self {
        AiGenerator::new(GeminiBackend::new(config), ApiKeyManager::from_config(config), metrics)
    }
}

impl<B: GenerativeBackend> AiGenerator<B> {
    pub fn new(backend: B, keys: ApiKeyManager, metrics: Metrics) -> Self {
        AiGenerator {
            backend,
            keys: Mutex::new(keys),
            metrics,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current_key(&self) -> Option<String> {
        self.keys.lock().current().map(str::to_string)
    }

    fn fail(&self, task: GenerationTask, err: AiError, retried: bool) -> CoachError {
        self.metrics.record_ai_failure();
        tracing::warn!(task = task.as_str(), retried = retried, error = %err, "AI generation failed");
        CoachError::from(err).with_context(format!("task: {}", task.as_str()))
    }

    async fn call(&self, task: GenerationTask, request: GenerationRequest) -> Result<String, CoachError> {
        let mut retried = false;
        loop {
            let key = self.keys.lock().current().map(str::to_string);
            let Some(key) = key else {
                return Err(self.fail(task, AiError::MissingKey, retried));
            };

            match self.backend.generate(&key, &request).await {
                Ok(text) => {
                    if retried {
                        tracing::info!(task = task.as_str(), "AI generation succeeded after key rotation");
                    }
                    return Ok(text);
                }
                Err(e) if e.is_quota() && !retried => {
                    if self.keys.lock().rotate().is_none() {
                        return Err(self.fail(task, e, retried));
                    }
                    retried = true;
                    self.metrics.record_key_rotation();
                    tracing::info!(task = task.as_str(), "AI quota reached, retrying with next API key");
                }
                Err(e) => return Err(self.fail(task, e, retried)),
            }
        }
    }

    /// JSON-mode generation decoded into `T`
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        task: GenerationTask,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<T, CoachError> {
        let text = self.call(task, GenerationRequest::json(prompt, schema)).await?;
        let json = extract_json(&text)
            .map_err(|e| self.fail(task, AiError::Decode(e.to_string()), false))?;
        serde_json::from_str(&json)
            .map_err(|e| self.fail(task, AiError::Decode(e.to_string()), false))
    }

    /// Free-text generation
    pub async fn generate_text(&self, task: GenerationTask, prompt: &str) -> Result<String, CoachError> {
        let text = self.call(task, GenerationRequest::text(prompt)).await?;
        Ok(text.trim().to_string())
    }

    /// A weekly plan, with unusable workouts dropped and defaults filled in
    pub async fn generate_workout_plan(&self, prompt: &str, schema: serde_json::Value) -> Result<Vec<Workout>, CoachError> {
        let raw: serde_json::Value = self.generate_json(GenerationTask::WorkoutPlan, prompt, schema).await?;
        Ok(sanitize_workout_plan(&raw))
    }

    /// Day label -> muscle groups, limited to the days the student trains
    pub async fn suggest_workout_split(
        &self,
        student: &Student,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<BTreeMap<String, Vec<String>>, CoachError> {
        let days: Vec<SplitDay> = self.generate_json(GenerationTask::SplitSuggestion, prompt, schema).await?;
        Ok(days
            .into_iter()
            .filter(|d| student.available_days.contains(&d.day_of_week))
            .map(|d| (d.day_of_week, d.muscle_groups))
            .collect())
    }

    /// Catalog id of a replacement exercise, None when the model gave none
    pub async fn suggest_exercise_modification(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<Option<String>, CoachError> {
        let replacement: Replacement = self
            .generate_json(GenerationTask::ExerciseModification, prompt, schema)
            .await?;
        Ok(replacement.exercise_id.filter(|id| !id.trim().is_empty()))
    }

    /// Catalog entry for `name`: the stored one when its id already exists,
    /// otherwise a generated one that is inserted into the catalog.
    pub async fn generate_exercise_details<S>(
        &self,
        store: &S,
        name: &str,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<(String, ExerciseDetails), CoachError>
    where
        S: PlanStore + ?Sized,
    {
        let id = exercise_id_for_name(name);
        let catalog = store.fetch_exercise_catalog().await?;
        if let Some(existing) = catalog.get(&id) {
            tracing::info!(exercise_id = %id, "Exercise already in catalog, reusing it");
            return Ok((id, existing.clone()));
        }

        let mut details: ExerciseDetails = self
            .generate_json(GenerationTask::ExerciseGeneration, prompt, schema)
            .await?;
        if details.name.trim().is_empty() {
            details.name = name.to_string();
        }
        store.insert_exercise(&id, details.clone()).await?;
        tracing::info!(exercise_id = %id, "Generated exercise added to catalog");
        Ok((id, details))
    }

    /// Feedback awaiting trainer approval; None when the text is unusable
    pub async fn generate_post_workout_analysis(&self, prompt: &str) -> Result<Option<PostWorkoutAnalysis>, CoachError> {
        let text = self.generate_text(GenerationTask::PostWorkoutAnalysis, prompt).await?;
        Ok(PostWorkoutAnalysis::pending(&text))
    }

    pub async fn generate_progression_insights(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<Vec<ProactiveInsight>, CoachError> {
        self.generate_json(GenerationTask::ProgressionInsights, prompt, schema).await
    }
}
