use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::catalog::{ExerciseCatalog, ExerciseDetails};
use crate::error::CoachError;
use crate::store::PlanStore;
use crate::student::{Student, StudentUpdate};

/// JSON-file store: one file per student plus one catalog file.
///
/// Layout under `root`:
/// - `students/<id>.json`
/// - `exercises.json`
pub struct FileStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FileStore {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store rooted at the configured data directory
    pub fn from_config() -> Self {
        Self::new(crate::config::get_config().store.data_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids name a file directly under `students/`
    fn student_path(&self, student_id: &str) -> Result<PathBuf, CoachError> {
        let unsafe_id = student_id.is_empty()
            || student_id.contains(['/', '\\'])
            || student_id.contains("..");
        if unsafe_id {
            return Err(CoachError::new(
                format!("Invalid student id '{}'", student_id),
                "store"
            ));
        }
        Ok(self.root.join("students").join(format!("{}.json", student_id)))
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join("exercises.json")
    }

    /// Create or overwrite a student record
    pub async fn save_student(&self, student: &Student) -> Result<(), CoachError> {
        let _guard = self.write_lock.lock().await;
        self.write_student(student).await
    }

    async fn write_student(&self, student: &Student) -> Result<(), CoachError> {
        let json = serde_json::to_string_pretty(student)
            .map_err(|e| CoachError::new(
                format!("Failed to serialize student: {}", e),
                "json_serialize"
            ))?;
        write_atomic(&self.student_path(&student.id)?, json).await
    }

    async fn read_catalog(&self) -> Result<ExerciseCatalog, CoachError> {
        let path = self.catalog_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| CoachError::new(
                    format!("Failed to parse exercises.json: {}", e),
                    "json_parse"
                ).with_context(format!("path: {:?}", path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ExerciseCatalog::default()),
            Err(e) => Err(CoachError::new(
                format!("Failed to read exercises.json: {}", e),
                "io"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    async fn write_catalog(&self, catalog: &ExerciseCatalog) -> Result<(), CoachError> {
        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| CoachError::new(
                format!("Failed to serialize catalog: {}", e),
                "json_serialize"
            ))?;
        write_atomic(&self.catalog_path(), json).await
    }
}

/// Write through a temp file and rename so readers never see half a record
async fn write_atomic(path: &Path, json: String) -> Result<(), CoachError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoachError::new(
                format!("Failed to create directory: {}", e),
                "io"
            ).with_context(format!("path: {:?}", parent)))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| CoachError::new(
            format!("Failed to write file: {}", e),
            "io"
        ).with_context(format!("path: {:?}", tmp)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| CoachError::new(
            format!("Failed to replace file: {}", e),
            "io"
        ).with_context(format!("path: {:?}", path)))?;
    Ok(())
}

#[async_trait]
impl PlanStore for FileStore {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, CoachError> {
        let path = self.student_path(student_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| CoachError::new(
                    format!("Failed to parse student record: {}", e),
                    "json_parse"
                ).with_context(format!("path: {:?}", path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoachError::not_found(format!("student {}", student_id)))
            }
            Err(e) => Err(CoachError::new(
                format!("Failed to read student record: {}", e),
                "io"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    async fn update_student(&self, student_id: &str, update: StudentUpdate) -> Result<(), CoachError> {
        let _guard = self.write_lock.lock().await;
        let mut student = self.fetch_student(student_id).await?;
        update.apply_to(&mut student);
        self.write_student(&student).await?;
        tracing::debug!(student_id = student_id, "Student record updated");
        Ok(())
    }

    async fn fetch_exercise_catalog(&self) -> Result<ExerciseCatalog, CoachError> {
        self.read_catalog().await
    }

    async fn insert_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.read_catalog().await?;
        if catalog.contains(exercise_id) {
            return Err(CoachError::new(
                format!("Exercise '{}' already exists", exercise_id),
                "store"
            ));
        }
        catalog.insert(exercise_id.to_string(), details);
        self.write_catalog(&catalog).await
    }

    async fn update_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.read_catalog().await?;
        if !catalog.contains(exercise_id) {
            return Err(CoachError::not_found(format!("exercise {}", exercise_id)));
        }
        catalog.insert(exercise_id.to_string(), details);
        self.write_catalog(&catalog).await
    }
}
