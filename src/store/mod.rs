pub mod file;
pub mod memory;

use async_trait::async_trait;
use crate::catalog::{ExerciseCatalog, ExerciseDetails};
use crate::error::CoachError;
use crate::student::{Student, StudentUpdate};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Hosted record store holding students and the exercise catalog.
/// Implementations are request/response only; callers own retry policy.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, CoachError>;

    async fn update_student(&self, student_id: &str, update: StudentUpdate) -> Result<(), CoachError>;

    async fn fetch_exercise_catalog(&self) -> Result<ExerciseCatalog, CoachError>;

    async fn insert_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError>;

    async fn update_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError>;
}
