use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use async_trait::async_trait;
use parking_lot::RwLock;
use crate::catalog::{ExerciseCatalog, ExerciseDetails};
use crate::error::CoachError;
use crate::store::PlanStore;
use crate::student::{Student, StudentUpdate};

/// In-process store, used by tests and local tooling.
/// `set_fail_writes(true)` makes every update fail, to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    students: RwLock<HashMap<String, Student>>,
    catalog: RwLock<ExerciseCatalog>,
    fail_writes: AtomicBool,
    student_writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(student: Student) -> Self {
        let store = Self::new();
        store.put_student(student);
        store
    }

    pub fn put_student(&self, student: Student) {
        self.students.write().insert(student.id.clone(), student);
    }

    pub fn student(&self, student_id: &str) -> Option<Student> {
        self.students.read().get(student_id).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Successful `update_student` calls so far
    pub fn student_writes(&self) -> u64 {
        self.student_writes.load(Ordering::Relaxed)
    }

    fn check_writable(&self) -> Result<(), CoachError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(CoachError::new("Store rejected the update", "store")
                .with_context("write failure injected"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn fetch_student(&self, student_id: &str) -> Result<Student, CoachError> {
        self.student(student_id)
            .ok_or_else(|| CoachError::not_found(format!("student {}", student_id)))
    }

    async fn update_student(&self, student_id: &str, update: StudentUpdate) -> Result<(), CoachError> {
        self.check_writable()?;
        let mut students = self.students.write();
        let student = students
            .get_mut(student_id)
            .ok_or_else(|| CoachError::not_found(format!("student {}", student_id)))?;
        update.apply_to(student);
        self.student_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn fetch_exercise_catalog(&self) -> Result<ExerciseCatalog, CoachError> {
        Ok(self.catalog.read().clone())
    }

    async fn insert_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError> {
        self.check_writable()?;
        let mut catalog = self.catalog.write();
        if catalog.contains(exercise_id) {
            return Err(CoachError::new(
                format!("Exercise '{}' already exists", exercise_id),
                "store"
            ));
        }
        catalog.insert(exercise_id.to_string(), details);
        Ok(())
    }

    async fn update_exercise(&self, exercise_id: &str, details: ExerciseDetails) -> Result<(), CoachError> {
        self.check_writable()?;
        let mut catalog = self.catalog.write();
        if !catalog.contains(exercise_id) {
            return Err(CoachError::not_found(format!("exercise {}", exercise_id)));
        }
        catalog.insert(exercise_id.to_string(), details);
        Ok(())
    }
}
