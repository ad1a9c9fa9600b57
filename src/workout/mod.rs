pub mod model;
pub mod progress;
pub mod sequencer;
pub mod timer;

pub use model::{BlockType, DurationType, Exercise, RoutineItem, Workout, WorkoutBlock, WorkoutDay, WorkoutPlan};
pub use progress::{Cursor, CurrentWorkoutProgress, WorkoutLog, WorkoutProgressState};
pub use sequencer::{Sequencer, SequencerState, Transition};
pub use timer::{RestOutcome, RestTimer};
