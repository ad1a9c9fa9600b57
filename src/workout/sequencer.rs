//! Workout execution state machine.
//!
//! A `Sequencer` walks a student through the blocks of a [`Workout`] one set
//! at a time. Every transition is synchronous; the caller persists
//! [`Sequencer::progress`] after each one and may rebuild an identical
//! sequencer later with [`Sequencer::resume`].
//!
//! Malformed plan data never panics: a cursor that addresses a missing block
//! or exercise moves the machine to [`SequencerState::Exited`] and keeps the
//! logs gathered so far.

use crate::logging::log_transition;
use crate::workout::model::{Exercise, Workout, WorkoutBlock};
use crate::workout::progress::{Cursor, WorkoutLog, WorkoutProgressState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Waiting for the set at the cursor to be logged or skipped
    Active(Cursor),
    /// Rest countdown running; `next` becomes active when it ends
    Resting { duration_secs: u32, next: Cursor },
    /// Last set done; waiting for the caller to confirm and call `finish`
    Finished { last: Cursor },
    /// Plan data could not be followed; the session should close
    Exited { at: Cursor },
}

/// Result of a log or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved straight to the next step (next exercise of a round, or a skip)
    Advanced(Cursor),
    /// Rest before `next`
    Rest { duration_secs: u32, next: Cursor },
    Finished,
    Exited,
}

/// Order in which a block's (exercise, set) steps are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStrategy {
    /// All sets of one exercise, then the next exercise
    Sequential,
    /// One set of every exercise per round; rest only between rounds
    RoundRobin,
}

impl BlockStrategy {
    pub fn for_block(block: &WorkoutBlock) -> Self {
        if block.block_type.is_round_robin() {
            BlockStrategy::RoundRobin
        } else {
            BlockStrategy::Sequential
        }
    }

    /// First performable step strictly after `after` (or the first one at all)
    pub fn next_step(&self, block: &WorkoutBlock, after: Option<(usize, usize)>) -> Option<(usize, usize)> {
        let exercises = &block.exercises;
        match self {
            BlockStrategy::Sequential => {
                let (mut ex, mut set) = match after {
                    Some((ex, set)) => match set.checked_add(1) {
                        Some(set) => (ex, set),
                        // no set of `ex` can follow
                        None => (ex + 1, 0),
                    },
                    None => (0, 0),
                };
                while ex < exercises.len() {
                    if set < exercises[ex].total_sets() {
                        return Some((ex, set));
                    }
                    ex += 1;
                    set = 0;
                }
                None
            }
            BlockStrategy::RoundRobin => {
                let rounds = exercises.iter().map(Exercise::total_sets).max().unwrap_or(0);
                let (mut set, mut ex) = match after {
                    Some((ex, set)) => (set, ex + 1),
                    None => (0, 0),
                };
                while set < rounds {
                    while ex < exercises.len() {
                        if set < exercises[ex].total_sets() {
                            return Some((ex, set));
                        }
                        ex += 1;
                    }
                    set += 1;
                    ex = 0;
                }
                None
            }
        }
    }

    /// Rest between two steps of the same block, `None` for no pause
    pub fn rest_between(&self, block: &WorkoutBlock, from: Cursor, to: Cursor) -> Option<u32> {
        if *self == BlockStrategy::RoundRobin && from.set == to.set {
            return None;
        }
        block.exercises.get(from.exercise).map(Exercise::rest_secs)
    }
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    workout: Workout,
    state: SequencerState,
    logs: Vec<WorkoutLog>,
}

impl Sequencer {
    /// Start a workout from the first performable set
    pub fn start(workout: Workout) -> Self {
        Self::resume(workout, WorkoutProgressState::fresh())
    }

    /// Rebuild a sequencer from persisted progress
    pub fn resume(workout: Workout, progress: WorkoutProgressState) -> Self {
        let cursor = progress.cursor();
        let mut sequencer = Sequencer {
            workout,
            state: SequencerState::Active(cursor),
            logs: progress.logs,
        };
        sequencer.state = sequencer.settle(cursor);
        sequencer
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn logs(&self) -> &[WorkoutLog] {
        &self.logs
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SequencerState::Finished { .. })
    }

    pub fn is_exited(&self) -> bool {
        matches!(self.state, SequencerState::Exited { .. })
    }

    /// Cursor the student is working on (or will work on after resting)
    pub fn cursor(&self) -> Cursor {
        match self.state {
            SequencerState::Active(c) => c,
            SequencerState::Resting { next, .. } => next,
            SequencerState::Finished { last } => last,
            SequencerState::Exited { at } => at,
        }
    }

    pub fn active_block(&self) -> Option<&WorkoutBlock> {
        self.workout.blocks.get(self.cursor().block)
    }

    pub fn active_exercise(&self) -> Option<&Exercise> {
        let cursor = self.cursor();
        self.active_block()
            .and_then(|block| block.exercises.get(cursor.exercise))
    }

    /// Set count of the active exercise, 0 when none
    pub fn total_sets(&self) -> usize {
        self.active_exercise().map(Exercise::total_sets).unwrap_or(0)
    }

    /// Record the active set and advance
    pub fn log_set(&mut self, weight: Option<String>, reps: Option<String>) -> Transition {
        let current = match self.take_active() {
            Ok(cursor) => cursor,
            Err(terminal) => return terminal,
        };
        let (block_id, exercise_id) = match self.lookup(current) {
            Some((block, exercise)) => (block.id.clone(), exercise.exercise_id.clone()),
            None => return self.exit(current),
        };

        self.logs.push(WorkoutLog {
            block_id,
            exercise_id,
            set_index: current.set,
            weight,
            reps,
        });

        self.step_from(current, true)
    }

    /// Advance exactly like a logged set but without a log entry or rest
    pub fn skip_exercise(&mut self) -> Transition {
        let current = match self.take_active() {
            Ok(cursor) => cursor,
            Err(terminal) => return terminal,
        };
        if self.lookup(current).is_none() {
            return self.exit(current);
        }
        self.step_from(current, false)
    }

    /// Rest elapsed or skipped; returns the cursor that is now active
    pub fn finish_rest(&mut self) -> Option<Cursor> {
        match self.state {
            SequencerState::Resting { next, .. } => {
                self.state = SequencerState::Active(next);
                log_transition("rest_done", next.block, next.exercise, next.set);
                Some(next)
            }
            SequencerState::Active(cursor) => Some(cursor),
            _ => None,
        }
    }

    /// Snapshot for persistence; a rest in progress is stored as already over
    pub fn progress(&self) -> WorkoutProgressState {
        let mut progress = WorkoutProgressState {
            logs: self.logs.clone(),
            ..WorkoutProgressState::default()
        };
        progress.set_cursor(self.cursor());
        progress
    }

    /// Hand the current progress back to the caller; nothing is discarded
    pub fn close_session(&self) -> WorkoutProgressState {
        self.progress()
    }

    /// Caller-confirmed end of the workout
    pub fn finish(self) -> Vec<WorkoutLog> {
        if !self.is_finished() {
            tracing::debug!(
                workout_id = %self.workout.id,
                logs = self.logs.len(),
                "Finishing workout before its last set"
            );
        }
        self.logs
    }

    /// Ends a pending rest implicitly; terminal states are returned as Err
    fn take_active(&mut self) -> Result<Cursor, Transition> {
        match self.state {
            SequencerState::Active(cursor) => Ok(cursor),
            SequencerState::Resting { next, .. } => {
                self.state = SequencerState::Active(next);
                Ok(next)
            }
            SequencerState::Finished { .. } => Err(Transition::Finished),
            SequencerState::Exited { .. } => Err(Transition::Exited),
        }
    }

    fn lookup(&self, cursor: Cursor) -> Option<(&WorkoutBlock, &Exercise)> {
        let block = self.workout.blocks.get(cursor.block)?;
        let exercise = block.exercises.get(cursor.exercise)?;
        Some((block, exercise))
    }

    fn exit(&mut self, at: Cursor) -> Transition {
        tracing::warn!(
            workout_id = %self.workout.id,
            block = at.block,
            exercise = at.exercise,
            logs = self.logs.len(),
            "Active block or exercise undefined, exiting session"
        );
        self.state = SequencerState::Exited { at };
        Transition::Exited
    }

    fn step_from(&mut self, current: Cursor, with_rest: bool) -> Transition {
        let Some(block) = self.workout.blocks.get(current.block) else {
            return self.exit(current);
        };
        let strategy = BlockStrategy::for_block(block);

        let (next, rest) = match strategy.next_step(block, Some((current.exercise, current.set))) {
            Some((exercise, set)) => {
                let next = Cursor::new(current.block, exercise, set);
                (next, strategy.rest_between(block, current, next))
            }
            None => match self.first_step_from_block(current.block + 1) {
                Some(next) => (next, Some(block.rest_after_block_secs())),
                None => {
                    self.state = SequencerState::Finished { last: current };
                    log_transition("finished", current.block, current.exercise, current.set);
                    return Transition::Finished;
                }
            },
        };

        match rest {
            Some(duration_secs) if with_rest => {
                self.state = SequencerState::Resting { duration_secs, next };
                log_transition("rest", next.block, next.exercise, next.set);
                Transition::Rest { duration_secs, next }
            }
            _ => {
                self.state = SequencerState::Active(next);
                log_transition("advance", next.block, next.exercise, next.set);
                Transition::Advanced(next)
            }
        }
    }

    /// First performable step in block `from` or any later block; blocks
    /// without performable sets are passed over
    fn first_step_from_block(&self, from: usize) -> Option<Cursor> {
        self.workout
            .blocks
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(index, block)| {
                BlockStrategy::for_block(block)
                    .next_step(block, None)
                    .map(|(exercise, set)| Cursor::new(index, exercise, set))
            })
    }

    /// State for a freshly loaded cursor: exit when it addresses nothing,
    /// slide forward past sets that cannot be performed
    fn settle(&self, cursor: Cursor) -> SequencerState {
        let Some((block, exercise)) = self.lookup(cursor) else {
            tracing::warn!(
                workout_id = %self.workout.id,
                block = cursor.block,
                exercise = cursor.exercise,
                "Progress cursor outside workout"
            );
            return SequencerState::Exited { at: cursor };
        };
        if cursor.set < exercise.total_sets() {
            return SequencerState::Active(cursor);
        }

        let strategy = BlockStrategy::for_block(block);
        let in_block = strategy
            .next_step(block, Some((cursor.exercise, cursor.set)))
            .map(|(exercise, set)| Cursor::new(cursor.block, exercise, set));
        match in_block.or_else(|| self.first_step_from_block(cursor.block + 1)) {
            Some(next) => SequencerState::Active(next),
            None => SequencerState::Finished { last: cursor },
        }
    }
}
