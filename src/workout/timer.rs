use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// Countdown between sets.
/// A duration of zero or less is finished from the start and never shows a
/// countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    duration_secs: u32,
    remaining_secs: u32,
    skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining_secs: u32 },
    Finished,
}

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestOutcome {
    Elapsed,
    Skipped,
    /// Duration was zero or negative
    Immediate,
}

impl RestTimer {
    pub fn new(duration_secs: i64) -> Self {
        let duration = duration_secs.clamp(0, u32::MAX as i64) as u32;
        RestTimer {
            duration_secs: duration,
            remaining_secs: duration,
            skipped: false,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0 || self.skipped
    }

    /// Whether there is a countdown to show at all
    pub fn has_countdown(&self) -> bool {
        self.duration_secs > 0
    }

    /// Fraction of the rest already spent, 0.0..=1.0
    pub fn elapsed_fraction(&self) -> f32 {
        if self.duration_secs == 0 || self.skipped {
            return 1.0;
        }
        (self.duration_secs - self.remaining_secs) as f32 / self.duration_secs as f32
    }

    /// One-second tick
    pub fn tick(&mut self) -> TimerTick {
        if self.is_finished() {
            return TimerTick::Finished;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TimerTick::Finished
        } else {
            TimerTick::Running { remaining_secs: self.remaining_secs }
        }
    }

    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// Count down on the wall clock, one tick per second, until the timer
    /// elapses or `skip` flips to true. `on_tick` sees every remaining value.
    pub async fn run<F>(mut self, mut skip: watch::Receiver<bool>, mut on_tick: F) -> RestOutcome
    where
        F: FnMut(u32),
    {
        if !self.has_countdown() {
            return RestOutcome::Immediate;
        }
        if *skip.borrow() {
            self.skip();
            return RestOutcome::Skipped;
        }

        let period = Duration::from_secs(1);
        let start = tokio::time::Instant::now() + period;
        let mut ticks = IntervalStream::new(tokio::time::interval_at(start, period));

        loop {
            tokio::select! {
                changed = skip.changed() => {
                    // A dropped sender counts as a skip: nobody is waiting for the rest any more
                    if changed.is_err() || *skip.borrow() {
                        self.skip();
                        tracing::debug!(remaining_secs = self.remaining_secs, "Rest skipped");
                        return RestOutcome::Skipped;
                    }
                }
                Some(_) = ticks.next() => {
                    match self.tick() {
                        TimerTick::Running { remaining_secs } => on_tick(remaining_secs),
                        TimerTick::Finished => {
                            on_tick(0);
                            return RestOutcome::Elapsed;
                        }
                    }
                }
            }
        }
    }
}
