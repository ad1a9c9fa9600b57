/// Initialize structured logging with tracing
/// This should be called once at application startup
pub fn init_logging() {
    if let Err(e) = try_init_logging() {
        eprintln!("[Logging] {}", e);
    }
}

/// Same as `init_logging` but reports a second initialization instead of panicking.
pub fn try_init_logging() -> Result<(), crate::error::CoachError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json()
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| crate::error::CoachError::new(
            format!("Failed to set global tracing subscriber: {}", e),
            "startup"
        ))?;

    tracing::info!("Structured logging initialized");
    Ok(())
}

/// Log a sequencer transition with the cursor it lands on
pub fn log_transition(kind: &str, block: usize, exercise: usize, set: usize) {
    tracing::debug!(
        transition = kind,
        block = block,
        exercise = exercise,
        set = set,
        "Sequencer transition"
    );
}

/// Log the outcome of a progress write
pub fn log_progress_write(student_id: &str, written: bool) {
    if written {
        tracing::debug!(student_id = student_id, "Progress persisted");
    } else {
        tracing::trace!(student_id = student_id, "Progress unchanged, write suppressed");
    }
}
