pub mod ai;
pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod session;
pub mod state;
pub mod store;
pub mod student;
pub mod workout;

#[cfg(test)]
#[path = "../tests"]
mod tests {
    // Re-export test modules
    #[path = "sequencer_test.rs"]
    mod sequencer_test;
    #[path = "rest_timer_test.rs"]
    mod rest_timer_test;
    #[path = "progress_sync_test.rs"]
    mod progress_sync_test;
    #[path = "ai_rotation_test.rs"]
    mod ai_rotation_test;
    #[path = "history_test.rs"]
    mod history_test;
    #[path = "sanitize_test.rs"]
    mod sanitize_test;
    #[path = "app_state_test.rs"]
    mod app_state_test;
    #[path = "config_test.rs"]
    mod config_test;
    #[path = "error_handling_test.rs"]
    mod error_handling_test;
    #[path = "json_extraction_test.rs"]
    mod json_extraction_test;
}

/// Process-wide startup: logging first, then configuration.
/// Returns the state container the caller passes around explicitly.
pub fn init() -> state::AppState {
    logging::init_logging();
    tracing::info!("fitcoach starting");

    let config = config::get_config();
    tracing::info!(
        model = %config.ai.model,
        api_keys = config.ai.api_keys.len(),
        data_dir = ?config.store.data_dir,
        "Configuration ready"
    );

    state::AppState::new()
}
