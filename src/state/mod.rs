pub mod app;

pub use app::{reduce, AppAction, AppState, Modal, PersonalViewMode, Role, SavedView, Screen, ViewState};
