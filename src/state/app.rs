use std::sync::Arc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Auth,
    Personal,
    Student,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    StudentManagement,
    AddStudent,
    WorkoutExecution,
    EditAnamnesis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalViewMode {
    #[default]
    List,
    Radar,
}

/// Which screen and overlay the user is on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub screen: Screen,
    #[serde(default)]
    pub modal: Option<Modal>,
    #[serde(default)]
    pub selected_student_id: Option<String>,
    #[serde(default)]
    pub personal_view_mode: PersonalViewMode,
}

/// Role the signed-in account has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Personal,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    SignedIn(Role),
    SignedOut,
    /// Switch between the admin panel and the trainer view
    ToggleAdmin,
    OpenModal(Modal),
    /// Open the management modal for one student
    ManageStudent(String),
    CloseModal,
    TogglePersonalViewMode,
    Restore(ViewState),
}

/// Pure transition function for the view
pub fn reduce(state: &ViewState, action: AppAction) -> ViewState {
    match action {
        AppAction::SignedIn(role) => ViewState {
            screen: match role {
                Role::Admin => Screen::Admin,
                Role::Personal => Screen::Personal,
                Role::Student => Screen::Student,
            },
            ..ViewState::default()
        },
        AppAction::SignedOut => ViewState::default(),
        AppAction::ToggleAdmin => {
            let screen = match state.screen {
                Screen::Admin => Screen::Personal,
                Screen::Personal => Screen::Admin,
                other => other,
            };
            ViewState { screen, ..state.clone() }
        }
        AppAction::OpenModal(modal) => ViewState {
            modal: Some(modal),
            ..state.clone()
        },
        AppAction::ManageStudent(student_id) => ViewState {
            modal: Some(Modal::StudentManagement),
            selected_student_id: Some(student_id),
            ..state.clone()
        },
        AppAction::CloseModal => ViewState {
            modal: None,
            selected_student_id: None,
            ..state.clone()
        },
        AppAction::TogglePersonalViewMode => ViewState {
            personal_view_mode: match state.personal_view_mode {
                PersonalViewMode::List => PersonalViewMode::Radar,
                PersonalViewMode::Radar => PersonalViewMode::List,
            },
            ..state.clone()
        },
        AppAction::Restore(saved) => saved,
    }
}

/// View remembered across reloads, keyed by the account it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub user_id: String,
    #[serde(flatten)]
    pub view: ViewState,
}

impl SavedView {
    /// The saved view, if it belongs to `user_id` and is past sign-in
    pub fn restore_for(&self, user_id: &str) -> Option<ViewState> {
        if self.user_id != user_id || self.view.screen == Screen::Auth {
            return None;
        }
        Some(self.view.clone())
    }
}

/// Application-wide state container.
/// All mutable state is centralized here and passed explicitly to functions.
#[derive(Clone, Default)]
pub struct AppState {
    view: Arc<RwLock<ViewState>>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view snapshot
    pub fn view(&self) -> ViewState {
        self.view.read().clone()
    }

    /// Apply an action and return the resulting view
    pub fn dispatch(&self, action: AppAction) -> ViewState {
        let mut guard = self.view.write();
        let next = reduce(&guard, action);
        if *guard != next {
            tracing::debug!(
                screen = ?next.screen,
                modal = ?next.modal,
                selected_student_id = ?next.selected_student_id,
                "View changed"
            );
        }
        *guard = next.clone();
        next
    }

    pub fn save_for(&self, user_id: &str) -> SavedView {
        SavedView {
            user_id: user_id.to_string(),
            view: self.view(),
        }
    }
}
