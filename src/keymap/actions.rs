//! Semantic actions triggered by key bindings.

use serde::{Deserialize, Serialize};

/// Everything a key press can mean in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToEnd,
    /// Jump to start of input
    Home,
    /// Jump to end of input
    End,

    // Selection
    Confirm,
    Cancel,
    Yes,
    No,

    // Global
    Quit,
    Help,
    /// Next tab, or next field inside a form
    NextTab,
    PrevTab,
    /// Open/close the collapsed tab menu on narrow terminals
    ToggleMenu,
    Refresh,

    // Appointments
    NewBooking,
    CancelAppointment,
    Reschedule,

    // Account
    SignOut,
    /// Switch the auth form between sign-in and sign-up
    SwitchForm,

    // Text editing
    Backspace,
    DeleteChar,
}

impl Action {
    /// Human-readable description for the help overlay
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move up",
            Action::MoveDown => "Move down",
            Action::MoveLeft => "Move left",
            Action::MoveRight => "Move right",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::GoToTop => "Go to top",
            Action::GoToEnd => "Go to end",
            Action::Home => "Start of input",
            Action::End => "End of input",
            Action::Confirm => "Select / continue",
            Action::Cancel => "Back",
            Action::Yes => "Yes",
            Action::No => "No",
            Action::Quit => "Quit",
            Action::Help => "Show help",
            Action::NextTab => "Next tab / field",
            Action::PrevTab => "Previous tab / field",
            Action::ToggleMenu => "Toggle menu",
            Action::Refresh => "Refresh",
            Action::NewBooking => "Book an appointment",
            Action::CancelAppointment => "Cancel appointment",
            Action::Reschedule => "Reschedule appointment",
            Action::SignOut => "Sign out",
            Action::SwitchForm => "Switch sign-in / sign-up",
            Action::Backspace => "Backspace",
            Action::DeleteChar => "Delete character",
        }
    }

    /// Group heading in the help overlay
    pub fn category(&self) -> &'static str {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::PageUp
            | Action::PageDown
            | Action::GoToTop
            | Action::GoToEnd
            | Action::Home
            | Action::End => "Navigation",

            Action::Confirm | Action::Cancel | Action::Yes | Action::No => "Selection",

            Action::Quit
            | Action::Help
            | Action::NextTab
            | Action::PrevTab
            | Action::ToggleMenu
            | Action::Refresh => "Global",

            Action::NewBooking | Action::CancelAppointment | Action::Reschedule => "Appointments",

            Action::SignOut | Action::SwitchForm => "Account",

            Action::Backspace | Action::DeleteChar => "Text Editing",
        }
    }
}
