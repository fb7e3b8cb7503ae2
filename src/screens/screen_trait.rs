//! Screen trait and associated types.
//!
//! Screens own their view state. They never call the backend: anything that
//! needs the network or the session comes back to the app as a
//! [`ScreenAction`].

use crate::config::Config;
use crate::models::AppointmentDetails;
use crate::session::AuthUser;
use crate::state::{DashboardCommand, Tab, WizardCommand};
use crate::widgets::ToastVariant;
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::Frame;

/// Read-only resources for rendering.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub user: Option<&'a AuthUser>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a Config, user: Option<&'a AuthUser>) -> Self {
        Self { config, user }
    }
}

/// Read-only resources for event handling.
pub struct ScreenContext<'a> {
    pub config: &'a Config,
    /// Signed-in user, `None` on the auth screens
    pub user: Option<&'a AuthUser>,
    /// Local calendar date, used as the lower bound for upcoming appointments
    pub today: NaiveDate,
}

impl<'a> ScreenContext<'a> {
    pub fn new(config: &'a Config, user: Option<&'a AuthUser>, today: NaiveDate) -> Self {
        Self { config, user, today }
    }
}

/// What a screen asks the app to do after handling an event.
#[derive(Debug, Clone, Default)]
pub enum ScreenAction {
    /// Stay put.
    #[default]
    None,
    Quit,
    ShowHelp,
    SwitchTab(Tab),
    /// Open a fresh booking wizard.
    OpenBooking,
    /// Open the wizard pre-filled to replace an appointment.
    Reschedule(AppointmentDetails),
    /// Leave the wizard and go back to the dashboard.
    CloseBooking,
    Wizard(WizardCommand),
    Dashboard(DashboardCommand),
    LoadHistory,
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        full_name: String,
    },
    SignOut,
    Toast {
        variant: ToastVariant,
        message: String,
    },
    Batch(Vec<ScreenAction>),
}

impl ScreenAction {
    /// Collapse a list of actions, skipping `None`.
    pub fn batch(actions: impl IntoIterator<Item = ScreenAction>) -> Self {
        let mut actions: Vec<ScreenAction> = actions
            .into_iter()
            .filter(|a| !matches!(a, ScreenAction::None))
            .collect();
        match actions.len() {
            0 => ScreenAction::None,
            1 => actions.remove(0),
            _ => ScreenAction::Batch(actions),
        }
    }
}

/// Trait for screen controllers.
pub trait Screen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()>;

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction>;

    /// When true, plain character keys are text, so global shortcuts like
    /// `q` and the tab keys are left to the screen.
    fn is_input_focused(&self) -> bool {
        false
    }

    /// Key hints for the footer.
    fn footer_hints(&self, _ctx: &RenderContext) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collapses() {
        assert!(matches!(
            ScreenAction::batch([ScreenAction::None]),
            ScreenAction::None
        ));
        assert!(matches!(
            ScreenAction::batch([ScreenAction::None, ScreenAction::Quit]),
            ScreenAction::Quit
        ));
        assert!(matches!(
            ScreenAction::batch([ScreenAction::LoadHistory, ScreenAction::Quit]),
            ScreenAction::Batch(v) if v.len() == 2
        ));
    }
}
