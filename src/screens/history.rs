//! Past and upcoming appointments, newest first.

use crate::backend::BackendError;
use crate::components::Footer;
use crate::keymap::Action;
use crate::models::{AppointmentDetails, AppointmentStatus};
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::state::{HistoryState, Loadable};
use crate::styles::theme;
use crate::utils::{format_date, format_time, ListStateExt, DEFAULT_PAGE_SIZE};
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

#[derive(Debug, Default)]
pub struct HistoryScreen {
    state: HistoryState,
    table: TableState,
}

impl HistoryScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// Ask for a reload unless one is already running.
    pub fn request_load(&mut self) -> ScreenAction {
        if self.state.begin_load() {
            ScreenAction::LoadHistory
        } else {
            ScreenAction::None
        }
    }

    /// Load on first visit only.
    pub fn on_enter(&mut self) -> ScreenAction {
        if self.state.needs_load() {
            self.request_load()
        } else {
            ScreenAction::None
        }
    }

    pub fn apply(&mut self, result: Result<Vec<AppointmentDetails>, BackendError>) {
        self.state.apply(result);
        let len = self.state.appointments().items().len();
        self.table.select_first_item(len);
    }

    /// Drop everything, e.g. after sign-out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn status_style(status: AppointmentStatus) -> Style {
    let t = theme();
    match status {
        AppointmentStatus::Scheduled => t.accent_style(),
        AppointmentStatus::Completed => t.success_style(),
        AppointmentStatus::Cancelled => t.muted_style(),
    }
}

impl Screen for HistoryScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let [body, footer] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(Footer::HEIGHT)]).areas(area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" Appointment history ")
            .title_style(t.title_style());

        let message = match self.state.appointments() {
            Loadable::Idle | Loadable::Loading => Some(Line::styled("Loading...", t.muted_style())),
            Loadable::Failed(e) => Some(Line::styled(
                format!("Could not load your appointments: {}", e),
                t.error_style(),
            )),
            Loadable::Loaded(rows) if rows.is_empty() => {
                Some(Line::styled("You have no appointments yet.", t.muted_style()))
            }
            Loadable::Loaded(_) => None,
        };

        if let Some(line) = message {
            frame.render_widget(Paragraph::new(line).block(block), body);
        } else {
            let rows: Vec<Row> = self
                .state
                .appointments()
                .items()
                .iter()
                .map(|a| {
                    Row::new(vec![
                        Cell::from(format_date(a.appointment_date)),
                        Cell::from(format_time(a.appointment_time)),
                        Cell::from(a.service_name().to_string()),
                        Cell::from(a.barber_name().to_string()),
                        Cell::from(a.unit_name().to_string()),
                        Cell::from(Span::styled(a.status.label(), status_style(a.status))),
                    ])
                })
                .collect();
            let header = Row::new(["Date", "Time", "Service", "Barber", "Unit", "Status"])
                .style(t.title_style());
            let table = Table::new(
                rows,
                [
                    Constraint::Length(11),
                    Constraint::Length(6),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(10),
                ],
            )
            .header(header)
            .block(block)
            .style(t.text_style())
            .row_highlight_style(t.highlight_style());
            frame.render_stateful_widget(table, body, &mut self.table);
        }

        Footer::render(frame, footer, &self.footer_hints(ctx));
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }
        let len = self.state.appointments().items().len();
        match ctx.config.keymap.get_action(key.code, key.modifiers) {
            Some(Action::MoveUp) => self.table.move_up_by(1, len),
            Some(Action::MoveDown) => self.table.move_down_by(1, len),
            Some(Action::PageUp) => self.table.move_up_by(DEFAULT_PAGE_SIZE, len),
            Some(Action::PageDown) => self.table.move_down_by(DEFAULT_PAGE_SIZE, len),
            Some(Action::GoToTop) => self.table.select_first_item(len),
            Some(Action::GoToEnd) => self.table.select_last_item(len),
            Some(Action::Refresh) => return Ok(self.request_load()),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn footer_hints(&self, ctx: &RenderContext) -> String {
        ctx.config.keymap.hints(&[
            (Action::MoveUp, "Up"),
            (Action::MoveDown, "Down"),
            (Action::Refresh, "Refresh"),
            (Action::Help, "Help"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_once_on_enter() {
        let mut screen = HistoryScreen::new();
        assert!(matches!(screen.on_enter(), ScreenAction::LoadHistory));
        // Still loading
        assert!(matches!(screen.on_enter(), ScreenAction::None));
        assert!(matches!(screen.request_load(), ScreenAction::None));

        screen.apply(Ok(Vec::new()));
        assert!(matches!(screen.on_enter(), ScreenAction::None));
        assert!(matches!(screen.request_load(), ScreenAction::LoadHistory));
    }

    #[test]
    fn test_failure_can_be_retried() {
        let mut screen = HistoryScreen::new();
        let _ = screen.request_load();
        screen.apply(Err(BackendError::Unauthorized));
        assert!(screen.state().appointments().error().is_some());
        assert!(matches!(screen.request_load(), ScreenAction::LoadHistory));
    }
}
