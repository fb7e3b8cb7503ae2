//! Dashboard: greeting, next appointment card and promotions.

use crate::components::Footer;
use crate::keymap::Action;
use crate::models::AppointmentDetails;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::state::{DashboardEvent, DashboardState, DashboardUpdate, Loadable, PROMOTIONS};
use crate::styles::theme;
use crate::utils::{format_date, format_price, format_time};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

pub struct DashboardScreen {
    state: DashboardState,
    confirm_cancel: bool,
}

impl DashboardScreen {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            state: DashboardState::new(today),
            confirm_cancel: false,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Fetch profile and next appointment for `user_id`.
    pub fn load(&mut self, user_id: &str, today: NaiveDate) -> ScreenAction {
        ScreenAction::batch(
            self.state
                .load(user_id, today)
                .into_iter()
                .map(ScreenAction::Dashboard),
        )
    }

    /// Re-run only the next-appointment query, e.g. after a booking.
    pub fn refresh_next(&mut self) -> ScreenAction {
        self.state
            .refresh_next()
            .map_or(ScreenAction::None, ScreenAction::Dashboard)
    }

    pub fn apply(&mut self, event: DashboardEvent) -> DashboardUpdate {
        self.state.apply(event)
    }

    /// Whether the cancel confirmation prompt is showing.
    pub fn is_confirming_cancel(&self) -> bool {
        self.confirm_cancel
    }

    fn handle_action(&mut self, action: Action, ctx: &ScreenContext) -> ScreenAction {
        if self.confirm_cancel {
            match action {
                Action::Yes | Action::Confirm => {
                    self.confirm_cancel = false;
                    return self
                        .state
                        .request_cancel()
                        .map_or(ScreenAction::None, ScreenAction::Dashboard);
                }
                Action::No | Action::Cancel => self.confirm_cancel = false,
                _ => {}
            }
            return ScreenAction::None;
        }

        match action {
            Action::NewBooking => ScreenAction::OpenBooking,
            Action::Reschedule => match self.state.displayed() {
                Some(appointment) if !self.state.is_cancelling() => {
                    ScreenAction::Reschedule(appointment.clone())
                }
                _ => ScreenAction::None,
            },
            Action::CancelAppointment => {
                if self.state.displayed().is_some() && !self.state.is_cancelling() {
                    self.confirm_cancel = true;
                }
                ScreenAction::None
            }
            Action::Refresh => match ctx.user {
                Some(user) => self.load(&user.id, ctx.today),
                None => ScreenAction::None,
            },
            _ => ScreenAction::None,
        }
    }

    fn render_next_appointment(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" Next appointment ")
            .title_style(t.title_style());

        let lines: Vec<Line> = match self.state.next_appointment() {
            Loadable::Idle | Loadable::Loading => {
                vec![Line::styled("Loading...", t.muted_style())]
            }
            Loadable::Failed(e) => vec![
                Line::styled("Could not load your next appointment.", t.error_style()),
                Line::styled(e.as_str(), t.muted_style()),
            ],
            Loadable::Loaded(None) => vec![
                Line::styled("No upcoming appointments.", t.text_style()),
                Line::default(),
                Line::styled("Book your next cut from the Book tab.", t.muted_style()),
            ],
            Loadable::Loaded(Some(appointment)) => self.appointment_lines(appointment),
        };

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn appointment_lines(&self, appointment: &AppointmentDetails) -> Vec<Line<'static>> {
        let t = theme();
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<9}", label), t.muted_style()),
                Span::styled(value, t.text_style()),
            ])
        };
        let mut lines = vec![
            Line::styled(appointment.service_name().to_string(), t.title_style()),
            row("Date", format_date(appointment.appointment_date)),
            row("Time", format_time(appointment.appointment_time)),
            row("Barber", appointment.barber_name().to_string()),
            row("Unit", appointment.unit_name().to_string()),
        ];
        if let Some(price) = appointment.service.as_ref().and_then(|s| s.price) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<9}", "Price"), t.muted_style()),
                Span::styled(format_price(price), t.accent_style()),
            ]));
        }
        if self.state.is_cancelling() {
            lines.push(Line::default());
            lines.push(Line::styled("Cancelling...", t.warning_style()));
        }
        lines
    }

    fn render_promotions(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let direction = if area.width >= 60 {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };
        let cards = Layout::default()
            .direction(direction)
            .constraints(PROMOTIONS.iter().map(|_| Constraint::Ratio(1, PROMOTIONS.len() as u32)))
            .split(area);

        for (promotion, card) in PROMOTIONS.iter().zip(cards.iter()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(t.border_style())
                .title(format!(" {} ", promotion.title))
                .title_style(t.title_style())
                .title_bottom(Line::styled(format!(" {} ", promotion.badge), t.accent_style()));
            frame.render_widget(
                Paragraph::new(promotion.description)
                    .style(t.text_style())
                    .block(block)
                    .wrap(Wrap { trim: true }),
                *card,
            );
        }
    }

    fn render_cancel_prompt(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let t = theme();
        let width = 44.min(area.width);
        let height = 5.min(area.height);
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        let keymap = &ctx.config.keymap;
        let text = vec![
            Line::styled("Cancel this appointment?", t.text_style()),
            Line::styled(
                format!(
                    "{}: Yes | {}: No",
                    keymap.key_for(Action::Yes),
                    keymap.key_for(Action::No)
                ),
                t.muted_style(),
            ),
        ];
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(t.warning_style())
                    .title(" Confirm "),
            ),
            popup,
        );
    }
}

impl Screen for DashboardScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let [greeting, next, promos, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(9),
            Constraint::Length(6),
            Constraint::Length(Footer::HEIGHT),
        ])
        .areas(area);

        let greeting_text = match self.state.greeting_name() {
            Some(name) => format!("Hello, {}!", name),
            None => "Hello!".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Line::styled(greeting_text, t.title_style())),
            greeting,
        );

        self.render_next_appointment(frame, next);
        self.render_promotions(frame, promos);
        Footer::render(frame, footer, &self.footer_hints(ctx));

        if self.confirm_cancel {
            self.render_cancel_prompt(frame, area, ctx);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                if let Some(action) = ctx.config.keymap.get_action(key.code, key.modifiers) {
                    return Ok(self.handle_action(action, ctx));
                }
            }
        }
        Ok(ScreenAction::None)
    }

    fn footer_hints(&self, ctx: &RenderContext) -> String {
        let keymap = &ctx.config.keymap;
        if self.state.displayed().is_some() {
            keymap.hints(&[
                (Action::NewBooking, "Book"),
                (Action::Reschedule, "Reschedule"),
                (Action::CancelAppointment, "Cancel"),
                (Action::Refresh, "Refresh"),
                (Action::Help, "Help"),
            ])
        } else {
            keymap.hints(&[
                (Action::NewBooking, "Book"),
                (Action::Refresh, "Refresh"),
                (Action::Help, "Help"),
            ])
        }
    }
}
