//! Booking wizard screen.
//!
//! Renders a [`BookingWizard`] one step at a time with a progress gauge.
//! List cursors live here; the selections themselves live in the wizard.

use crate::components::Footer;
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::state::wizard::TOTAL_STEPS;
use crate::state::{BookingWizard, Loadable, SubmitOutcome, WizardEvent, WizardStep};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use crate::utils::format::{format_day_label, format_duration};
use crate::utils::{format_price, format_time, ListStateExt, DEFAULT_PAGE_SIZE};
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap};

/// Which column has focus on the date/time step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Dates,
    Times,
}

pub struct BookingScreen {
    wizard: BookingWizard,
    /// Distinguishes this wizard's results from those of a closed one
    instance: u64,
    list: ListState,
    dates: ListState,
    times: ListState,
    column: Column,
    error: Option<String>,
}

impl BookingScreen {
    pub fn new(instance: u64, wizard: BookingWizard) -> Self {
        let mut screen = Self {
            wizard,
            instance,
            list: ListState::default(),
            dates: ListState::default(),
            times: ListState::default(),
            column: Column::Dates,
            error: None,
        };
        screen.sync_cursor();
        screen
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn wizard(&self) -> &BookingWizard {
        &self.wizard
    }

    /// Initial fetches as a single action.
    pub fn mount(&mut self) -> ScreenAction {
        ScreenAction::batch(self.wizard.mount().into_iter().map(ScreenAction::Wizard))
    }

    pub fn apply(&mut self, event: WizardEvent) -> Option<SubmitOutcome> {
        let outcome = self.wizard.apply(event);
        if let Some(SubmitOutcome::Failed(message)) = &outcome {
            self.error = Some(message.clone());
        }
        self.clamp_cursors();
        outcome
    }

    fn list_len(&self) -> usize {
        match self.wizard.step() {
            WizardStep::Unit => self.wizard.units().items().len(),
            WizardStep::Service => self.wizard.services().items().len(),
            WizardStep::Barber => self.wizard.barbers().items().len(),
            WizardStep::DateTime | WizardStep::Confirm => 0,
        }
    }

    fn highlighted_times(&self) -> &[chrono::NaiveTime] {
        self.dates
            .selected()
            .and_then(|i| self.wizard.schedule().items().get(i))
            .map(|day| day.times.as_slice())
            .unwrap_or(&[])
    }

    fn clamp_cursors(&mut self) {
        let len = self.list_len();
        self.list.clamp_to(len);
        let days = self.wizard.schedule().items().len();
        self.dates.clamp_to(days);
        let times = self.highlighted_times().len();
        self.times.clamp_to(times);
    }

    /// Point the cursor at the current selection for the step just entered.
    fn sync_cursor(&mut self) {
        let selection = self.wizard.selection();
        let position = match self.wizard.step() {
            WizardStep::Unit => selection.unit_id.as_deref().and_then(|id| {
                self.wizard.units().items().iter().position(|u| u.id == id)
            }),
            WizardStep::Service => selection.service_id.as_deref().and_then(|id| {
                self.wizard.services().items().iter().position(|s| s.id == id)
            }),
            WizardStep::Barber => selection.barber_id.as_deref().and_then(|id| {
                self.wizard.barbers().items().iter().position(|b| b.id == id)
            }),
            WizardStep::DateTime => {
                let date = selection.date;
                let time = selection.time;
                let schedule = self.wizard.schedule().items();
                let day = date.and_then(|d| schedule.iter().position(|day| day.date == d));
                self.dates.select(Some(day.unwrap_or(0)));
                let slot = day
                    .and_then(|i| schedule.get(i))
                    .zip(time)
                    .and_then(|(day, t)| day.times.iter().position(|x| *x == t));
                self.times.select(Some(slot.unwrap_or(0)));
                self.column = Column::Dates;
                None
            }
            WizardStep::Confirm => None,
        };
        self.list.select(Some(position.unwrap_or(0)));
        self.clamp_cursors();
    }

    fn advance(&mut self) {
        if self.wizard.next() {
            self.error = None;
            self.sync_cursor();
        }
    }

    fn choose(&mut self, ctx: &ScreenContext) -> ScreenAction {
        let index = self.list.selected();
        match self.wizard.step() {
            WizardStep::Unit => {
                let Some(unit) = index.and_then(|i| self.wizard.units().items().get(i)) else {
                    return ScreenAction::None;
                };
                let id = unit.id.clone();
                let command = self.wizard.select_unit(&id);
                self.advance();
                command.map_or(ScreenAction::None, ScreenAction::Wizard)
            }
            WizardStep::Service => {
                let Some(service) = index.and_then(|i| self.wizard.services().items().get(i)) else {
                    return ScreenAction::None;
                };
                let id = service.id.clone();
                self.wizard.select_service(&id);
                self.advance();
                ScreenAction::None
            }
            WizardStep::Barber => {
                let Some(barber) = index.and_then(|i| self.wizard.barbers().items().get(i)) else {
                    return ScreenAction::None;
                };
                let id = barber.id.clone();
                let command = self.wizard.select_barber(&id);
                self.advance();
                command.map_or(ScreenAction::None, ScreenAction::Wizard)
            }
            WizardStep::DateTime => {
                let Some(day) = self
                    .dates
                    .selected()
                    .and_then(|i| self.wizard.schedule().items().get(i))
                    .cloned()
                else {
                    return ScreenAction::None;
                };
                match self.column {
                    Column::Dates => {
                        self.wizard.select_date(day.date);
                        self.column = Column::Times;
                        self.times.select_first_item(day.times.len());
                    }
                    Column::Times => {
                        if let Some(time) = self.times.selected().and_then(|i| day.times.get(i)) {
                            self.wizard.select_date(day.date);
                            self.wizard.select_time(*time);
                            self.advance();
                        }
                    }
                }
                ScreenAction::None
            }
            WizardStep::Confirm => match self.wizard.confirm(ctx.user) {
                Ok(command) => {
                    self.error = None;
                    ScreenAction::Wizard(command)
                }
                Err(e) => {
                    self.error = Some(e.to_string());
                    ScreenAction::None
                }
            },
        }
    }

    fn back(&mut self) -> ScreenAction {
        if self.wizard.is_submitting() {
            return ScreenAction::None;
        }
        if self.wizard.step() == WizardStep::DateTime && self.column == Column::Times {
            self.column = Column::Dates;
            return ScreenAction::None;
        }
        if self.wizard.previous() {
            self.error = None;
            self.sync_cursor();
            ScreenAction::None
        } else {
            ScreenAction::CloseBooking
        }
    }

    fn move_cursor(&mut self, up: bool, by: usize) {
        let (state, len) = match (self.wizard.step(), self.column) {
            (WizardStep::DateTime, Column::Dates) => {
                (&mut self.dates, self.wizard.schedule().items().len())
            }
            (WizardStep::DateTime, Column::Times) => {
                let len = self.highlighted_times().len();
                (&mut self.times, len)
            }
            _ => {
                let len = self.list_len();
                (&mut self.list, len)
            }
        };
        if up {
            state.move_up_by(by, len);
        } else {
            state.move_down_by(by, len);
        }
        if self.wizard.step() == WizardStep::DateTime && self.column == Column::Dates {
            // A different day shows a different set of times
            let times = self.highlighted_times().len();
            self.times.select_first_item(times);
        }
    }

    fn handle_action(&mut self, action: Action, ctx: &ScreenContext) -> ScreenAction {
        match action {
            Action::MoveUp => self.move_cursor(true, 1),
            Action::MoveDown => self.move_cursor(false, 1),
            Action::PageUp => self.move_cursor(true, DEFAULT_PAGE_SIZE),
            Action::PageDown => self.move_cursor(false, DEFAULT_PAGE_SIZE),
            Action::MoveRight if self.wizard.step() == WizardStep::DateTime => {
                if !self.highlighted_times().is_empty() {
                    self.column = Column::Times;
                }
            }
            Action::MoveLeft if self.wizard.step() == WizardStep::DateTime => {
                self.column = Column::Dates;
            }
            Action::Confirm => return self.choose(ctx),
            Action::Cancel => return self.back(),
            _ => {}
        }
        ScreenAction::None
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    fn render_progress(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let step = self.wizard.step();
        let [label, gauge] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        let mut spans = vec![
            Span::styled(
                format!("Step {} of {}", step.number(), TOTAL_STEPS),
                t.muted_style(),
            ),
            Span::styled(" \u{00B7} ", t.muted_style()),
            Span::styled(step.title(), t.title_style()),
        ];
        if self.wizard.replaces().is_some() {
            spans.push(Span::styled("  (rescheduling)", t.warning_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), label);

        let percent = self.wizard.progress_percent();
        frame.render_widget(
            Gauge::default()
                .gauge_style(t.accent_style())
                .percent(percent)
                .label(format!("{}%", percent)),
            gauge,
        );
    }

    fn boxed<'a>(title: &'a str, focused: bool) -> Block<'a> {
        let t = theme();
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                t.border_focused_style()
            } else {
                t.border_style()
            })
            .title(format!(" {} ", title))
            .title_style(t.title_style())
    }

    /// Loading, failure and empty states shared by every list
    fn placeholder<T>(loadable: &Loadable<Vec<T>>, empty: &str) -> Option<Line<'static>> {
        let t = theme();
        match loadable {
            Loadable::Idle | Loadable::Loading => Some(Line::styled("Loading...", t.muted_style())),
            Loadable::Failed(e) => Some(Line::styled(format!("Could not load: {}", e), t.error_style())),
            Loadable::Loaded(items) if items.is_empty() => {
                Some(Line::styled(empty.to_string(), t.muted_style()))
            }
            Loadable::Loaded(_) => None,
        }
    }

    fn render_list(
        frame: &mut Frame,
        area: Rect,
        block: Block,
        items: Vec<ListItem>,
        state: &mut ListState,
    ) {
        let t = theme();
        let list = List::new(items)
            .block(block)
            .style(t.text_style())
            .highlight_style(t.highlight_style())
            .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(list, area, state);
    }

    fn render_step(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let step = self.wizard.step();
        let block = Self::boxed(step.title(), true);
        let selected = self.wizard.selection().clone();

        let (placeholder, items): (Option<Line>, Vec<ListItem>) = match step {
            WizardStep::Unit => (
                Self::placeholder(self.wizard.units(), "No units available."),
                self.wizard
                    .units()
                    .items()
                    .iter()
                    .map(|u| {
                        let mark = marker(selected.unit_id.as_deref() == Some(u.id.as_str()));
                        ListItem::new(vec![
                            Line::from(format!("{}{}", mark, u.name)),
                            Line::styled(format!("   {}", u.address), t.muted_style()),
                        ])
                    })
                    .collect(),
            ),
            WizardStep::Service => (
                Self::placeholder(self.wizard.services(), "No services available."),
                self.wizard
                    .services()
                    .items()
                    .iter()
                    .map(|s| {
                        let mark = marker(selected.service_id.as_deref() == Some(s.id.as_str()));
                        ListItem::new(Line::from(vec![
                            Span::raw(format!("{}{:<24}", mark, s.name)),
                            Span::styled(format!("{:>8}  ", format_duration(s.duration_minutes)), t.muted_style()),
                            Span::styled(format_price(s.price), t.accent_style()),
                        ]))
                    })
                    .collect(),
            ),
            WizardStep::Barber => (
                Self::placeholder(self.wizard.barbers(), "No barbers at this unit."),
                self.wizard
                    .barbers()
                    .items()
                    .iter()
                    .map(|b| {
                        let mark = marker(selected.barber_id.as_deref() == Some(b.id.as_str()));
                        ListItem::new(Line::from(vec![
                            Span::raw(format!("{}{:<24}", mark, b.name)),
                            Span::styled(format!("\u{2605} {}  ", b.rating_display()), t.accent_style()),
                            Span::styled(b.specialty.clone().unwrap_or_default(), t.muted_style()),
                        ]))
                    })
                    .collect(),
            ),
            WizardStep::DateTime => {
                self.render_date_time(frame, area);
                return;
            }
            WizardStep::Confirm => {
                self.render_confirmation(frame, area, block);
                return;
            }
        };

        match placeholder {
            Some(line) => frame.render_widget(
                Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
                area,
            ),
            None => Self::render_list(frame, area, block, items, &mut self.list),
        }
    }

    fn render_date_time(&mut self, frame: &mut Frame, area: Rect) {
        let [dates_area, times_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let dates_block = Self::boxed("Date", self.column == Column::Dates);
        let times_block = Self::boxed("Time", self.column == Column::Times);

        if let Some(line) = Self::placeholder(self.wizard.schedule(), "No free slots for this barber.") {
            frame.render_widget(
                Paragraph::new(line).block(dates_block).wrap(Wrap { trim: true }),
                dates_area,
            );
            frame.render_widget(times_block, times_area);
            return;
        }

        let selection = self.wizard.selection().clone();
        let days: Vec<ListItem> = self
            .wizard
            .schedule()
            .items()
            .iter()
            .map(|day| {
                ListItem::new(format!(
                    "{}{}",
                    marker(selection.date == Some(day.date)),
                    format_day_label(day.date)
                ))
            })
            .collect();
        let highlighted_date = self
            .dates
            .selected()
            .and_then(|i| self.wizard.schedule().items().get(i))
            .map(|day| day.date);
        let times: Vec<ListItem> = self
            .highlighted_times()
            .iter()
            .map(|time| {
                let chosen = selection.time == Some(*time) && selection.date == highlighted_date;
                ListItem::new(format!("{}{}", marker(chosen), format_time(*time)))
            })
            .collect();

        Self::render_list(frame, dates_area, dates_block, days, &mut self.dates);
        Self::render_list(frame, times_area, times_block, times, &mut self.times);
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect, block: Block) {
        let t = theme();
        let summary = self.wizard.summary();
        let row = |label: &str, value: Option<String>| {
            Line::from(vec![
                Span::styled(format!("{:<10}", label), t.muted_style()),
                Span::styled(value.unwrap_or_else(|| "-".to_string()), t.text_style()),
            ])
        };

        let mut lines = vec![
            row("Unit", summary.unit),
            row("Address", summary.address),
            row("Service", summary.service),
            row("Duration", summary.duration),
            row("Barber", summary.barber),
            row("Date", summary.date),
            row("Time", summary.time),
            Line::default(),
            Line::from(vec![
                Span::styled(format!("{:<10}", "Total"), t.title_style()),
                Span::styled(summary.total.unwrap_or_else(|| "-".to_string()), t.accent_style()),
            ]),
            Line::default(),
        ];
        if self.wizard.is_submitting() {
            lines.push(Line::styled("Booking...", t.warning_style()));
        } else if self.wizard.is_completed() {
            lines.push(Line::styled("Booked!", t.success_style()));
        } else if let Some(error) = &self.error {
            lines.push(Line::styled(error.clone(), t.error_style()));
        }

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

fn marker(chosen: bool) -> &'static str {
    if chosen {
        "\u{2714} "
    } else {
        "  "
    }
}

impl Screen for BookingScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        self.clamp_cursors();
        let [progress, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(Footer::HEIGHT),
        ])
        .areas(area);

        self.render_progress(frame, progress);
        self.render_step(frame, body);
        Footer::render(frame, footer, &self.footer_hints(ctx));
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
        let back = if self.wizard.can_go_back() { "Back" } else { "Close" };
        match self.wizard.step() {
            WizardStep::Confirm => keymap.hints(&[(Action::Confirm, "Book"), (Action::Cancel, back)]),
            WizardStep::DateTime => keymap.hints(&[
                (Action::MoveUp, "Up"),
                (Action::MoveDown, "Down"),
                (Action::MoveRight, "Times"),
                (Action::Confirm, "Select"),
                (Action::Cancel, back),
            ]),
            _ => keymap.hints(&[
                (Action::MoveUp, "Up"),
                (Action::MoveDown, "Down"),
                (Action::Confirm, "Select"),
                (Action::Cancel, back),
            ]),
        }
    }
}
