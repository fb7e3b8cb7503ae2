//! Placeholder shown while the saved session is being resolved.

use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::styles::theme;
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Default)]
pub struct LoadingScreen {
    frame: usize,
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the spinner.
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER.len();
    }
}

impl Screen for LoadingScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, _ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);
        let line = Line::from(vec![
            Span::styled(SPINNER[self.frame], t.accent_style()),
            Span::styled(" Loading your session...", t.text_style()),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), middle);
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        // Only quitting is possible until the session is known
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press
                && ctx.config.keymap.get_action(key.code, key.modifiers)
                    == Some(crate::keymap::Action::Quit)
            {
                return Ok(ScreenAction::Quit);
            }
        }
        Ok(ScreenAction::None)
    }
}
