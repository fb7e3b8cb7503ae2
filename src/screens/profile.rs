use crate::components::Footer;
use crate::keymap::Action;
use crate::models::Profile;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::styles::theme;
use crate::utils::get_config_path;
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

/// Account details and sign-out
#[derive(Debug, Default)]
pub struct ProfileScreen {
    profile: Option<Profile>,
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile row loaded by the dashboard
    pub fn set_profile(&mut self, profile: Option<Profile>) {
        self.profile = profile;
    }
}

impl Screen for ProfileScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let [body, footer] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(Footer::HEIGHT)]).areas(area);

        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<10}", label), t.muted_style()),
                Span::styled(value, t.text_style()),
            ])
        };
        let name = self
            .profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .unwrap_or_else(|| "-".to_string());
        let phone = self
            .profile
            .as_ref()
            .and_then(|p| p.phone.clone())
            .unwrap_or_else(|| "-".to_string());
        let email = ctx
            .user
            .and_then(|u| u.email.clone())
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            row("Name", name),
            row("Email", email),
            row("Phone", phone),
            Line::default(),
            row("Theme", ctx.config.theme.clone()),
            row("Keys", ctx.config.keymap.preset.name().to_string()),
            row("Config", get_config_path().display().to_string()),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(" Profile ")
            .title_style(t.title_style());
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            body,
        );
        Footer::render(frame, footer, &self.footer_hints(ctx));
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press
                && ctx.config.keymap.get_action(key.code, key.modifiers) == Some(Action::SignOut)
            {
                return Ok(ScreenAction::SignOut);
            }
        }
        Ok(ScreenAction::None)
    }

    fn footer_hints(&self, ctx: &RenderContext) -> String {
        ctx.config
            .keymap
            .hints(&[(Action::SignOut, "Sign out"), (Action::Help, "Help"), (Action::Quit, "Quit")])
    }
}
