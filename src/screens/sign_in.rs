//! Sign-in and sign-up forms shown while no session exists.

use crate::components::{Footer, Header};
use crate::keymap::Action;
use crate::screens::screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
use crate::services::{validate_sign_in, validate_sign_up};
use crate::styles::theme;
use crate::utils::TextInput;
use crate::widgets::{TextInputWidget, TextInputWidgetExt};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FullName,
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct SignInScreen {
    mode: AuthMode,
    full_name: TextInput,
    email: TextInput,
    password: TextInput,
    focus: usize,
    error: Option<String>,
    notice: Option<String>,
    submitting: bool,
}

impl SignInScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The request came back with an error.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }

    /// Sign-up went through but the account must be confirmed by email.
    pub fn confirmation_required(&mut self) {
        self.submitting = false;
        self.mode = AuthMode::SignIn;
        self.focus = 1;
        self.password.clear();
        self.notice = Some("Account created. Confirm your email, then sign in.".to_string());
    }

    /// Clear everything, e.g. after sign-out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn fields(&self) -> &'static [Field] {
        match self.mode {
            AuthMode::SignIn => &[Field::Email, Field::Password],
            AuthMode::SignUp => &[Field::FullName, Field::Email, Field::Password],
        }
    }

    fn focused_field(&self) -> Field {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    fn input_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn switch_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.focus = 0;
        self.error = None;
        self.notice = None;
    }

    fn submit(&mut self) -> ScreenAction {
        let email = self.email.text_trimmed().to_string();
        let password = self.password.text().to_string();
        let checked = match self.mode {
            AuthMode::SignIn => validate_sign_in(&email, &password),
            AuthMode::SignUp => validate_sign_up(&email, &password, self.full_name.text()),
        };
        if let Err(e) = checked {
            self.error = Some(e.to_string());
            return ScreenAction::None;
        }

        self.submitting = true;
        self.error = None;
        self.notice = None;
        match self.mode {
            AuthMode::SignIn => ScreenAction::SignIn { email, password },
            AuthMode::SignUp => ScreenAction::SignUp {
                email,
                password,
                full_name: self.full_name.text_trimmed().to_string(),
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &ScreenContext) -> ScreenAction {
        if self.submitting {
            return match ctx.config.keymap.get_action(key.code, key.modifiers) {
                Some(Action::Quit) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ScreenAction::Quit
                }
                _ => ScreenAction::None,
            };
        }

        // Plain characters are always text, whatever the keymap says
        if let KeyCode::Char(c) = key.code {
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                let field = self.focused_field();
                self.input_mut(field).insert_char(c);
                self.error = None;
                return ScreenAction::None;
            }
        }

        let field = self.focused_field();
        match ctx.config.keymap.get_action(key.code, key.modifiers) {
            Some(Action::Confirm) => {
                if self.focus + 1 < self.fields().len() {
                    self.focus_next();
                    ScreenAction::None
                } else {
                    self.submit()
                }
            }
            Some(Action::NextTab | Action::MoveDown) => {
                self.focus_next();
                ScreenAction::None
            }
            Some(Action::PrevTab | Action::MoveUp) => {
                self.focus_prev();
                ScreenAction::None
            }
            Some(Action::SwitchForm) => {
                self.switch_mode();
                ScreenAction::None
            }
            Some(Action::Quit | Action::Cancel) => ScreenAction::Quit,
            Some(action) if self.input_mut(field).handle_action(action) => ScreenAction::None,
            _ => {
                self.input_mut(field).handle_key(key.code);
                ScreenAction::None
            }
        }
    }
}

impl Screen for SignInScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) -> Result<()> {
        let t = theme();
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Min(0),
            Constraint::Length(Footer::HEIGHT),
        ])
        .areas(area);

        let title = match self.mode {
            AuthMode::SignIn => "Sign in to book your next cut",
            AuthMode::SignUp => "Create your account",
        };
        Header::render(frame, header, title, None);

        let form_width = 50.min(body.width);
        let fields = self.fields();
        let form_height = fields.len() as u16 * 3 + 6;
        let form = Rect::new(
            body.x + body.width.saturating_sub(form_width) / 2,
            body.y + body.height.saturating_sub(form_height) / 2,
            form_width,
            form_height.min(body.height),
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(match self.mode {
                AuthMode::SignIn => " Sign in ",
                AuthMode::SignUp => " Sign up ",
            })
            .title_style(t.title_style());
        let inner = block.inner(form);
        frame.render_widget(block, form);

        let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(1));
        let rows = Layout::vertical(constraints).split(inner);

        let focused = self.focused_field();
        for (i, field) in fields.iter().enumerate() {
            let (input, label, placeholder) = match field {
                Field::FullName => (&self.full_name, "Full name", "Jane Doe"),
                Field::Email => (&self.email, "Email", "you@example.com"),
                Field::Password => (&self.password, "Password", ""),
            };
            let widget = TextInputWidget::new(input)
                .title(label)
                .placeholder(placeholder)
                .masked(*field == Field::Password)
                .focused(*field == focused && !self.submitting);
            frame.render_text_input_widget(widget, rows[i]);
        }

        let status = if self.submitting {
            Line::styled("Please wait...", t.muted_style())
        } else if let Some(error) = &self.error {
            Line::styled(error.as_str(), t.error_style())
        } else if let Some(notice) = &self.notice {
            Line::styled(notice.as_str(), t.success_style())
        } else {
            Line::default()
        };
        frame.render_widget(
            Paragraph::new(status).wrap(Wrap { trim: true }),
            rows[fields.len()],
        );

        Footer::render(frame, footer, &self.footer_hints(ctx));
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                return Ok(self.handle_key(key, ctx));
            }
        }
        Ok(ScreenAction::None)
    }

    fn is_input_focused(&self) -> bool {
        true
    }

    fn footer_hints(&self, ctx: &RenderContext) -> String {
        let switch_label = match self.mode {
            AuthMode::SignIn => "Create account",
            AuthMode::SignUp => "I have an account",
        };
        ctx.config.keymap.hints(&[
            (Action::NextTab, "Next field"),
            (Action::Confirm, "Submit"),
            (Action::SwitchForm, switch_label),
            (Action::Cancel, "Quit"),
        ])
    }
}
