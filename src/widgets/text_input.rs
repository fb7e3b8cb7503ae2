//! Bordered single-line input for [`TextInput`] state.
//!
//! Used by the sign-in and sign-up forms. Supports a placeholder, password
//! masking and placing the terminal cursor when focused.

use crate::styles::theme;
use crate::utils::TextInput;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

const MASK_CHAR: char = '\u{2022}';

pub struct TextInputWidget<'a> {
    input: &'a TextInput,
    title: Option<&'a str>,
    placeholder: Option<&'a str>,
    focused: bool,
    masked: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput) -> Self {
        Self {
            input,
            title: None,
            placeholder: None,
            focused: false,
            masked: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Render every character as a bullet
    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    fn display_text(&self) -> String {
        let text = self.input.text();
        if text.is_empty() {
            self.placeholder.unwrap_or_default().to_string()
        } else if self.masked {
            MASK_CHAR.to_string().repeat(text.chars().count())
        } else {
            text.to_string()
        }
    }

    fn block(&self) -> Block<'a> {
        let t = theme();
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                t.border_focused_style()
            } else {
                t.border_style()
            });
        if let Some(title) = self.title {
            block = block.title(format!(" {} ", title));
        }
        block
    }

    /// Terminal cursor position inside `area`, clamped to the visible width.
    fn cursor_position(&self, area: Rect) -> Position {
        let inner = self.block().inner(area);
        let max = inner.width.saturating_sub(1) as usize;
        let x = inner.x + self.input.cursor().min(max) as u16;
        Position::new(x, inner.y)
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let t = theme();
        let style = if self.input.text().is_empty() {
            t.muted_style()
        } else {
            t.text_style()
        };
        Paragraph::new(self.display_text())
            .block(self.block())
            .style(style)
            .render(area, buf);
    }
}

/// Renders a [`TextInputWidget`] and moves the terminal cursor into it when
/// focused.
pub trait TextInputWidgetExt {
    fn render_text_input_widget(&mut self, widget: TextInputWidget, area: Rect);
}

impl TextInputWidgetExt for Frame<'_> {
    fn render_text_input_widget(&mut self, widget: TextInputWidget, area: Rect) {
        let cursor = widget.focused.then(|| widget.cursor_position(area));
        self.render_widget(widget, area);
        if let Some(position) = cursor {
            self.set_cursor_position(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_when_empty() {
        let input = TextInput::new();
        let widget = TextInputWidget::new(&input).placeholder("you@example.com");
        assert_eq!(widget.display_text(), "you@example.com");
    }

    #[test]
    fn test_masked_text_keeps_length() {
        let input = TextInput::with_text("segredo1");
        let widget = TextInputWidget::new(&input).masked(true);
        assert_eq!(widget.display_text(), "\u{2022}".repeat(8));
    }

    #[test]
    fn test_cursor_clamped_to_inner_width() {
        let input = TextInput::with_text("a-very-long-email@example.com");
        let widget = TextInputWidget::new(&input).focused(true);
        let pos = widget.cursor_position(Rect::new(0, 0, 10, 3));
        // Inner area is x 1..9
        assert_eq!(pos, Position::new(8, 1));
    }
}
