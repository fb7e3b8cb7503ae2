use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Key hint line at the bottom of every screen
pub struct Footer;

impl Footer {
    /// Border plus one line of text
    pub const HEIGHT: u16 = 2;

    /// Render `"key: label | key: label"` text with keys highlighted
    pub fn render(frame: &mut Frame, area: Rect, text: &str) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Rounded)
            .border_style(theme().border_style());
        let inner = block.inner(area);

        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Self::spans(text)).alignment(Alignment::Center),
            inner,
        );
    }

    fn spans(text: &str) -> Line<'_> {
        let t = theme();
        let mut spans = Vec::new();
        for (i, part) in text.split(" | ").enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", t.muted_style()));
            }
            if let Some((key, label)) = part.split_once(": ") {
                spans.push(Span::styled(key, t.accent_style()));
                spans.push(Span::styled(format!(": {}", label), t.text_style()));
            } else {
                spans.push(Span::styled(part, t.text_style()));
            }
        }
        Line::from(spans)
    }
}
