//! Help overlay listing the active keybindings, opened with `?`.

use crate::keymap::Keymap;
use crate::styles::theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap, config_path: &str) {
        let t = theme();

        let width = (area.width * 9 / 10).min(80);
        let height = (area.height * 9 / 10).min(40);
        let popup = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Keyboard Shortcuts - {} ", keymap.preset.name()))
            .title_alignment(Alignment::Center)
            .border_style(t.border_focused_style());
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [body, footer] = Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).areas(inner);

        let mut lines: Vec<Line> = Vec::new();
        let mut current_category = "";
        for binding in keymap.all_bindings() {
            let category = binding.action.category();
            if category != current_category {
                if !current_category.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!(" {}", category),
                    t.title_style(),
                )));
                current_category = category;
            }
            lines.push(Line::from(vec![
                Span::styled(format!("   {:12}", binding.display()), t.accent_style()),
                Span::styled(binding.action.description(), t.text_style()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);

        frame.render_widget(
            Paragraph::new(format!(
                "Edit keybindings in: {}\nPress any key to close",
                config_path
            ))
            .style(t.muted_style())
            .alignment(Alignment::Center),
            footer,
        );
    }
}
