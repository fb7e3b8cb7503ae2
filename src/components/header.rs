use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

/// Common header: app title on the left, the signed-in user on the right
pub struct Header;

impl Header {
    /// Height the header occupies
    pub const HEIGHT: u16 = 3;

    pub fn render(frame: &mut Frame, area: Rect, title: &str, user: Option<&str>) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(t.border_focused_style())
            .title(" barberbook ")
            .title_style(t.title_style())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(40)]).areas(inner);

        frame.render_widget(Paragraph::new(title).style(t.text_style()), left);
        if let Some(user) = user {
            frame.render_widget(
                Paragraph::new(user)
                    .style(t.muted_style())
                    .alignment(Alignment::Right),
                right,
            );
        }
    }
}
