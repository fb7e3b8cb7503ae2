//! Navigation between the authenticated tabs.
//!
//! Wide terminals get a tab strip. Below [`NARROW_WIDTH`] columns it
//! collapses into a single line naming the active tab, and the tabs are
//! picked from a popup menu instead.

use crate::keymap::{Action, Keymap};
use crate::state::{NavigationState, Tab, NARROW_WIDTH};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs};

pub struct TabBar;

impl TabBar {
    pub const HEIGHT: u16 = 2;

    pub fn render(frame: &mut Frame, area: Rect, nav: &NavigationState, keymap: &Keymap) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(t.border_style());

        if area.width < NARROW_WIDTH {
            let line = Line::from(vec![
                Span::styled(format!("[{}] ", keymap.key_for(Action::ToggleMenu)), t.accent_style()),
                Span::styled("Menu", t.muted_style()),
                Span::styled(" \u{00B7} ", t.muted_style()),
                Span::styled(nav.active().title(), t.title_style()),
            ]);
            frame.render_widget(Paragraph::new(line).block(block), area);
            return;
        }

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
            .collect();
        let selected = Tab::ALL.iter().position(|tab| *tab == nav.active());
        let tabs = Tabs::new(titles)
            .block(block)
            .select(selected)
            .style(t.muted_style())
            .highlight_style(t.highlight_style())
            .divider(Span::styled("|", t.border_style()));
        frame.render_widget(tabs, area);
    }

    /// Popup listing the tabs, drawn under the collapsed bar
    pub fn render_menu(frame: &mut Frame, area: Rect, nav: &NavigationState) {
        let t = theme();
        let height = (Tab::ALL.len() as u16 + 2).min(area.height);
        let width = 24.min(area.width);
        let popup = Rect::new(area.x, area.y, width, height);

        let items: Vec<ListItem> = Tab::ALL
            .iter()
            .map(|tab| ListItem::new(tab.title()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Go to ")
                    .border_style(t.border_focused_style()),
            )
            .style(t.text_style())
            .highlight_style(t.highlight_style())
            .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
        let mut state = ListState::default().with_selected(Some(nav.menu_cursor()));

        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, &mut state);
    }
}
