//! Tab shell state.

/// Below this width the tab bar collapses behind a menu.
pub const NARROW_WIDTH: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Booking,
    History,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Booking, Tab::History, Tab::Profile];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Booking => "Book",
            Tab::History => "History",
            Tab::Profile => "Profile",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    active: Tab,
    menu_open: bool,
    menu_cursor: usize,
}

impl NavigationState {
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Switch tabs; closes the menu.
    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
        self.menu_open = false;
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        if self.menu_open {
            self.menu_cursor = self.active.index();
        }
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    pub fn menu_up(&mut self) {
        self.menu_cursor = self.menu_cursor.saturating_sub(1);
    }

    pub fn menu_down(&mut self) {
        self.menu_cursor = (self.menu_cursor + 1).min(Tab::ALL.len() - 1);
    }

    /// Activate the tab under the menu cursor.
    pub fn menu_choose(&mut self) -> Tab {
        let tab = Tab::ALL[self.menu_cursor.min(Tab::ALL.len() - 1)];
        self.select(tab);
        tab
    }

    /// The tab bar is hidden while the booking wizard is open.
    pub fn nav_visible(&self) -> bool {
        self.active != Tab::Booking
    }

    pub fn is_narrow(width: u16) -> bool {
        width < NARROW_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Dashboard.next(), Tab::Booking);
        assert_eq!(Tab::Profile.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.previous(), Tab::Profile);
    }

    #[test]
    fn test_menu_selection_closes_menu() {
        let mut nav = NavigationState::default();
        nav.toggle_menu();
        assert!(nav.is_menu_open());
        nav.menu_down();
        nav.menu_down();
        assert_eq!(nav.menu_choose(), Tab::History);
        assert!(!nav.is_menu_open());
        assert_eq!(nav.active(), Tab::History);
    }

    #[test]
    fn test_menu_cursor_starts_on_active_tab() {
        let mut nav = NavigationState::default();
        nav.select(Tab::Profile);
        nav.toggle_menu();
        assert_eq!(nav.menu_cursor(), 3);
        nav.menu_down();
        assert_eq!(nav.menu_cursor(), 3);
    }

    #[test]
    fn test_nav_hidden_while_booking() {
        let mut nav = NavigationState::default();
        assert!(nav.nav_visible());
        nav.select(Tab::Booking);
        assert!(!nav.nav_visible());
        assert!(NavigationState::is_narrow(79));
        assert!(!NavigationState::is_narrow(80));
    }
}
