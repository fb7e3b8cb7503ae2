//! Selection movement for ratatui lists and tables.

use ratatui::widgets::{ListState, TableState};

/// Rows skipped by page up/down.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Cursor movement helpers for list and table state, clamped to the row count.
pub trait ListStateExt {
    fn move_up_by(&mut self, count: usize, total_items: usize);

    fn move_down_by(&mut self, count: usize, total_items: usize);

    fn select_first_item(&mut self, total_items: usize);

    fn select_last_item(&mut self, total_items: usize);

    /// Keep the selection inside `0..total_items` after the list changed;
    /// an empty list clears it.
    fn clamp_to(&mut self, total_items: usize);
}

// ListState and TableState expose the same selection API
macro_rules! impl_list_state_ext {
    ($($state:ty),*) => {$(
        impl ListStateExt for $state {
            fn move_up_by(&mut self, count: usize, total_items: usize) {
                if total_items == 0 {
                    return;
                }
                let current = self.selected().unwrap_or(0);
                self.select(Some(current.saturating_sub(count)));
            }

            fn move_down_by(&mut self, count: usize, total_items: usize) {
                if total_items == 0 {
                    return;
                }
                let next = match self.selected() {
                    Some(current) => current + count,
                    None => 0,
                };
                self.select(Some(next.min(total_items - 1)));
            }

            fn select_first_item(&mut self, total_items: usize) {
                if total_items > 0 {
                    self.select(Some(0));
                }
            }

            fn select_last_item(&mut self, total_items: usize) {
                if total_items > 0 {
                    self.select(Some(total_items - 1));
                }
            }

            fn clamp_to(&mut self, total_items: usize) {
                if total_items == 0 {
                    self.select(None);
                } else {
                    let current = self.selected().unwrap_or(0);
                    self.select(Some(current.min(total_items - 1)));
                }
            }
        }
    )*};
}

impl_list_state_ext!(ListState, TableState);
