use crate::keymap::Action;
use crossterm::event::KeyCode;

/// Single-line text field state: the text plus a cursor counted in chars.
///
/// ```
/// use barberbook::utils::TextInput;
///
/// let mut input = TextInput::new();
/// input.insert_char('h');
/// input.insert_char('i');
/// assert_eq!(input.text(), "hi");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text input with initial text, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Empty ignoring whitespace.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert a printable character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Apply an editing action. Returns true if it was consumed.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::Home | Action::GoToTop => self.move_home(),
            Action::End | Action::GoToEnd => self.move_end(),
            Action::Backspace => self.backspace(),
            Action::DeleteChar => self.delete(),
            _ => return false,
        }
        true
    }

    /// Apply a raw key. Returns true if it was consumed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_in_middle() {
        let mut input = TextInput::with_text("joao");
        input.move_left();
        input.move_left();
        input.insert_char('-');
        assert_eq!(input.text(), "jo-ao");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::with_text("joão");
        input.backspace();
        assert_eq!(input.text(), "joã");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "oã");
        input.move_end();
        input.insert_char('o');
        assert_eq!(input.text(), "oão");
    }

    #[test]
    fn test_boundaries() {
        let mut input = TextInput::new();
        input.backspace();
        input.delete();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.insert_char('\n');
        assert!(input.is_empty());
    }

    #[test]
    fn test_handle_action_and_key() {
        let mut input = TextInput::with_text("abc");
        assert!(input.handle_action(Action::Home));
        assert_eq!(input.cursor(), 0);
        assert!(!input.handle_action(Action::Quit));
        assert!(input.handle_key(KeyCode::Char('x')));
        assert_eq!(input.text(), "xabc");
        assert!(!input.handle_key(KeyCode::Enter));
    }
}
