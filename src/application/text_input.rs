/// Single-line text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `value` with the cursor at the end.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        for c in "milk".chars() {
            input.insert(c);
        }
        assert_eq!(input.value(), "milk");
        assert_eq!(input.cursor(), 4);

        input.backspace();
        assert_eq!(input.value(), "mil");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = TextInput::with_value("ac");
        input.move_left();
        input.insert('b');
        assert_eq!(input.value(), "abc");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::with_value("café");
        input.backspace();
        assert_eq!(input.value(), "caf");
        input.insert('é');
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "afé");
        input.move_end();
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = TextInput::with_value("x");
        input.move_right();
        assert_eq!(input.cursor(), 1);
        input.delete();
        assert_eq!(input.value(), "x");
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.backspace();
        assert_eq!(input.value(), "x");
    }
}
