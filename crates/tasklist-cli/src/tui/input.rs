//! Single-line text editing shared by the new-task input and the row title
//! field.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to a [`LineBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    /// Enter: the owner should submit the current value.
    Submit,
    /// Esc: the owner should abandon editing.
    Cancel,
    Changed,
    /// The key is not a line-editing key; the owner may handle it.
    Ignored,
}

/// Text value plus a cursor measured in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    value: String,
    cursor: usize,
}

impl LineBuffer {
    /// Buffer holding `value` with the cursor at its end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = char_len(&value);
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    #[cfg(test)]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text left of the cursor, for measuring its display column.
    pub fn before_cursor(&self) -> &str {
        &self.value[..byte_index_at_char(&self.value, self.cursor)]
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the whole value and move the cursor to the end.
    pub fn set(&mut self, value: &str) {
        value.clone_into(&mut self.value);
        self.cursor = char_len(&self.value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LineEdit {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => LineEdit::Submit,
            KeyCode::Esc => LineEdit::Cancel,
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    remove_char_at(&mut self.value, self.cursor);
                }
                LineEdit::Changed
            }
            KeyCode::Delete => {
                remove_char_at(&mut self.value, self.cursor);
                LineEdit::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                LineEdit::Changed
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(char_len(&self.value));
                LineEdit::Changed
            }
            KeyCode::Home => {
                self.cursor = 0;
                LineEdit::Changed
            }
            KeyCode::End => {
                self.cursor = char_len(&self.value);
                LineEdit::Changed
            }
            KeyCode::Char('a') if ctrl => {
                self.cursor = 0;
                LineEdit::Changed
            }
            KeyCode::Char('e') if ctrl => {
                self.cursor = char_len(&self.value);
                LineEdit::Changed
            }
            KeyCode::Char('u') if ctrl => {
                self.clear();
                LineEdit::Changed
            }
            KeyCode::Char(ch) if !ctrl => {
                insert_char_at(&mut self.value, self.cursor, ch);
                self.cursor += 1;
                LineEdit::Changed
            }
            _ => LineEdit::Ignored,
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn byte_index_at_char(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(idx, _)| idx)
}

fn insert_char_at(value: &mut String, char_idx: usize, ch: char) {
    let idx = byte_index_at_char(value, char_idx);
    value.insert(idx, ch);
}

fn remove_char_at(value: &mut String, char_idx: usize) {
    if char_idx >= char_len(value) {
        return;
    }
    let start = byte_index_at_char(value, char_idx);
    let end = byte_index_at_char(value, char_idx + 1);
    value.replace_range(start..end, "");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(buf: &mut LineBuffer, text: &str) {
        for ch in text.chars() {
            buf.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_appends_and_moves_cursor() {
        let mut buf = LineBuffer::default();
        type_str(&mut buf, "milk");
        assert_eq!(buf.value(), "milk");
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn insert_in_middle_handles_multibyte() {
        let mut buf = LineBuffer::new("café");
        buf.handle_key(key(KeyCode::Left));
        buf.handle_key(key(KeyCode::Char('x')));
        assert_eq!(buf.value(), "cafxé");
        buf.handle_key(key(KeyCode::Backspace));
        assert_eq!(buf.value(), "café");
        buf.handle_key(key(KeyCode::Delete));
        assert_eq!(buf.value(), "caf");
    }

    #[test]
    fn before_cursor_slices_on_char_boundary() {
        let mut buf = LineBuffer::new("漢字ab");
        assert_eq!(buf.before_cursor(), "漢字ab");
        buf.handle_key(key(KeyCode::Home));
        buf.handle_key(key(KeyCode::Right));
        assert_eq!(buf.before_cursor(), "漢");
    }

    #[test]
    fn backspace_at_start_is_harmless() {
        let mut buf = LineBuffer::new("ab");
        buf.handle_key(key(KeyCode::Home));
        buf.handle_key(key(KeyCode::Backspace));
        assert_eq!(buf.value(), "ab");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn enter_and_esc_are_reported() {
        let mut buf = LineBuffer::new("x");
        assert_eq!(buf.handle_key(key(KeyCode::Enter)), LineEdit::Submit);
        assert_eq!(buf.handle_key(key(KeyCode::Esc)), LineEdit::Cancel);
        assert_eq!(buf.value(), "x");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut buf = LineBuffer::new("walk dog");
        let edit = buf.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(edit, LineEdit::Changed);
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn unhandled_keys_are_ignored() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.handle_key(key(KeyCode::Tab)), LineEdit::Ignored);
        assert_eq!(
            buf.handle_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            LineEdit::Ignored
        );
    }
}
