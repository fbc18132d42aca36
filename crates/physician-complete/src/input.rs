//! Single-line name input with a cursor

use crossterm::event::{KeyCode, KeyModifiers};

/// Effect of a key on the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The text changed
    Changed,
    /// Only the cursor moved
    Moved,
    /// The key is not an editing key
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct TextInput {
    text: String,
    /// Byte offset, always on a char boundary
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole text and park the cursor at the end
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    /// Start of the word before the cursor, skipping trailing whitespace
    fn word_start_before(&self) -> usize {
        let head = self.text[..self.cursor].trim_end();
        head.char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8())
    }

    /// End of the word after the cursor, skipping leading whitespace
    fn word_end_after(&self) -> usize {
        let tail = &self.text[self.cursor..];
        let skipped = tail.len() - tail.trim_start().len();
        let word: usize = tail[skipped..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        self.cursor + skipped + word
    }

    fn insert(&mut self, c: char) -> Edit {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        Edit::Changed
    }

    fn delete_range(&mut self, start: usize, end: usize) -> Edit {
        if start == end {
            return Edit::Ignored;
        }
        self.text.drain(start..end);
        self.cursor = start;
        Edit::Changed
    }

    fn move_to(&mut self, pos: usize) -> Edit {
        if pos == self.cursor {
            return Edit::Ignored;
        }
        self.cursor = pos;
        Edit::Moved
    }

    /// Apply an editing key. Navigation keys the widget owns (arrows up and
    /// down, Enter, Tab) are never handled here.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Edit {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        // macOS Option may report as SUPER
        let word = modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER);

        match code {
            KeyCode::Char('u') if ctrl => self.delete_range(0, self.cursor),
            KeyCode::Char('w') if ctrl => self.delete_range(self.word_start_before(), self.cursor),
            KeyCode::Backspace if word => {
                self.delete_range(self.word_start_before(), self.cursor)
            }
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::Char('e') if ctrl => self.move_to(self.text.len()),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.text.len()),
            KeyCode::Char('b') if word => self.move_to(self.word_start_before()),
            KeyCode::Char('f') if word => self.move_to(self.word_end_after()),
            KeyCode::Left if word || ctrl => self.move_to(self.word_start_before()),
            KeyCode::Right if word || ctrl => self.move_to(self.word_end_after()),
            KeyCode::Left => self.move_to(self.prev_boundary()),
            KeyCode::Right => self.move_to(self.next_boundary()),
            KeyCode::Backspace => self.delete_range(self.prev_boundary(), self.cursor),
            KeyCode::Delete => {
                let (start, end) = (self.cursor, self.next_boundary());
                self.delete_range(start, end)
            }
            KeyCode::Char(c) if !ctrl && !word => self.insert(c),
            _ => Edit::Ignored,
        }
    }
}
