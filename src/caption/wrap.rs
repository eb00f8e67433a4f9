use crate::error::{Result, SubburnError};

/// Greedy word wrapper with a per-line character budget.
///
/// Words are never split. A word longer than the budget gets a line of its
/// own. Lengths are counted in `char`s, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWrapper {
    max_chars: usize,
}

impl Default for LineWrapper {
    fn default() -> Self {
        Self { max_chars: 60 }
    }
}

impl LineWrapper {
    pub fn new(max_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(SubburnError::Config("max_chars must be at least 1".to_string()));
        }
        Ok(Self { max_chars })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Wrap `text` into lines, in word order. Empty or blank text yields no lines.
    pub fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + word_len + 1 <= self.max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += word_len + 1;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }

        lines
    }
}
