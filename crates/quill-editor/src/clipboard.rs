//! Clipboard — the text area's cut/copy/paste slot.
//!
//! One in-process slot. Cut and copy overwrite it, paste reads it. Bracketed
//! paste from the terminal bypasses it and inserts directly.

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: String,
}

impl Clipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Replace the stored text. Empty text is ignored so copying an empty
    /// span never wipes the clipboard.
    pub fn store(&mut self, text: String) {
        if !text.is_empty() {
            self.content = text;
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_replaces_content() {
        let mut clip = Clipboard::new();
        assert!(clip.is_empty());
        clip.store("one".into());
        clip.store("two".into());
        assert_eq!(clip.content(), "two");
    }

    #[test]
    fn empty_store_keeps_previous() {
        let mut clip = Clipboard::new();
        clip.store("keep".into());
        clip.store(String::new());
        assert_eq!(clip.content(), "keep");
    }
}
