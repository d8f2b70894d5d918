//! Collaborators the document session talks to.
//!
//! The session never draws anything itself. It asks a [`FileDialog`] for
//! paths and a [`MessagePrompt`] for answers and error reports, both behind
//! traits so tests can script them. The terminal implementations live in
//! [`dialog`](crate::dialog).
//!
//! All calls block until the user answers.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// File filters
// ---------------------------------------------------------------------------

/// A named set of file-name patterns, e.g. `Text Files (*.txt)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub patterns: Vec<String>,
}

impl FileFilter {
    #[must_use]
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// `Text Files (*.txt)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.patterns.join(" "))
    }

    /// Whether a file name matches any pattern. Matching ignores ASCII case.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| glob_match(p, file_name))
    }
}

/// The filters offered by Open and Save As.
#[must_use]
pub fn default_filters() -> Vec<FileFilter> {
    vec![
        FileFilter::new("Text Files", &["*.txt"]),
        FileFilter::new("All Files", &["*"]),
    ]
}

/// `*` matches any run of chars, `?` exactly one. Iterative with
/// backtracking to the last `*`.
fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let n: Vec<char> = name.chars().map(|c| c.to_ascii_lowercase()).collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        match p.get(pi) {
            Some('*') => {
                star = Some((pi, ni));
                pi += 1;
            }
            Some(&c) if c == '?' || c == n[ni] => {
                pi += 1;
                ni += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    pi = sp + 1;
                    ni = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Answer to a Yes / No / Cancel question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Cancel,
}

pub trait FileDialog {
    /// Pick an existing file to open. `None` when the user cancels.
    fn open_file(&mut self, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Pick a path to save to. `None` when the user cancels.
    fn save_file(&mut self, filters: &[FileFilter]) -> Option<PathBuf>;
}

pub trait MessagePrompt {
    fn ask_yes_no_cancel(&mut self, title: &str, message: &str) -> Answer;
    fn show_error(&mut self, title: &str, message: &str);
    fn show_info(&mut self, title: &str, message: &str);
}

/// Everything the session needs from the UI.
pub trait Host: FileDialog + MessagePrompt {}

impl<T: FileDialog + MessagePrompt + ?Sized> Host for T {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_labels() {
        let labels: Vec<String> = default_filters().iter().map(FileFilter::label).collect();
        assert_eq!(labels, ["Text Files (*.txt)", "All Files (*)"]);
    }

    #[test]
    fn extension_pattern() {
        let f = FileFilter::new("Text Files", &["*.txt"]);
        assert!(f.matches("notes.txt"));
        assert!(f.matches("NOTES.TXT"));
        assert!(f.matches(".txt"));
        assert!(!f.matches("notes.txt.bak"));
        assert!(!f.matches("notes.md"));
    }

    #[test]
    fn star_matches_everything() {
        let f = FileFilter::new("All Files", &["*"]);
        assert!(f.matches("anything"));
        assert!(f.matches(""));
    }

    #[test]
    fn multiple_patterns_and_question_mark() {
        let f = FileFilter::new("Docs", &["*.md", "README?"]);
        assert!(f.matches("guide.md"));
        assert!(f.matches("README1"));
        assert!(!f.matches("README"));
        assert_eq!(f.label(), "Docs (*.md README?)");
    }

    #[test]
    fn star_backtracks() {
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(glob_match("*.tar.gz", "x.tar.gz"));
        assert!(!glob_match("a*b", "acbd"));
    }
}
