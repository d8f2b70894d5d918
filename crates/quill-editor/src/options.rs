//! Editor options.
//!
//! Quill reads no configuration file; these are compile-time defaults that
//! the binary may override before starting the loop.
//!
//! | Option           | Default   |
//! |------------------|-----------|
//! | `app_name`       | `Quill`   |
//! | `status_timeout` | 5 s       |
//! | `tab_width`      | 4         |
//! | `scroll_margin`  | 2         |

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Shown in the window title and the About box.
    pub app_name: String,

    /// How long a status message stays visible.
    pub status_timeout: Duration,

    /// Display columns per tab stop (minimum 1).
    pub tab_width: u8,

    /// Lines kept visible above and below the cursor when scrolling.
    pub scroll_margin: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            app_name: "Quill".to_string(),
            status_timeout: Duration::from_secs(5),
            tab_width: 4,
            scroll_margin: 2,
        }
    }
}

impl Options {
    /// Tab width with the minimum applied.
    #[must_use]
    pub fn tab_width(&self) -> u8 {
        self.tab_width.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.app_name, "Quill");
        assert_eq!(opts.status_timeout, Duration::from_secs(5));
        assert_eq!(opts.tab_width(), 4);
    }

    #[test]
    fn zero_tab_width_reads_as_one() {
        let opts = Options {
            tab_width: 0,
            ..Options::default()
        };
        assert_eq!(opts.tab_width(), 1);
    }
}
