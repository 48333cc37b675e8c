//! Cell type — a single addressable terminal position.

use crate::style::Style;
use unicode_width::UnicodeWidthStr;

/// A single cell in a [`crate::buffer::CellBuffer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The grapheme cluster displayed in this cell (0-16 bytes, spec.md §3).
    pub grapheme: String,
    /// The style of this cell.
    pub style: Style,
    /// Display width (1 for most chars, 2 for CJK/emoji, 0 for continuation).
    pub width: u8,
}

impl Cell {
    /// Create a new cell, auto-detecting width from the grapheme.
    pub fn new(grapheme: impl Into<String>, style: Style) -> Self {
        let grapheme = grapheme.into();
        let width = UnicodeWidthStr::width(grapheme.as_str()) as u8;
        Self {
            grapheme,
            style,
            width,
        }
    }

    /// Create a blank cell (space, default style, width 1).
    pub fn blank() -> Self {
        Self {
            grapheme: " ".into(),
            style: Style::default(),
            width: 1,
        }
    }

    /// Create a transparent cell: an empty grapheme with the transparency
    /// sentinel style (spec.md §3). The compositor skips these during
    /// compositing.
    pub fn transparent() -> Self {
        Self {
            grapheme: String::new(),
            style: Style::transparent(),
            width: 0,
        }
    }

    /// Returns true if this is a blank cell (space with default style).
    pub fn is_blank(&self) -> bool {
        self.grapheme == " " && self.style.is_empty() && self.width == 1
    }

    /// Returns true if this cell should be skipped by the compositor: an
    /// empty grapheme under the transparency sentinel style.
    pub fn is_transparent(&self) -> bool {
        self.grapheme.is_empty() && self.style.transparent
    }

    /// Returns true if this is a wide character (width > 1).
    pub fn is_wide(&self) -> bool {
        self.width > 1
    }

    /// Returns true if this is a continuation cell (width == 0 but not
    /// transparent — occupies the second column of a wide character).
    pub fn is_continuation(&self) -> bool {
        self.width == 0 && !self.is_transparent()
    }

    /// Create a continuation cell (placeholder for the second cell of a wide character).
    pub fn continuation() -> Self {
        Self {
            grapheme: String::new(),
            style: Style::default(),
            width: 0,
        }
    }
}
