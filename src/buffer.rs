//! `CellBuffer` — a fixed-size 2D grid of styled cells (spec.md §4.1).

use unicode_segmentation::UnicodeSegmentation;

use crate::cell::Cell;
use crate::geometry::Size;
use crate::style::Style;

/// A 2D grid of [`Cell`]s, row-major, fixed `(width, height)`.
///
/// Invariant: `cells.len() == width * height`. Out-of-bounds writes clip
/// silently rather than panicking (spec.md §4.1).
#[derive(Clone, Debug)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Create a new buffer of the given size, filled with blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::blank(); len],
        }
    }

    /// Current dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Width in columns.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Resize the buffer, preserving top-left content up to the new extent
    /// (spec.md §3). New area beyond the old extent is filled with blanks.
    pub fn resize(&mut self, width: u16, height: u16) {
        let mut new_cells = vec![Cell::blank(); usize::from(width) * usize::from(height)];
        let copy_w = self.width.min(width);
        let copy_h = self.height.min(height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                let Some(old_idx) = self.index(x, y) else {
                    continue;
                };
                let new_idx = usize::from(y) * usize::from(width) + usize::from(x);
                new_cells[new_idx] = self.cells[old_idx].clone();
            }
        }
        self.width = width;
        self.height = height;
        self.cells = new_cells;
    }

    /// Fill every cell with a blank cell carrying the given background
    /// style (fg unset, bg set, no attributes beyond what `style` carries).
    pub fn clear(&mut self, style: Style) {
        for cell in &mut self.cells {
            *cell = Cell::new(" ", style);
        }
    }

    /// Fill every cell with the transparency sentinel.
    pub fn clear_transparent(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::transparent();
        }
    }

    /// Read the cell at `(x, y)`. Out-of-bounds reads return a transparent
    /// cell rather than panicking.
    pub fn get_cell(&self, x: u16, y: u16) -> Cell {
        match self.index(x, y) {
            Some(idx) => self.cells[idx].clone(),
            None => Cell::transparent(),
        }
    }

    /// Write a single grapheme cluster at `(x, y)`. Out-of-bounds writes
    /// are a silent no-op.
    pub fn write(&mut self, x: u16, y: u16, grapheme: &str, style: Style) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = Cell::new(grapheme, style);
        }
    }

    /// Write `text` starting at `(x, y)`, advancing one column per grapheme
    /// cluster (more for wide characters). Does **not** wrap — callers
    /// wrap (spec.md §4.1). Invalid UTF-8 is not representable in `&str`;
    /// malformed byte sequences upstream of this call must already have
    /// been replaced with U+FFFD by the caller.
    pub fn write_text(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if col >= self.width {
                break;
            }
            let width = unicode_width::UnicodeWidthStr::width(grapheme).max(1) as u16;
            self.write(col, y, grapheme, style);
            // Continuation cell(s) for wide graphemes.
            for c in 1..width {
                let cx = col + c;
                if let Some(idx) = self.index(cx, y) {
                    self.cells[idx] = Cell::continuation();
                }
            }
            col = col.saturating_add(width);
        }
    }

    /// Fill a rectangular region with a repeated character and style.
    /// Clips silently at the buffer edges.
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: &str, style: Style) {
        for row in y..y.saturating_add(h) {
            for col in x..x.saturating_add(w) {
                self.write(col, row, ch, style);
            }
        }
    }

    /// Blit `src` onto `self` at `(dst_x, dst_y)`, skipping transparent
    /// source cells so destination content underneath shows through.
    pub fn blit_from(&mut self, src: &CellBuffer, dst_x: i32, dst_y: i32) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                let cell = src.get_cell(sx, sy);
                if cell.is_transparent() {
                    continue;
                }
                let dx = dst_x + i32::from(sx);
                let dy = dst_y + i32::from(sy);
                if dx < 0 || dy < 0 || dx > i32::from(u16::MAX) || dy > i32::from(u16::MAX) {
                    continue;
                }
                if let Some(idx) = self.index(dx as u16, dy as u16) {
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Overwrite the entire contents of `self` with `other`. Resizes `self`
    /// to match `other`'s dimensions first.
    pub fn copy_from(&mut self, other: &CellBuffer) {
        self.width = other.width;
        self.height = other.height;
        self.cells = other.cells.clone();
    }

    /// Iterate over all cells in row-major order, yielding `(x, y, &Cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u16;
            (i % width, i / width, cell)
        })
    }
}
