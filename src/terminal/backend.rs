//! `TerminalBackend` — double-buffered diff rendering and ANSI emission
//! (spec.md §4.4).
//!
//! Each `present()` call diffs the incoming frame against the previous one
//! cell-by-cell, emits cursor moves only when output isn't already
//! positioned correctly, and elides SGR sequences for styles that didn't
//! change since the last written cell.

use std::fmt::Write as _;

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::Rgb;
use crate::error::Result;
use crate::style::Style;
use crate::terminal::traits::Terminal;

/// Owns the previous frame and renders the diff against each new frame.
pub struct TerminalBackend {
    previous: CellBuffer,
}

impl TerminalBackend {
    /// Create a backend tracking a blank previous frame of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            previous: CellBuffer::new(width, height),
        }
    }

    /// Resize the tracked previous frame. The next `present()` call will
    /// treat every cell as changed.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.previous = CellBuffer::new(width, height);
    }

    /// Diff `frame` against the previous frame, write the minimal ANSI
    /// output to `terminal`, flush, then adopt `frame` as the new previous
    /// frame.
    pub fn present(&mut self, frame: &CellBuffer, terminal: &mut dyn Terminal) -> Result<()> {
        let output = self.render_diff(frame);
        if !output.is_empty() {
            terminal.write_raw(output.as_bytes())?;
            terminal.flush()?;
        }
        self.previous.copy_from(frame);
        Ok(())
    }

    fn render_diff(&self, frame: &CellBuffer) -> String {
        let mut output = String::new();
        let mut last_pos: Option<(u16, u16)> = None;
        let mut last_style = Style::default();
        let mut style_active = false;

        for (x, y, cell) in frame.iter() {
            if cell.width == 0 {
                continue; // continuation cells never produce output directly
            }
            let prev = self.previous.get_cell(x, y);
            if *cell == prev {
                continue;
            }

            let need_move = !matches!(last_pos, Some((lx, ly)) if lx == x && ly == y);
            if need_move {
                let _ = write!(output, "\x1b[{};{}H", y + 1, x + 1);
            }

            write_style_diff(&mut output, &last_style, &cell.style, style_active);
            last_style = cell.style;
            style_active = true;

            output.push_str(&cell.grapheme);
            last_pos = Some((x + u16::from(cell.width), y));
        }

        if style_active && !last_style.is_empty() {
            output.push_str("\x1b[0m");
        }
        output
    }
}

fn needs_reset(prev: &Style, next: &Style) -> bool {
    (prev.bold && !next.bold)
        || (prev.dim && !next.dim)
        || (prev.italic && !next.italic)
        || (prev.underline && !next.underline)
}

fn write_style_diff(output: &mut String, prev: &Style, next: &Style, active: bool) {
    if !active || needs_reset(prev, next) {
        if active && !prev.is_empty() {
            output.push_str("\x1b[0m");
        }
        write_full_style(output, next);
        return;
    }

    if prev.fg != next.fg {
        write_fg(output, next.fg);
    }
    if prev.bg != next.bg {
        write_bg(output, next.bg);
    }
    if !prev.bold && next.bold {
        output.push_str("\x1b[1m");
    }
    if !prev.dim && next.dim {
        output.push_str("\x1b[2m");
    }
    if !prev.italic && next.italic {
        output.push_str("\x1b[3m");
    }
    if !prev.underline && next.underline {
        output.push_str("\x1b[4m");
    }
}

fn write_full_style(output: &mut String, style: &Style) {
    write_fg(output, style.fg);
    write_bg(output, style.bg);
    if style.bold {
        output.push_str("\x1b[1m");
    }
    if style.dim {
        output.push_str("\x1b[2m");
    }
    if style.italic {
        output.push_str("\x1b[3m");
    }
    if style.underline {
        output.push_str("\x1b[4m");
    }
}

fn write_fg(output: &mut String, color: Option<Rgb>) {
    if let Some(Rgb { r, g, b }) = color {
        let _ = write!(output, "\x1b[38;2;{r};{g};{b}m");
    }
}

fn write_bg(output: &mut String, color: Option<Rgb>) {
    if let Some(Rgb { r, g, b }) = color {
        let _ = write!(output, "\x1b[48;2;{r};{g};{b}m");
    }
}
