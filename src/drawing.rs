//! Draw helpers that resolve a layer id to its buffer and write through it
//! (spec.md §4.2). Scripting-facing calls go through these rather than
//! touching [`crate::buffer::CellBuffer`] directly so a missing layer
//! degrades to a no-op instead of panicking (spec.md §9).

use crate::geometry::Rect;
use crate::layer_stack::LayerStack;
use crate::style::Style;

/// Write a single grapheme to `layer_id` at `(x, y)`. No-op if the layer
/// does not exist.
pub fn draw(stack: &mut LayerStack, layer_id: &str, x: u16, y: u16, grapheme: &str, style: Style) {
    if let Ok(buf) = stack.resolve(layer_id) {
        buf.write(x, y, grapheme, style);
    }
}

/// Draw left-to-right, non-wrapping text on `layer_id` at `(x, y)`.
pub fn draw_text(stack: &mut LayerStack, layer_id: &str, x: u16, y: u16, text: &str, style: Style) {
    if let Ok(buf) = stack.resolve(layer_id) {
        buf.write_text(x, y, text, style);
    }
}

/// Fill a rectangle with a border-drawing-safe box character, then leave
/// the interior untouched — a thin outline, not a filled panel. `ch`
/// supplies the border glyph (e.g. `"#"` or a box-drawing character).
pub fn fill_box(
    stack: &mut LayerStack,
    layer_id: &str,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    ch: &str,
    style: Style,
) {
    let Ok(buf) = stack.resolve(layer_id) else {
        return;
    };
    if w == 0 || h == 0 {
        return;
    }
    for col in x..x.saturating_add(w) {
        buf.write(col, y, ch, style);
        buf.write(col, y.saturating_add(h - 1), ch, style);
    }
    for row in y..y.saturating_add(h) {
        buf.write(x, row, ch, style);
        buf.write(x.saturating_add(w - 1), row, ch, style);
    }
}

/// Draw a filled rectangular panel: background fill plus an optional
/// single-line label centered on the top edge.
pub fn draw_panel(
    stack: &mut LayerStack,
    layer_id: &str,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    fill_style: Style,
    label: Option<&str>,
    label_style: Style,
) {
    let Ok(buf) = stack.resolve(layer_id) else {
        return;
    };
    buf.fill_rect(x, y, w, h, " ", fill_style);
    if let Some(text) = label {
        let label_len = text.chars().count() as u16;
        let label_x = x.saturating_add(w.saturating_sub(label_len) / 2);
        buf.write_text(label_x, y, text, label_style);
    }
}

/// Draw a single-line label (no background fill).
pub fn draw_label(stack: &mut LayerStack, layer_id: &str, x: u16, y: u16, text: &str, style: Style) {
    draw_text(stack, layer_id, x, y, text, style);
}

/// Draw a bracketed button: `[ text ]`, with the brackets in `style` and
/// the label in `label_style`. Returns the button's clickable `Rect`
/// (`None` if the layer doesn't exist) — hit-testing a mouse click against
/// it is the caller's responsibility; this module doesn't know about
/// [`crate::event_router::EventRouter`].
pub fn draw_button(
    stack: &mut LayerStack,
    layer_id: &str,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
    label_style: Style,
) -> Option<Rect> {
    let buf = stack.resolve(layer_id).ok()?;
    let width = text.chars().count() as u16 + 2;
    buf.write(x, y, "[", style);
    buf.write_text(x.saturating_add(1), y, text, label_style);
    let close_x = x.saturating_add(1).saturating_add(text.chars().count() as u16);
    buf.write(close_x, y, "]", style);
    Some(Rect::new(x, y, width, 1))
}
