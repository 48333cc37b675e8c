//! `Compositor` — flattens a [`crate::layer_stack::LayerStack`] into a
//! single [`CellBuffer`] (spec.md §4.3).
//!
//! Compose runs in four steps: clear the target with the theme background,
//! visit layers low-to-high z (auto-depth: ties keep insertion order),
//! apply each layer's parallax offset, then write every non-transparent
//! cell through the layer's darken/desaturate effects.

use crate::buffer::CellBuffer;
use crate::layer_stack::LayerStack;
use crate::style::Style;

/// Compositor: flattens layers into a caller-owned target buffer. Carries
/// its own auto-depth range rather than a global, so independent
/// `Lifecycle` instances (e.g. concurrent tests) never share auto-depth
/// state (spec.md §9 "global mutable state").
#[derive(Debug, Default)]
pub struct Compositor {
    /// Darken range `(min, max)` auto-depth maps the observed z-range onto,
    /// or `None` when disabled.
    auto_depth: Option<(f32, f32)>,
}

impl Compositor {
    /// Create a compositor with auto-depth disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable auto-depth: each visible layer's `darken` is overridden, for
    /// composing only, by linearly mapping its `z` over the observed
    /// `z`-range of all visible layers onto `[min, max]` (spec.md §4.3 step
    /// 3). Layers' own `z` and stored `effects.darken` are never mutated —
    /// this only changes what `compose` writes into `target`.
    pub fn enable_auto_depth(&mut self, min: f32, max: f32) {
        self.auto_depth = Some((min, max));
    }

    /// Disable auto-depth; layers compose using their own `effects.darken`
    /// again.
    pub fn disable_auto_depth(&mut self) {
        self.auto_depth = None;
    }

    /// Compose all visible layers of `stack` onto `target`, which is first
    /// cleared with `theme_bg`. `target`'s existing dimensions are used as
    /// the compose viewport; callers resize it before calling.
    pub fn compose(&self, stack: &LayerStack, target: &mut CellBuffer, theme_bg: Style) {
        target.clear(theme_bg);
        let depth = self.auto_depth.map(|(min, max)| (min, max, Self::z_range(stack)));
        for layer in stack.iter_sorted() {
            if !layer.visible {
                continue;
            }
            let darken = match depth {
                Some((min, max, (z_min, z_max))) => {
                    let t = if z_max > z_min {
                        (layer.z - z_min) as f32 / (z_max - z_min) as f32
                    } else {
                        0.0
                    };
                    min + (max - min) * t
                }
                None => layer.effects.darken,
            };
            self.composite_layer(layer, target, darken);
        }
    }

    /// `(min, max)` of `z` across the stack's visible layers; `(0, 0)` if
    /// none are visible.
    fn z_range(stack: &LayerStack) -> (i32, i32) {
        stack
            .iter_sorted()
            .filter(|l| l.visible)
            .fold(None, |acc: Option<(i32, i32)>, l| match acc {
                Some((lo, hi)) => Some((lo.min(l.z), hi.max(l.z))),
                None => Some((l.z, l.z)),
            })
            .unwrap_or((0, 0))
    }

    fn composite_layer(&self, layer: &crate::layer::Layer, target: &mut CellBuffer, darken: f32) {
        let effects = layer.effects;
        for (x, y, cell) in layer.buffer.iter() {
            if cell.is_transparent() {
                continue;
            }
            let dx = i32::from(x) + effects.offset_x;
            let dy = i32::from(y) + effects.offset_y;
            if dx < 0 || dy < 0 || dx > i32::from(u16::MAX) || dy > i32::from(u16::MAX) {
                continue;
            }
            let styled = cell.style.with_effects(darken, effects.desaturate);
            target.write(dx as u16, dy as u16, &cell.grapheme, styled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn compose_clears_with_theme_bg() {
        let stack = LayerStack::new();
        let mut target = CellBuffer::new(2, 2);
        let theme = Style::new().bg(Rgb::new(1, 1, 1));
        Compositor::new().compose(&stack, &mut target, theme);
        assert_eq!(target.get_cell(0, 0).style.bg, Some(Rgb::new(1, 1, 1)));
    }

    #[test]
    fn higher_z_layer_wins() {
        let mut stack = LayerStack::new();
        stack.add_layer("bg", 2, 2).ok();
        stack.add_layer("fg", 2, 2).ok();
        stack.set_z("fg", 1).ok();
        if let Ok(buf) = stack.resolve("bg") {
            buf.write(0, 0, "B", Style::default());
        }
        if let Ok(buf) = stack.resolve("fg") {
            buf.write(0, 0, "F", Style::default());
        }
        let mut target = CellBuffer::new(2, 2);
        Compositor::new().compose(&stack, &mut target, Style::default());
        assert_eq!(target.get_cell(0, 0).grapheme, "F");
    }

    #[test]
    fn transparent_cells_let_layer_below_show() {
        let mut stack = LayerStack::new();
        stack.add_layer("bg", 2, 2).ok();
        stack.add_layer("fg", 2, 2).ok();
        stack.set_z("fg", 1).ok();
        if let Ok(buf) = stack.resolve("bg") {
            buf.write(0, 0, "B", Style::default());
        }
        if let Ok(buf) = stack.resolve("fg") {
            buf.clear_transparent();
        }
        let mut target = CellBuffer::new(2, 2);
        Compositor::new().compose(&stack, &mut target, Style::default());
        assert_eq!(target.get_cell(0, 0).grapheme, "B");
    }

    #[test]
    fn invisible_layer_skipped() {
        let mut stack = LayerStack::new();
        stack.add_layer("hidden", 2, 2).ok();
        stack.set_visible("hidden", false).ok();
        if let Ok(buf) = stack.resolve("hidden") {
            buf.write(0, 0, "X", Style::default());
        }
        let mut target = CellBuffer::new(2, 2);
        Compositor::new().compose(&stack, &mut target, Style::default());
        assert!(target.get_cell(0, 0).is_blank());
    }

    #[test]
    fn offset_shifts_layer_content() {
        let mut stack = LayerStack::new();
        stack.add_layer("parallax", 2, 2).ok();
        if let Ok(buf) = stack.resolve("parallax") {
            buf.write(0, 0, "P", Style::default());
        }
        stack
            .set_effects(
                "parallax",
                crate::layer::LayerEffects {
                    offset_x: 1,
                    offset_y: 1,
                    ..Default::default()
                },
            )
            .ok();
        let mut target = CellBuffer::new(3, 3);
        Compositor::new().compose(&stack, &mut target, Style::default());
        assert_eq!(target.get_cell(1, 1).grapheme, "P");
        assert!(target.get_cell(0, 0).is_blank());
    }

    #[test]
    fn darken_effect_applied_on_compose() {
        let mut stack = LayerStack::new();
        stack.add_layer("dim", 1, 1).ok();
        if let Ok(buf) = stack.resolve("dim") {
            buf.write(0, 0, "X", Style::new().fg(Rgb::new(200, 200, 200)));
        }
        let mut target = CellBuffer::new(1, 1);
        Compositor::new().compose(&stack, &mut target, Style::default());
        // darken defaults to 1.0 (identity) absent explicit effects.
        assert_eq!(target.get_cell(0, 0).style.fg, Some(Rgb::new(200, 200, 200)));
    }

    #[test]
    fn auto_depth_maps_z_range_onto_darken_without_mutating_z() {
        let mut stack = LayerStack::new();
        stack.add_layer("near", 1, 1).ok();
        stack.add_layer("mid", 1, 1).ok();
        stack.add_layer("far", 1, 1).ok();
        stack.set_z("near", 0).ok();
        stack.set_z("mid", 5).ok();
        stack.set_z("far", 10).ok();
        for id in ["near", "mid", "far"] {
            if let Ok(buf) = stack.resolve(id) {
                buf.write(0, 0, "X", Style::new().fg(Rgb::new(200, 200, 200)));
            }
        }

        let mut compositor = Compositor::new();
        compositor.enable_auto_depth(0.2, 1.0);

        let mut target = CellBuffer::new(1, 1);
        // Compose once per layer in isolation (by hiding the others) so the
        // resulting darken for that layer is directly observable in the
        // single target cell.
        for (id, expect_t) in [("near", 0.0_f32), ("mid", 0.5), ("far", 1.0)] {
            stack.set_visible("near", id == "near").ok();
            stack.set_visible("mid", id == "mid").ok();
            stack.set_visible("far", id == "far").ok();
            compositor.compose(&stack, &mut target, Style::default());
            let expected = (200.0 * (0.2 + 0.8 * expect_t)).round() as u8;
            assert_eq!(target.get_cell(0, 0).style.fg, Some(Rgb::new(expected, expected, expected)));
        }

        // z itself was never mutated by auto-depth.
        assert_eq!(stack.get_by_id("near").map(|l| l.z), Ok(0));
        assert_eq!(stack.get_by_id("mid").map(|l| l.z), Ok(5));
        assert_eq!(stack.get_by_id("far").map(|l| l.z), Ok(10));
    }

    #[test]
    fn auto_depth_disabled_uses_layer_own_darken() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", 1, 1).ok();
        if let Ok(buf) = stack.resolve("a") {
            buf.write(0, 0, "X", Style::new().fg(Rgb::new(200, 200, 200)));
        }
        let mut target = CellBuffer::new(1, 1);
        Compositor::new().compose(&stack, &mut target, Style::default());
        assert_eq!(target.get_cell(0, 0).style.fg, Some(Rgb::new(200, 200, 200)));
    }
}
