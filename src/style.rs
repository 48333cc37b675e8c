//! `Style` — foreground/background color plus boolean attributes.

use crate::color::Rgb;

/// A cell or segment style: foreground/background color and attribute
/// flags. `Style::transparent()` is the compositor's "do not write"
/// sentinel (spec.md §3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// Foreground color, if set.
    pub fg: Option<Rgb>,
    /// Background color, if set.
    pub bg: Option<Rgb>,
    /// Bold attribute.
    pub bold: bool,
    /// Italic attribute.
    pub italic: bool,
    /// Underline attribute.
    pub underline: bool,
    /// Dim attribute.
    pub dim: bool,
    /// Transparency sentinel. When set, the compositor skips this cell
    /// entirely regardless of `fg`/`bg`.
    pub transparent: bool,
}

impl Style {
    /// A new, unstyled style (no color, no attributes, not transparent).
    pub fn new() -> Self {
        Self::default()
    }

    /// The transparency sentinel: "no write" during compositing.
    pub fn transparent() -> Self {
        Self {
            transparent: true,
            ..Self::default()
        }
    }

    /// Set the foreground color (builder pattern).
    #[must_use]
    pub fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color (builder pattern).
    #[must_use]
    pub fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Set the bold attribute (builder pattern).
    #[must_use]
    pub fn bold(mut self, on: bool) -> Self {
        self.bold = on;
        self
    }

    /// Set the italic attribute (builder pattern).
    #[must_use]
    pub fn italic(mut self, on: bool) -> Self {
        self.italic = on;
        self
    }

    /// Set the underline attribute (builder pattern).
    #[must_use]
    pub fn underline(mut self, on: bool) -> Self {
        self.underline = on;
        self
    }

    /// Set the dim attribute (builder pattern).
    #[must_use]
    pub fn dim(mut self, on: bool) -> Self {
        self.dim = on;
        self
    }

    /// Returns true if no color is set and no attribute is on (the default
    /// style, distinct from the transparency sentinel).
    pub fn is_empty(&self) -> bool {
        self.fg.is_none()
            && self.bg.is_none()
            && !self.bold
            && !self.italic
            && !self.underline
            && !self.dim
            && !self.transparent
    }

    /// Apply the compositor's per-layer color effects: multiply `fg` by
    /// `darken`, then (if `desaturate > 0`) mix `fg` toward luminance by
    /// `desaturate` (spec.md §4.3). `bg` is left untouched — only the
    /// foreground carries the glyph's visible color in this model.
    #[must_use]
    pub fn with_effects(mut self, darken: f32, desaturate: f32) -> Self {
        if let Some(fg) = self.fg {
            let mut fg = fg.darken(darken);
            if desaturate > 0.0 {
                fg = fg.desaturate(desaturate);
            }
            self.fg = Some(fg);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_and_not_transparent() {
        let s = Style::default();
        assert!(s.is_empty());
        assert!(!s.transparent);
    }

    #[test]
    fn transparent_sentinel() {
        let s = Style::transparent();
        assert!(s.transparent);
        assert!(s.fg.is_none());
    }

    #[test]
    fn builder_chain() {
        let s = Style::new().fg(Rgb::new(255, 0, 0)).bold(true).italic(true);
        assert_eq!(s.fg, Some(Rgb::new(255, 0, 0)));
        assert!(s.bold);
        assert!(s.italic);
        assert!(!s.is_empty());
    }

    #[test]
    fn with_effects_darkens_fg_only() {
        let s = Style::new().fg(Rgb::new(200, 200, 200)).bg(Rgb::new(10, 10, 10));
        let effected = s.with_effects(0.5, 0.0);
        assert_eq!(effected.fg, Some(Rgb::new(100, 100, 100)));
        assert_eq!(effected.bg, Some(Rgb::new(10, 10, 10)));
    }

    #[test]
    fn with_effects_noop_on_unset_fg() {
        let s = Style::new().bg(Rgb::new(10, 10, 10));
        let effected = s.with_effects(0.5, 1.0);
        assert_eq!(effected.fg, None);
    }
}
