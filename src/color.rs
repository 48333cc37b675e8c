//! `Rgb` — the 8-bit-per-channel true color used throughout the rendering
//! core (spec.md §3: "Style — foreground/background RGB (8-bit per
//! channel)").
//!
//! This is distinct from [`crate::detrand::color::RgbColor`], the
//! integer-domain color primitive used by procedural generation: that one
//! is reachable from pure, seed-only code with no terminal dependency,
//! while this one exists to be emitted as a true-color SGR sequence.

use crate::error::{Error, Result};

/// An 8-bit-per-channel RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// White.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Parse a hex color string like `"#rrggbb"` or `"#rgb"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[2..4], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[4..6], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                Ok(Self::new(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[1..2], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[2..3], 16)
                    .map_err(|e| Error::Render(format!("invalid hex color: {e}")))?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(Error::Render(format!(
                "invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            ))),
        }
    }

    /// Linearly interpolate between two colors. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Multiply every channel by `factor`, clamped to `[0, 1]`. Used by the
    /// compositor's per-layer `darken` effect (spec.md §4.3).
    #[must_use]
    pub fn darken(self, factor: f32) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| -> u8 { (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8 };
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Perceptual luminance, `Y = 0.299R + 0.587G + 0.114B` (spec.md §4.3).
    pub fn luminance(self) -> f32 {
        0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)
    }

    /// Mix this color toward its own luminance (greyscale) by `factor`,
    /// clamped to `[0, 1]`. Used by the compositor's per-layer `desaturate`
    /// effect.
    #[must_use]
    pub fn desaturate(self, factor: f32) -> Rgb {
        if factor <= 0.0 {
            return self;
        }
        let y = self.luminance().round().clamp(0.0, 255.0) as u8;
        self.lerp(Rgb::new(y, y, y), factor)
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(color: Rgb) -> Self {
        crossterm::style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

impl From<&Rgb> for crossterm::style::Color {
    fn from(color: &Rgb) -> Self {
        (*color).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_6_digit() {
        let c = Rgb::from_hex("#1e1e2e").ok();
        assert_eq!(c, Some(Rgb::new(30, 30, 46)));
    }

    #[test]
    fn hex_3_digit() {
        let c = Rgb::from_hex("#f0a").ok();
        assert_eq!(c, Some(Rgb::new(255, 0, 170)));
    }

    #[test]
    fn hex_no_hash() {
        let c = Rgb::from_hex("ff0000").ok();
        assert_eq!(c, Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn hex_invalid() {
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("#1234").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn crossterm_conversion() {
        let ct: crossterm::style::Color = Rgb::new(1, 2, 3).into();
        assert_eq!(ct, crossterm::style::Color::Rgb { r: 1, g: 2, b: 3 });
    }

    #[test]
    fn darken_full_is_identity() {
        let c = Rgb::new(100, 150, 200);
        assert_eq!(c.darken(1.0), c);
    }

    #[test]
    fn darken_zero_is_black() {
        let c = Rgb::new(100, 150, 200);
        assert_eq!(c.darken(0.0), Rgb::BLACK);
    }

    #[test]
    fn desaturate_zero_is_identity() {
        let c = Rgb::new(10, 200, 30);
        assert_eq!(c.desaturate(0.0), c);
    }

    #[test]
    fn desaturate_full_is_greyscale() {
        let c = Rgb::new(10, 200, 30);
        let g = c.desaturate(1.0);
        assert_eq!(g.r, g.g);
        assert_eq!(g.g, g.b);
    }

    #[test]
    fn lerp_at_zero_and_one() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(100, 100, 100);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }
}
