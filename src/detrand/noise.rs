//! Deterministic integer noise (spec.md §4.8). Canonical output range for
//! every function here is `u16` `0..=65535` (SPEC_FULL.md §3.7's Open
//! Question decision) — the Graph's Audio-domain nodes rescale to
//! `[-1.0, 1.0]` at their own boundary, keeping this integer core bit-
//! identical across domains.

use super::math::{clamp, idiv};

const BIT_NOISE1: u32 = 0xB529_7A4D;
const BIT_NOISE2: u32 = 0x68E3_1DA4;
const BIT_NOISE3: u32 = 0x1B56_C4E9;
const Y_PRIME: i64 = 0x27D4_EB2F;

/// Hash a single integer with a seed into a `u16`. Squirrel3-style bit
/// mangling: fast, fully integer, and deterministic across platforms.
pub fn int_hash(x: i64, seed: u64) -> u16 {
    let mut mangled = x as u32;
    mangled = mangled.wrapping_mul(BIT_NOISE1);
    mangled = mangled.wrapping_add(seed as u32);
    mangled ^= mangled >> 8;
    mangled = mangled.wrapping_add(BIT_NOISE2);
    mangled ^= mangled << 8;
    mangled = mangled.wrapping_mul(BIT_NOISE3);
    mangled ^= mangled >> 8;
    (mangled >> 16) as u16
}

/// Hash a 2D lattice coordinate with a seed into a `u16`.
pub fn int_hash2d(x: i64, y: i64, seed: u64) -> u16 {
    let combined = x.wrapping_add(y.wrapping_mul(Y_PRIME));
    int_hash(combined, seed)
}

/// Raw lattice-point value noise: `int_hash2d` reinterpreted as the noise
/// value at integer lattice coordinate `(x, y)`.
pub fn value_noise_2d(x: i64, y: i64, seed: u64) -> u16 {
    int_hash2d(x, y, seed)
}

/// Bilinear-interpolated value noise over a lattice spaced `scale` units
/// apart. `scale <= 0` is treated as `1` (every point is its own lattice
/// cell, no interpolation).
pub fn smooth_noise_2d(x: i64, y: i64, scale: i64, seed: u64) -> u16 {
    let scale = scale.max(1);
    let cell_x = x.div_euclid(scale);
    let cell_y = y.div_euclid(scale);
    let frac_x = x.rem_euclid(scale);
    let frac_y = y.rem_euclid(scale);

    let tx = idiv(frac_x * 1000, scale);
    let ty = idiv(frac_y * 1000, scale);
    let tx = super::math::smoothstep(tx);
    let ty = super::math::smoothstep(ty);

    let v00 = value_noise_2d(cell_x, cell_y, seed) as i64;
    let v10 = value_noise_2d(cell_x + 1, cell_y, seed) as i64;
    let v01 = value_noise_2d(cell_x, cell_y + 1, seed) as i64;
    let v11 = value_noise_2d(cell_x + 1, cell_y + 1, seed) as i64;

    let top = super::math::lerp(v00, v10, tx);
    let bottom = super::math::lerp(v01, v11, tx);
    let value = super::math::lerp(top, bottom, ty);
    clamp(value, 0, 65535) as u16
}

/// Fractal (fractional Brownian motion) noise: sums `octaves` layers of
/// [`smooth_noise_2d`], halving the lattice scale and the contribution
/// weight each octave, normalised back to `0..=65535`.
///
/// With `octaves == 1` this is exactly [`smooth_noise_2d`] (spec.md §8
/// boundary behaviour).
pub fn fractal_noise_2d(x: i64, y: i64, octaves: u32, scale: i64, seed: u64) -> u16 {
    if octaves == 0 {
        return 0;
    }
    let mut total: i64 = 0;
    let mut total_weight: i64 = 0;
    let mut weight: i64 = 1000;
    let mut freq_scale = scale.max(1);

    for octave in 0..octaves {
        let octave_seed = seed.wrapping_add(u64::from(octave).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let n = smooth_noise_2d(x, y, freq_scale, octave_seed) as i64;
        total += n * weight;
        total_weight += weight;
        weight = (weight / 2).max(1);
        freq_scale = (freq_scale / 2).max(1);
    }

    if total_weight == 0 {
        return 0;
    }
    clamp(total / total_weight, 0, 65535) as u16
}
