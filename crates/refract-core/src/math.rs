//! Small DSP math helpers shared by the stage effects.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`]
//!
//! # Waveshaping
//!
//! | Function | Character | Used by |
//! |----------|-----------|---------|
//! | [`soft_clip`] | Smooth tanh saturation | Volume Boost, Tape Saturation, Dreamscape |
//! | [`hard_clip`] | Flat tops, buzzy | Distortion, Megaphone |
//! | [`quantize`] | Stepped amplitude | Lo-Fi, 8-Bit, Bitcrusher |
//!
//! # Utilities
//!
//! - [`lerp`], [`ms_to_samples`], [`flush_denormal`], [`wet_dry_mix`], [`mono_sum`]
//! - [`equal_power_pan`] for the panning stages

/// Convert decibels to linear gain.
///
/// ```rust
/// use refract_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    (db * FACTOR).exp()
}

/// Convert linear gain to decibels. Inputs are floored at 1e-10.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    linear.max(1e-10).ln() * FACTOR
}

/// Soft clip using hyperbolic tangent. Output stays inside (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Hard clip to the ±threshold range.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Quantize a sample in [-1, 1] to the given bit depth.
///
/// `bits` is clamped to 1..=24.
#[inline]
pub fn quantize(x: f32, bits: u32) -> f32 {
    let levels = (1u32 << bits.clamp(1, 24)) as f32 * 0.5;
    (x * levels).round() / levels
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush values below 1e-20 to zero.
///
/// Feedback paths decay toward the subnormal range, where most CPUs slow
/// down dramatically.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals: 0.0 = all dry, 1.0 = all wet.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Sum stereo to mono.
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

/// Equal-power pan gains for a position in [-1 (left), 1 (right)].
///
/// Returns `(left_gain, right_gain)`; the squared gains always sum to 1.
#[inline]
pub fn equal_power_pan(position: f32) -> (f32, f32) {
    let angle = (position.clamp(-1.0, 1.0) + 1.0) * core::f32::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_known_values() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 0.001);
        assert!((db_to_linear(6.0206) - 2.0).abs() < 0.001);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 0.001);
    }

    #[test]
    fn test_soft_clip_bounds() {
        assert!(soft_clip(3.0) < 1.0);
        assert!(soft_clip(3.0) > 0.99);
        assert!(soft_clip(-3.0) > -1.0);
    }

    #[test]
    fn test_quantize_steps() {
        // 1 bit: levels at -1, 0, 1
        assert_eq!(quantize(0.4, 1), 0.0);
        assert_eq!(quantize(0.6, 1), 1.0);
        // 8 bits keeps small detail
        assert!((quantize(0.3, 8) - 0.3).abs() < 0.01);
    }

    #[test]
    fn test_equal_power_pan() {
        let (l, r) = equal_power_pan(0.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-5);

        let (l, r) = equal_power_pan(-1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
