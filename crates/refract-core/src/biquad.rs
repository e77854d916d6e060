//! Biquad (bi-quadratic) filter and RBJ cookbook coefficient design.
//!
//! [`Biquad`] is a mono Direct Form I section; [`FilterShape`] names the
//! response families the catalog uses and [`FilterShape::design`] turns a
//! shape, frequency and Q into normalized [`Coefficients`].

use core::f32::consts::PI;

/// Normalized biquad coefficients (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl Coefficients {
    /// Coefficients for `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let inv = 1.0 / a0;
        Self {
            b0: b0 * inv,
            b1: b1 * inv,
            b2: b2 * inv,
            a1: a1 * inv,
            a2: a2 * inv,
        }
    }
}

/// Filter response family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterShape {
    /// 12 dB/oct low-pass.
    LowPass,
    /// 12 dB/oct high-pass.
    HighPass,
    /// Constant 0 dB peak band-pass.
    BandPass,
    /// Low shelf with the given gain in dB.
    LowShelf(f32),
    /// High shelf with the given gain in dB.
    HighShelf(f32),
    /// Peaking bell with the given gain in dB.
    Peak(f32),
}

impl FilterShape {
    /// Designs coefficients for this shape.
    ///
    /// `frequency` is clamped to (10 Hz, 0.49 × sample rate) so that sweeps
    /// driven by modulation tasks never leave the stable region.
    pub fn design(self, frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
        let frequency = frequency.clamp(10.0, sample_rate * 0.49);
        let q = q.max(0.05);
        let omega = 2.0 * PI * frequency / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let alpha = sin_w / (2.0 * q);

        match self {
            Self::LowPass => {
                let b1 = 1.0 - cos_w;
                Coefficients::normalized(
                    b1 * 0.5,
                    b1,
                    b1 * 0.5,
                    1.0 + alpha,
                    -2.0 * cos_w,
                    1.0 - alpha,
                )
            }
            Self::HighPass => {
                let b1 = -(1.0 + cos_w);
                Coefficients::normalized(
                    -b1 * 0.5,
                    b1,
                    -b1 * 0.5,
                    1.0 + alpha,
                    -2.0 * cos_w,
                    1.0 - alpha,
                )
            }
            Self::BandPass => Coefficients::normalized(
                alpha,
                0.0,
                -alpha,
                1.0 + alpha,
                -2.0 * cos_w,
                1.0 - alpha,
            ),
            Self::Peak(gain_db) => {
                let a = 10f32.powf(gain_db / 40.0);
                Coefficients::normalized(
                    1.0 + alpha * a,
                    -2.0 * cos_w,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w,
                    1.0 - alpha / a,
                )
            }
            Self::LowShelf(gain_db) => {
                let a = 10f32.powf(gain_db / 40.0);
                let k = 2.0 * a.sqrt() * alpha;
                Coefficients::normalized(
                    a * ((a + 1.0) - (a - 1.0) * cos_w + k),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
                    a * ((a + 1.0) - (a - 1.0) * cos_w - k),
                    (a + 1.0) + (a - 1.0) * cos_w + k,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
                    (a + 1.0) + (a - 1.0) * cos_w - k,
                )
            }
            Self::HighShelf(gain_db) => {
                let a = 10f32.powf(gain_db / 40.0);
                let k = 2.0 * a.sqrt() * alpha;
                Coefficients::normalized(
                    a * ((a + 1.0) + (a - 1.0) * cos_w + k),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w),
                    a * ((a + 1.0) + (a - 1.0) * cos_w - k),
                    (a + 1.0) - (a - 1.0) * cos_w + k,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w),
                    (a + 1.0) - (a - 1.0) * cos_w - k,
                )
            }
        }
    }
}

/// Mono biquad section, Direct Form I.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: Coefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a passthrough biquad.
    pub fn new() -> Self {
        Self::with_coefficients(Coefficients::PASSTHROUGH)
    }

    /// Creates a biquad with the given coefficients and cleared state.
    pub fn with_coefficients(coeffs: Coefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the coefficients, keeping the filter history.
    pub fn set_coefficients(&mut self, coeffs: Coefficients) {
        self.coeffs = coeffs;
    }

    /// Returns the current coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);

        output
    }

    /// Clears the filter history.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(biquad: &mut Biquad, input: f32) -> f32 {
        let mut out = 0.0;
        for _ in 0..4800 {
            out = biquad.process(input);
        }
        out
    }

    fn sine_peak(biquad: &mut Biquad, freq: f32, sr: f32) -> f32 {
        let mut peak = 0.0f32;
        for i in 0..9600 {
            let x = (2.0 * PI * freq * i as f32 / sr).sin();
            let y = biquad.process(x);
            if i > 4800 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_passthrough() {
        let mut biquad = Biquad::new();
        assert_eq!(biquad.process(0.25), 0.25);
        assert_eq!(biquad.process(-0.5), -0.5);
    }

    #[test]
    fn test_lowpass_dc_gain() {
        let coeffs = FilterShape::LowPass.design(1000.0, 0.707, 48000.0);
        let mut biquad = Biquad::with_coefficients(coeffs);
        assert!((settle(&mut biquad, 1.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let coeffs = FilterShape::HighPass.design(1000.0, 0.707, 48000.0);
        let mut biquad = Biquad::with_coefficients(coeffs);
        assert!(settle(&mut biquad, 1.0).abs() < 0.01);
    }

    #[test]
    fn test_low_shelf_boosts_bass() {
        let coeffs = FilterShape::LowShelf(12.0).design(200.0, 0.707, 48000.0);
        let mut biquad = Biquad::with_coefficients(coeffs);
        let dc = settle(&mut biquad, 1.0);
        // +12 dB ~ 3.98x
        assert!((dc - 3.98).abs() < 0.1, "dc gain {dc}");
    }

    #[test]
    fn test_high_shelf_leaves_bass() {
        let coeffs = FilterShape::HighShelf(10.0).design(3000.0, 0.707, 48000.0);
        let mut biquad = Biquad::with_coefficients(coeffs);
        assert!((settle(&mut biquad, 1.0) - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_bandpass_attenuates_outside_band() {
        let sr = 48000.0;
        let coeffs = FilterShape::BandPass.design(1000.0, 2.0, sr);
        let mut center = Biquad::with_coefficients(coeffs);
        let mut far = Biquad::with_coefficients(coeffs);
        assert!(sine_peak(&mut center, 1000.0, sr) > 0.9);
        assert!(sine_peak(&mut far, 100.0, sr) < 0.2);
    }

    #[test]
    fn test_design_clamps_frequency() {
        let coeffs = FilterShape::LowPass.design(1.0e6, 0.707, 48000.0);
        assert!(coeffs.b0.is_finite() && coeffs.a1.is_finite());
    }
}
