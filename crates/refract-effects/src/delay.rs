//! Delay-based stages.
//!
//! - [`FeedbackDelay`]: echo and ping pong
//! - [`ModulatedDelay`]: vibrato, chorus, flanger and cassette wow, with the
//!   delay offset written by a modulation task
//! - [`Ensemble`]: several detuned voices for the choir effect

use refract_core::{
    DelayLine, Effect, Lfo, SharedParam, SmoothedParam, flush_denormal, mono_sum,
    ms_to_samples, wet_dry_mix,
};

/// Fixed-time feedback delay.
///
/// In ping-pong mode each channel's feedback is written into the opposite
/// channel, so repeats alternate sides.
///
/// ```rust
/// use refract_effects::FeedbackDelay;
/// use refract_core::Effect;
///
/// let mut echo = FeedbackDelay::new(300.0, 0.4, 0.35);
/// echo.set_sample_rate(48000.0);
/// let (l, _) = echo.process_stereo(1.0, 1.0);
/// assert!((l - 0.65).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    time_ms: f32,
    feedback: f32,
    mix: f32,
    ping_pong: bool,
    delay_samples: f32,
    left: DelayLine,
    right: DelayLine,
}

impl FeedbackDelay {
    /// Creates an echo with `feedback` clamped below 0.95.
    pub fn new(time_ms: f32, feedback: f32, mix: f32) -> Self {
        let mut delay = Self {
            time_ms: time_ms.max(1.0),
            feedback: feedback.clamp(0.0, 0.95),
            mix: mix.clamp(0.0, 1.0),
            ping_pong: false,
            delay_samples: 0.0,
            left: DelayLine::new(2),
            right: DelayLine::new(2),
        };
        delay.set_sample_rate(48000.0);
        delay
    }

    /// Cross-feeds the channels.
    pub fn ping_pong(mut self) -> Self {
        self.ping_pong = true;
        self
    }
}

impl Effect for FeedbackDelay {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let wet_l = self.left.read(self.delay_samples);
        let wet_r = self.right.read(self.delay_samples);
        let (fb_l, fb_r) = if self.ping_pong {
            (wet_r, wet_l)
        } else {
            (wet_l, wet_r)
        };
        if self.ping_pong {
            // Input enters on the left only, so repeats alternate sides.
            self.left
                .write(flush_denormal(mono_sum(left, right) + fb_l * self.feedback));
            self.right.write(flush_denormal(fb_r * self.feedback));
        } else {
            self.left.write(flush_denormal(left + fb_l * self.feedback));
            self.right.write(flush_denormal(right + fb_r * self.feedback));
        }
        (
            wet_dry_mix(left, wet_l, self.mix),
            wet_dry_mix(right, wet_r, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.delay_samples = ms_to_samples(self.time_ms, sample_rate);
        self.left = DelayLine::new(self.delay_samples as usize + 2);
        self.right = DelayLine::new(self.delay_samples as usize + 2);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

/// Delay whose time is `base_ms + offset_ms`, where the offset comes from a
/// [`SharedParam`] written by a modulation task.
///
/// With `mix = 1.0` only the delayed signal is heard (pitch vibrato); lower
/// mixes give chorus, and feedback with a short base gives flanging.
#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    base_ms: f32,
    max_offset_ms: f32,
    feedback: f32,
    mix: f32,
    offset: SharedParam,
    smoothed_ms: SmoothedParam,
    sample_rate: f32,
    left: DelayLine,
    right: DelayLine,
}

impl ModulatedDelay {
    /// Creates the stage. The offset is clamped to ±`max_offset_ms`.
    pub fn new(base_ms: f32, max_offset_ms: f32, offset: SharedParam) -> Self {
        let start = base_ms + offset.get();
        let mut delay = Self {
            base_ms: base_ms.max(0.1),
            max_offset_ms: max_offset_ms.abs(),
            feedback: 0.0,
            mix: 1.0,
            offset,
            smoothed_ms: SmoothedParam::new(start, 48000.0, 5.0),
            sample_rate: 48000.0,
            left: DelayLine::new(2),
            right: DelayLine::new(2),
        };
        delay.set_sample_rate(48000.0);
        delay
    }

    /// Sets the feedback amount (clamped to ±0.9).
    pub fn with_feedback(mut self, feedback: f32) -> Self {
        self.feedback = feedback.clamp(-0.9, 0.9);
        self
    }

    /// Sets the wet/dry mix.
    pub fn with_mix(mut self, mix: f32) -> Self {
        self.mix = mix.clamp(0.0, 1.0);
        self
    }

    /// Delay time currently applied, in milliseconds.
    pub fn current_delay_ms(&self) -> f32 {
        self.smoothed_ms.get()
    }
}

impl Effect for ModulatedDelay {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let offset = self
            .offset
            .get()
            .clamp(-self.max_offset_ms, self.max_offset_ms);
        self.smoothed_ms.set_target((self.base_ms + offset).max(0.05));
        let delay = ms_to_samples(self.smoothed_ms.advance(), self.sample_rate);

        let wet_l = self.left.read(delay);
        let wet_r = self.right.read(delay);
        self.left
            .write(flush_denormal(left + wet_l * self.feedback));
        self.right
            .write(flush_denormal(right + wet_r * self.feedback));
        (
            wet_dry_mix(left, wet_l, self.mix),
            wet_dry_mix(right, wet_r, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.smoothed_ms.set_sample_rate(sample_rate);
        let capacity = ms_to_samples(self.base_ms + self.max_offset_ms + 1.0, sample_rate);
        self.left = DelayLine::new(capacity as usize + 2);
        self.right = DelayLine::new(capacity as usize + 2);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.smoothed_ms.snap_to_target();
    }
}

/// Several slightly detuned delay voices summed over the dry signal.
#[derive(Debug, Clone)]
pub struct Ensemble {
    voices: Vec<(Lfo, f32)>,
    depth_ms: f32,
    mix: f32,
    sample_rate: f32,
    left: DelayLine,
    right: DelayLine,
}

impl Ensemble {
    /// Creates `voices` voices centered around 20–35 ms with `depth_ms`
    /// of LFO sweep each.
    pub fn new(voices: usize, depth_ms: f32, mix: f32) -> Self {
        let count = voices.max(1);
        let voices = (0..count)
            .map(|i| {
                let spread = i as f32 / count as f32;
                let lfo = Lfo::new(0.2 + 0.17 * i as f32).with_phase(spread);
                (lfo, 20.0 + 15.0 * spread)
            })
            .collect();
        let mut ensemble = Self {
            voices,
            depth_ms: depth_ms.abs(),
            mix: mix.clamp(0.0, 1.0),
            sample_rate: 48000.0,
            left: DelayLine::new(2),
            right: DelayLine::new(2),
        };
        ensemble.set_sample_rate(48000.0);
        ensemble
    }

    /// Number of voices.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
}

impl Effect for Ensemble {
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.left.write(left);
        self.right.write(right);

        let dt = 1.0 / self.sample_rate;
        let norm = 1.0 / self.voices.len() as f32;
        let (mut sum_l, mut sum_r) = (0.0, 0.0);
        for (i, (lfo, base_ms)) in self.voices.iter_mut().enumerate() {
            let ms = *base_ms + lfo.advance(dt) * self.depth_ms;
            let delay = ms_to_samples(ms, self.sample_rate);
            // Alternate voices lean left and right.
            let (gl, gr) = if i % 2 == 0 { (0.7, 0.3) } else { (0.3, 0.7) };
            sum_l += self.left.read(delay) * gl * 2.0;
            sum_r += self.right.read(delay) * gr * 2.0;
        }
        (
            wet_dry_mix(left, sum_l * norm, self.mix),
            wet_dry_mix(right, sum_r * norm, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let capacity = ms_to_samples(40.0 + self.depth_ms, sample_rate) as usize + 2;
        self.left = DelayLine::new(capacity);
        self.right = DelayLine::new(capacity);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        for (lfo, _) in &mut self.voices {
            lfo.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(effect: &mut dyn Effect, len: usize) -> (Vec<f32>, Vec<f32>) {
        (0..len)
            .map(|i| {
                let x = if i == 0 { 1.0 } else { 0.0 };
                effect.process_stereo(x, x)
            })
            .unzip()
    }

    #[test]
    fn test_echo_repeats() {
        let mut echo = FeedbackDelay::new(10.0, 0.5, 1.0);
        echo.set_sample_rate(1000.0);
        let (left, _) = impulse_response(&mut echo, 40);
        assert_eq!(left[10], 1.0);
        assert_eq!(left[20], 0.5);
        assert_eq!(left[30], 0.25);
    }

    #[test]
    fn test_ping_pong_alternates() {
        let mut delay = FeedbackDelay::new(10.0, 0.5, 1.0).ping_pong();
        delay.set_sample_rate(1000.0);
        let (left, right) = impulse_response(&mut delay, 40);
        assert_eq!(left[10], 1.0);
        assert_eq!(right[10], 0.0);
        assert_eq!(right[20], 0.5);
        assert_eq!(left[20], 0.0);
        assert_eq!(left[30], 0.25);
    }

    #[test]
    fn test_modulated_delay_follows_offset() {
        let offset = SharedParam::new(0.0);
        let mut vibrato = ModulatedDelay::new(5.0, 3.0, offset.clone());
        vibrato.set_sample_rate(48000.0);
        offset.set(2.0);
        for _ in 0..4800 {
            vibrato.process_stereo(0.0, 0.0);
        }
        assert!((vibrato.current_delay_ms() - 7.0).abs() < 0.01);

        // Offsets beyond the range are clamped.
        offset.set(50.0);
        for _ in 0..4800 {
            vibrato.process_stereo(0.0, 0.0);
        }
        assert!((vibrato.current_delay_ms() - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_flanger_feedback_stays_finite() {
        let offset = SharedParam::new(0.0);
        let mut flanger = ModulatedDelay::new(2.0, 1.5, offset)
            .with_feedback(0.9)
            .with_mix(0.5);
        flanger.set_sample_rate(48000.0);
        for i in 0..48000 {
            let x = if i % 100 == 0 { 1.0 } else { 0.0 };
            let (l, r) = flanger.process_stereo(x, x);
            assert!(l.is_finite() && r.is_finite());
        }
    }

    #[test]
    fn test_ensemble_voices() {
        let mut choir = Ensemble::new(3, 4.0, 0.5);
        choir.set_sample_rate(48000.0);
        assert_eq!(choir.voice_count(), 3);
        let (left, _) = impulse_response(&mut choir, 4800);
        assert_eq!(left[0], 0.5);
        assert!(left[900..1800].iter().any(|s| s.abs() > 0.01));
    }
}
