//! Time-slicing stages: reversed echo windows and random stutter.

use refract_core::{Effect, Noise, ms_to_samples, wet_dry_mix};

/// Length of the fade applied at each reversed window edge, in samples.
const EDGE_FADE: usize = 64;

/// Plays each fixed-length window of input backwards while the next one
/// records, so the wet signal trails the dry by one window.
///
/// ```rust
/// use refract_effects::ReverseDelay;
/// use refract_core::Effect;
///
/// let mut reverse = ReverseDelay::new(250.0, 0.5);
/// reverse.set_sample_rate(48000.0);
/// // The first window plays back silence.
/// assert_eq!(reverse.process_stereo(1.0, 1.0), (0.5, 0.5));
/// ```
#[derive(Debug, Clone)]
pub struct ReverseDelay {
    window_ms: f32,
    mix: f32,
    recording: [Vec<f32>; 2],
    playing: [Vec<f32>; 2],
    pos: usize,
}

impl ReverseDelay {
    /// Creates a reverser with `window_ms` windows and the given wet/dry mix.
    pub fn new(window_ms: f32, mix: f32) -> Self {
        let mut reverse = Self {
            window_ms: window_ms.max(1.0),
            mix: mix.clamp(0.0, 1.0),
            recording: [Vec::new(), Vec::new()],
            playing: [Vec::new(), Vec::new()],
            pos: 0,
        };
        reverse.set_sample_rate(48000.0);
        reverse
    }

    /// Window length in samples.
    pub fn window_len(&self) -> usize {
        self.playing[0].len()
    }

    fn edge_gain(&self) -> f32 {
        let len = self.window_len();
        let fade = EDGE_FADE.min(len / 2).max(1);
        let from_edge = self.pos.min(len - 1 - self.pos);
        (from_edge as f32 / fade as f32).min(1.0)
    }
}

impl Effect for ReverseDelay {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let len = self.window_len();
        let back = len - 1 - self.pos;
        let gain = self.edge_gain();
        let wet_l = self.playing[0][back] * gain;
        let wet_r = self.playing[1][back] * gain;
        self.recording[0][self.pos] = left;
        self.recording[1][self.pos] = right;

        self.pos += 1;
        if self.pos == len {
            self.pos = 0;
            core::mem::swap(&mut self.recording, &mut self.playing);
        }
        (
            wet_dry_mix(left, wet_l, self.mix),
            wet_dry_mix(right, wet_r, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let len = (ms_to_samples(self.window_ms, sample_rate) as usize).max(2);
        self.recording = [vec![0.0; len], vec![0.0; len]];
        self.playing = [vec![0.0; len], vec![0.0; len]];
        self.pos = 0;
    }

    fn reset(&mut self) {
        for buf in self.recording.iter_mut().chain(self.playing.iter_mut()) {
            buf.fill(0.0);
        }
        self.pos = 0;
    }

    fn latency_samples(&self) -> usize {
        self.window_len()
    }
}

/// Random stutter: at each slice boundary, with some probability, the slice
/// just heard is repeated a few times instead of passing new input through.
#[derive(Debug, Clone)]
pub struct Glitch {
    slice_ms: f32,
    probability: f32,
    max_repeats: u32,
    noise: Noise,
    slice: [Vec<f32>; 2],
    pos: usize,
    repeats_left: u32,
}

impl Glitch {
    /// Creates a stutter with `slice_ms` slices, triggering with `probability`
    /// per slice and repeating up to `max_repeats` times.
    pub fn new(slice_ms: f32, probability: f32, max_repeats: u32) -> Self {
        let mut glitch = Self {
            slice_ms: slice_ms.max(1.0),
            probability: probability.clamp(0.0, 1.0),
            max_repeats: max_repeats.max(1),
            noise: Noise::new(0x0611_7C40),
            slice: [Vec::new(), Vec::new()],
            pos: 0,
            repeats_left: 0,
        };
        glitch.set_sample_rate(48000.0);
        glitch
    }

    /// True while a captured slice is being repeated.
    pub fn is_stuttering(&self) -> bool {
        self.repeats_left > 0
    }

    fn slice_len(&self) -> usize {
        self.slice[0].len()
    }
}

impl Effect for Glitch {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let out = if self.repeats_left > 0 {
            (self.slice[0][self.pos], self.slice[1][self.pos])
        } else {
            self.slice[0][self.pos] = left;
            self.slice[1][self.pos] = right;
            (left, right)
        };

        self.pos += 1;
        if self.pos == self.slice_len() {
            self.pos = 0;
            if self.repeats_left > 0 {
                self.repeats_left -= 1;
            } else if self.noise.chance(self.probability) {
                let span = self.noise.next_unipolar() * self.max_repeats as f32;
                self.repeats_left = (span as u32 + 1).min(self.max_repeats);
            }
        }
        out
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let len = (ms_to_samples(self.slice_ms, sample_rate) as usize).max(1);
        self.slice = [vec![0.0; len], vec![0.0; len]];
        self.pos = 0;
        self.repeats_left = 0;
    }

    fn reset(&mut self) {
        self.slice[0].fill(0.0);
        self.slice[1].fill(0.0);
        self.pos = 0;
        self.repeats_left = 0;
        self.noise.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_plays_previous_window_backwards() {
        let mut reverse = ReverseDelay::new(1000.0, 1.0);
        reverse.set_sample_rate(200.0);
        assert_eq!(reverse.window_len(), 200);
        for i in 0..200 {
            reverse.process_stereo(i as f32, i as f32);
        }
        // Middle of the next window, away from the edge fades.
        let mut out = Vec::new();
        for _ in 0..200 {
            out.push(reverse.process_stereo(0.0, 0.0).0);
        }
        assert_eq!(out[100], 99.0);
        assert_eq!(out[101], 98.0);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_glitch_never_stutters_at_zero_probability() {
        let mut glitch = Glitch::new(10.0, 0.0, 4);
        glitch.set_sample_rate(48000.0);
        for i in 0..48000 {
            let x = (i as f32 * 0.01).sin();
            assert_eq!(glitch.process_stereo(x, x), (x, x));
        }
    }

    #[test]
    fn test_glitch_repeats_slice() {
        let mut glitch = Glitch::new(1.0, 1.0, 1);
        glitch.set_sample_rate(10000.0);
        // First slice passes through and is captured.
        let first: Vec<f32> = (0..10).map(|i| glitch.process_stereo(i as f32, 0.0).0).collect();
        assert!(glitch.is_stuttering());
        let repeated: Vec<f32> = (0..10).map(|_| glitch.process_stereo(-1.0, 0.0).0).collect();
        assert_eq!(first, repeated);
    }
}
