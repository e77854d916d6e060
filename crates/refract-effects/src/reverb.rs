//! Algorithmic reverb and allpass diffusion.
//!
//! [`Reverb`] is a Freeverb-style network: eight damped feedback combs in
//! parallel followed by four series allpasses, per channel, with the right
//! channel's delays offset by a stereo spread. [`Diffuser`] is the allpass
//! half on its own, used to smear transients without a tail.

use refract_core::{Effect, flush_denormal, wet_dry_mix};

/// Freeverb comb delay times at 44.1 kHz. Mutually prime to avoid resonances.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Freeverb allpass delay times at 44.1 kHz.
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Extra delay for the right channel, in 44.1 kHz samples.
const STEREO_SPREAD: usize = 23;

const REFERENCE_RATE: f32 = 44100.0;

/// Input attenuation into the comb bank.
const FIXED_GAIN: f32 = 0.015;

fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    ((samples as f32 * sample_rate / REFERENCE_RATE).round() as usize).max(1)
}

/// Lowpass-feedback comb.
#[derive(Debug, Clone)]
struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    store: f32,
}

impl Comb {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
            store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let out = self.buffer[self.pos];
        self.store = flush_denormal(out * (1.0 - damp) + self.store * damp);
        self.buffer[self.pos] = input + self.store * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.store = 0.0;
        self.pos = 0;
    }
}

/// Schroeder allpass.
#[derive(Debug, Clone)]
struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, gain: f32) -> f32 {
        // v[n] = x[n] + g v[n-D],  y[n] = v[n-D] - g v[n]
        let delayed = self.buffer[self.pos];
        let v = flush_denormal(input + delayed * gain);
        self.buffer[self.pos] = v;
        self.pos = (self.pos + 1) % self.buffer.len();
        delayed - gain * v
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// One channel of the Freeverb network.
#[derive(Debug, Clone)]
struct Tank {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl Tank {
    fn new(sample_rate: f32, offset: usize) -> Self {
        Self {
            combs: COMB_TUNINGS_44K
                .iter()
                .map(|&t| Comb::new(scale_to_rate(t + offset, sample_rate)))
                .collect(),
            allpasses: ALLPASS_TUNINGS_44K
                .iter()
                .map(|&t| Allpass::new(scale_to_rate(t + offset, sample_rate)))
                .collect(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let mut out = self
            .combs
            .iter_mut()
            .map(|c| c.process(input, feedback, damp))
            .sum::<f32>();
        for ap in &mut self.allpasses {
            out = ap.process(out, 0.5);
        }
        out
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(Comb::clear);
        self.allpasses.iter_mut().for_each(Allpass::clear);
    }
}

/// Room character presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverbType {
    /// Small room, short decay.
    #[default]
    Room,
    /// Large hall, long decay, darker.
    Hall,
}

impl ReverbType {
    /// `(room_size, damping)` for this preset.
    pub fn defaults(self) -> (f32, f32) {
        match self {
            Self::Room => (0.5, 0.5),
            Self::Hall => (0.88, 0.3),
        }
    }
}

/// Freeverb-style stereo reverb.
///
/// # Example
///
/// ```rust
/// use refract_effects::{Reverb, ReverbType};
/// use refract_core::Effect;
///
/// let mut hall = Reverb::new(ReverbType::Hall, 0.4);
/// hall.set_sample_rate(48000.0);
/// let (l, r) = hall.process_stereo(0.5, 0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    room_size: f32,
    damping: f32,
    mix: f32,
    left: Tank,
    right: Tank,
}

impl Reverb {
    /// Creates a reverb from a preset with the given wet/dry mix.
    pub fn new(kind: ReverbType, mix: f32) -> Self {
        let (room_size, damping) = kind.defaults();
        Self {
            room_size,
            damping,
            mix: mix.clamp(0.0, 1.0),
            left: Tank::new(48000.0, 0),
            right: Tank::new(48000.0, STEREO_SPREAD),
        }
    }

    /// Comb feedback derived from the room size (0.7 - 0.98).
    fn feedback(&self) -> f32 {
        0.7 + self.room_size * 0.28
    }

    /// Room size in [0, 1].
    pub fn room_size(&self) -> f32 {
        self.room_size
    }
}

impl Effect for Reverb {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let input = (left + right) * FIXED_GAIN;
        let feedback = self.feedback();
        let wet_l = self.left.process(input, feedback, self.damping);
        let wet_r = self.right.process(input, feedback, self.damping);
        (
            wet_dry_mix(left, wet_l, self.mix),
            wet_dry_mix(right, wet_r, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left = Tank::new(sample_rate, 0);
        self.right = Tank::new(sample_rate, STEREO_SPREAD);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

/// Series allpass diffusion without a decaying tail.
#[derive(Debug, Clone)]
pub struct Diffuser {
    gain: f32,
    left: Vec<Allpass>,
    right: Vec<Allpass>,
}

impl Diffuser {
    /// Creates a four-stage diffuser with the given allpass gain.
    pub fn new(gain: f32) -> Self {
        let mut diffuser = Self {
            gain: gain.clamp(0.0, 0.9),
            left: Vec::new(),
            right: Vec::new(),
        };
        diffuser.set_sample_rate(48000.0);
        diffuser
    }
}

impl Effect for Diffuser {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mut l = left;
        let mut r = right;
        for ap in &mut self.left {
            l = ap.process(l, self.gain);
        }
        for ap in &mut self.right {
            r = ap.process(r, self.gain);
        }
        (l, r)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left = ALLPASS_TUNINGS_44K
            .iter()
            .map(|&t| Allpass::new(scale_to_rate(t, sample_rate)))
            .collect();
        self.right = ALLPASS_TUNINGS_44K
            .iter()
            .map(|&t| Allpass::new(scale_to_rate(t + STEREO_SPREAD, sample_rate)))
            .collect();
    }

    fn reset(&mut self) {
        self.left.iter_mut().for_each(Allpass::clear);
        self.right.iter_mut().for_each(Allpass::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tail_energy(reverb: &mut Reverb, from: usize, to: usize) -> f32 {
        let mut energy = 0.0;
        for i in 0..to {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (l, r) = reverb.process_stereo(x, x);
            if i >= from {
                energy += l * l + r * r;
            }
        }
        energy
    }

    #[test]
    fn test_reverb_has_tail() {
        let mut reverb = Reverb::new(ReverbType::Room, 1.0);
        reverb.set_sample_rate(48000.0);
        assert!(tail_energy(&mut reverb, 4800, 9600) > 1e-6);
    }

    #[test]
    fn test_hall_rings_longer_than_room() {
        let mut room = Reverb::new(ReverbType::Room, 1.0);
        let mut hall = Reverb::new(ReverbType::Hall, 1.0);
        room.set_sample_rate(48000.0);
        hall.set_sample_rate(48000.0);
        let late_room = tail_energy(&mut room, 48000, 72000);
        let late_hall = tail_energy(&mut hall, 48000, 72000);
        assert!(late_hall > late_room);
    }

    #[test]
    fn test_reset_silences() {
        let mut reverb = Reverb::new(ReverbType::Hall, 1.0);
        reverb.set_sample_rate(48000.0);
        tail_energy(&mut reverb, 0, 1000);
        reverb.reset();
        for _ in 0..2000 {
            assert_eq!(reverb.process_stereo(0.0, 0.0), (0.0, 0.0));
        }
    }

    #[test]
    fn test_stereo_decorrelated() {
        let mut reverb = Reverb::new(ReverbType::Room, 1.0);
        reverb.set_sample_rate(48000.0);
        let mut differs = false;
        for i in 0..4800 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (l, r) = reverb.process_stereo(x, x);
            differs |= (l - r).abs() > 1e-6;
        }
        assert!(differs);
    }

    #[test]
    fn test_diffuser_preserves_energy_roughly() {
        let mut diffuser = Diffuser::new(0.6);
        diffuser.set_sample_rate(48000.0);
        let mut energy = 0.0;
        for i in 0..48000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (l, _) = diffuser.process_stereo(x, x);
            energy += l * l;
        }
        // Allpass chains are lossless.
        assert!((energy - 1.0).abs() < 0.05, "energy {energy}");
    }
}
