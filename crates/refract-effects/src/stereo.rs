//! Stages that operate on the stereo image rather than on each channel.

use refract_core::{Effect, Lfo, SharedParam, SmoothedParam, equal_power_pan, mono_sum};

/// Folds both channels to their average.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoSum;

impl Effect for MonoSum {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let m = mono_sum(left, right);
        (m, m)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Center-channel cancellation: outputs the side signal on both channels.
///
/// Anything panned dead center (usually the lead vocal) disappears.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocalRemover;

impl Effect for VocalRemover {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let side = left - right;
        (side, -side)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Mid/side width control. 1.0 is unchanged, 0.0 is mono, above 1.0 widens.
#[derive(Debug, Clone, Copy)]
pub struct Widener {
    width: f32,
}

impl Widener {
    /// Creates a widener; `width` is clamped to [0, 3].
    pub fn new(width: f32) -> Self {
        Self {
            width: width.clamp(0.0, 3.0),
        }
    }
}

impl Effect for Widener {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mid = (left + right) * 0.5;
        let side = (left - right) * 0.5 * self.width;
        // Keep loudness roughly constant as side energy grows.
        let norm = 1.0 / (1.0 + (self.width - 1.0).max(0.0) * 0.5);
        ((mid + side) * norm, (mid - side) * norm)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Where a [`Panner`] takes its position from.
#[derive(Debug, Clone)]
enum PanSource {
    /// Swept in the node by its own LFO.
    Lfo(Lfo),
    /// Written by a modulation task.
    Shared(SharedParam),
}

/// Equal-power auto panner over a mono fold of the input.
///
/// ```rust
/// use refract_effects::Panner;
/// use refract_core::{Effect, SharedParam};
///
/// let position = SharedParam::new(-1.0);
/// let mut pan = Panner::controlled(position);
/// pan.set_sample_rate(48000.0);
/// let (l, r) = pan.process_stereo(0.5, 0.5);
/// assert!(l > 0.4 && r.abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Panner {
    source: PanSource,
    position: SmoothedParam,
    dt: f32,
    depth: f32,
}

impl Panner {
    /// Pans with an internal sine LFO at `rate_hz`, swinging by `depth`.
    pub fn lfo(rate_hz: f32, depth: f32) -> Self {
        Self {
            source: PanSource::Lfo(Lfo::new(rate_hz)),
            position: SmoothedParam::new(0.0, 48000.0, 0.0),
            dt: 1.0 / 48000.0,
            depth: depth.clamp(0.0, 1.0),
        }
    }

    /// Pans to whatever `position` holds, smoothed over 15 ms.
    pub fn controlled(position: SharedParam) -> Self {
        let start = position.get();
        Self {
            source: PanSource::Shared(position),
            position: SmoothedParam::new(start, 48000.0, 15.0),
            dt: 1.0 / 48000.0,
            depth: 1.0,
        }
    }

    /// Current smoothed position in [-1, 1].
    pub fn position(&self) -> f32 {
        self.position.get()
    }
}

impl Effect for Panner {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let target = match &mut self.source {
            PanSource::Lfo(lfo) => lfo.advance(self.dt) * self.depth,
            PanSource::Shared(param) => param.get() * self.depth,
        };
        self.position.set_target(target);
        let (gl, gr) = equal_power_pan(self.position.advance());
        let m = mono_sum(left, right) * core::f32::consts::SQRT_2;
        (m * gl, m * gr)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.dt = 1.0 / sample_rate;
        self.position.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        if let PanSource::Lfo(lfo) = &mut self.source {
            lfo.reset();
        }
        self.position.snap_to_target();
    }
}
