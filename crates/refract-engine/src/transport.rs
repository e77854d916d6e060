//! Track playback position and rate.

use refract_core::{StereoSamples, lerp};

/// What one [`Transport::fill`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Frames taken from the track. The rest of the block is silence.
    pub frames: usize,
    /// True if the track ran out during this block.
    pub ended: bool,
}

/// Variable-rate playhead over an in-memory track.
///
/// The step per output frame is `rate · track_rate / render_rate`, so a rate
/// above 1.0 raises pitch and shortens the track, like a turntable. Reads
/// between samples are linearly interpolated.
#[derive(Debug, Clone)]
pub struct Transport {
    position: f64,
    step_scale: f64,
    rate: f32,
    playing: bool,
    track_sample_rate: f64,
}

impl Transport {
    /// A paused transport at the start of a track recorded at
    /// `track_sample_rate`, rendered at `render_sample_rate`.
    pub fn new(track_sample_rate: u32, render_sample_rate: u32) -> Self {
        Self {
            position: 0.0,
            step_scale: f64::from(track_sample_rate) / f64::from(render_sample_rate.max(1)),
            rate: 1.0,
            playing: false,
            track_sample_rate: f64::from(track_sample_rate.max(1)),
        }
    }

    /// Whether the playhead is moving.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stops playback, keeping the position.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Playback rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Sets the playback rate. Non-positive rates are ignored.
    pub fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    /// Position in track seconds.
    pub fn position_secs(&self) -> f64 {
        self.position / self.track_sample_rate
    }

    /// Moves the playhead, clamped to the track.
    pub fn seek(&mut self, secs: f64, track: &StereoSamples) {
        let frame = (secs.max(0.0) * self.track_sample_rate).min(track.len() as f64);
        self.position = frame;
    }

    /// Writes the next block of the track into `left`/`right`.
    ///
    /// A paused transport writes silence. When the track ends the transport
    /// pauses and rewinds to the start.
    pub fn fill(&mut self, track: &StereoSamples, left: &mut [f32], right: &mut [f32]) -> Fill {
        let len = left.len().min(right.len());
        if !self.playing {
            left.fill(0.0);
            right.fill(0.0);
            return Fill {
                frames: 0,
                ended: false,
            };
        }

        let step = f64::from(self.rate) * self.step_scale;
        let last = track.len().saturating_sub(1);
        let mut frames = 0;
        let mut ended = track.is_empty();
        for i in 0..len {
            if ended || self.position > last as f64 {
                ended = true;
                left[i] = 0.0;
                right[i] = 0.0;
                continue;
            }
            let index = self.position as usize;
            let frac = (self.position - index as f64) as f32;
            let next = (index + 1).min(last);
            left[i] = lerp(track.left[index], track.left[next], frac);
            right[i] = lerp(track.right[index], track.right[next], frac);
            self.position += step;
            frames += 1;
        }

        if ended {
            self.playing = false;
            self.position = 0.0;
        }
        Fill { frames, ended }
    }
}
