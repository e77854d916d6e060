//! The decoded track a session plays.

use refract_core::StereoSamples;

/// A loaded track: its file name, stereo samples and sample rate.
///
/// The name is kept as given by the host (for example `song.mp3`); export
/// filenames are derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTrack {
    name: String,
    samples: StereoSamples,
    sample_rate: u32,
}

impl SourceTrack {
    /// Creates a track from already-decoded samples.
    pub fn new(name: impl Into<String>, samples: StereoSamples, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            samples,
            sample_rate: sample_rate.max(1),
        }
    }

    /// The file name the track was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without its extension: `song.mp3` → `song`.
    pub fn base_name(&self) -> &str {
        split_extension(&self.name).0
    }

    /// Extension including the dot (`.mp3`), or empty when there is none.
    pub fn extension(&self) -> &str {
        split_extension(&self.name).1
    }

    /// Decoded audio.
    pub fn samples(&self) -> &StereoSamples {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in frames.
    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Splits at the last dot, unless that dot starts the name (`.hidden`).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(dot) => name.split_at(dot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> SourceTrack {
        SourceTrack::new(name, StereoSamples::from_mono(vec![0.0; 480]), 48000)
    }

    #[test]
    fn test_base_and_extension() {
        let track = named("song.mp3");
        assert_eq!(track.base_name(), "song");
        assert_eq!(track.extension(), ".mp3");

        let dotted = named("my.mix.final.wav");
        assert_eq!(dotted.base_name(), "my.mix.final");
        assert_eq!(dotted.extension(), ".wav");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(named("take1").extension(), "");
        assert_eq!(named(".hidden").base_name(), ".hidden");
    }

    #[test]
    fn test_duration() {
        assert!((named("a.wav").duration_secs() - 0.01).abs() < 1e-9);
    }
}
