//! Stereo audio buffer for whole-track data.
//!
//! [`StereoSamples`] holds a decoded track (or a rendered export) as a pair
//! of equal-length channel vectors.

/// A pair of stereo audio buffers (left and right channels).
///
/// ```rust
/// use refract_core::StereoSamples;
///
/// let samples = StereoSamples::from_interleaved(&[1.0, 0.0, 0.5, -0.5]);
/// assert_eq!(samples.len(), 2);
/// assert_eq!(samples.to_interleaved(), vec![1.0, 0.0, 0.5, -0.5]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Create new stereo samples from left and right channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "Channels must have same length");
        Self { left, right }
    }

    /// Create stereo samples from mono by duplicating to both channels.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            left: mono.clone(),
            right: mono,
        }
    }

    /// Get the number of frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Convert to interleaved format (L, R, L, R, ...).
    pub fn to_interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(self.right.iter())
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Create from interleaved format (L, R, L, R, ...). A trailing odd
    /// sample is dropped.
    pub fn from_interleaved(interleaved: &[f32]) -> Self {
        let (left, right) = interleaved
            .chunks_exact(2)
            .map(|frame| (frame[0], frame[1]))
            .unzip();
        Self { left, right }
    }

    /// Appends another buffer's frames.
    pub fn extend(&mut self, other: &StereoSamples) {
        self.left.extend_from_slice(&other.left);
        self.right.extend_from_slice(&other.right);
    }

    /// Largest absolute sample across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mono() {
        let samples = StereoSamples::from_mono(vec![0.5, -0.5]);
        assert_eq!(samples.left, samples.right);
    }

    #[test]
    fn test_interleaved_odd_tail_dropped() {
        let samples = StereoSamples::from_interleaved(&[0.1, 0.2, 0.3]);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_extend_and_peak() {
        let mut a = StereoSamples::new(vec![0.1], vec![-0.2]);
        a.extend(&StereoSamples::new(vec![0.9], vec![0.0]));
        assert_eq!(a.len(), 2);
        assert_eq!(a.peak(), 0.9);
    }
}
