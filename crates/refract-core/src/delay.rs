//! Circular delay line with fractional reads.
//!
//! Used by every time-based stage: echo, ping pong, chorus, flanger,
//! vibrato, cassette wow and the reverb building blocks.

/// Mono circular delay buffer with linear interpolation.
///
/// A read of `d` samples returns the input from `d` writes ago, so calling
/// [`read`](Self::read) before [`write`](Self::write) yields `y[n] = x[n - d]`.
///
/// ```rust
/// use refract_core::DelayLine;
///
/// let mut delay = DelayLine::new(16);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(2.0), 1.0);
/// assert_eq!(delay.read(1.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding up to `capacity - 1` samples of delay.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is below 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "delay capacity must be at least 2");
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Creates a delay line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds) as usize + 2)
    }

    #[inline]
    fn at(&self, samples_ago: usize) -> f32 {
        let len = self.buffer.len();
        self.buffer[(self.write_pos + len - samples_ago) % len]
    }

    /// Reads the signal `delay_samples` writes ago, interpolating linearly.
    ///
    /// The delay is clamped to `[1, capacity - 1]`.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let max = (self.buffer.len() - 1) as f32;
        let delay = delay_samples.clamp(1.0, max);
        let whole = delay as usize;
        let frac = delay - whole as f32;
        let a = self.at(whole);
        if frac == 0.0 || whole + 1 >= self.buffer.len() {
            return a;
        }
        a + (self.at(whole + 1) - a) * frac
    }

    /// Writes a sample and advances.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads at `delay_samples`, then writes `input`.
    #[inline]
    pub fn tap(&mut self, input: f32, delay_samples: f32) -> f32 {
        let out = self.read(delay_samples);
        self.write(input);
        out
    }

    /// Zeroes the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the buffer length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_delay() {
        let mut delay = DelayLine::new(8);
        let outputs: Vec<f32> = [1.0, 0.0, 0.0, 0.0, 0.0]
            .iter()
            .map(|&x| delay.tap(x, 3.0))
            .collect();
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut delay = DelayLine::new(4);
        for i in 0..4 {
            delay.write(i as f32);
        }
        // 0,1,2,3 written; max delay is 3 -> value 1.0
        assert_eq!(delay.read(100.0), 1.0);
        assert_eq!(delay.read(0.0), 3.0);
    }

    #[test]
    fn test_clear() {
        let mut delay = DelayLine::from_time(1000.0, 0.01);
        delay.write(1.0);
        delay.clear();
        assert_eq!(delay.read(1.0), 0.0);
        assert_eq!(delay.capacity(), 12);
    }
}
