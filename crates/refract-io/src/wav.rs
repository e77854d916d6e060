//! WAV decoding of loaded tracks and in-memory encoding of exports.

use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use refract_core::StereoSamples;

use crate::track::SourceTrack;
use crate::{Error, Result};

/// Output format of an encoded export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth: 8, 16 or 24 for PCM, 32 for IEEE float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bits_per_sample: 16,
        }
    }
}

impl TryFrom<WavSpec> for hound::WavSpec {
    type Error = Error;

    fn try_from(spec: WavSpec) -> Result<Self> {
        let sample_format = match spec.bits_per_sample {
            8 | 16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(Error::UnsupportedFormat(format!("{other}-bit WAV")));
            }
        };
        Ok(hound::WavSpec {
            channels: 2,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format,
        })
    }
}

/// Decodes a WAV file held in memory into a stereo track.
///
/// Mono files are duplicated to both channels; files with more than two
/// channels keep the first two.
pub fn decode_wav(name: &str, bytes: &[u8]) -> Result<SourceTrack> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    decode(name, reader)
}

/// Reads and decodes a WAV file from disk.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<SourceTrack> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reader = WavReader::open(path)?;
    decode(&name, reader)
}

fn decode<R: Read>(name: &str, reader: WavReader<R>) -> Result<SourceTrack> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(Error::UnsupportedFormat("zero-channel WAV".into()));
    }

    let all_samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let samples = match channels {
        1 => StereoSamples::from_mono(all_samples),
        2 => StereoSamples::from_interleaved(&all_samples),
        _ => {
            let (left, right) = all_samples
                .chunks_exact(channels)
                .map(|frame| (frame[0], frame[1]))
                .unzip();
            StereoSamples::new(left, right)
        }
    };

    tracing::debug!(
        "wav_decode: {name} {} frames, {} ch @ {} Hz",
        samples.len(),
        channels,
        spec.sample_rate
    );
    Ok(SourceTrack::new(name, samples, spec.sample_rate))
}

/// Encodes stereo samples as a complete WAV file in memory.
///
/// Samples outside [-1, 1] are clipped for integer formats.
pub fn encode_wav(samples: &StereoSamples, sample_rate: u32, bits_per_sample: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec::try_from(WavSpec {
        sample_rate,
        bits_per_sample,
    })?;

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    let frames = samples.left.iter().zip(&samples.right);
    match spec.sample_format {
        SampleFormat::Float => {
            for (&l, &r) in frames {
                writer.write_sample(l)?;
                writer.write_sample(r)?;
            }
        }
        SampleFormat::Int => {
            let max_val = (1i64 << (bits_per_sample - 1)) as f32;
            let quantize = |x: f32| (x * max_val).clamp(-max_val, max_val - 1.0) as i32;
            for (&l, &r) in frames {
                writer.write_sample(quantize(l))?;
                writer.write_sample(quantize(r))?;
            }
        }
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> StereoSamples {
        let left: Vec<f32> = (0..len).map(|i| (i as f32 / len as f32) * 0.9).collect();
        let right = left.iter().map(|x| -x).collect();
        StereoSamples::new(left, right)
    }

    #[test]
    fn test_float_is_lossless() {
        let samples = ramp(1000);
        let bytes = encode_wav(&samples, 44100, 32).unwrap();
        let track = decode_wav("ramp.wav", &bytes).unwrap();
        assert_eq!(track.sample_rate(), 44100);
        assert_eq!(track.samples(), &samples);
    }

    #[test]
    fn test_sixteen_bit_precision() {
        let samples = ramp(1000);
        let bytes = encode_wav(&samples, 48000, 16).unwrap();
        // Header plus 4 bytes per stereo frame
        assert!(bytes.len() >= 44 + 4 * 1000);
        let track = decode_wav("ramp.wav", &bytes).unwrap();
        for (a, b) in samples.left.iter().zip(&track.samples().left) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_integer_export_clips() {
        let loud = StereoSamples::new(vec![2.0, -2.0], vec![0.0, 0.0]);
        let track = decode_wav("x.wav", &encode_wav(&loud, 48000, 16).unwrap()).unwrap();
        assert!(track.samples().left[0] < 1.0);
        assert_eq!(track.samples().left[1], -1.0);
    }

    #[test]
    fn test_unsupported_depth() {
        let err = encode_wav(&ramp(4), 48000, 12).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_mono_source_duplicated() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for v in [0i32, 8192, -8192] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let track = decode_wav("mono.wav", cursor.get_ref()).unwrap();
        assert_eq!(track.frames(), 3);
        assert_eq!(track.samples().left, track.samples().right);
        assert_eq!(track.samples().left[1], 0.25);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            decode_wav("bad.wav", b"not a wav file"),
            Err(Error::Wav(_))
        ));
    }
}
