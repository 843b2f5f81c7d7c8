use hound::SampleFormat;
use log::debug;
use std::io::Cursor;

use crate::error::AppError;
use crate::whisper::resampler::{WHISPER_SAMPLE_RATE, resample_to_16khz};

pub struct DecodedAudio {
    /// Interleaved samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Decodes an uploaded WAV container into normalized f32 samples.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, AppError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AppError::InvalidInput(format!("not a readable WAV file: {e}")))?;
    let spec = reader.spec();

    debug!(
        "WAV header: {}Hz, {} channels, {}-bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    let samples: Result<Vec<f32>, hound::Error> = match (spec.sample_format, spec.bits_per_sample)
    {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_607.0))
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / i32::MAX as f32))
            .collect(),
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect(),
        (format, bits) => {
            return Err(AppError::InvalidInput(format!(
                "unsupported WAV encoding: {bits}-bit {format:?}"
            )));
        }
    };
    let samples =
        samples.map_err(|e| AppError::InvalidInput(format!("corrupt WAV data: {e}")))?;

    if samples.is_empty() {
        return Err(AppError::InvalidInput(
            "WAV file contains no samples".to_string(),
        ));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels as usize,
    })
}

/// Resamples and downmixes to the 16 kHz mono stream whisper expects.
pub fn prepare_for_whisper(decoded: &DecodedAudio) -> Result<Vec<f32>, AppError> {
    let resampled = resample_to_16khz(&decoded.samples, decoded.sample_rate, decoded.channels)
        .map_err(|e| AppError::InvalidInput(format!("failed to resample audio: {e}")))?;

    let mono = match decoded.channels {
        1 => resampled,
        2 => whisper_rs::convert_stereo_to_mono_audio(&resampled)
            .map_err(|e| AppError::InvalidInput(format!("failed to downmix audio: {e}")))?,
        n => {
            return Err(AppError::InvalidInput(format!(
                "unsupported channel count: {n}"
            )));
        }
    };

    if mono.len() < WHISPER_SAMPLE_RATE as usize {
        return Err(AppError::InvalidInput(
            "audio is too short (less than 1 second)".to_string(),
        ));
    }

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_16bit_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let samples: Vec<i16> = (0..16000).map(|i| (i % 1000) as i16).collect();
        let decoded = decode_wav(&wav_bytes(spec, &samples)).unwrap();

        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), 16000);
        assert!(decoded.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_wav(b"definitely not a wav file").is_err());
        assert!(decode_wav(&[]).is_err());
    }

    #[test]
    fn test_prepare_stereo_downmix() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        // two seconds of interleaved stereo
        let samples: Vec<i16> = (0..64000).map(|i| (i % 500) as i16).collect();
        let decoded = decode_wav(&wav_bytes(spec, &samples)).unwrap();
        let mono = prepare_for_whisper(&decoded).unwrap();

        assert_eq!(mono.len(), 32000);
    }

    #[test]
    fn test_prepare_rejects_short_audio() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let samples: Vec<i16> = vec![100; 8000]; // half a second
        let decoded = decode_wav(&wav_bytes(spec, &samples)).unwrap();
        let err = prepare_for_whisper(&decoded).unwrap_err();
        assert!(err.is_user_error());
    }
}
