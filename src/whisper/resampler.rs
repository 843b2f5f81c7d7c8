use anyhow::Result;
use rubato::{Resampler, SincFixedIn, SincInterpolationType, WindowFunction};

pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Resamples interleaved audio to the 16 kHz stream whisper expects. Channel
/// layout is preserved; downmixing happens after resampling.
pub fn resample_to_16khz(audio: &[f32], sample_rate: u32, channels: usize) -> Result<Vec<f32>> {
    if channels == 0 {
        return Err(anyhow::anyhow!("audio has no channels"));
    }
    if sample_rate == WHISPER_SAMPLE_RATE {
        return Ok(audio.to_vec());
    }

    let frames = audio.len() / channels;
    if frames == 0 {
        return Err(anyhow::anyhow!("no audio frames to resample"));
    }

    let params = rubato::SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in audio.chunks_exact(channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            planar[ch].push(sample);
        }
    }

    let resample_ratio = WHISPER_SAMPLE_RATE as f64 / sample_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, frames, channels)?;

    let resampled = resampler.process(&planar, None)?;
    let delay = resampler.output_delay();
    let expected_frames = (frames as f64 * resample_ratio) as usize;

    let start_frame = delay.min(resampled[0].len());
    let end_frame = (delay + expected_frames).min(resampled[0].len());

    let mut output = Vec::with_capacity((end_frame - start_frame) * channels);
    for frame_idx in start_frame..end_frame {
        for channel in resampled.iter() {
            output.push(channel[frame_idx]);
        }
    }

    Ok(output)
}
