use log::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::AppError;
use crate::whisper::config::{Language, ModelSize, WhisperConfig};

/// One transcription job. `audio` must already be 16 kHz mono samples.
pub struct TranscribeRequest<'a> {
    pub audio: &'a [f32],
    pub model: ModelSize,
    pub language: Language,
    pub initial_prompt: Option<String>,
}

/// A contiguous span of recognized speech. Offsets are whisper timestamps in
/// centiseconds, in model output order.
#[derive(Clone, Debug)]
pub struct Segment {
    pub start: i64,
    pub end: i64,
    pub text: String,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.text == other.text
    }
}

pub struct TranscribeOutput {
    /// The hint actually passed to inference; `None` means whisper picked the
    /// language itself.
    pub language_hint: Option<&'static str>,
    pub segments: Vec<Segment>,
}

/// Loads a fresh whisper context per request and drops it before returning,
/// so a long-running server does not accumulate model memory on the device.
#[derive(Clone)]
pub struct Transcriber {
    config: WhisperConfig,
}

impl Transcriber {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    pub fn transcribe(&self, request: &TranscribeRequest) -> Result<TranscribeOutput, AppError> {
        let model_path = self.config.model_path(request.model);
        if !model_path.exists() {
            return Err(AppError::ModelLoad(format!(
                "model file {} not found; fetch it with `dialogue-draft download {}`",
                model_path.display(),
                request.model
            )));
        }

        // The "auto" sentinel resolves to an absent hint here; whisper runs
        // its own detection pass when no language is set.
        let language_hint = request.language.hint();

        info!(
            "Loading whisper model '{}' from {}",
            request.model,
            model_path.display()
        );
        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(self.config.use_gpu);

        let model_path_str = model_path
            .to_str()
            .ok_or_else(|| AppError::ModelLoad("model path is not valid UTF-8".to_string()))?;
        let ctx = WhisperContext::new_with_params(model_path_str, ctx_params)
            .map_err(|e| AppError::ModelLoad(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language_hint);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_no_speech_thold(self.config.no_speech_threshold);
        params.set_n_threads(self.config.num_threads);
        if self.config.audio_context > 0 {
            params.set_audio_ctx(self.config.audio_context);
        }
        if let Some(prompt) = request.initial_prompt.as_deref() {
            if !prompt.trim().is_empty() {
                debug!("Priming first decoding window with {} prompt bytes", prompt.len());
                params.set_initial_prompt(prompt);
            }
        }

        info!(
            "Generating transcript: {} samples, language hint {:?}",
            request.audio.len(),
            language_hint
        );

        let mut state = ctx
            .create_state()
            .map_err(|e| AppError::Inference(format!("failed to create whisper state: {e}")))?;

        state
            .full(params, request.audio)
            .map_err(|e| AppError::Inference(format!("failed to run transcription: {e}")))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| AppError::Inference(format!("failed to get segment count: {e}")))?;

        let mut segments = Vec::with_capacity(num_segments as usize);
        for i in 0..num_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| AppError::Inference(format!("failed to get segment text: {e}")))?;
            let start = state
                .full_get_segment_t0(i)
                .map_err(|e| AppError::Inference(format!("failed to get segment start: {e}")))?;
            let end = state
                .full_get_segment_t1(i)
                .map_err(|e| AppError::Inference(format!("failed to get segment end: {e}")))?;

            segments.push(Segment { start, end, text });
        }

        debug!("Collected {} segments; releasing model", segments.len());
        // state and ctx drop here, returning model memory to the device
        // before the response leaves the handler.
        Ok(TranscribeOutput {
            language_hint,
            segments,
        })
    }
}
