use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::whisper::config::{Language, ModelSize};

#[derive(Parser)]
#[command(
    name = "dialogue-draft",
    about = "DialogueDraft - Whisper transcription with a browser UI",
    long_about = "Serves a browser form for transcribing uploaded audio with local Whisper models, \
writes each transcript as a downloadable CSV, and ships a terminal client for the same endpoint.",
    after_help = "EXAMPLES:\n    # Start the transcription server\n    dialogue-draft serve\n\n    # Fetch the default model first\n    dialogue-draft download medium\n\n    # Transcribe a WAV file against a running server\n    dialogue-draft file interview.wav --language japanese\n\n    # Bias the first decoding window toward expected vocabulary\n    dialogue-draft file standup.wav --prompt \"Kubernetes, Grafana, rollout\""
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(name = "serve")]
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "7860")]
        port: u16,

        /// Directory holding ggml model files; defaults to WHISPER_MODELS_DIR
        /// or .cache/models.
        #[arg(long)]
        models_dir: Option<PathBuf>,

        #[arg(long, default_value = "data/output")]
        output_dir: PathBuf,

        /// Keep the model off the accelerator and run on CPU only.
        #[arg(long)]
        cpu: bool,

        #[arg(long, default_value = "4")]
        threads: i32,
    },
    #[command(name = "file")]
    TranscribeFile {
        audio_file: String,

        #[arg(long, default_value = "http://localhost:7860")]
        server_url: String,

        #[arg(long, default_value = "medium")]
        model: ModelSize,

        #[arg(long, default_value = "auto")]
        language: Language,

        /// Free text priming the first decoding window (proper nouns, jargon).
        #[arg(long)]
        prompt: Option<String>,
    },
    #[command(name = "download")]
    Download {
        model: ModelSize,

        #[arg(long)]
        models_dir: Option<PathBuf>,
    },
}
