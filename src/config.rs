use crate::whisper::config::{Language, ModelSize};

/// Options for driving a running server from the terminal.
#[derive(Debug)]
pub struct ClientConfig {
    pub server_url: String,
    pub audio_file: String,
    pub model: ModelSize,
    pub language: Language,
    pub initial_prompt: Option<String>,
}

impl ClientConfig {
    pub fn new(
        server_url: String,
        audio_file: String,
        model: ModelSize,
        language: Language,
        initial_prompt: Option<String>,
    ) -> Self {
        Self {
            server_url,
            audio_file,
            model,
            language,
            initial_prompt,
        }
    }
}
