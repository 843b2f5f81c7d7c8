use dotenv::dotenv;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings shared by every transcription request. The model file itself is
/// chosen per request via [`ModelSize`].
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct WhisperConfig {
    pub models_dir: PathBuf,
    pub use_gpu: bool,
    /// Encoder context override; 0 leaves the model default in place.
    pub audio_context: i32,
    pub no_speech_threshold: f32,
    pub num_threads: i32,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        dotenv().ok();
        Self {
            models_dir: std::env::var("WHISPER_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".cache/models")),
            use_gpu: true,
            audio_context: 0,
            no_speech_threshold: 0.6,
            num_threads: 4,
        }
    }
}

impl WhisperConfig {
    pub fn model_path(&self, size: ModelSize) -> PathBuf {
        self.models_dir.join(size.model_filename())
    }
}

/// The five ggml model sizes the UI offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    #[default]
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    pub fn model_filename(&self) -> String {
        format!("ggml-{}.bin", self.as_str())
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            other => Err(format!("unknown model size: {other}")),
        }
    }
}

/// Language selection offered by the UI. `Auto` is a sentinel that resolves
/// to "no hint" before inference; whisper then detects the language itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Auto,
    English,
    Japanese,
}

impl Language {
    /// The language hint handed to whisper. Never the sentinel itself.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Language::Auto => None,
            Language::English => Some("en"),
            Language::Japanese => Some("ja"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::English => "english",
            Language::Japanese => "japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Language::Auto),
            "english" | "en" => Ok(Language::English),
            "japanese" | "ja" => Ok(Language::Japanese),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_size_parse() {
        assert_eq!("medium".parse::<ModelSize>().unwrap(), ModelSize::Medium);
        assert_eq!(" Large ".parse::<ModelSize>().unwrap(), ModelSize::Large);
        assert!("huge".parse::<ModelSize>().is_err());
    }

    #[test]
    fn test_model_filename() {
        assert_eq!(ModelSize::Tiny.model_filename(), "ggml-tiny.bin");
        let sizes = [
            ModelSize::Tiny,
            ModelSize::Base,
            ModelSize::Small,
            ModelSize::Medium,
            ModelSize::Large,
        ];
        for size in sizes {
            assert_eq!(size.as_str().parse::<ModelSize>().unwrap(), size);
        }
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("Auto".parse::<Language>().unwrap(), Language::Auto);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Japanese);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_auto_resolves_to_no_hint() {
        assert_eq!(Language::Auto.hint(), None);
        assert_eq!(Language::English.hint(), Some("en"));
        assert_eq!(Language::Japanese.hint(), Some("ja"));
        // The sentinel string must never be what inference sees.
        for language in [Language::Auto, Language::English, Language::Japanese] {
            assert_ne!(language.hint(), Some("auto"));
        }
    }

    #[test]
    fn test_model_path() {
        let config = WhisperConfig {
            models_dir: PathBuf::from("/models"),
            ..WhisperConfig::default()
        };
        assert_eq!(
            config.model_path(ModelSize::Base),
            PathBuf::from("/models/ggml-base.bin")
        );
    }
}
