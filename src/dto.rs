#[derive(serde::Serialize)]
pub struct TranscriptionDto {
    /// Language hint used for inference; null when whisper auto-detected.
    pub language: Option<String>,
    pub rows: Vec<SegmentRow>,
    pub csv_file: String,
    pub download_url: String,
}

/// One row of the result table, timestamps already formatted for display.
#[derive(serde::Serialize)]
pub struct SegmentRow {
    pub start: String,
    pub end: String,
    pub text: String,
}

#[derive(serde::Serialize)]
pub struct ErrorDto {
    pub error: String,
}
