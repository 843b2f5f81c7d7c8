use actix_cors::Cors;
use actix_multipart::{Field, Multipart};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, post, web};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::audio::{decode_wav, prepare_for_whisper};
use crate::dto::{SegmentRow, TranscriptionDto};
use crate::error::AppError;
use crate::output::{format_timestamp, write_transcript};
use crate::whisper::config::{Language, ModelSize, WhisperConfig};
use crate::whisper::transcriber::{TranscribeRequest, Transcriber};

const INDEX_HTML: &str = include_str!("../static/index.html");

pub struct AppState {
    pub transcriber: Transcriber,
    pub output_dir: PathBuf,
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

#[get("/api/v1/health")]
async fn health_check() -> impl Responder {
    debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "DialogueDraft transcription service is running"
    }))
}

#[post("/api/v1/transcribe")]
async fn transcribe_upload(
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    debug!("Transcription request received");

    let mut audio_data: Option<Vec<u8>> = None;
    let mut audio_name = String::from("audio.wav");
    let mut model = ModelSize::default();
    let mut language = Language::default();
    let mut initial_prompt: Option<String> = None;

    // Process multipart fields
    while let Some(field) = payload.try_next().await.unwrap_or(None) {
        match field.name() {
            Some("audio") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(|name| name.to_string());
                if let Some(name) = filename {
                    audio_name = name;
                }
                let bytes = read_field_data(field).await.map_err(|e| {
                    warn!("Failed to read audio upload: {e}");
                    AppError::InvalidInput("Failed to read audio data".to_string())
                })?;
                debug!("Audio data received: {} bytes", bytes.len());
                audio_data = Some(bytes);
            }
            Some("model") => {
                let text = read_field_text(field).await?;
                model = text.parse().map_err(AppError::InvalidInput)?;
                debug!("Model size set to: {model}");
            }
            Some("language") => {
                let text = read_field_text(field).await?;
                language = text.parse().map_err(AppError::InvalidInput)?;
                debug!("Language set to: {language}");
            }
            Some("initial_prompt") => {
                let text = read_field_text(field).await?;
                if !text.trim().is_empty() {
                    initial_prompt = Some(text);
                }
            }
            _ => continue,
        }
    }

    let audio_bytes = audio_data.ok_or_else(|| {
        warn!("No audio file provided in transcription request");
        AppError::InvalidInput("No audio file provided".to_string())
    })?;

    info!(
        "Processing '{}': {} bytes, model={}, language={}",
        audio_name,
        audio_bytes.len(),
        model,
        language
    );

    // Inference blocks for the length of the audio; keep it off the HTTP
    // workers so other requests stay responsive.
    let transcriber = data.transcriber.clone();
    let output_dir = data.output_dir.clone();
    let dto = web::block(move || {
        run_transcription(
            &transcriber,
            &output_dir,
            &audio_name,
            &audio_bytes,
            model,
            language,
            initial_prompt,
        )
    })
    .await
    .map_err(|e| AppError::Inference(format!("worker thread failed: {e}")))??;

    info!(
        "Transcription completed successfully: {} segments",
        dto.rows.len()
    );
    Ok(HttpResponse::Ok().json(dto))
}

fn run_transcription(
    transcriber: &Transcriber,
    output_dir: &Path,
    audio_name: &str,
    audio_bytes: &[u8],
    model: ModelSize,
    language: Language,
    initial_prompt: Option<String>,
) -> Result<TranscriptionDto, AppError> {
    let decoded = decode_wav(audio_bytes)?;
    let samples = prepare_for_whisper(&decoded)?;

    let output = transcriber.transcribe(&TranscribeRequest {
        audio: &samples,
        model,
        language,
        initial_prompt,
    })?;

    let path = write_transcript(output_dir, audio_name, &output.segments)?;
    let csv_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let rows = output
        .segments
        .iter()
        .map(|segment| SegmentRow {
            start: format_timestamp(segment.start),
            end: format_timestamp(segment.end),
            text: segment.text.clone(),
        })
        .collect();

    Ok(TranscriptionDto {
        language: output.language_hint.map(|hint| hint.to_string()),
        rows,
        download_url: format!("/api/v1/download/{csv_file}"),
        csv_file,
    })
}

#[get("/api/v1/download/{file}")]
async fn download_csv(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    if !is_safe_file_name(&name) {
        warn!("Rejected download request for suspicious path: {name}");
        return Err(AppError::InvalidInput("invalid file name".to_string()));
    }

    let full_path = data.output_dir.join(&name);
    let bytes = tokio::fs::read(&full_path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::InvalidInput(format!("no such transcript: {name}"))
        }
        _ => AppError::Io(e),
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{name}\""),
        ))
        .body(bytes))
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && name.ends_with(".csv")
}

async fn read_field_data(mut field: Field) -> Result<Vec<u8>, actix_web::Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        data.extend_from_slice(&chunk);
    }
    debug!("Read field data: {} bytes", data.len());
    Ok(data)
}

async fn read_field_text(field: Field) -> Result<String, AppError> {
    let bytes = read_field_data(field)
        .await
        .map_err(|e| AppError::InvalidInput(format!("failed to read form field: {e}")))?;
    String::from_utf8(bytes)
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::InvalidInput("form field is not valid UTF-8".to_string()))
}

pub async fn run_server(
    host: String,
    port: u16,
    output_dir: PathBuf,
    config: WhisperConfig,
) -> std::io::Result<()> {
    info!("Starting DialogueDraft transcription service");
    info!(
        "Using configuration: models_dir={:?}, use_gpu={}, num_threads={}, output_dir={:?}",
        config.models_dir, config.use_gpu, config.num_threads, output_dir
    );

    let app_state = web::Data::new(AppState {
        transcriber: Transcriber::new(config),
        output_dir,
    });

    info!("Starting HTTP server on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(50 * 1024 * 1024)) // 50MB
            .app_data(
                actix_multipart::form::MultipartFormConfig::default()
                    .total_limit(100 * 1024 * 1024), // 100MB
            )
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(index)
            .service(health_check)
            .service(transcribe_upload)
            .service(download_csv)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_names() {
        assert!(is_safe_file_name("meeting.csv"));
        assert!(is_safe_file_name("2026-08-29 standup.csv"));
        assert!(!is_safe_file_name(""));
        assert!(!is_safe_file_name("../secrets.csv"));
        assert!(!is_safe_file_name("a/b.csv"));
        assert!(!is_safe_file_name("a\\b.csv"));
        assert!(!is_safe_file_name("meeting.txt"));
    }
}
