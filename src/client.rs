use anyhow::{Result, anyhow};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::config::ClientConfig;

pub async fn send_transcription_request(config: &ClientConfig) -> Result<Value> {
    let client = reqwest::Client::new();

    if !Path::new(&config.audio_file).exists() {
        return Err(anyhow!("Audio file not found: {}", config.audio_file));
    }
    let audio_data = fs::read(&config.audio_file)
        .map_err(|e| anyhow!("Failed to read audio file: {}", e))?;

    let filename = Path::new(&config.audio_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());

    println!(
        "📁 Audio source: {} ({} bytes)",
        config.audio_file,
        audio_data.len()
    );

    let mut form = reqwest::multipart::Form::new()
        .part(
            "audio",
            reqwest::multipart::Part::bytes(audio_data).file_name(filename),
        )
        .text("model", config.model.to_string())
        .text("language", config.language.to_string());
    if let Some(prompt) = &config.initial_prompt {
        form = form.text("initial_prompt", prompt.clone());
    }

    println!(
        "🚀 Sending transcription request to: {}/api/v1/transcribe",
        config.server_url
    );
    println!(
        "   Model: {}, Language: {}",
        config.model, config.language
    );

    let response = client
        .post(format!("{}/api/v1/transcribe", config.server_url))
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow!("Failed to send request: {}", e))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read response: {}", e))?;

    if !status.is_success() {
        return Err(anyhow!(
            "Server returned error {}: {}",
            status,
            response_text
        ));
    }

    let json: Value = serde_json::from_str(&response_text)
        .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))?;

    Ok(json)
}

pub async fn check_server_health(server_url: &str) -> Result<()> {
    let client = reqwest::Client::new();

    println!("🔍 Checking server health at: {server_url}/api/v1/health");

    let response = client
        .get(format!("{server_url}/api/v1/health"))
        .send()
        .await
        .map_err(|e| anyhow!("Failed to connect to server: {}", e))?;

    if response.status().is_success() {
        println!("✅ Server is healthy");
        Ok(())
    } else {
        Err(anyhow!("Server health check failed: {}", response.status()))
    }
}

fn print_segment_table(result: &Value) {
    let Some(rows) = result.get("rows").and_then(|r| r.as_array()) else {
        println!("(no segments in response)");
        return;
    };

    println!("{:<14} {:<14} TEXT", "START", "END");
    for row in rows {
        println!(
            "{:<14} {:<14}{}",
            row.get("start").and_then(|v| v.as_str()).unwrap_or(""),
            row.get("end").and_then(|v| v.as_str()).unwrap_or(""),
            row.get("text").and_then(|v| v.as_str()).unwrap_or("")
        );
    }

    if let Some(url) = result.get("download_url").and_then(|u| u.as_str()) {
        println!("\n💾 CSV download: {url}");
    }
}

pub async fn run_client(config: ClientConfig) -> Result<()> {
    println!("🎵 DialogueDraft Client");
    println!("=======================");
    println!("📁 File Mode: {}", config.audio_file);
    println!();

    if let Err(e) = check_server_health(&config.server_url).await {
        eprintln!("❌ {e}");
        eprintln!("💡 Make sure the server is running: dialogue-draft serve");
        return Err(e);
    }

    match send_transcription_request(&config).await {
        Ok(result) => {
            println!("\n✅ Transcription completed!");
            print_segment_table(&result);
        }
        Err(e) => {
            eprintln!("❌ Transcription failed: {e}");
            return Err(e);
        }
    }

    Ok(())
}
