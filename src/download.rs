use anyhow::{Result, anyhow};
use std::path::Path;
use std::process::Command;

use crate::whisper::config::ModelSize;

const MODEL_SOURCE: &str = "https://huggingface.co/ggerganov/whisper.cpp";

fn check_download_tool() -> Result<String> {
    let tools = ["wget2", "wget", "curl"];

    for tool in &tools {
        if Command::new("which")
            .arg(tool)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
        {
            return Ok(tool.to_string());
        }
    }

    Err(anyhow!(
        "Either wget, wget2, or curl is required to download models. Please install one of them."
    ))
}

fn download_with_tool(tool: &str, url: &str, output_path: &str) -> Result<()> {
    let mut cmd = Command::new(tool);

    match tool {
        "wget2" => {
            cmd.args(["--no-config", "--progress", "bar", "-O", output_path, url]);
        }
        "wget" => {
            cmd.args([
                "--no-config",
                "--quiet",
                "--show-progress",
                "-O",
                output_path,
                url,
            ]);
        }
        "curl" => {
            cmd.args(["-L", "--output", output_path, url]);
        }
        _ => return Err(anyhow!("Unsupported download tool: {}", tool)),
    }

    let status = cmd
        .status()
        .map_err(|e| anyhow!("Failed to execute {}: {}", tool, e))?;

    if !status.success() {
        return Err(anyhow!("Download failed with {}", tool));
    }

    Ok(())
}

pub fn download_model(model: ModelSize, models_dir: &Path) -> Result<()> {
    let file_path = models_dir.join(model.model_filename());

    if file_path.exists() {
        println!("Model '{model}' already exists. Skipping download.");
        return Ok(());
    }

    let url = format!("{MODEL_SOURCE}/resolve/main/{}", model.model_filename());
    println!("Downloading ggml model '{model}' from '{MODEL_SOURCE}'...");

    let tool = check_download_tool()?;

    std::fs::create_dir_all(models_dir)
        .map_err(|e| anyhow!("Failed to create models directory: {}", e))?;

    let output_path = file_path
        .to_str()
        .ok_or_else(|| anyhow!("Models directory path is not valid UTF-8"))?;
    download_with_tool(&tool, &url, output_path)?;

    println!("Done! Model '{}' saved in '{}'", model, file_path.display());
    println!("You can now start the server:");
    println!("  $ dialogue-draft serve");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_url_shape() {
        let url = format!(
            "{MODEL_SOURCE}/resolve/main/{}",
            ModelSize::Large.model_filename()
        );
        assert_eq!(
            url,
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large.bin"
        );
    }

    #[test]
    fn test_existing_model_is_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(ModelSize::Tiny.model_filename());
        std::fs::write(&path, b"stub").unwrap();

        // Must return without touching the network or the file.
        download_model(ModelSize::Tiny, tmp.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"stub");
    }
}
