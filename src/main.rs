mod audio;
mod cli;
mod client;
mod config;
mod download;
mod dto;
mod error;
mod output;
mod server;
mod whisper;

use clap::Parser;

use cli::{Cli, Commands};
use config::ClientConfig;
use whisper::config::WhisperConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            host,
            port,
            models_dir,
            output_dir,
            cpu,
            threads,
        } => {
            let mut whisper_config = WhisperConfig::default();
            if let Some(dir) = models_dir {
                whisper_config.models_dir = dir;
            }
            whisper_config.use_gpu = !cpu;
            whisper_config.num_threads = threads;

            server::run_server(host, port, output_dir, whisper_config).await?;
        }
        Commands::TranscribeFile {
            audio_file,
            server_url,
            model,
            language,
            prompt,
        } => {
            let client_config =
                ClientConfig::new(server_url, audio_file, model, language, prompt);
            client::run_client(client_config).await?;
        }
        Commands::Download { model, models_dir } => {
            let dir = models_dir.unwrap_or_else(|| WhisperConfig::default().models_dir);
            download::download_model(model, &dir)?;
        }
    }

    Ok(())
}
