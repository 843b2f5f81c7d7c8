pub mod config;
pub mod resampler;
pub mod transcriber;
