use clap::Parser;
use std::path::PathBuf;

use crate::distilbert_engine::EngineConfig;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "7860")]
    pub port: u16,

    /// Local directory holding a copy of the triage model files
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Model revision/branch on Hugging Face
    #[arg(long, env = "MODEL_REVISION", default_value = "main")]
    pub model_revision: String,

    /// Use PyTorch weights instead of safetensors
    #[arg(long, env = "USE_PTH")]
    pub use_pth: bool,

    /// Run on CPU instead of GPU
    #[arg(long, env = "CPU_ONLY")]
    pub cpu_only: bool,

    /// Maximum number of tokens fed to the model; longer e-mails are truncated
    #[arg(long, env = "MAX_SEQUENCE_LENGTH", default_value = "256")]
    pub max_sequence_length: usize,

    /// Largest accepted request body, uploads included
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    pub max_upload_bytes: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            model_path: config.model_path.clone(),
            revision: config.model_revision.clone(),
            use_pth: config.use_pth,
            cpu: config.cpu_only,
            max_sequence_length: config.max_sequence_length,
        }
    }
}

impl Config {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
