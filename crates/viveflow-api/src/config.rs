use std::path::PathBuf;

use tracing::warn;

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the hosted generation service. A missing key is not
    /// fatal at startup; requests that need it fail individually.
    pub groq_api_key: Option<String>,
    pub port: u16,
    /// Directory for the recency list and chat transcripts.
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let groq_api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        if groq_api_key.is_none() {
            warn!("GROQ_API_KEY is not set; generation requests will fail");
        }
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let data_dir = std::env::var("VIVEFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self {
            groq_api_key,
            port,
            data_dir,
        }
    }
}
