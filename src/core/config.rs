use std::env;

use anyhow::{Context, Result};

use crate::genai;

/// Runtime configuration resolved from the process environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub genai_api_hostname: String,
    pub genai_api_key: String,
    pub genai_model: String,
}

impl AppConfig {
    /// Reads configuration from the environment. The API key is
    /// required; without it no turn can run, so startup fails.
    pub fn from_env() -> Result<Self> {
        let genai_api_key =
            env::var("GOOGLE_API_KEY").context("Missing env var GOOGLE_API_KEY")?;
        let genai_api_hostname = env::var("PARLEY_GENAI_HOST")
            .unwrap_or_else(|_| genai::DEFAULT_API_HOSTNAME.to_string());
        let genai_model = env::var("PARLEY_GENAI_MODEL")
            .unwrap_or_else(|_| genai::DEFAULT_MODEL.to_string());

        Ok(Self {
            genai_api_hostname,
            genai_api_key,
            genai_model,
        })
    }
}
