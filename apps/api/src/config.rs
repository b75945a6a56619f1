use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SITE_URL: &str = "https://your-site-url.com";
const DEFAULT_SITE_NAME: &str = "SkillBridge";

/// Application configuration loaded from environment variables.
/// Fails at startup if the completion credential is missing or a numeric value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub completion_api_key: String,
    /// Absent means voice answers are disabled; the transcription client reports "not configured".
    pub transcription_api_key: Option<String>,
    pub site_url: String,
    pub site_name: String,
    pub identity: Option<IdentityConfig>,
    pub interview_max_questions: u32,
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub transcription_poll_interval: Duration,
    pub completion_timeout: Option<Duration>,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub url: String,
    pub public_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let completion_api_key = var("OPENROUTER_API_KEY")
            .or_else(|| var("GEMINI_API_KEY"))
            .context("Required environment variable 'OPENROUTER_API_KEY' is not set")?;

        let identity = match (var("IDENTITY_URL"), var("IDENTITY_PUBLIC_KEY")) {
            (Some(url), Some(public_key)) => Some(IdentityConfig {
                url: url.trim_end_matches('/').to_string(),
                public_key,
            }),
            _ => None,
        };

        Ok(Config {
            completion_api_key,
            transcription_api_key: var("ASSEMBLYAI_API_KEY"),
            site_url: var("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            site_name: var("SITE_NAME").unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            identity,
            interview_max_questions: parse_or(&var, "INTERVIEW_MAX_QUESTIONS", 20)?,
            session_idle_ttl: Duration::from_secs(parse_or(&var, "SESSION_IDLE_TTL_SECS", 3600)?),
            session_sweep_interval: Duration::from_secs(parse_or(
                &var,
                "SESSION_SWEEP_INTERVAL_SECS",
                300,
            )?),
            transcription_poll_interval: Duration::from_millis(parse_or(
                &var,
                "TRANSCRIPTION_POLL_INTERVAL_MS",
                2000,
            )?),
            completion_timeout: var("COMPLETION_TIMEOUT_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .map(Duration::from_secs)
                        .context("COMPLETION_TIMEOUT_SECS must be a whole number of seconds")
                })
                .transpose()?,
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
