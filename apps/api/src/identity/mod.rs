//! Email/password accounts backed by an external GoTrue-compatible identity provider.
//!
//! Only the request/response boundary lives here: the provider owns user records.

pub mod handlers;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::IdentityConfig;

/// The signed-in user, kept on the session until sign-out or teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Accounts are not configured.")]
    NotConfigured,

    #[error("Could not reach the identity provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected identity provider response: {0}")]
    MalformedResponse(String),
}

impl IdentityError {
    /// Message shown to the user. Provider messages pass through verbatim,
    /// except for rate-limited sign-ups and unconfirmed emails.
    pub fn friendly_message(&self) -> String {
        let raw = self.to_string();
        let lowered = raw.to_lowercase();
        if lowered.contains("rate limit") {
            "Too many sign-up attempts. Please wait a few minutes and try again.".to_string()
        } else if lowered.contains("email not confirmed") {
            "Please confirm your email address before signing in.".to_string()
        } else {
            raw
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthResponse {
    Session { user: ProviderUser },
    UserOnly(ProviderUser),
}

/// GoTrue has used several error shapes over time; take the first message present.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Result of a sign-up. Providers that require email confirmation return the
/// user without a session; that user is not signed in yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub identity: Identity,
    pub signed_in: bool,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    public_key: String,
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.clone(),
            public_key: config.public_key.clone(),
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, IdentityError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "display_name": display_name },
        });
        let response = self.post("/auth/v1/signup", &body).await?;
        let (user, signed_in) = match response {
            AuthResponse::Session { user } => (user, true),
            AuthResponse::UserOnly(user) => (user, false),
        };
        info!("Identity provider accepted sign-up for user {}", user.id);
        Ok(SignUpOutcome {
            identity: to_identity(user, email),
            signed_in,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let body = json!({ "email": email, "password": password });
        match self.post("/auth/v1/token?grant_type=password", &body).await? {
            AuthResponse::Session { user } => {
                info!("User {} signed in", user.id);
                Ok(to_identity(user, email))
            }
            AuthResponse::UserOnly(_) => Err(IdentityError::MalformedResponse(
                "sign-in returned no session".to_string(),
            )),
        }
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> Result<AuthResponse, IdentityError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .header("apikey", &self.public_key)
            .bearer_auth(&self.public_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&text)
                .ok()
                .and_then(ProviderError::into_message)
                .unwrap_or(text);
            warn!("Identity provider returned {}: {}", status, message);
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| IdentityError::MalformedResponse(e.to_string()))
    }
}

fn to_identity(user: ProviderUser, fallback_email: &str) -> Identity {
    let email = user.email.unwrap_or_else(|| fallback_email.to_string());
    let display_name = user
        .user_metadata
        .display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    Identity {
        user_id: user.id,
        email,
        display_name,
    }
}
