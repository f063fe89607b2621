//! Firebase Cloud Messaging (HTTP v1) client.
//!
//! Authenticates with a service account: a short-lived RS256 assertion is
//! exchanged for an OAuth2 access token, which is cached until shortly
//! before it expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::{PushClient, PushError, PushOutcome};
use crate::config::PushSettings;
use crate::domain::PushMessage;

const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime accepted by Google (max one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Access tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account key file this client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    /// Parse a key file. Escaped `\n` sequences in the private key (common
    /// when the JSON is passed through an environment variable) are restored.
    pub fn from_json(raw: &str) -> Result<Self, PushError> {
        let mut account: Self =
            serde_json::from_str(raw).map_err(|e| PushError::Credentials(e.to_string()))?;
        account.private_key = account.private_key.replace("\\n", "\n");
        Ok(account)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// FCM HTTP v1 push client.
pub struct FcmPushClient {
    client: Client,
    account: ServiceAccount,
    signing_key: EncodingKey,
    send_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl FcmPushClient {
    pub fn new(account: ServiceAccount, settings: &PushSettings) -> Result<Self, PushError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| PushError::Credentials(format!("invalid private key: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            settings.endpoint.trim_end_matches('/'),
            account.project_id
        );

        Ok(Self {
            client,
            account,
            signing_key,
            send_url,
            token: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    /// Return a valid access token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, PushError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_access_token(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_access_token(&self, now: DateTime<Utc>) -> Result<CachedToken, PushError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: MESSAGING_SCOPE,
            aud: &self.account.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| PushError::Auth(format!("failed to sign assertion: {}", e)))?;

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = (token.expires_in - TOKEN_REFRESH_MARGIN_SECS).max(0);

        tracing::debug!(expires_in = token.expires_in, "Obtained FCM access token");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + chrono::Duration::seconds(lifetime),
        })
    }

    /// Build the `messages:send` request body.
    fn build_payload(message: &PushMessage) -> serde_json::Value {
        let mut payload = json!({
            "message": {
                "token": message.target.token(),
                "notification": {
                    "title": message.title,
                    "body": message.body,
                },
            }
        });

        if !message.data.is_empty() {
            payload["message"]["data"] = json!(message.data);
        }

        payload
    }
}

#[async_trait]
impl PushClient for FcmPushClient {
    fn provider(&self) -> &'static str {
        "fcm"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, message: &PushMessage) -> Result<PushOutcome, PushError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&Self::build_payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendResponse = response.json().await?;
        Ok(PushOutcome::Sent {
            message_id: sent.name,
        })
    }
}
