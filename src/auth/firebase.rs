use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::{AuthError, AuthErrorCode, Identity, IdentityNotifier, IdentityProvider};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Email/password accounts hosted by Firebase Authentication, spoken to over the
/// Identity Toolkit REST API. Session persistence is not attempted, so the initial
/// emission is always "absent".
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
    notifier: IdentityNotifier,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let notifier = IdentityNotifier::new();
        notifier.publish(None);

        Self {
            client: builder.build().unwrap_or_default(),
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            api_key: api_key.into(),
            notifier,
        }
    }

    /// Points the adapter at another endpoint, e.g. the local auth emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn password_call(
        &self,
        operation: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, operation, self.api_key);
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(operation, "Identity provider unreachable: {}", e);
                AuthError::new(AuthErrorCode::NetworkRequestFailed)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let code = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => map_rest_error(&envelope.error.message),
                Err(_) => AuthErrorCode::Other(format!("http-{}", status.as_u16())),
            };
            return Err(AuthError::new(code));
        }

        let parsed: PasswordResponse = response.json().await.map_err(|e| {
            warn!(operation, "Undecodable identity provider response: {}", e);
            AuthError::new(AuthErrorCode::NetworkRequestFailed)
        })?;

        let identity = Identity::new(parsed.local_id, parsed.email);
        self.notifier.publish(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.notifier.publish(None);
        Ok(())
    }

    fn notifier(&self) -> IdentityNotifier {
        self.notifier.clone()
    }
}

/// The REST API reports upper-case reasons, sometimes followed by " : detail".
pub fn map_rest_error(message: &str) -> AuthErrorCode {
    let reason = message.split(':').next().unwrap_or(message).trim();
    match reason {
        "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthErrorCode::WrongPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
        "USER_DISABLED" => AuthErrorCode::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
        "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        other => AuthErrorCode::Other(other.to_ascii_lowercase().replace('_', "-")),
    }
}
