use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use shared::{
    domain::{Credentials, IdentityRecord, Registration},
    error::{ApiError, ApiException},
    protocol::{PasswordResetRequest, SignInRequest, SignUpRequest},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity service rejected the request: {0}")]
    Rejected(#[from] ApiException),
    #[error("identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected identity service response: {0}")]
    UnexpectedResponse(String),
    #[error("identity service is not configured")]
    Unavailable,
}

/// Hosted identity backend. Owns credential checks, account creation and
/// password-reset delivery.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<IdentityRecord, IdentityError>;
    async fn sign_up(&self, registration: &Registration) -> Result<IdentityRecord, IdentityError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;
}

pub struct MissingIdentityService;

#[async_trait]
impl IdentityService for MissingIdentityService {
    async fn sign_in(&self, _credentials: &Credentials) -> Result<IdentityRecord, IdentityError> {
        Err(IdentityError::Unavailable)
    }

    async fn sign_up(&self, _registration: &Registration) -> Result<IdentityRecord, IdentityError> {
        Err(IdentityError::Unavailable)
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), IdentityError> {
        Err(IdentityError::Unavailable)
    }
}

pub struct HttpIdentityService {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpIdentityService {
    pub fn new(base_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut parsed = Url::parse(base_url)
            .map_err(|err| anyhow::anyhow!("invalid identity service url '{base_url}': {err}"))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("identity service url '{base_url}' cannot carry a path");
        }
        // `join` replaces the last segment unless the path ends in a slash
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url: parsed,
            api_key,
        })
    }

    fn endpoint(&self, action: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(&format!("accounts/{action}"))
            .map_err(|err| {
                IdentityError::UnexpectedResponse(format!("bad endpoint {action}: {err}"))
            })
    }

    async fn post<B: Serialize + Sync>(&self, action: &str, body: &B) -> Result<Response, IdentityError> {
        let mut request = self.http.post(self.endpoint(action)?).json(body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(action, %status, "identity service responded");
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await?;
        match serde_json::from_str::<ApiError>(&raw) {
            Ok(api_error) => Err(ApiException::from(api_error).into()),
            Err(_) => Err(IdentityError::UnexpectedResponse(format!("{status}: {raw}"))),
        }
    }

    async fn identity_from(response: Response) -> Result<IdentityRecord, IdentityError> {
        let record: IdentityRecord = response.json().await?;
        if record.id.trim().is_empty() {
            return Err(IdentityError::UnexpectedResponse(
                "identity record is missing an id".into(),
            ));
        }
        Ok(record)
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn sign_in(&self, credentials: &Credentials) -> Result<IdentityRecord, IdentityError> {
        let response = self
            .post(
                "sign-in",
                &SignInRequest {
                    email: credentials.email.clone(),
                    password: credentials.password.clone(),
                },
            )
            .await?;
        Self::identity_from(response).await
    }

    async fn sign_up(&self, registration: &Registration) -> Result<IdentityRecord, IdentityError> {
        let response = self
            .post(
                "sign-up",
                &SignUpRequest {
                    email: registration.email.clone(),
                    password: registration.password.clone(),
                    name: registration.name.clone(),
                    number: registration.number.clone(),
                },
            )
            .await?;
        Self::identity_from(response).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        self.post(
            "password-reset",
            &PasswordResetRequest {
                email: email.to_string(),
            },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
