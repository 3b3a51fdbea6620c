//! Screen-facing account actions: talk to the identity service first, then
//! hand the verified identity to the session controller.

use std::sync::Arc;

use shared::domain::{Credentials, Registration};
use thiserror::Error;
use tracing::warn;

use crate::{
    identity::{IdentityError, IdentityService},
    SessionController, Transition,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[derive(Clone)]
pub struct AccountFlows {
    identity: Arc<dyn IdentityService>,
    controller: Arc<SessionController>,
}

impl AccountFlows {
    pub fn new(identity: Arc<dyn IdentityService>, controller: Arc<SessionController>) -> Self {
        Self {
            identity,
            controller,
        }
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Transition, AccountError> {
        require("email", &credentials.email)?;
        require("password", &credentials.password)?;

        let record = self
            .identity
            .sign_in(credentials)
            .await
            .inspect_err(|err| {
                warn!(email = %credentials.email, error = %err, "sign-in rejected")
            })?;
        Ok(self.controller.sign_in(&record).await)
    }

    /// Creates the account and stores it locally. The user still has to sign
    /// in afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<Transition, AccountError> {
        require("email", &registration.email)?;
        require("password", &registration.password)?;

        let record = self
            .identity
            .sign_up(registration)
            .await
            .inspect_err(|err| {
                warn!(email = %registration.email, error = %err, "sign-up rejected")
            })?;
        Ok(self.controller.sign_up(&record).await)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        require("email", email)?;

        self.identity.send_password_reset(email).await?;
        self.controller.forgot_password(email);
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/accounts_tests.rs"]
mod tests;
