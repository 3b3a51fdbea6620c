use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Session;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEventKind {
    Restored { session: Session },
    SignedIn { session: Session },
    SignedOut { session: Session },
    Registered { email: String },
    ThemeToggled { dark_theme: bool },
    PasswordResetRequested { email: String },
}

/// Published by the session controller after each applied operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub at: DateTime<Utc>,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn now(kind: SessionEventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }
}
