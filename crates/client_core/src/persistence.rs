//! Durable mirror of the session's identity fields in device key-value storage.
//!
//! Each field lives under its own key. Writes and removals run in field order
//! and stop at the first failure; reads are attempted for every key and a
//! failing key reads as absent.

use std::sync::Arc;

use serde::Serialize;
use shared::domain::IdentityRecord;
use storage::KeyValueStore;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistedField {
    Token,
    Email,
    Name,
    Number,
    Theme,
}

impl PersistedField {
    pub const IDENTITY: [PersistedField; 4] = [
        PersistedField::Token,
        PersistedField::Email,
        PersistedField::Name,
        PersistedField::Number,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PersistedField::Token => "userToken",
            PersistedField::Email => "userEmail",
            PersistedField::Name => "userName",
            PersistedField::Number => "userNumber",
            PersistedField::Theme => "userTheme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageOp {
    Get,
    Set,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceFailure {
    pub field: PersistedField,
    pub op: StorageOp,
    pub message: String,
}

/// Outcome of mirroring a session change into storage. Independent of whether
/// the in-memory transition was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failures", rename_all = "snake_case")]
pub enum PersistenceReport {
    Mirrored,
    Skipped,
    Failed(Vec<PersistenceFailure>),
}

impl PersistenceReport {
    pub fn is_mirrored(&self) -> bool {
        matches!(self, PersistenceReport::Mirrored)
    }

    pub fn failures(&self) -> &[PersistenceFailure] {
        match self {
            PersistenceReport::Failed(failures) => failures,
            _ => &[],
        }
    }

    fn from_failures(failures: Vec<PersistenceFailure>) -> Self {
        if failures.is_empty() {
            PersistenceReport::Mirrored
        } else {
            PersistenceReport::Failed(failures)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredFields {
    pub token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub dark_theme: Option<bool>,
}

pub struct SessionMirror {
    store: Arc<dyn KeyValueStore>,
    persist_theme: bool,
}

impl SessionMirror {
    pub fn new(store: Arc<dyn KeyValueStore>, persist_theme: bool) -> Self {
        Self {
            store,
            persist_theme,
        }
    }

    pub fn persists_theme(&self) -> bool {
        self.persist_theme
    }

    pub async fn write_identity(&self, record: &IdentityRecord) -> PersistenceReport {
        let values = [
            (PersistedField::Token, record.id.as_str()),
            (PersistedField::Email, record.email.as_str()),
            (PersistedField::Name, record.name.as_str()),
            (PersistedField::Number, record.number.as_str()),
        ];
        for (field, value) in values {
            if let Err(err) = self.store.set(field.key(), value).await {
                return failed(field, StorageOp::Set, &err);
            }
        }
        PersistenceReport::Mirrored
    }

    pub async fn clear_identity(&self) -> PersistenceReport {
        for field in PersistedField::IDENTITY {
            if let Err(err) = self.store.remove(field.key()).await {
                return failed(field, StorageOp::Remove, &err);
            }
        }
        PersistenceReport::Mirrored
    }

    pub async fn write_theme(&self, dark_theme: bool) -> PersistenceReport {
        if !self.persist_theme {
            return PersistenceReport::Skipped;
        }
        let value = if dark_theme { "dark" } else { "light" };
        match self.store.set(PersistedField::Theme.key(), value).await {
            Ok(()) => PersistenceReport::Mirrored,
            Err(err) => failed(PersistedField::Theme, StorageOp::Set, &err),
        }
    }

    pub async fn read(&self) -> (RestoredFields, PersistenceReport) {
        let mut failures = Vec::new();
        let mut fields = RestoredFields {
            token: self.read_field(PersistedField::Token, &mut failures).await,
            email: self.read_field(PersistedField::Email, &mut failures).await,
            name: self.read_field(PersistedField::Name, &mut failures).await,
            number: self.read_field(PersistedField::Number, &mut failures).await,
            dark_theme: None,
        };

        if self.persist_theme {
            fields.dark_theme = match self
                .read_field(PersistedField::Theme, &mut failures)
                .await
                .as_deref()
            {
                Some("dark") => Some(true),
                Some("light") => Some(false),
                Some(other) => {
                    warn!(value = other, "ignoring unrecognised stored theme");
                    None
                }
                None => None,
            };
        }

        (fields, PersistenceReport::from_failures(failures))
    }

    async fn read_field(
        &self,
        field: PersistedField,
        failures: &mut Vec<PersistenceFailure>,
    ) -> Option<String> {
        match self.store.get(field.key()).await {
            Ok(value) => {
                debug!(key = field.key(), present = value.is_some(), "read stored field");
                value
            }
            Err(err) => {
                warn!(key = field.key(), error = %err, "failed to read stored field");
                failures.push(PersistenceFailure {
                    field,
                    op: StorageOp::Get,
                    message: format!("{err:#}"),
                });
                None
            }
        }
    }
}

fn failed(field: PersistedField, op: StorageOp, err: &anyhow::Error) -> PersistenceReport {
    warn!(key = field.key(), ?op, error = %err, "session storage mirror failed");
    PersistenceReport::Failed(vec![PersistenceFailure {
        field,
        op,
        message: format!("{err:#}"),
    }])
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
