use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::IdentityRecord;
use storage::{KeyValueStore, MemoryStore, StoredEntry};

use crate::persistence::StorageOp;

/// Memory store that fails selected operations on selected keys.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<(StorageOp, String)>>,
    calls: Mutex<Vec<(StorageOp, String)>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ..Self::default()
        })
    }

    pub fn fail(&self, op: StorageOp, key: &str) {
        self.failing
            .lock()
            .expect("failing set")
            .insert((op, key.to_string()));
    }

    pub fn heal(&self) {
        self.failing.lock().expect("failing set").clear();
    }

    pub fn calls(&self) -> Vec<(StorageOp, String)> {
        self.calls.lock().expect("calls").clone()
    }

    fn check(&self, op: StorageOp, key: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("calls")
            .push((op, key.to_string()));
        if self
            .failing
            .lock()
            .expect("failing set")
            .contains(&(op, key.to_string()))
        {
            return Err(anyhow!("injected {op:?} failure for '{key}'"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check(StorageOp::Get, key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(StorageOp::Set, key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check(StorageOp::Remove, key)?;
        self.inner.remove(key).await
    }

    async fn entries(&self) -> Result<Vec<StoredEntry>> {
        self.inner.entries().await
    }
}

pub fn identity(id: &str) -> IdentityRecord {
    IdentityRecord {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: format!("User {id}"),
        number: "5550100".to_string(),
    }
}

pub fn stored_session() -> MemoryStore {
    MemoryStore::with_entries([
        ("userToken", "t1"),
        ("userEmail", "e1"),
        ("userName", "n1"),
        ("userNumber", "123"),
    ])
}
