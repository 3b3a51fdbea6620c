use std::{sync::Arc, time::Duration};

use serde::Serialize;
use shared::{
    domain::{IdentityRecord, Session},
    protocol::{SessionEvent, SessionEventKind},
};
use storage::KeyValueStore;
use tokio::{
    sync::{broadcast, watch, Mutex, OnceCell},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

pub mod accounts;
pub mod config;
pub mod identity;
pub mod navigation;
pub mod persistence;
pub mod theme;

pub use accounts::{AccountError, AccountFlows};
pub use identity::{HttpIdentityService, IdentityError, IdentityService, MissingIdentityService};
pub use navigation::NavigationTree;
pub use persistence::{PersistedField, PersistenceFailure, PersistenceReport, SessionMirror};
pub use theme::{resolve_theme, Theme};

#[cfg(test)]
pub(crate) mod test_support;

const SESSION_EVENT_CAPACITY: usize = 64;

/// Result of a session operation. `applied` reports whether the in-memory
/// session changed; `persistence` reports the storage mirror separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub session: Session,
    pub applied: bool,
    pub persistence: PersistenceReport,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    pub persist_theme: bool,
}

/// Sole owner of the device session.
///
/// Mutations are serialised by an operation lock and published as whole
/// snapshots, so observers never see a partially updated session. Every
/// mutator completes the one-time restore before running, which means a
/// user action can never be overwritten by a late restore.
pub struct SessionController {
    mirror: SessionMirror,
    op_lock: Mutex<()>,
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
    restore: OnceCell<PersistenceReport>,
}

impl SessionController {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Arc<Self> {
        Self::new_with_options(store, ControllerOptions::default())
    }

    pub fn new_with_options(store: Arc<dyn KeyValueStore>, options: ControllerOptions) -> Arc<Self> {
        let (state, _) = watch::channel(Session::default());
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Arc::new(Self {
            mirror: SessionMirror::new(store, options.persist_theme),
            op_lock: Mutex::new(()),
            state,
            events,
            restore: OnceCell::new(),
        })
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn updates(&self) -> WatchStream<Session> {
        WatchStream::new(self.state.subscribe())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_restored(&self) -> bool {
        self.restore.initialized()
    }

    /// Loads the persisted session once. Later calls leave the session alone
    /// and report `applied: false` with the original restore's report.
    pub async fn restore(&self) -> Transition {
        let mut applied = false;
        let ran_restore = &mut applied;
        let persistence = self
            .restore
            .get_or_init(|| async move {
                *ran_restore = true;
                self.restore_from_store().await
            })
            .await
            .clone();

        Transition {
            session: self.snapshot(),
            applied,
            persistence,
        }
    }

    /// Runs `restore` on a background task after `delay`.
    pub fn spawn_restore(self: &Arc<Self>, delay: Duration) -> JoinHandle<Transition> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            controller.restore().await
        })
    }

    /// Resolves once the restore transition has been published.
    pub async fn wait_restored(&self) -> Session {
        let mut rx = self.state.subscribe();
        rx.wait_for(|session| session.restored)
            .await
            .map(|session| Session::clone(&session))
            // the sender lives in `self`, so the channel cannot close here
            .unwrap_or_else(|_| self.snapshot())
    }

    pub async fn sign_in(&self, record: &IdentityRecord) -> Transition {
        self.restore().await;
        let _guard = self.op_lock.lock().await;

        info!(email = %record.email, name = %record.name, "signing in");
        let persistence = self.mirror.write_identity(record).await;
        let session = self.update(|session| session.apply_identity(record));
        self.publish(SessionEventKind::SignedIn {
            session: session.clone(),
        });

        Transition {
            session,
            applied: true,
            persistence,
        }
    }

    pub async fn sign_out(&self) -> Transition {
        self.restore().await;
        let _guard = self.op_lock.lock().await;

        info!("signing out");
        let persistence = self.mirror.clear_identity().await;
        let session = self.update(Session::clear_identity);
        self.publish(SessionEventKind::SignedOut {
            session: session.clone(),
        });

        Transition {
            session,
            applied: true,
            persistence,
        }
    }

    /// Stores a freshly registered identity without signing the user in.
    pub async fn sign_up(&self, record: &IdentityRecord) -> Transition {
        self.restore().await;
        let _guard = self.op_lock.lock().await;

        info!(email = %record.email, name = %record.name, "registering account");
        let persistence = self.mirror.write_identity(record).await;
        self.publish(SessionEventKind::Registered {
            email: record.email.clone(),
        });

        Transition {
            session: self.snapshot(),
            applied: false,
            persistence,
        }
    }

    pub async fn toggle_theme(&self) -> Transition {
        self.restore().await;
        let _guard = self.op_lock.lock().await;

        let session = self.update(|session| session.dark_theme = !session.dark_theme);
        debug!(dark_theme = session.dark_theme, "theme toggled");
        let persistence = self.mirror.write_theme(session.dark_theme).await;
        self.publish(SessionEventKind::ThemeToggled {
            dark_theme: session.dark_theme,
        });

        Transition {
            session,
            applied: true,
            persistence,
        }
    }

    pub fn forgot_password(&self, email: &str) {
        info!(email, "password reset requested");
        self.publish(SessionEventKind::PasswordResetRequested {
            email: email.to_string(),
        });
    }

    async fn restore_from_store(&self) -> PersistenceReport {
        let _guard = self.op_lock.lock().await;

        let (fields, report) = self.mirror.read().await;
        let session = self.update(|session| {
            session.token = fields.token;
            session.email = fields.email;
            session.name = fields.name;
            session.number = fields.number;
            if let Some(dark_theme) = fields.dark_theme {
                session.dark_theme = dark_theme;
            }
            session.restored = true;
        });
        info!(status = ?session.status(), "session restored");
        self.publish(SessionEventKind::Restored {
            session: session.clone(),
        });

        report
    }

    fn update(&self, mutate: impl FnOnce(&mut Session)) -> Session {
        self.state.send_modify(mutate);
        self.snapshot()
    }

    fn publish(&self, kind: SessionEventKind) {
        let _ = self.events.send(SessionEvent::now(kind));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
