use super::*;
use crate::test_support::{identity, FlakyStore};
use async_trait::async_trait;
use shared::{
    domain::{IdentityRecord, SessionStatus},
    error::{ApiException, ErrorCode},
    protocol::SessionEventKind,
};
use storage::{KeyValueStore, MemoryStore};
use tokio::sync::Mutex;

#[derive(Default)]
struct StubIdentityService {
    reject_with: Option<ErrorCode>,
    calls: Mutex<Vec<String>>,
}

impl StubIdentityService {
    fn rejecting(code: ErrorCode) -> Self {
        Self {
            reject_with: Some(code),
            ..Self::default()
        }
    }

    fn outcome(&self) -> Result<(), IdentityError> {
        match self.reject_with {
            Some(code) => Err(ApiException::new(code, "rejected by stub").into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityService for StubIdentityService {
    async fn sign_in(&self, credentials: &Credentials) -> Result<IdentityRecord, IdentityError> {
        self.calls
            .lock()
            .await
            .push(format!("sign_in:{}", credentials.email));
        self.outcome()?;
        Ok(identity("signed-in"))
    }

    async fn sign_up(&self, registration: &Registration) -> Result<IdentityRecord, IdentityError> {
        self.calls
            .lock()
            .await
            .push(format!("sign_up:{}", registration.email));
        self.outcome()?;
        Ok(IdentityRecord {
            id: "registered".into(),
            email: registration.email.clone(),
            name: registration.name.clone(),
            number: registration.number.clone(),
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        self.calls.lock().await.push(format!("reset:{email}"));
        self.outcome()
    }
}

fn build_flows(
    identity: StubIdentityService,
    store: Arc<dyn KeyValueStore>,
) -> (AccountFlows, Arc<StubIdentityService>) {
    let identity = Arc::new(identity);
    let controller = SessionController::new(store);
    (AccountFlows::new(identity.clone(), controller), identity)
}

fn credentials() -> Credentials {
    Credentials {
        email: "ada@example.com".into(),
        password: "hunter2".into(),
    }
}

fn registration() -> Registration {
    Registration {
        email: "grace@example.com".into(),
        password: "secret".into(),
        name: "Grace".into(),
        number: "5550101".into(),
    }
}

#[tokio::test]
async fn sign_in_authenticates_with_identity_record() {
    let (flows, _identity) = build_flows(
        StubIdentityService::default(),
        Arc::new(MemoryStore::new()),
    );

    let transition = flows.sign_in(&credentials()).await.expect("sign in");
    assert_eq!(transition.session.status(), SessionStatus::Authenticated);
    assert_eq!(transition.session.token.as_deref(), Some("signed-in"));
}

#[tokio::test]
async fn rejected_sign_in_leaves_session_signed_out() {
    let (flows, _identity) = build_flows(
        StubIdentityService::rejecting(ErrorCode::InvalidCredentials),
        Arc::new(MemoryStore::new()),
    );

    let err = flows.sign_in(&credentials()).await.expect_err("rejected");
    assert!(matches!(
        err,
        AccountError::Identity(IdentityError::Rejected(ApiException {
            code: ErrorCode::InvalidCredentials,
            ..
        }))
    ));
    assert_ne!(
        flows.controller().snapshot().status(),
        SessionStatus::Authenticated
    );
}

#[tokio::test]
async fn empty_credentials_never_reach_identity_service() {
    let (flows, identity) = build_flows(
        StubIdentityService::default(),
        Arc::new(MemoryStore::new()),
    );

    let err = flows
        .sign_in(&Credentials {
            email: "  ".into(),
            password: "hunter2".into(),
        })
        .await
        .expect_err("validation");
    assert!(matches!(err, AccountError::Validation(_)));
    assert!(identity.calls.lock().await.is_empty());
}

#[tokio::test]
async fn register_stores_identity_but_stays_signed_out() {
    let store = Arc::new(MemoryStore::new());
    let (flows, _identity) = build_flows(StubIdentityService::default(), store.clone());

    let transition = flows.register(&registration()).await.expect("register");
    assert!(!transition.applied);
    assert_eq!(transition.session.status(), SessionStatus::Unauthenticated);
    assert_eq!(
        store.get("userEmail").await.expect("get").as_deref(),
        Some("grace@example.com")
    );
}

#[tokio::test]
async fn register_survives_storage_failure() {
    let store = FlakyStore::new(MemoryStore::new());
    store.fail(crate::persistence::StorageOp::Set, "userToken");
    let (flows, _identity) = build_flows(StubIdentityService::default(), store);

    let transition = flows.register(&registration()).await.expect("register");
    assert!(!transition.persistence.is_mirrored());
    assert_eq!(transition.session.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn password_reset_notifies_controller_after_identity_service() {
    let (flows, identity) = build_flows(
        StubIdentityService::default(),
        Arc::new(MemoryStore::new()),
    );
    let mut events = flows.controller().subscribe_events();

    flows
        .request_password_reset("ada@example.com")
        .await
        .expect("reset");
    assert_eq!(
        identity.calls.lock().await.as_slice(),
        &["reset:ada@example.com".to_string()]
    );
    let event = events.try_recv().expect("event");
    assert!(matches!(
        event.kind,
        SessionEventKind::PasswordResetRequested { ref email } if email == "ada@example.com"
    ));
}

#[tokio::test]
async fn failed_password_reset_publishes_nothing() {
    let (flows, _identity) = build_flows(
        StubIdentityService::rejecting(ErrorCode::UserNotFound),
        Arc::new(MemoryStore::new()),
    );
    let mut events = flows.controller().subscribe_events();

    flows
        .request_password_reset("nobody@example.com")
        .await
        .expect_err("unknown user");
    assert!(events.try_recv().is_err());
}
