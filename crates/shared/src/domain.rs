use serde::{Deserialize, Serialize};

/// Identity returned by the identity service after a successful sign-in or
/// sign-up. `id` doubles as the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Point-in-time view of the device user's session.
///
/// `token` is `None` exactly when the user is signed out. The remaining
/// identity fields are only meaningful alongside a token but may be missing
/// independently of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub dark_theme: bool,
    pub restored: bool,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        if !self.restored {
            SessionStatus::Unknown
        } else if self.token.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn apply_identity(&mut self, record: &IdentityRecord) {
        self.token = Some(record.id.clone());
        self.email = Some(record.email.clone());
        self.name = Some(record.name.clone());
        self.number = Some(record.number.clone());
    }

    pub fn clear_identity(&mut self) {
        self.token = None;
        self.email = None;
        self.name = None;
        self.number = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_unknown_until_restored() {
        let mut session = Session::default();
        assert_eq!(session.status(), SessionStatus::Unknown);

        session.restored = true;
        assert_eq!(session.status(), SessionStatus::Unauthenticated);

        session.token = Some("t1".into());
        assert_eq!(session.status(), SessionStatus::Authenticated);
    }

    #[test]
    fn clear_identity_keeps_theme() {
        let mut session = Session {
            dark_theme: true,
            restored: true,
            ..Session::default()
        };
        session.apply_identity(&IdentityRecord {
            id: "t1".into(),
            email: "e1".into(),
            name: "n1".into(),
            number: "123".into(),
        });
        session.clear_identity();

        assert_eq!(session.token, None);
        assert_eq!(session.number, None);
        assert!(session.dark_theme);
    }
}
