//! Session gate
//!
//! Decides whether the viewer is logged out, a normal user, or an admin.
//!
//! ```text
//! Unauthenticated --session found--> Loading --role--> User | Admin
//! any state --logout / 401--> Unauthenticated
//! ```

use anyhow::Result;

use super::{Session, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    Loading,
    User,
    Admin,
}

#[derive(Debug)]
pub struct SessionGate {
    store: SessionStore,
    session: Option<Session>,
    state: GateState,
}

impl SessionGate {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            session: None,
            state: GateState::Unauthenticated,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Read the persisted session on entry
    pub fn enter(&mut self) -> GateState {
        self.session = self.store.load();
        self.state = match self.session {
            Some(_) => GateState::Loading,
            None => GateState::Unauthenticated,
        };
        self.state
    }

    /// Loading -> User | Admin. Other states are left alone.
    pub fn resolve(&mut self) -> GateState {
        if self.state == GateState::Loading {
            self.state = match &self.session {
                Some(s) if s.is_admin() => GateState::Admin,
                Some(_) => GateState::User,
                None => GateState::Unauthenticated,
            };
        }
        self.state
    }

    /// Persist a fresh session from login/signup and move to Loading
    pub fn login(&mut self, session: Session) -> Result<GateState> {
        self.store.save(&session)?;
        tracing::info!("Logged in as {} ({})", session.email, session.role.label());
        self.session = Some(session);
        self.state = GateState::Loading;
        Ok(self.state)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.drop_session()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// The server rejected our token
    pub fn unauthorized(&mut self) -> Result<()> {
        tracing::warn!("Authorization failure, clearing session");
        self.drop_session()
    }

    /// Keep the persisted session in step with a saved profile
    pub fn update_identity(&mut self, full_name: &str, email: &str) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            session.full_name = full_name.to_string();
            session.email = email.to_string();
            self.store.save(session)?;
        }
        Ok(())
    }

    fn drop_session(&mut self) -> Result<()> {
        self.session = None;
        self.state = GateState::Unauthenticated;
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{sample_session, Role};

    fn gate_in(dir: &tempfile::TempDir) -> SessionGate {
        SessionGate::new(SessionStore::at(dir.path().join("session.json")))
    }

    #[test]
    fn test_no_session_stays_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = gate_in(&dir);

        assert_eq!(gate.enter(), GateState::Unauthenticated);
        assert_eq!(gate.resolve(), GateState::Unauthenticated);
        assert!(gate.session().is_none());
    }

    #[test]
    fn test_found_session_resolves_by_role() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        store.save(&sample_session(Role::Admin)).unwrap();

        let mut gate = SessionGate::new(store.clone());
        assert_eq!(gate.enter(), GateState::Loading);
        assert_eq!(gate.resolve(), GateState::Admin);

        store.save(&sample_session(Role::User)).unwrap();
        let mut gate = SessionGate::new(store);
        gate.enter();
        assert_eq!(gate.resolve(), GateState::User);
    }

    #[test]
    fn test_login_persists_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = gate_in(&dir);
        gate.enter();

        assert_eq!(gate.login(sample_session(Role::User)).unwrap(), GateState::Loading);
        assert_eq!(gate.resolve(), GateState::User);

        let mut reopened = gate_in(&dir);
        assert_eq!(reopened.enter(), GateState::Loading);
        assert_eq!(reopened.token(), Some("tok-123"));
    }

    #[test]
    fn test_logout_from_any_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = gate_in(&dir);
        gate.login(sample_session(Role::Admin)).unwrap();

        // From Loading
        gate.logout().unwrap();
        assert_eq!(gate.state(), GateState::Unauthenticated);

        // From Admin
        gate.login(sample_session(Role::Admin)).unwrap();
        gate.resolve();
        gate.logout().unwrap();
        assert_eq!(gate.state(), GateState::Unauthenticated);
        assert!(gate_in(&dir).store.load().is_none());
    }

    #[test]
    fn test_unauthorized_clears_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = gate_in(&dir);
        gate.login(sample_session(Role::User)).unwrap();
        gate.resolve();

        gate.unauthorized().unwrap();

        assert_eq!(gate.state(), GateState::Unauthenticated);
        assert!(gate.session().is_none());
        assert_eq!(gate_in(&dir).enter(), GateState::Unauthenticated);
    }

    #[test]
    fn test_update_identity_rewrites_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = gate_in(&dir);
        gate.login(sample_session(Role::User)).unwrap();

        gate.update_identity("Grace Hopper", "grace@example.com").unwrap();

        let mut reopened = gate_in(&dir);
        reopened.enter();
        let session = reopened.session().unwrap();
        assert_eq!(session.full_name, "Grace Hopper");
        assert_eq!(session.email, "grace@example.com");
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.role, Role::User);
    }
}
