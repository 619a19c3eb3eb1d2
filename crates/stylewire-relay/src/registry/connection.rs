//! In-memory connection registry for relay sessions.

use std::collections::BTreeSet;

use serde::Serialize;

use stylewire_core::protocol::{Role, Session, SessionId};

/// Live session counts for both roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub producers: usize,
    pub consumers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Session {id} is already registered as {role}")]
    DuplicateSession { id: SessionId, role: Role },

    #[error("Session {id} is not registered as {role}")]
    UnknownSession { id: SessionId, role: Role },
}

/// Registry of live session ids, one set per role.
///
/// Owned by the hub task; all mutation happens there, so no locking.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    producers: BTreeSet<SessionId>,
    consumers: BTreeSet<SessionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session id for a role.
    ///
    /// Leaves the registry untouched if the id is already live for that role.
    pub fn register(
        &mut self,
        id: SessionId,
        role: Role,
    ) -> Result<SessionCounts, RegistryError> {
        let set = self.set_mut(role);
        if set.contains(&id) {
            return Err(RegistryError::DuplicateSession { id, role });
        }
        set.insert(id);
        Ok(self.counts())
    }

    /// Remove a session id for a role.
    pub fn unregister(
        &mut self,
        id: &SessionId,
        role: Role,
    ) -> Result<SessionCounts, RegistryError> {
        if !self.set_mut(role).remove(id) {
            return Err(RegistryError::UnknownSession {
                id: id.clone(),
                role,
            });
        }
        Ok(self.counts())
    }

    pub fn count_of(&self, role: Role) -> usize {
        self.set(role).len()
    }

    pub fn has_any(&self, role: Role) -> bool {
        !self.set(role).is_empty()
    }

    pub fn contains(&self, id: &SessionId, role: Role) -> bool {
        self.set(role).contains(id)
    }

    /// Live sessions of a role, in id order.
    pub fn sessions(&self, role: Role) -> Vec<Session> {
        self.set(role)
            .iter()
            .map(|id| Session::new(id.clone(), role))
            .collect()
    }

    pub fn counts(&self) -> SessionCounts {
        SessionCounts {
            producers: self.producers.len(),
            consumers: self.consumers.len(),
        }
    }

    const fn set(&self, role: Role) -> &BTreeSet<SessionId> {
        match role {
            Role::Producer => &self.producers,
            Role::Consumer => &self.consumers,
        }
    }

    const fn set_mut(&mut self, role: Role) -> &mut BTreeSet<SessionId> {
        match role {
            Role::Producer => &mut self.producers,
            Role::Consumer => &mut self.consumers,
        }
    }
}
