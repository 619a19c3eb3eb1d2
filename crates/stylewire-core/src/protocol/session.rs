//! Session identity and role.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the relay a session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The inspected runtime. At most one is expected at a time.
    Producer,
    /// An observer issuing requests and receiving broadcasts.
    Consumer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-assigned identifier of one connection instance.
///
/// Never reused: a reconnect always gets a new id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A live connection: its identity plus the side it is on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub role: Role,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn producer(id: impl Into<SessionId>) -> Self {
        Self::new(id, Role::Producer)
    }

    pub fn consumer(id: impl Into<SessionId>) -> Self {
        Self::new(id, Role::Consumer)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}
