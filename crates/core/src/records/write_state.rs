//! Optimistic write lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Kind of mutation issued against a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOperation {
    Add,
    Update,
    Delete,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Add => "add",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single write.
///
/// `Idle -> Pending -> Committed | RolledBack`. Both terminal states are
/// final; retrying means issuing a new write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteState {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
}

impl WriteState {
    /// The optimistic change has been applied locally.
    pub fn begin(self) -> Result<Self> {
        self.transition(WriteState::Pending)
    }

    /// The store confirmed the write.
    pub fn commit(self) -> Result<Self> {
        self.transition(WriteState::Committed)
    }

    /// The store rejected the write and the local change was reverted.
    pub fn roll_back(self) -> Result<Self> {
        self.transition(WriteState::RolledBack)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WriteState::Committed | WriteState::RolledBack)
    }

    fn transition(self, next: WriteState) -> Result<Self> {
        let allowed = matches!(
            (self, next),
            (WriteState::Idle, WriteState::Pending)
                | (WriteState::Pending, WriteState::Committed)
                | (WriteState::Pending, WriteState::RolledBack)
        );
        if allowed {
            Ok(next)
        } else {
            Err(Error::Unexpected(format!(
                "invalid write transition {:?} -> {:?}",
                self, next
            )))
        }
    }
}

/// Local change of a write, re-applied on top of every reload until it and
/// every earlier write have been answered by the store.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite<R> {
    /// Placeholder carrying a temporary id, shown first.
    Insert(R),
    /// Record with the patch merged in, replacing the stored version.
    Update(R),
    /// Id hidden from the snapshot.
    Delete(String),
}
