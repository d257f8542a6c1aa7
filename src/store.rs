// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session storage.
//!
//! Signing sessions are shared between concurrent signers, keyed by id.
//! Status updates go through [`SessionStatus::can_transition_to`], so a
//! terminal session is never modified again.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::ring::{RingMixingSession, SessionStatus};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {0} already exists")]
    Duplicate(String),

    #[error("Session {id} is already {status}")]
    Terminal { id: String, status: SessionStatus },

    #[error("Session {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Session store unavailable")]
    Unavailable,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Keyed storage for [`RingMixingSession`] records.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: RingMixingSession) -> SessionResult<()>;

    fn get(&self, id: &str) -> SessionResult<RingMixingSession>;

    /// Move a session to `status`, returning the updated record.
    fn update_status(&self, id: &str, status: SessionStatus) -> SessionResult<RingMixingSession>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, RingMixingSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: RingMixingSession) -> SessionResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;
        if sessions.contains_key(&session.id) {
            return Err(SessionError::Duplicate(session.id));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn get(&self, id: &str) -> SessionResult<RingMixingSession> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::Unavailable)?;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn update_status(&self, id: &str, status: SessionStatus) -> SessionResult<RingMixingSession> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if session.status.is_terminal() {
            return Err(SessionError::Terminal {
                id: id.to_string(),
                status: session.status,
            });
        }
        if !session.status.can_transition_to(status) {
            return Err(SessionError::InvalidTransition {
                id: id.to_string(),
                from: session.status,
                to: status,
            });
        }

        session.status = status;
        Ok(session.clone())
    }
}
