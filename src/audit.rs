// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit trail for planning and signing outcomes.
//!
//! [`AuditLog`] is a [`MixerObserver`] that keeps every reported outcome as
//! an [`AuditEvent`]. Events can be exported as JSONL (one JSON object per
//! line) for the persistence layer to ship wherever it keeps audit records.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MixerError;
use crate::models::MixingPlan;
use crate::observer::MixerObserver;
use crate::ring::{KeyImage, RingMixingSession, Verdict};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Planning
    PlanCreated,

    // Signing
    SignatureCreated,
    SignatureFailed,

    // Verification
    VerificationAccepted,
    VerificationRejected,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// Resource affected (mix_request, ring_session, key_image).
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    /// Additional details as JSON.
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if the operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            resource_type: None,
            resource_id: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Audit I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit log unavailable")]
    Unavailable,
}

/// In-memory audit trail.
#[derive(Debug, Default)]
pub struct AuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Recording never fails the operation being audited.
    pub fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(_) => tracing::error!(
                event_type = ?event.event_type,
                "Audit log lock poisoned, event dropped"
            ),
        }
    }

    /// Snapshot of all events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn events_of_type(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Write every event as JSONL. Returns the number of events written.
    pub fn export_jsonl<W: Write>(&self, mut writer: W) -> Result<usize, AuditError> {
        let events = self.events.lock().map_err(|_| AuditError::Unavailable)?;
        for event in events.iter() {
            serde_json::to_writer(&mut writer, event)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(events.len())
    }

    /// Parse a JSONL export, skipping blank lines.
    pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}

impl MixerObserver for AuditLog {
    fn plan_created(&self, plan: &MixingPlan) {
        self.record(
            AuditEvent::new(AuditEventType::PlanCreated)
                .with_resource("mix_request", plan.mix_request_id.to_string())
                .with_details(serde_json::json!({
                    "currency": plan.currency,
                    "chunks": plan.len(),
                    "estimated_completion": plan.estimated_completion,
                })),
        );
    }

    fn signature_created(&self, session: &RingMixingSession, key_image: &KeyImage) {
        self.record(
            AuditEvent::new(AuditEventType::SignatureCreated)
                .with_resource("ring_session", session.id.clone())
                .with_details(serde_json::json!({
                    "currency": session.currency,
                    "ring_size": session.participants.len(),
                    "key_image": key_image,
                })),
        );
    }

    fn signature_failed(&self, session_id: Option<&str>, error: &MixerError) {
        let mut event = AuditEvent::new(AuditEventType::SignatureFailed)
            .with_details(serde_json::json!({ "error_code": error.error_code() }))
            .failed(error.to_string());
        if let Some(id) = session_id {
            event = event.with_resource("ring_session", id);
        }
        self.record(event);
    }

    fn verification_completed(&self, key_image: &KeyImage, verdict: Verdict) {
        let event = if verdict.is_accepted() {
            AuditEvent::new(AuditEventType::VerificationAccepted)
        } else {
            AuditEvent::new(AuditEventType::VerificationRejected)
                .failed(format!("{verdict:?}"))
        };
        self.record(
            event
                .with_resource("key_image", key_image.to_string())
                .with_details(serde_json::json!({ "verdict": verdict })),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::MixerConfig;
    use crate::models::Currency;
    use crate::ring::{InMemoryKeyImageSet, RingSignatureEngine, RingSignatureKey};
    use crate::store::InMemorySessionStore;

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::PlanCreated)
            .with_resource("mix_request", "req-1")
            .with_details(serde_json::json!({ "chunks": 3 }));

        assert_eq!(event.event_type, AuditEventType::PlanCreated);
        assert_eq!(event.resource_id.as_deref(), Some("req-1"));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::SignatureFailed).failed("bad key");
        assert!(!event.success);
        assert_eq!(event.error, Some("bad key".to_string()));
    }

    #[test]
    fn records_engine_outcomes() {
        let log = Arc::new(AuditLog::new());
        let engine = RingSignatureEngine::new(
            &MixerConfig::default(),
            Arc::new(InMemoryKeyImageSet::new()),
            Arc::new(InMemorySessionStore::new()),
        )
        .with_observer(log.clone());

        let mut rng = StdRng::seed_from_u64(1);
        let currency = Currency::from("XMR");
        let real = RingSignatureKey::generate(&mut rng);
        let decoys = engine.generate_decoy_keys(&mut rng, &currency, &real.public_key);
        let result = engine
            .create_ring_signature(&mut rng, b"m", &real, &decoys, &currency, dec!(1))
            .unwrap();
        engine.verify_ring_signature(b"m", &result.signature, &result.ring_keys, &result.key_image);
        engine.verify_ring_signature(b"m", &result.signature, &result.ring_keys, &result.key_image);
        let _ = engine.create_ring_signature(&mut rng, b"m", &real.public_only(), &decoys, &currency, dec!(1));

        let created = log.events_of_type(AuditEventType::SignatureCreated);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].resource_id.as_deref(), Some(result.session_id.as_str()));
        assert_eq!(created[0].details.as_ref().unwrap()["ring_size"], 11);

        assert_eq!(log.events_of_type(AuditEventType::VerificationAccepted).len(), 1);
        let rejected = log.events_of_type(AuditEventType::VerificationRejected);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].details.as_ref().unwrap()["verdict"], "replayed");

        let failed = log.events_of_type(AuditEventType::SignatureFailed);
        assert_eq!(failed.len(), 1);
        assert!(!failed[0].success);
        assert!(failed[0].resource_id.is_some());
        assert_ne!(failed[0].resource_id.as_deref(), Some(result.session_id.as_str()));
    }

    #[test]
    fn export_and_read_jsonl() {
        let log = AuditLog::new();
        log.record(AuditEvent::new(AuditEventType::PlanCreated).with_resource("mix_request", "a"));
        log.record(
            AuditEvent::new(AuditEventType::VerificationRejected)
                .with_resource("key_image", "b")
                .failed("Malformed"),
        );

        let mut buffer = Vec::new();
        assert_eq!(log.export_jsonl(&mut buffer).unwrap(), 2);
        assert_eq!(buffer.iter().filter(|b| **b == b'\n').count(), 2);

        let events = AuditLog::read_jsonl(Cursor::new(buffer)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::PlanCreated);
        assert_eq!(events[1].error.as_deref(), Some("Malformed"));
    }
}
