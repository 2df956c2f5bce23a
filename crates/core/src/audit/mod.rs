//! Audit trail and domain event types.
//!
//! Audit entries are append-only and immutable: they are created only by
//! the workflow engine as part of a transition, ordered by timestamp with
//! ties broken by insertion sequence, and never updated or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::types::{Action, Cursor};

/// One immutable record in a request's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id.
    pub id: Uuid,
    /// The request this entry belongs to.
    pub request_id: Uuid,
    /// The actor who performed the action.
    pub actor_id: Uuid,
    /// Insertion sequence; breaks timestamp ties.
    pub seq: i64,
    /// The action recorded.
    pub action: Action,
    /// Free-text note.
    pub note: Option<String>,
    /// Opaque attachment handles from the external file store. The core
    /// never interprets file bytes.
    pub attachments: Vec<Uuid>,
    /// Receipt amount in the request's currency, for income receipts.
    pub amount: Option<i64>,
    /// Server-assigned timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Domain event emitted after a transition commits.
///
/// Consumed by the external notifier, which decides recipients and
/// composes messages; the core knows nothing about delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// The request that transitioned.
    pub request_id: Uuid,
    /// The actor who triggered the transition.
    pub actor_id: Uuid,
    /// The action performed.
    pub action: Action,
    /// The cursor after the transition.
    pub resulting_cursor: Cursor,
    /// When the transition committed.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_event_serializes_with_snake_case_cursor() {
        let event = DomainEvent {
            request_id: Uuid::nil(),
            actor_id: Uuid::nil(),
            action: Action::Approve,
            resulting_cursor: Cursor::AwaitAudit,
            timestamp: DateTime::<Utc>::MIN_UTC,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "approve");
        assert_eq!(json["resulting_cursor"], "await_audit");
    }

    #[test]
    fn test_audit_entry_roundtrip() {
        let entry = AuditEntry {
            id: Uuid::nil(),
            request_id: Uuid::nil(),
            actor_id: Uuid::nil(),
            seq: 7,
            action: Action::Comment,
            note: Some("receipt for stall fees".to_string()),
            attachments: vec![Uuid::nil()],
            amount: Some(2000),
            timestamp: DateTime::<Utc>::MIN_UTC,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
