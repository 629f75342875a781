//! Notification sink port - fire-and-forget outbound events.
//!
//! Delivery failures are logged and swallowed by callers; they never affect
//! workflow outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::foundation::UserId;

/// Port for outbound event delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a single event. Implementations should bound their own
    /// timeouts; callers do not retry.
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Kinds of events the wallet workflows emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    IdentityProvisioned,
    MethodAttached,
    MethodDetached,
    DefaultChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::IdentityProvisioned => "identity_provisioned",
            NotificationKind::MethodAttached => "method_attached",
            NotificationKind::MethodDetached => "method_detached",
            NotificationKind::DefaultChanged => "default_changed",
        }
    }
}

/// An outbound event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique event id, for receiver-side dedup.
    pub id: Uuid,
    pub kind: NotificationKind,
    pub user_id: UserId,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    /// Builds an event stamped with a fresh id and the current time.
    pub fn now(kind: NotificationKind, user_id: UserId, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            user_id,
            metadata,
            occurred_at: Utc::now(),
        }
    }
}

/// Errors from notification delivery.
#[derive(Debug, Clone, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotificationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn NotificationSink) {}
    }

    #[test]
    fn kind_serializes_snake_case() {
        let kind = NotificationKind::MethodAttached;
        assert_eq!(kind.as_str(), "method_attached");
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"method_attached\""
        );
    }
}
