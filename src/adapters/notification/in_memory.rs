//! Recording notification sink for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{Notification, NotificationError, NotificationSink};

/// `NotificationSink` that records every event, with failure injection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Notification>>,
    fail: Mutex<bool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events delivered so far, in order.
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    /// Make subsequent deliveries fail.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        if *self.fail.lock().unwrap() {
            return Err(NotificationError("Mock: delivery failed".to_string()));
        }
        self.events.lock().unwrap().push(notification);
        Ok(())
    }
}
