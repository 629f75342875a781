//! Notification adapters.

mod in_memory;
mod webhook_sink;

pub use in_memory::RecordingSink;
pub use webhook_sink::{NullSink, WebhookSink};
