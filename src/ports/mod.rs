//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProcessor` - customer records, card tokens, setup handshakes
//! - `ProfileStore` - the durable identity-to-customer link
//! - `NotificationSink` - fire-and-forget outbound events

mod notification_sink;
mod payment_processor;
mod profile_store;

pub use notification_sink::{Notification, NotificationError, NotificationKind, NotificationSink};
pub use payment_processor::{
    CreateCustomerRequest, CustomerRecord, HandshakeResolution, HandshakeStatus, PaymentProcessor,
    ProcessorError, ProcessorErrorCode, SetupHandshake,
};
pub use profile_store::{ProfileStore, StoreError};
