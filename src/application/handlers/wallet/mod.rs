//! Wallet workflows - the saga-style card lifecycle orchestration.
//!
//! One handler per workflow. Every handler that mutates processor state for
//! an identity serializes behind that identity's lock; the duplicate check
//! and the default pointer are only sound under that serialization.

mod begin_attachment;
mod confirm_attachment;
mod detach;
mod identity_locks;
mod list_methods;
mod provision_identity;
mod set_default;
mod support;
mod swap;

pub use begin_attachment::{BeginAttachmentCommand, BeginAttachmentHandler};
pub use confirm_attachment::{ConfirmAttachmentCommand, ConfirmAttachmentHandler};
pub use detach::{DetachCommand, DetachHandler};
pub use identity_locks::IdentityLocks;
pub use list_methods::{ListMethodsHandler, ListMethodsQuery};
pub use provision_identity::{ProvisionIdentityCommand, ProvisionIdentityHandler};
pub use set_default::{SetDefaultCommand, SetDefaultHandler};
pub use swap::{SwapCommand, SwapHandler};
