//! Shared plumbing for wallet workflows: time-bounded processor calls and
//! best-effort notification delivery.

use std::future::Future;
use std::time::Duration;

use crate::domain::wallet::WalletError;
use crate::ports::{Notification, NotificationSink, ProcessorError, StoreError};

/// Outcome of a time-bounded processor call, before it is mapped onto the
/// workflow-specific error taxonomy.
pub(crate) enum CallFailure {
    /// The caller-supplied bound elapsed. The workflow fails with `Timeout`
    /// and never retries; the in-flight call is left to complete on its own.
    TimedOut,
    Failed(ProcessorError),
}

impl CallFailure {
    /// Map onto the transient taxonomy: callers may retry the whole workflow.
    pub(crate) fn unavailable(self) -> WalletError {
        match self {
            CallFailure::TimedOut => WalletError::Timeout,
            CallFailure::Failed(err) => WalletError::processor_unavailable(err.to_string()),
        }
    }

    /// Map onto `AttachmentFailed` for failures past the attach point.
    pub(crate) fn attachment(self) -> WalletError {
        match self {
            CallFailure::TimedOut => WalletError::Timeout,
            CallFailure::Failed(err) => WalletError::attachment_failed(err.to_string()),
        }
    }

    /// Map onto `DetachmentFailed` for detach-path failures.
    pub(crate) fn detachment(self) -> WalletError {
        match self {
            CallFailure::TimedOut => WalletError::Timeout,
            CallFailure::Failed(err) => WalletError::detachment_failed(err.to_string()),
        }
    }

    pub(crate) fn processor_error(&self) -> Option<&ProcessorError> {
        match self {
            CallFailure::TimedOut => None,
            CallFailure::Failed(err) => Some(err),
        }
    }
}

/// Run a processor call under the caller-supplied time bound.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, CallFailure>
where
    F: Future<Output = Result<T, ProcessorError>> + Send,
{
    match tokio::time::timeout(limit, call).await {
        Err(_) => Err(CallFailure::TimedOut),
        Ok(Err(err)) => Err(CallFailure::Failed(err)),
        Ok(Ok(value)) => Ok(value),
    }
}

/// Outcome of a time-bounded store call. The store is just as external as
/// the processor; a hung call must not block the workflow (or the identity's
/// lock) indefinitely.
pub(crate) enum StoreCallFailure {
    /// The caller-supplied bound elapsed. The write may or may not have
    /// landed; callers must treat the outcome as indeterminate.
    TimedOut,
    Failed(StoreError),
}

impl StoreCallFailure {
    /// Map onto the workflow taxonomy.
    pub(crate) fn store(self) -> WalletError {
        match self {
            StoreCallFailure::TimedOut => WalletError::Timeout,
            StoreCallFailure::Failed(err) => store_error(err),
        }
    }
}

/// Run a store call under the caller-supplied time bound.
pub(crate) async fn bounded_store<T, F>(limit: Duration, call: F) -> Result<T, StoreCallFailure>
where
    F: Future<Output = Result<T, StoreError>> + Send,
{
    match tokio::time::timeout(limit, call).await {
        Err(_) => Err(StoreCallFailure::TimedOut),
        Ok(Err(err)) => Err(StoreCallFailure::Failed(err)),
        Ok(Ok(value)) => Ok(value),
    }
}

/// Map store failures onto the workflow taxonomy.
pub(crate) fn store_error(err: StoreError) -> WalletError {
    WalletError::store(err.to_string())
}

/// Deliver a notification, logging and swallowing any failure. Delivery
/// never affects workflow outcomes.
pub(crate) async fn notify_best_effort(sink: &dyn NotificationSink, notification: Notification) {
    let kind = notification.kind;
    if let Err(err) = sink.notify(notification).await {
        tracing::warn!(event = kind.as_str(), error = %err, "Notification delivery failed");
    }
}
