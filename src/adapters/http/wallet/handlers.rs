//! HTTP handlers for wallet endpoints.
//!
//! These handlers connect Axum routes to the application layer workflows.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::wallet::{
    BeginAttachmentCommand, BeginAttachmentHandler, ConfirmAttachmentCommand,
    ConfirmAttachmentHandler, DetachCommand, DetachHandler, IdentityLocks, ListMethodsHandler,
    ListMethodsQuery, ProvisionIdentityCommand, ProvisionIdentityHandler, SetDefaultCommand,
    SetDefaultHandler, SwapCommand, SwapHandler,
};
use crate::domain::foundation::UserId;
use crate::domain::wallet::WalletError;
use crate::ports::{NotificationSink, PaymentProcessor, ProfileStore};

use super::dto::{
    ConfirmMethodRequest, ErrorResponse, ListMethodsResponse, PaymentMethodResponse,
    ProvisionRequest, ProvisionResponse, SetDefaultRequest, SetupResponse, SwapMethodRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all wallet dependencies.
#[derive(Clone)]
pub struct WalletAppState {
    pub profile_store: Arc<dyn ProfileStore>,
    pub processor: Arc<dyn PaymentProcessor>,
    pub notifications: Arc<dyn NotificationSink>,
    pub locks: Arc<IdentityLocks>,
    pub call_timeout: Duration,
}

impl WalletAppState {
    /// Create handlers on demand from the shared state.
    pub fn provision_handler(&self) -> ProvisionIdentityHandler {
        ProvisionIdentityHandler::new(
            self.profile_store.clone(),
            self.processor.clone(),
            self.notifications.clone(),
            self.call_timeout,
        )
    }

    pub fn begin_attachment_handler(&self) -> BeginAttachmentHandler {
        BeginAttachmentHandler::new(self.processor.clone(), self.call_timeout)
    }

    pub fn confirm_attachment_handler(&self) -> ConfirmAttachmentHandler {
        ConfirmAttachmentHandler::new(
            self.profile_store.clone(),
            self.processor.clone(),
            self.notifications.clone(),
            self.locks.clone(),
            self.call_timeout,
        )
    }

    pub fn list_methods_handler(&self) -> ListMethodsHandler {
        ListMethodsHandler::new(
            self.profile_store.clone(),
            self.processor.clone(),
            self.call_timeout,
        )
    }

    pub fn set_default_handler(&self) -> SetDefaultHandler {
        SetDefaultHandler::new(
            self.profile_store.clone(),
            self.processor.clone(),
            self.notifications.clone(),
            self.locks.clone(),
            self.call_timeout,
        )
    }

    pub fn detach_handler(&self) -> DetachHandler {
        DetachHandler::new(
            self.profile_store.clone(),
            self.processor.clone(),
            self.notifications.clone(),
            self.locks.clone(),
            self.call_timeout,
        )
    }

    pub fn swap_handler(&self) -> SwapHandler {
        SwapHandler::new(
            Arc::new(self.confirm_attachment_handler()),
            Arc::new(self.detach_handler()),
            self.locks.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// Identity ids arrive validated from upstream; for development/testing this
/// reads an X-User-Id header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /wallet/provision - Provision a processor customer for the identity
pub async fn provision_identity(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Json(request): Json<ProvisionRequest>,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.provision_handler();
    let cmd = ProvisionIdentityCommand {
        user_id: user.user_id,
        email: request.email,
        display_name: request.display_name,
    };

    let customer_id = handler.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProvisionResponse { customer_id }),
    ))
}

/// POST /wallet/setup - Open a setup handshake for card collection
pub async fn begin_attachment(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.begin_attachment_handler();
    let handshake = handler
        .handle(BeginAttachmentCommand {
            user_id: user.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SetupResponse::from(handshake))))
}

/// POST /wallet/methods - Confirm a completed handshake into an attached method
pub async fn confirm_method(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Json(request): Json<ConfirmMethodRequest>,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.confirm_attachment_handler();
    let view = handler
        .handle(ConfirmAttachmentCommand {
            user_id: user.user_id,
            handshake_ref: request.handshake_ref,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentMethodResponse::from(view)),
    ))
}

/// GET /wallet/methods - List attached methods with the live default pointer
pub async fn list_methods(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.list_methods_handler();
    let views = handler
        .handle(ListMethodsQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(ListMethodsResponse {
        methods: views.into_iter().map(PaymentMethodResponse::from).collect(),
    }))
}

/// POST /wallet/methods/default - Repoint the default payment method
pub async fn set_default_method(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Json(request): Json<SetDefaultRequest>,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.set_default_handler();
    handler
        .handle(SetDefaultCommand {
            user_id: user.user_id,
            token_id: request.token_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /wallet/methods/:token_id - Detach a payment method
pub async fn detach_method(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Path(token_id): Path<String>,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.detach_handler();
    handler
        .handle(DetachCommand {
            user_id: user.user_id,
            token_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /wallet/methods/:token_id - Replace a payment method with a new one
pub async fn swap_method(
    State(state): State<WalletAppState>,
    user: AuthenticatedUser,
    Path(token_id): Path<String>,
    Json(request): Json<SwapMethodRequest>,
) -> Result<impl IntoResponse, WalletApiError> {
    let handler = state.swap_handler();
    let view = handler
        .handle(SwapCommand {
            user_id: user.user_id,
            handshake_ref: request.handshake_ref,
            old_token_id: token_id,
        })
        .await?;

    Ok(Json(PaymentMethodResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Wrapper turning `WalletError` into HTTP responses.
pub struct WalletApiError(WalletError);

impl From<WalletError> for WalletApiError {
    fn from(err: WalletError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WalletApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            WalletError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            WalletError::AlreadyProvisioned(_) | WalletError::DuplicatePaymentMethod => {
                StatusCode::CONFLICT
            }
            WalletError::UnsupportedPaymentType(_) | WalletError::HandshakeIncomplete { .. } => {
                StatusCode::BAD_REQUEST
            }
            WalletError::NotOwned { .. } | WalletError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WalletError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            WalletError::ProcessorUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::ProvisioningFailed { .. }
            | WalletError::AttachmentFailed { .. }
            | WalletError::DetachmentFailed { .. } => StatusCode::BAD_GATEWAY,
            WalletError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.code(), self.0.message());
        (status, Json(body)).into_response()
    }
}
