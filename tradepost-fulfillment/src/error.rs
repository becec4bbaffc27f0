//! Error types for the fulfillment workflow.

use crate::attempt::{AttemptId, AttemptState};
use thiserror::Error;
use tradepost_types::UserId;

/// Fulfillment-specific errors.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The requested product is absent from the current catalog snapshot.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The user already has an open attempt for this product.
    #[error("user {user} already has an open attempt for {product}")]
    AttemptAlreadyOpen { user: UserId, product: String },

    /// No attempt with this id.
    #[error("attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    /// The submitted amount does not equal the recorded price. The attempt
    /// stays open for another submission.
    #[error("payment mismatch: expected {expected}, got {submitted}")]
    PaymentMismatch { expected: u64, submitted: u64 },

    /// The attempt is not in a state that allows the operation.
    #[error("operation not allowed while attempt is {state}")]
    InvalidState { state: AttemptState },

    /// Cancellation was confirmed or declined without a pending request.
    #[error("no cancellation pending for this attempt")]
    NoCancelPending,

    /// The cancellation confirmation window elapsed; the attempt stays in
    /// its prior state.
    #[error("cancellation confirmation window expired")]
    CancelWindowExpired,

    /// Datastore failure. When raised from the commit path, the ownership
    /// write did not happen.
    #[error(transparent)]
    Store(#[from] tradepost_store::StoreError),

    /// Failure inside an external collaborator.
    #[error("collaborator error: {0}")]
    Collaborator(String),
}

/// Result type for fulfillment operations.
pub type FulfillmentResult<T> = Result<T, FulfillmentError>;
