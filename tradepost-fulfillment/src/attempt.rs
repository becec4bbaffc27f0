//! Purchase attempt lifecycle.
//!
//! An attempt lives in memory for the duration of one purchase; nothing
//! here is persisted. The durable outcome of an attempt is the ownership
//! entry written at the commit point.

use crate::collaborators::ContextHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;
use tradepost_license::LicenseKey;
use tradepost_types::{ProductRecord, UserId};
use uuid::Uuid;

/// Unique identifier for a fulfillment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Creates a new attempt id with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Buy request accepted, product resolved.
    Initiated,
    /// Waiting for a staff-submitted payment amount. Waits indefinitely.
    AwaitingPayment,
    /// Price check passed (or product free); the commit is in flight.
    Confirmed,
    /// Ownership recorded and delivery dispatched. Final.
    Delivered,
    /// Transaction context archived.
    Closed,
    /// Abandoned before confirmation. No side effects.
    Cancelled,
}

impl AttemptState {
    /// States in which cancellation may still be requested.
    #[must_use]
    pub fn cancellable(self) -> bool {
        matches!(self, Self::Initiated | Self::AwaitingPayment)
    }

    /// True while the attempt blocks a second attempt for the same
    /// user/product pair. Delivery ends the exclusive claim; only teardown
    /// remains after it.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Initiated | Self::AwaitingPayment | Self::Confirmed)
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initiated => "initiated",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A single purchase attempt tracked by the engine.
#[derive(Debug, Clone)]
pub struct FulfillmentAttempt {
    pub(crate) id: AttemptId,
    pub(crate) user: UserId,
    pub(crate) product: String,
    pub(crate) price: u64,
    pub(crate) deliverable: String,
    pub(crate) state: AttemptState,
    pub(crate) context: Option<ContextHandle>,
    pub(crate) opened_at: DateTime<Utc>,
    pub(crate) cancel_deadline: Option<Instant>,
}

impl FulfillmentAttempt {
    pub(crate) fn new(id: AttemptId, user: UserId, product: &str, record: &ProductRecord) -> Self {
        Self {
            id,
            user,
            product: product.to_string(),
            price: record.price,
            deliverable: record.filename.clone(),
            state: AttemptState::Initiated,
            context: None,
            opened_at: Utc::now(),
            cancel_deadline: None,
        }
    }

    /// Returns the attempt id.
    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    /// Returns the buyer.
    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Returns the product name.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Returns the price recorded when the attempt was opened.
    #[must_use]
    pub fn price(&self) -> u64 {
        self.price
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Returns the transaction context, when one is open.
    #[must_use]
    pub fn context(&self) -> Option<&ContextHandle> {
        self.context.as_ref()
    }

    /// Returns when the attempt was opened.
    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// True while a cancellation request awaits its confirmation.
    #[must_use]
    pub fn cancel_pending(&self) -> bool {
        self.cancel_deadline.is_some()
    }
}

/// How the deliverable dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Deliverable and license key reached the buyer.
    Sent,
    /// Deliverable reference did not resolve. Ownership stands; manual
    /// follow-up expected.
    Missing,
    /// The buyer's channel refused the message. Ownership stands.
    Refused,
}

/// Outcome of a committed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The attempt that produced this receipt.
    pub attempt: AttemptId,
    /// The buyer.
    pub user: UserId,
    /// The purchased product.
    pub product: String,
    /// Confirmed amount; zero for free products.
    pub amount_paid: u64,
    /// The issued license key.
    pub key: LicenseKey,
    /// How delivery went.
    pub delivery: DeliveryStatus,
}

/// Result of starting a purchase.
#[derive(Debug, Clone)]
pub enum BeginOutcome {
    /// Free product: committed and delivered in one step.
    Delivered(Receipt),
    /// Paid product: a transaction context is open, payment pending.
    AwaitingPayment {
        /// The attempt to submit the payment against.
        attempt: AttemptId,
        /// The context the purchase conversation happens in.
        context: ContextHandle,
    },
}
