//! Collaborator seams for the fulfillment engine.
//!
//! The engine never talks to the chat platform or the filesystem directly;
//! it goes through these traits so the gateway, the admin panel, and the
//! datastore stay swappable (and mockable in tests).

use crate::error::FulfillmentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tradepost_license::LicenseKey;
use tradepost_types::{ProductRecord, UserAccount, UserId};

/// Opaque handle on an access-restricted transaction context, conceptually
/// a private channel scoped to the buyer and staff.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHandle(String);

impl ContextHandle {
    /// Wraps a transport-specific context identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only product lookup, consulted at request time. The engine never
/// caches the result: a product deleted between two buys is gone for the
/// second one.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the current record for a product name.
    async fn product(&self, name: &str) -> FulfillmentResult<Option<ProductRecord>>;
}

/// User account persistence.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Loads the account for a user, defaulting to an empty record.
    async fn account(&self, user: &UserId) -> FulfillmentResult<UserAccount>;

    /// Persists the account. A failure here aborts the ownership commit.
    async fn put_account(&self, user: &UserId, account: UserAccount) -> FulfillmentResult<()>;
}

/// Failure modes of deliverable dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The deliverable reference did not resolve to an asset.
    #[error("deliverable not found")]
    NotFound,

    /// The buyer's message channel refused the delivery.
    #[error("delivery refused by the recipient channel")]
    Forbidden,
}

/// Sends the deliverable and its license key to the buyer.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(
        &self,
        user: &UserId,
        deliverable: &str,
        key: &LicenseKey,
    ) -> Result<(), DeliveryError>;
}

/// Creates and tears down transaction contexts.
#[async_trait]
pub trait ContextChannel: Send + Sync {
    /// Opens a context restricted to the buyer and staff.
    async fn open(&self, user: &UserId, product: &str) -> FulfillmentResult<ContextHandle>;

    /// Tears a context down. The engine logs failures and moves on; they
    /// never reach the ownership commit.
    async fn close(&self, handle: &ContextHandle) -> FulfillmentResult<()>;
}
