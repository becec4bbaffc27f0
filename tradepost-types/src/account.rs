//! User account records.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-user commerce record: lifetime payment total plus the ownership map
/// (product name → issued license key).
///
/// Serialized field names match the legacy `users.json` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Cumulative confirmed payments, in whole currency units. Only ever
    /// incremented, and only by completed paid transactions.
    #[serde(rename = "total-payment")]
    pub total_payment: u64,
    /// Products owned by this user and the license key issued for each.
    #[serde(default)]
    pub ownership: BTreeMap<String, String>,
}

impl UserAccount {
    /// Creates an empty account (no payments, no ownership).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed payment.
    pub fn record_payment(&mut self, amount: u64) {
        self.total_payment = self.total_payment.saturating_add(amount);
    }

    /// Grants ownership of a product under the given license key. Returns
    /// the previously issued key when the product was already owned.
    pub fn grant(&mut self, product: impl Into<String>, key: impl Into<String>) -> Option<String> {
        self.ownership.insert(product.into(), key.into())
    }

    /// Revokes ownership of a product. Returns true when an entry existed.
    pub fn revoke(&mut self, product: &str) -> bool {
        self.ownership.remove(product).is_some()
    }

    /// Returns true when the user owns the product.
    #[must_use]
    pub fn owns(&self, product: &str) -> bool {
        self.ownership.contains_key(product)
    }

    /// Returns the license key issued for a product, if owned.
    #[must_use]
    pub fn license_for(&self, product: &str) -> Option<&str> {
        self.ownership.get(product).map(String::as_str)
    }
}

/// Map shape of `users.json`: user id → account.
pub type AccountMap = BTreeMap<UserId, UserAccount>;
