//! Catalog record types.
//!
//! Shapes match the legacy `product.json` and `category.json` files:
//! products are keyed by name, categories map a name to the channel that
//! carries the listing.

use crate::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product entry in the catalog, keyed externally by product name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Category the product is listed under.
    pub category: String,
    /// Store-page description.
    pub description: String,
    /// Preview image URLs, kept opaque.
    #[serde(default)]
    pub images: String,
    /// Deliverable reference: the asset handed to the buyer on purchase.
    pub filename: String,
    /// Price in whole currency units. Zero means the product is free.
    pub price: u64,
}

impl ProductRecord {
    /// Returns true when the product is claimable without payment.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// Map shape of `product.json`: product name → record.
pub type ProductMap = BTreeMap<String, ProductRecord>;

/// Map shape of `category.json`: category name → listing channel.
pub type Categories = BTreeMap<String, ChannelId>;
