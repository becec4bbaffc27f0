//! Flat-file JSON persistence for Tradepost.
//!
//! The datastore is a directory of JSON files, one collection each:
//! `product.json`, `category.json`, `users.json`, `warnings.json`. Loads
//! default to an empty collection when a file is missing; writes replace
//! the whole file through a temp-file rename.
//!
//! Whole-file rewrite is only safe with a single writer process. A
//! deployment with concurrent writers needs record-level locking or a real
//! key-value store underneath this API.

mod account_store;
mod catalog_store;
mod error;
mod json;
mod warning_store;

pub use account_store::AccountStore;
pub use catalog_store::CatalogStore;
pub use error::{StoreError, StoreResult};
pub use json::JsonFile;
pub use warning_store::{Warning, WarningMap, WarningStore};
