//! Product and category catalog persistence.
//!
//! Backed by `product.json` and `category.json`. Every read goes back to
//! disk, so admin edits land without a restart; callers get the state of
//! the moment they asked, nothing is cached here.

use crate::error::{StoreError, StoreResult};
use crate::json::JsonFile;
use std::path::Path;
use tracing::info;
use tradepost_types::{Categories, ChannelId, ProductMap, ProductRecord};

/// CRUD over the product and category collections.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: JsonFile<ProductMap>,
    categories: JsonFile<Categories>,
}

impl CatalogStore {
    /// Opens a catalog rooted at the given database directory
    /// (`<dir>/product.json`, `<dir>/category.json`).
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            products: JsonFile::new(dir.join("product.json")),
            categories: JsonFile::new(dir.join("category.json")),
        }
    }

    // ── Products ─────────────────────────────────────────────────

    /// Returns the current product map.
    pub fn products(&self) -> StoreResult<ProductMap> {
        self.products.load()
    }

    /// Looks up a single product by name.
    pub fn product(&self, name: &str) -> StoreResult<Option<ProductRecord>> {
        Ok(self.products.load()?.remove(name))
    }

    /// Returns the products listed under a category.
    pub fn products_in(&self, category: &str) -> StoreResult<ProductMap> {
        let mut products = self.products.load()?;
        products.retain(|_, record| record.category == category);
        Ok(products)
    }

    /// Adds a new product.
    ///
    /// # Errors
    ///
    /// [`StoreError::ProductExists`] when the name is already taken.
    pub fn add_product(&self, name: &str, record: ProductRecord) -> StoreResult<()> {
        let mut products = self.products.load()?;
        if products.contains_key(name) {
            return Err(StoreError::ProductExists(name.to_string()));
        }
        products.insert(name.to_string(), record);
        self.products.save(&products)?;
        info!(product = name, "catalog: product added");
        Ok(())
    }

    /// Replaces an existing product record.
    ///
    /// # Errors
    ///
    /// [`StoreError::ProductNotFound`] when the name is unknown.
    pub fn update_product(&self, name: &str, record: ProductRecord) -> StoreResult<()> {
        let mut products = self.products.load()?;
        if !products.contains_key(name) {
            return Err(StoreError::ProductNotFound(name.to_string()));
        }
        products.insert(name.to_string(), record);
        self.products.save(&products)?;
        info!(product = name, "catalog: product updated");
        Ok(())
    }

    /// Removes a product, returning the removed record.
    ///
    /// # Errors
    ///
    /// [`StoreError::ProductNotFound`] when the name is unknown.
    pub fn remove_product(&self, name: &str) -> StoreResult<ProductRecord> {
        let mut products = self.products.load()?;
        let removed = products
            .remove(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        self.products.save(&products)?;
        info!(product = name, "catalog: product removed");
        Ok(removed)
    }

    // ── Categories ───────────────────────────────────────────────

    /// Returns the current category map.
    pub fn categories(&self) -> StoreResult<Categories> {
        self.categories.load()
    }

    /// Adds a new category with its listing channel.
    ///
    /// # Errors
    ///
    /// [`StoreError::CategoryExists`] when the name is already taken.
    pub fn add_category(&self, name: &str, channel: ChannelId) -> StoreResult<()> {
        let mut categories = self.categories.load()?;
        if categories.contains_key(name) {
            return Err(StoreError::CategoryExists(name.to_string()));
        }
        categories.insert(name.to_string(), channel);
        self.categories.save(&categories)?;
        info!(category = name, "catalog: category added");
        Ok(())
    }

    /// Points an existing category at a different listing channel.
    ///
    /// # Errors
    ///
    /// [`StoreError::CategoryNotFound`] when the name is unknown.
    pub fn update_category(&self, name: &str, channel: ChannelId) -> StoreResult<()> {
        let mut categories = self.categories.load()?;
        if !categories.contains_key(name) {
            return Err(StoreError::CategoryNotFound(name.to_string()));
        }
        categories.insert(name.to_string(), channel);
        self.categories.save(&categories)
    }

    /// Removes a category.
    ///
    /// # Errors
    ///
    /// [`StoreError::CategoryNotFound`] when the name is unknown.
    pub fn remove_category(&self, name: &str) -> StoreResult<()> {
        let mut categories = self.categories.load()?;
        if categories.remove(name).is_none() {
            return Err(StoreError::CategoryNotFound(name.to_string()));
        }
        self.categories.save(&categories)?;
        info!(category = name, "catalog: category removed");
        Ok(())
    }
}
