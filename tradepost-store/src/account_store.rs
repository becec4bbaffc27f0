//! User account persistence.
//!
//! Backed by `users.json`: one JSON object keyed by user id. Reads for an
//! unknown user yield the empty account, matching the create-on-first-use
//! behavior of the purchase flow.

use crate::error::{StoreError, StoreResult};
use crate::json::JsonFile;
use std::path::Path;
use tracing::info;
use tradepost_types::{AccountMap, UserAccount, UserId};

/// CRUD over the user account collection.
#[derive(Debug, Clone)]
pub struct AccountStore {
    accounts: JsonFile<AccountMap>,
}

impl AccountStore {
    /// Opens the account store rooted at the given database directory
    /// (`<dir>/users.json`).
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            accounts: JsonFile::new(dir.as_ref().join("users.json")),
        }
    }

    /// Returns the whole account map.
    pub fn accounts(&self) -> StoreResult<AccountMap> {
        self.accounts.load()
    }

    /// Loads the account for a user, defaulting to an empty record.
    pub fn account(&self, user: &UserId) -> StoreResult<UserAccount> {
        Ok(self.accounts.load()?.remove(user).unwrap_or_default())
    }

    /// Writes back a single account, inserting it if absent.
    pub fn put_account(&self, user: &UserId, account: UserAccount) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        accounts.insert(user.clone(), account);
        self.accounts.save(&accounts)
    }

    /// Creates an account explicitly (admin surface).
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountExists`] when the user already has one.
    pub fn add_account(&self, user: &UserId, total_payment: u64) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        if accounts.contains_key(user) {
            return Err(StoreError::AccountExists(user.to_string()));
        }
        accounts.insert(
            user.clone(),
            UserAccount {
                total_payment,
                ..UserAccount::new()
            },
        );
        self.accounts.save(&accounts)?;
        info!(user = user.as_str(), "account created");
        Ok(())
    }

    /// Overwrites the payment total of an existing account.
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountNotFound`] when the user has no account.
    pub fn set_total_payment(&self, user: &UserId, total_payment: u64) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        let account = accounts
            .get_mut(user)
            .ok_or_else(|| StoreError::AccountNotFound(user.to_string()))?;
        account.total_payment = total_payment;
        self.accounts.save(&accounts)
    }

    /// Grants a product to an existing account under the given key
    /// (admin surface; purchases go through the fulfillment engine).
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountNotFound`] when the user has no account.
    pub fn grant_product(&self, user: &UserId, product: &str, key: &str) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        let account = accounts
            .get_mut(user)
            .ok_or_else(|| StoreError::AccountNotFound(user.to_string()))?;
        account.grant(product, key);
        self.accounts.save(&accounts)?;
        info!(user = user.as_str(), product, "ownership granted");
        Ok(())
    }

    /// Removes a product from a user's ownership map.
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountNotFound`] when the user has no account;
    /// [`StoreError::ProductNotFound`] when the user does not own the
    /// product.
    pub fn revoke_product(&self, user: &UserId, product: &str) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        let account = accounts
            .get_mut(user)
            .ok_or_else(|| StoreError::AccountNotFound(user.to_string()))?;
        if !account.revoke(product) {
            return Err(StoreError::ProductNotFound(product.to_string()));
        }
        self.accounts.save(&accounts)?;
        info!(user = user.as_str(), product, "ownership revoked");
        Ok(())
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountNotFound`] when the user has no account.
    pub fn remove_account(&self, user: &UserId) -> StoreResult<()> {
        let mut accounts = self.accounts.load()?;
        if accounts.remove(user).is_none() {
            return Err(StoreError::AccountNotFound(user.to_string()));
        }
        self.accounts.save(&accounts)?;
        info!(user = user.as_str(), "account removed");
        Ok(())
    }
}
