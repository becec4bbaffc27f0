//! Flat-file collaborator adapters.
//!
//! Bridges the JSON datastore into the engine's collaborator seams. The
//! file I/O involved is small and local, so the async trait methods call
//! into it inline.

use crate::collaborators::{AccountSource, CatalogSource};
use crate::error::FulfillmentResult;
use async_trait::async_trait;
use tradepost_store::{AccountStore, CatalogStore};
use tradepost_types::{ProductRecord, UserAccount, UserId};

#[async_trait]
impl CatalogSource for CatalogStore {
    async fn product(&self, name: &str) -> FulfillmentResult<Option<ProductRecord>> {
        Ok(CatalogStore::product(self, name)?)
    }
}

#[async_trait]
impl AccountSource for AccountStore {
    async fn account(&self, user: &UserId) -> FulfillmentResult<UserAccount> {
        Ok(AccountStore::account(self, user)?)
    }

    async fn put_account(&self, user: &UserId, account: UserAccount) -> FulfillmentResult<()> {
        Ok(AccountStore::put_account(self, user, account)?)
    }
}
