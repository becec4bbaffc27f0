#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tradepost_fulfillment::{
    AccountSource, CatalogSource, ContextChannel, ContextHandle, Delivery, DeliveryError,
    FulfillmentConfig, FulfillmentEngine, FulfillmentError, FulfillmentResult,
};
use tradepost_license::LicenseKey;
use tradepost_types::{ProductRecord, UserAccount, UserId};

/// In-memory catalog collaborator.
#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<HashMap<String, ProductRecord>>,
}

impl MemoryCatalog {
    pub async fn insert(&self, name: &str, record: ProductRecord) {
        self.products.lock().await.insert(name.to_string(), record);
    }

    pub async fn remove(&self, name: &str) {
        self.products.lock().await.remove(name);
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn product(&self, name: &str) -> FulfillmentResult<Option<ProductRecord>> {
        Ok(self.products.lock().await.get(name).cloned())
    }
}

/// In-memory account collaborator with write counting and failure
/// injection.
#[derive(Default)]
pub struct MemoryAccounts {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl MemoryAccounts {
    pub async fn get(&self, user: &UserId) -> UserAccount {
        self.accounts.lock().await.get(user).cloned().unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_next_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountSource for MemoryAccounts {
    async fn account(&self, user: &UserId) -> FulfillmentResult<UserAccount> {
        let account = self.accounts.lock().await.get(user).cloned().unwrap_or_default();
        // Widen the read-modify-write window so unserialized commits would
        // actually interleave.
        tokio::task::yield_now().await;
        Ok(account)
    }

    async fn put_account(&self, user: &UserId, account: UserAccount) -> FulfillmentResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FulfillmentError::Collaborator("account write failed".to_string()));
        }
        self.accounts.lock().await.insert(user.clone(), account);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Delivery collaborator recording every dispatch.
#[derive(Default)]
pub struct MemoryDelivery {
    fail_with: Mutex<Option<DeliveryError>>,
    pub sent: Mutex<Vec<(UserId, String, LicenseKey)>>,
}

impl MemoryDelivery {
    pub async fn fail_with(&self, error: Option<DeliveryError>) {
        *self.fail_with.lock().await = error;
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Delivery for MemoryDelivery {
    async fn deliver(
        &self,
        user: &UserId,
        deliverable: &str,
        key: &LicenseKey,
    ) -> Result<(), DeliveryError> {
        if let Some(error) = *self.fail_with.lock().await {
            return Err(error);
        }
        self.sent
            .lock()
            .await
            .push((user.clone(), deliverable.to_string(), key.clone()));
        Ok(())
    }
}

/// Context collaborator recording opens and closes.
#[derive(Default)]
pub struct MemoryContexts {
    counter: AtomicUsize,
    pub opened: Mutex<Vec<ContextHandle>>,
    pub closed: Mutex<Vec<ContextHandle>>,
    pub fail_open: AtomicBool,
    pub fail_close: AtomicBool,
}

impl MemoryContexts {
    pub async fn opened_count(&self) -> usize {
        self.opened.lock().await.len()
    }

    pub async fn closed_count(&self) -> usize {
        self.closed.lock().await.len()
    }
}

#[async_trait]
impl ContextChannel for MemoryContexts {
    async fn open(&self, user: &UserId, product: &str) -> FulfillmentResult<ContextHandle> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(FulfillmentError::Collaborator("context open failed".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let handle = ContextHandle::new(format!("order-{}-{}-{n}", user.as_str(), product));
        self.opened.lock().await.push(handle.clone());
        Ok(handle)
    }

    async fn close(&self, handle: &ContextHandle) -> FulfillmentResult<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(FulfillmentError::Collaborator("context close failed".to_string()));
        }
        self.closed.lock().await.push(handle.clone());
        Ok(())
    }
}

/// Engine plus handles on all of its mock collaborators.
pub struct Rig {
    pub engine: Arc<FulfillmentEngine>,
    pub catalog: Arc<MemoryCatalog>,
    pub accounts: Arc<MemoryAccounts>,
    pub delivery: Arc<MemoryDelivery>,
    pub contexts: Arc<MemoryContexts>,
}

/// Rig with no archive delay, for tests that do not exercise timing.
pub fn rig() -> Rig {
    rig_with_config(FulfillmentConfig {
        archive_delay: Duration::ZERO,
        cancel_confirm_window: Duration::from_secs(60),
    })
}

pub fn rig_with_config(config: FulfillmentConfig) -> Rig {
    let catalog = Arc::new(MemoryCatalog::default());
    let accounts = Arc::new(MemoryAccounts::default());
    let delivery = Arc::new(MemoryDelivery::default());
    let contexts = Arc::new(MemoryContexts::default());
    let engine = Arc::new(FulfillmentEngine::with_config(
        catalog.clone(),
        accounts.clone(),
        delivery.clone(),
        contexts.clone(),
        config,
    ));
    Rig {
        engine,
        catalog,
        accounts,
        delivery,
        contexts,
    }
}

/// Catalog record helper.
pub fn product(category: &str, price: u64) -> ProductRecord {
    ProductRecord {
        category: category.to_string(),
        description: "a product".to_string(),
        images: String::new(),
        filename: format!("{category}.zip"),
        price,
    }
}
