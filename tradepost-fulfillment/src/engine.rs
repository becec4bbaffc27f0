//! Purchase fulfillment engine.
//!
//! Drives a buy request through the attempt state machine:
//! `Initiated → (free | AwaitingPayment) → Confirmed → Delivered → Closed`,
//! with `Cancelled` reachable until confirmation.
//!
//! The ownership write inside [`FulfillmentEngine::submit_payment`] (and the
//! free path of [`FulfillmentEngine::begin`]) is the single commit point.
//! Before it nothing is persisted; after it nothing is rolled back.

use crate::attempt::{
    AttemptId, AttemptState, BeginOutcome, DeliveryStatus, FulfillmentAttempt, Receipt,
};
use crate::collaborators::{
    AccountSource, CatalogSource, ContextChannel, Delivery, DeliveryError,
};
use crate::error::{FulfillmentError, FulfillmentResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tradepost_license::LicenseKey;
use tradepost_types::UserId;

/// Configuration for the fulfillment engine.
#[derive(Debug, Clone)]
pub struct FulfillmentConfig {
    /// Delay between delivery and context teardown.
    pub archive_delay: Duration,
    /// Window in which a requested cancellation must be confirmed.
    pub cancel_confirm_window: Duration,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            archive_delay: Duration::from_secs(300),
            cancel_confirm_window: Duration::from_secs(60),
        }
    }
}

/// The fulfillment engine. Owns the in-flight attempt table and reaches all
/// external effects through collaborator traits.
pub struct FulfillmentEngine {
    catalog: Arc<dyn CatalogSource>,
    accounts: Arc<dyn AccountSource>,
    delivery: Arc<dyn Delivery>,
    contexts: Arc<dyn ContextChannel>,
    config: FulfillmentConfig,
    attempts: Arc<RwLock<HashMap<AttemptId, FulfillmentAttempt>>>,
    /// Per-user guards serializing the account read-modify-write, so two
    /// attempts completing for the same user cannot lose updates.
    account_locks: Arc<Mutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl FulfillmentEngine {
    /// Creates an engine with the default configuration.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        accounts: Arc<dyn AccountSource>,
        delivery: Arc<dyn Delivery>,
        contexts: Arc<dyn ContextChannel>,
    ) -> Self {
        Self::with_config(catalog, accounts, delivery, contexts, FulfillmentConfig::default())
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(
        catalog: Arc<dyn CatalogSource>,
        accounts: Arc<dyn AccountSource>,
        delivery: Arc<dyn Delivery>,
        contexts: Arc<dyn ContextChannel>,
        config: FulfillmentConfig,
    ) -> Self {
        Self {
            catalog,
            accounts,
            delivery,
            contexts,
            config,
            attempts: Arc::new(RwLock::new(HashMap::new())),
            account_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }

    /// Returns a snapshot of an attempt.
    pub async fn attempt(&self, id: AttemptId) -> Option<FulfillmentAttempt> {
        self.attempts.read().await.get(&id).cloned()
    }

    // ── Initiation ───────────────────────────────────────────────

    /// Starts a purchase attempt for a product.
    ///
    /// The catalog is consulted at call time. Free products commit and
    /// deliver before returning; paid products get a private transaction
    /// context and wait for [`FulfillmentEngine::submit_payment`].
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::ProductNotFound`] when the product is absent
    /// from the catalog; [`FulfillmentError::AttemptAlreadyOpen`] when the
    /// user already has an open attempt for it.
    pub async fn begin(&self, user: UserId, product_name: &str) -> FulfillmentResult<BeginOutcome> {
        let record = self
            .catalog
            .product(product_name)
            .await?
            .ok_or_else(|| FulfillmentError::ProductNotFound(product_name.to_string()))?;

        let id = AttemptId::new();
        {
            // Check-and-insert under one write lock: two simultaneous buys
            // for the same pair cannot both register.
            let mut attempts = self.attempts.write().await;
            let open = attempts
                .values()
                .any(|a| a.user == user && a.product == product_name && a.state.is_open());
            if open {
                return Err(FulfillmentError::AttemptAlreadyOpen {
                    user,
                    product: product_name.to_string(),
                });
            }
            attempts.insert(id, FulfillmentAttempt::new(id, user.clone(), product_name, &record));
        }
        debug!(%id, user = user.as_str(), product = product_name, "attempt initiated");

        if record.is_free() {
            self.set_state(id, AttemptState::Confirmed).await;
            match self.commit(id, 0).await {
                Ok(receipt) => Ok(BeginOutcome::Delivered(receipt)),
                Err(err) => {
                    // Nothing was persisted; drop the attempt so the buy
                    // action can simply be reissued.
                    self.attempts.write().await.remove(&id);
                    Err(err)
                }
            }
        } else {
            let context = match self.contexts.open(&user, product_name).await {
                Ok(handle) => handle,
                Err(err) => {
                    self.attempts.write().await.remove(&id);
                    return Err(err);
                }
            };
            {
                let mut attempts = self.attempts.write().await;
                if let Some(attempt) = attempts.get_mut(&id) {
                    attempt.context = Some(context.clone());
                    attempt.state = AttemptState::AwaitingPayment;
                }
            }
            info!(%id, product = product_name, context = %context, "attempt awaiting payment");
            Ok(BeginOutcome::AwaitingPayment { attempt: id, context })
        }
    }

    // ── Confirmation and commit ──────────────────────────────────

    /// Verifies a staff-submitted payment amount and, on an exact match,
    /// commits the purchase and dispatches delivery.
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::PaymentMismatch`] when the amount differs from
    /// the recorded price; the attempt stays in `AwaitingPayment` and the
    /// submission may be repeated. [`FulfillmentError::InvalidState`] when
    /// the attempt is past the payment gate; a duplicate confirmation lands
    /// here and cannot commit a second time.
    pub async fn submit_payment(&self, id: AttemptId, amount: u64) -> FulfillmentResult<Receipt> {
        {
            // The gate and the flip to Confirmed happen under one write
            // lock: exactly one submission can pass it.
            let mut attempts = self.attempts.write().await;
            let attempt = attempts
                .get_mut(&id)
                .ok_or(FulfillmentError::AttemptNotFound(id))?;
            if attempt.state != AttemptState::AwaitingPayment {
                return Err(FulfillmentError::InvalidState { state: attempt.state });
            }
            if amount != attempt.price {
                return Err(FulfillmentError::PaymentMismatch {
                    expected: attempt.price,
                    submitted: amount,
                });
            }
            attempt.state = AttemptState::Confirmed;
            // Confirmation wins over a still-pending cancellation request.
            attempt.cancel_deadline = None;
        }
        info!(%id, amount, "payment confirmed");

        match self.commit(id, amount).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                // The ownership write did not land. Reopen the payment gate
                // so staff can retry the confirmation.
                self.set_state(id, AttemptState::AwaitingPayment).await;
                warn!(%id, error = %err, "commit failed, attempt reopened");
                Err(err)
            }
        }
    }

    /// Confirmed → Delivered. The `put_account` call is the commit point.
    async fn commit(&self, id: AttemptId, amount: u64) -> FulfillmentResult<Receipt> {
        let (user, product, deliverable) = {
            let attempts = self.attempts.read().await;
            let attempt = attempts
                .get(&id)
                .ok_or(FulfillmentError::AttemptNotFound(id))?;
            debug_assert_eq!(attempt.state, AttemptState::Confirmed);
            (
                attempt.user.clone(),
                attempt.product.clone(),
                attempt.deliverable.clone(),
            )
        };

        let key = LicenseKey::derive(user.as_str(), &product);

        {
            // Serialize the read-modify-write per user id; attempts for
            // different users proceed independently.
            let guard = self.user_lock(&user).await;
            let _held = guard.lock().await;
            let mut account = self.accounts.account(&user).await?;
            account.grant(&product, key.as_str());
            if amount > 0 {
                account.record_payment(amount);
            }
            self.accounts.put_account(&user, account).await?;
        }
        info!(%id, user = user.as_str(), product = %product, %key, "ownership recorded");

        // The purchase is now durable; delivery problems are reported, not
        // rolled back.
        let delivery = match self.delivery.deliver(&user, &deliverable, &key).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(DeliveryError::NotFound) => {
                warn!(%id, deliverable = %deliverable, "deliverable missing, ownership already recorded");
                DeliveryStatus::Missing
            }
            Err(DeliveryError::Forbidden) => {
                warn!(%id, user = user.as_str(), "delivery refused, ownership already recorded");
                DeliveryStatus::Refused
            }
        };

        self.set_state(id, AttemptState::Delivered).await;
        debug!(%id, ?delivery, "attempt delivered");

        Ok(Receipt {
            attempt: id,
            user,
            product,
            amount_paid: amount,
            key,
            delivery,
        })
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// Delivered → Closed: waits the archive delay, then tears the
    /// transaction context down. Teardown failure is logged, never
    /// surfaced; the committed ownership record is unaffected.
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::InvalidState`] unless the attempt is
    /// `Delivered`.
    pub async fn close(&self, id: AttemptId) -> FulfillmentResult<()> {
        {
            let attempts = self.attempts.read().await;
            let attempt = attempts
                .get(&id)
                .ok_or(FulfillmentError::AttemptNotFound(id))?;
            if attempt.state != AttemptState::Delivered {
                return Err(FulfillmentError::InvalidState { state: attempt.state });
            }
        }

        tokio::time::sleep(self.config.archive_delay).await;

        let context = {
            let mut attempts = self.attempts.write().await;
            match attempts.get_mut(&id) {
                Some(attempt) if attempt.state == AttemptState::Delivered => {
                    attempt.state = AttemptState::Closed;
                    attempt.context.take()
                }
                // Raced with another close during the delay; nothing left.
                _ => None,
            }
        };
        if let Some(handle) = context {
            if let Err(err) = self.contexts.close(&handle).await {
                warn!(%id, context = %handle, error = %err, "context teardown failed");
            }
        }
        info!(%id, "attempt closed");
        Ok(())
    }

    // ── Cancellation ─────────────────────────────────────────────

    /// Requests cancellation of an attempt. Honored only before
    /// confirmation; a second affirmative action within the configured
    /// window is required before anything happens.
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::InvalidState`] once the attempt is confirmed or
    /// later.
    pub async fn request_cancel(&self, id: AttemptId) -> FulfillmentResult<()> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .get_mut(&id)
            .ok_or(FulfillmentError::AttemptNotFound(id))?;
        if !attempt.state.cancellable() {
            return Err(FulfillmentError::InvalidState { state: attempt.state });
        }
        attempt.cancel_deadline = Some(Instant::now() + self.config.cancel_confirm_window);
        debug!(%id, "cancellation requested");
        Ok(())
    }

    /// Confirms a pending cancellation. After the window has elapsed the
    /// request is void and the attempt stays in its prior state: the
    /// timeout cancels the cancellation, not the purchase.
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::NoCancelPending`] without a prior request;
    /// [`FulfillmentError::CancelWindowExpired`] past the window;
    /// [`FulfillmentError::InvalidState`] when the attempt was confirmed
    /// while the request was pending.
    pub async fn confirm_cancel(&self, id: AttemptId) -> FulfillmentResult<()> {
        let context = {
            let mut attempts = self.attempts.write().await;
            let attempt = attempts
                .get_mut(&id)
                .ok_or(FulfillmentError::AttemptNotFound(id))?;
            let Some(deadline) = attempt.cancel_deadline else {
                return Err(FulfillmentError::NoCancelPending);
            };
            if !attempt.state.cancellable() {
                attempt.cancel_deadline = None;
                return Err(FulfillmentError::InvalidState { state: attempt.state });
            }
            if Instant::now() > deadline {
                attempt.cancel_deadline = None;
                return Err(FulfillmentError::CancelWindowExpired);
            }
            attempt.cancel_deadline = None;
            attempt.state = AttemptState::Cancelled;
            attempt.context.take()
        };
        info!(%id, "attempt cancelled");
        if let Some(handle) = context {
            if let Err(err) = self.contexts.close(&handle).await {
                warn!(%id, context = %handle, error = %err, "context teardown failed");
            }
        }
        Ok(())
    }

    /// Withdraws a pending cancellation request, keeping the attempt where
    /// it was.
    ///
    /// # Errors
    ///
    /// [`FulfillmentError::NoCancelPending`] without a prior request.
    pub async fn decline_cancel(&self, id: AttemptId) -> FulfillmentResult<()> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .get_mut(&id)
            .ok_or(FulfillmentError::AttemptNotFound(id))?;
        if attempt.cancel_deadline.take().is_none() {
            return Err(FulfillmentError::NoCancelPending);
        }
        debug!(%id, "cancellation declined");
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    async fn set_state(&self, id: AttemptId, state: AttemptState) {
        if let Some(attempt) = self.attempts.write().await.get_mut(&id) {
            attempt.state = state;
        }
    }

    async fn user_lock(&self, user: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock().await;
        locks
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
