//! Purchase fulfillment for Tradepost.
//!
//! Turns a buy intent into a recorded ownership entry exactly once:
//!
//! - Free products commit and deliver immediately.
//! - Paid products park in a private transaction context until staff submit
//!   a payment amount that exactly matches the recorded price.
//! - The account write is the single commit point. Delivery and teardown
//!   failures after it are reported or logged, never rolled back.
//!
//! External effects (catalog, account store, delivery, transaction
//! contexts) are reached through collaborator traits; adapters onto the
//! flat-file datastore are provided in this crate.

mod attempt;
mod collaborators;
mod engine;
mod error;
mod stores;

pub use attempt::{
    AttemptId, AttemptState, BeginOutcome, DeliveryStatus, FulfillmentAttempt, Receipt,
};
pub use collaborators::{
    AccountSource, CatalogSource, ContextChannel, ContextHandle, Delivery, DeliveryError,
};
pub use engine::{FulfillmentConfig, FulfillmentEngine};
pub use error::{FulfillmentError, FulfillmentResult};
