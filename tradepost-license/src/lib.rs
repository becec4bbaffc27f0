//! License key engine for Tradepost.
//!
//! A license key proves purchase of a product by a user. Keys are derived,
//! not drawn at random: [`LicenseKey::derive`] is a pure function of
//! (user identity, product name), stable across calls and restarts, and
//! [`LicenseKey::verify`] recomputes the derivation for comparison. Any key
//! in the ownership ledger can therefore be re-derived for audit from the
//! ledger entry alone.
//!
//! The flip side is that the inputs are not secret: whoever holds the
//! algorithm and a user's id can compute that user's key. This is a known,
//! accepted property; issued keys stay valid only as long as the
//! derivation stays unchanged.

mod error;
mod key;

pub use error::{LicenseError, LicenseResult};
pub use key::{GROUP_LEN, KEY_CHARS, LicenseKey};
