//! Shared types for the Tradepost core.
//!
//! Identifier newtypes for platform-assigned handles plus the record types
//! persisted in the flat JSON datastore. Field names on persisted types
//! match the legacy JSON files so existing data loads unchanged.

mod account;
mod catalog;
mod ids;

pub use account::{AccountMap, UserAccount};
pub use catalog::{Categories, ProductMap, ProductRecord};
pub use ids::{ChannelId, GuildId, MessageId, UserId};
