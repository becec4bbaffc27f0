//! Error types for the community features.

use crate::giveaway::GiveawayId;
use thiserror::Error;

/// Community-feature errors.
#[derive(Debug, Error)]
pub enum CommunityError {
    /// No active giveaway with this id.
    #[error("giveaway not found: {0}")]
    GiveawayNotFound(GiveawayId),

    /// The giveaway's end time has passed; entries are closed.
    #[error("giveaway has ended: {0}")]
    GiveawayEnded(GiveawayId),

    /// Winner count outside the allowed range.
    #[error("winner count must be between {min} and {max}")]
    InvalidWinnerCount { min: u32, max: u32 },

    /// Duration below the minimum or not representable.
    #[error("giveaway duration out of range (minimum one minute)")]
    InvalidDuration,

    /// The user already entered this giveaway.
    #[error("already entered this giveaway")]
    AlreadyEntered,

    /// The user is not a participant of this giveaway.
    #[error("not entered in this giveaway")]
    NotEntered,

    /// The user already has an open ticket in this guild.
    #[error("user already has an open ticket in this guild")]
    TicketAlreadyOpen,

    /// No ticket with this number in this guild.
    #[error("ticket not found: #{0}")]
    TicketNotFound(u64),

    /// The ticket is already closed.
    #[error("ticket #{0} is already closed")]
    TicketClosed(u64),

    /// Timeout specification did not parse.
    #[error("invalid timeout duration: {0:?}")]
    InvalidTimeout(String),

    /// Timeout beyond the platform cap.
    #[error("timeout duration exceeds the 28-day cap")]
    TimeoutTooLong,

    /// Datastore failure.
    #[error(transparent)]
    Store(#[from] tradepost_store::StoreError),
}

/// Result type for community operations.
pub type CommunityResult<T> = Result<T, CommunityError>;
