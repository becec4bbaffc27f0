//! Community features for Tradepost: timed giveaways, the support ticket
//! desk, and moderation utilities.
//!
//! Everything here persists through the same flat-file JSON datastore as
//! the commerce core (`giveaways.json`, `tickets.json`, `warnings.json`).

mod error;
mod giveaway;
mod moderation;
mod ticket;

pub use error::{CommunityError, CommunityResult};
pub use giveaway::{
    Giveaway, GiveawayBoard, GiveawayId, GiveawayOutcome, GiveawaySpec, MAX_WINNERS, MIN_DURATION,
    MIN_WINNERS, SWEEP_INTERVAL, draw_winners,
};
pub use moderation::{MAX_TIMEOUT, ModerationLog, format_timeout, parse_timeout};
pub use ticket::{GuildTickets, Ticket, TicketDesk, TicketKind, TicketStatus, TranscriptLine};
