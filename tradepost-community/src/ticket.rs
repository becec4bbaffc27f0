//! Support ticket desk.
//!
//! Tickets are numbered sequentially per guild, one open ticket per user at
//! a time. The stored ticket keeps a transcript of the conversation so it
//! survives the channel's deletion.

use crate::error::{CommunityError, CommunityResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tradepost_store::JsonFile;
use tradepost_types::{ChannelId, GuildId, UserId};
use tracing::info;

/// Ticket category offered in the support menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Questions about a product before buying.
    ProductAdvice,
    /// A bug or incident report.
    IssueReport,
    /// Help completing a purchase.
    PurchaseHelp,
}

impl TicketKind {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ProductAdvice => "product advice",
            Self::IssueReport => "issue report",
            Self::PurchaseHelp => "purchase help",
        }
    }
}

/// Whether a ticket still accepts messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Accepting messages.
    Open,
    /// Resolved; transcript frozen.
    Closed,
}

/// One line of the stored transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Who wrote it.
    pub author: UserId,
    /// When it was written.
    pub sent_at: DateTime<Utc>,
    /// The message text.
    pub content: String,
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Sequential number within the guild, starting at 1.
    pub number: u64,
    /// Channel the conversation happens in.
    pub channel: ChannelId,
    /// Who opened it.
    pub user: UserId,
    /// Chosen category.
    pub kind: TicketKind,
    /// The issue as described when opening.
    pub issue: String,
    /// Open or closed.
    pub status: TicketStatus,
    /// When it was opened.
    pub opened_at: DateTime<Utc>,
    /// Conversation transcript, oldest first.
    #[serde(default)]
    pub messages: Vec<TranscriptLine>,
}

/// Per-guild ticket ledger: the sequential counter plus tickets by number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuildTickets {
    /// Highest ticket number handed out so far.
    pub counter: u64,
    /// Tickets by number.
    pub tickets: BTreeMap<u64, Ticket>,
}

type TicketMap = BTreeMap<GuildId, GuildTickets>;

/// Opens, records, and closes support tickets.
pub struct TicketDesk {
    file: JsonFile<TicketMap>,
    tickets: RwLock<TicketMap>,
}

impl TicketDesk {
    /// Opens the desk rooted at the given database directory
    /// (`<dir>/tickets.json`).
    pub fn open(dir: impl AsRef<Path>) -> CommunityResult<Self> {
        let file = JsonFile::new(dir.as_ref().join("tickets.json"));
        let tickets = file.load()?;
        Ok(Self {
            file,
            tickets: RwLock::new(tickets),
        })
    }

    /// Opens a ticket and assigns it the guild's next number.
    ///
    /// # Errors
    ///
    /// [`CommunityError::TicketAlreadyOpen`] when the user already has an
    /// open ticket in this guild.
    pub async fn open_ticket(
        &self,
        guild: &GuildId,
        user: UserId,
        kind: TicketKind,
        issue: impl Into<String>,
        channel: ChannelId,
    ) -> CommunityResult<Ticket> {
        let mut all = self.tickets.write().await;
        let ledger = all.entry(guild.clone()).or_default();
        if ledger
            .tickets
            .values()
            .any(|t| t.user == user && t.status == TicketStatus::Open)
        {
            return Err(CommunityError::TicketAlreadyOpen);
        }
        ledger.counter += 1;
        let ticket = Ticket {
            number: ledger.counter,
            channel,
            user,
            kind,
            issue: issue.into(),
            status: TicketStatus::Open,
            opened_at: Utc::now(),
            messages: Vec::new(),
        };
        ledger.tickets.insert(ticket.number, ticket.clone());
        self.file.save(&all)?;
        info!(guild = guild.as_str(), number = ticket.number, kind = kind.label(), "ticket opened");
        Ok(ticket)
    }

    /// Appends a line to an open ticket's transcript.
    ///
    /// # Errors
    ///
    /// [`CommunityError::TicketClosed`] when the ticket no longer accepts
    /// messages.
    pub async fn record_message(
        &self,
        guild: &GuildId,
        number: u64,
        line: TranscriptLine,
    ) -> CommunityResult<()> {
        let mut all = self.tickets.write().await;
        let ticket = all
            .get_mut(guild)
            .and_then(|ledger| ledger.tickets.get_mut(&number))
            .ok_or(CommunityError::TicketNotFound(number))?;
        if ticket.status == TicketStatus::Closed {
            return Err(CommunityError::TicketClosed(number));
        }
        ticket.messages.push(line);
        self.file.save(&all)?;
        Ok(())
    }

    /// Closes a ticket and returns it with the frozen transcript.
    ///
    /// # Errors
    ///
    /// [`CommunityError::TicketClosed`] when it was already closed.
    pub async fn close_ticket(&self, guild: &GuildId, number: u64) -> CommunityResult<Ticket> {
        let mut all = self.tickets.write().await;
        let ticket = all
            .get_mut(guild)
            .and_then(|ledger| ledger.tickets.get_mut(&number))
            .ok_or(CommunityError::TicketNotFound(number))?;
        if ticket.status == TicketStatus::Closed {
            return Err(CommunityError::TicketClosed(number));
        }
        ticket.status = TicketStatus::Closed;
        let closed = ticket.clone();
        self.file.save(&all)?;
        info!(guild = guild.as_str(), number, "ticket closed");
        Ok(closed)
    }

    /// Returns a snapshot of a ticket.
    pub async fn ticket(&self, guild: &GuildId, number: u64) -> Option<Ticket> {
        self.tickets
            .read()
            .await
            .get(guild)
            .and_then(|ledger| ledger.tickets.get(&number))
            .cloned()
    }

    /// Returns the open tickets of a guild, lowest number first.
    pub async fn open_tickets(&self, guild: &GuildId) -> Vec<Ticket> {
        self.tickets
            .read()
            .await
            .get(guild)
            .map(|ledger| {
                ledger
                    .tickets
                    .values()
                    .filter(|t| t.status == TicketStatus::Open)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
