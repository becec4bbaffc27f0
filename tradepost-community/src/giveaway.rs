//! Timed giveaways.
//!
//! A giveaway accumulates participants until its end time; a periodic sweep
//! draws winners and retires it. Active giveaways persist across restarts
//! in `giveaways.json`; entries whose end time already passed are dropped
//! on load.

use crate::error::{CommunityError, CommunityResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tradepost_store::JsonFile;
use tradepost_types::{ChannelId, MessageId, UserId};
use tracing::{debug, info};
use uuid::Uuid;

/// Fewest winners a giveaway may draw.
pub const MIN_WINNERS: u32 = 1;

/// Most winners a giveaway may draw.
pub const MAX_WINNERS: u32 = 10;

/// Shortest allowed run time.
pub const MIN_DURATION: Duration = Duration::from_secs(60);

/// How often the periodic driver sweeps for ended giveaways.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Unique identifier for a giveaway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiveawayId(Uuid);

impl GiveawayId {
    /// Creates a new giveaway id with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GiveawayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GiveawayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters for creating a giveaway.
#[derive(Debug, Clone)]
pub struct GiveawaySpec {
    /// Channel the giveaway is announced in.
    pub channel: ChannelId,
    /// What is being given away.
    pub prize: String,
    /// Optional extra details.
    pub description: String,
    /// How many winners to draw, between [`MIN_WINNERS`] and
    /// [`MAX_WINNERS`].
    pub winners_count: u32,
    /// How long the giveaway runs, at least [`MIN_DURATION`].
    pub duration: Duration,
    /// Who is hosting it.
    pub host: UserId,
}

/// A running giveaway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Giveaway {
    /// Identifier.
    pub id: GiveawayId,
    /// Channel the giveaway was announced in.
    pub channel: ChannelId,
    /// The announcement message carrying the entry button, once posted.
    pub message: Option<MessageId>,
    /// The prize.
    pub prize: String,
    /// Extra details.
    #[serde(default)]
    pub description: String,
    /// Number of winners to draw.
    pub winners_count: u32,
    /// When entries close.
    pub ends_at: DateTime<Utc>,
    /// Entrants, in entry order.
    pub participants: Vec<UserId>,
    /// The host.
    pub host: UserId,
}

/// An ended giveaway with its drawn winners.
#[derive(Debug, Clone)]
pub struct GiveawayOutcome {
    /// The retired giveaway.
    pub giveaway: Giveaway,
    /// Drawn winners; fewer than `winners_count` when entries were short,
    /// empty when nobody entered.
    pub winners: Vec<UserId>,
}

/// Draws up to `winners_count` distinct winners uniformly at random. When
/// the entry list is no larger than the winner count, everyone wins.
pub fn draw_winners<R: Rng + ?Sized>(giveaway: &Giveaway, rng: &mut R) -> Vec<UserId> {
    use rand::seq::SliceRandom;

    let wanted = giveaway.winners_count as usize;
    if giveaway.participants.len() <= wanted {
        return giveaway.participants.clone();
    }
    giveaway
        .participants
        .choose_multiple(rng, wanted)
        .cloned()
        .collect()
}

/// Manages the active giveaways and their persistence.
pub struct GiveawayBoard {
    file: JsonFile<Vec<Giveaway>>,
    active: RwLock<Vec<Giveaway>>,
}

impl GiveawayBoard {
    /// Opens the board rooted at the given database directory
    /// (`<dir>/giveaways.json`), dropping giveaways that ended while the
    /// process was down.
    pub fn open(dir: impl AsRef<Path>) -> CommunityResult<Self> {
        let file = JsonFile::new(dir.as_ref().join("giveaways.json"));
        let mut active: Vec<Giveaway> = file.load()?;
        let before = active.len();
        let now = Utc::now();
        active.retain(|g| g.ends_at > now);
        if active.len() < before {
            debug!(dropped = before - active.len(), "dropped ended giveaways on load");
        }
        Ok(Self {
            file,
            active: RwLock::new(active),
        })
    }

    /// Creates a giveaway.
    ///
    /// # Errors
    ///
    /// [`CommunityError::InvalidWinnerCount`] or
    /// [`CommunityError::InvalidDuration`] when the parameters are out of
    /// bounds.
    pub async fn create(&self, spec: GiveawaySpec) -> CommunityResult<Giveaway> {
        if !(MIN_WINNERS..=MAX_WINNERS).contains(&spec.winners_count) {
            return Err(CommunityError::InvalidWinnerCount {
                min: MIN_WINNERS,
                max: MAX_WINNERS,
            });
        }
        if spec.duration < MIN_DURATION {
            return Err(CommunityError::InvalidDuration);
        }
        let run_time =
            chrono::Duration::from_std(spec.duration).map_err(|_| CommunityError::InvalidDuration)?;

        let giveaway = Giveaway {
            id: GiveawayId::new(),
            channel: spec.channel,
            message: None,
            prize: spec.prize,
            description: spec.description,
            winners_count: spec.winners_count,
            ends_at: Utc::now() + run_time,
            participants: Vec::new(),
            host: spec.host,
        };

        let mut active = self.active.write().await;
        active.push(giveaway.clone());
        self.file.save(&active)?;
        info!(id = %giveaway.id, prize = %giveaway.prize, "giveaway created");
        Ok(giveaway)
    }

    /// Records the posted announcement message for a giveaway.
    pub async fn set_message(&self, id: GiveawayId, message: MessageId) -> CommunityResult<()> {
        let mut active = self.active.write().await;
        let giveaway = active
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(CommunityError::GiveawayNotFound(id))?;
        giveaway.message = Some(message);
        self.file.save(&active)?;
        Ok(())
    }

    /// Enters a user into a giveaway. Returns the new entry count.
    ///
    /// # Errors
    ///
    /// [`CommunityError::AlreadyEntered`] on a repeat entry;
    /// [`CommunityError::GiveawayEnded`] once the end time has passed.
    pub async fn enter(
        &self,
        id: GiveawayId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> CommunityResult<usize> {
        let mut active = self.active.write().await;
        let giveaway = active
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(CommunityError::GiveawayNotFound(id))?;
        if giveaway.ends_at <= now {
            return Err(CommunityError::GiveawayEnded(id));
        }
        if giveaway.participants.contains(&user) {
            return Err(CommunityError::AlreadyEntered);
        }
        giveaway.participants.push(user);
        let entries = giveaway.participants.len();
        self.file.save(&active)?;
        Ok(entries)
    }

    /// Withdraws a user's entry.
    ///
    /// # Errors
    ///
    /// [`CommunityError::NotEntered`] when the user never entered.
    pub async fn leave(&self, id: GiveawayId, user: &UserId) -> CommunityResult<()> {
        let mut active = self.active.write().await;
        let giveaway = active
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(CommunityError::GiveawayNotFound(id))?;
        let before = giveaway.participants.len();
        giveaway.participants.retain(|p| p != user);
        if giveaway.participants.len() == before {
            return Err(CommunityError::NotEntered);
        }
        self.file.save(&active)?;
        Ok(())
    }

    /// Returns a snapshot of a giveaway.
    pub async fn giveaway(&self, id: GiveawayId) -> Option<Giveaway> {
        self.active.read().await.iter().find(|g| g.id == id).cloned()
    }

    /// Returns snapshots of all active giveaways.
    pub async fn active(&self) -> Vec<Giveaway> {
        self.active.read().await.clone()
    }

    /// Retires every giveaway whose end time has passed, drawing winners
    /// for each.
    pub async fn sweep(&self, now: DateTime<Utc>) -> CommunityResult<Vec<GiveawayOutcome>> {
        let ended = {
            let mut active = self.active.write().await;
            let mut ended: Vec<Giveaway> = Vec::new();
            let mut i = 0;
            while i < active.len() {
                if active[i].ends_at <= now {
                    ended.push(active.remove(i));
                } else {
                    i += 1;
                }
            }
            if !ended.is_empty() {
                self.file.save(&active)?;
            }
            ended
        };
        if ended.is_empty() {
            return Ok(Vec::new());
        }

        let mut rng = rand::thread_rng();
        let mut outcomes = Vec::with_capacity(ended.len());
        for giveaway in ended {
            let winners = draw_winners(&giveaway, &mut rng);
            info!(
                id = %giveaway.id,
                prize = %giveaway.prize,
                entries = giveaway.participants.len(),
                winners = winners.len(),
                "giveaway ended"
            );
            outcomes.push(GiveawayOutcome { giveaway, winners });
        }
        Ok(outcomes)
    }

    /// Periodic driver: sweeps every `interval` and hands each outcome to
    /// `on_end`. Runs until a store error stops it.
    pub async fn run<F>(&self, interval: Duration, mut on_end: F) -> CommunityResult<()>
    where
        F: FnMut(GiveawayOutcome),
    {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            for outcome in self.sweep(Utc::now()).await? {
                on_end(outcome);
            }
        }
    }
}
