//! Moderation utilities: the warning ledger and timeout parsing.
//!
//! Kicks, bans, and message purges are stateless gateway calls and live
//! with the platform integration; only the pieces with stored state or
//! parsing rules are here.

use crate::error::{CommunityError, CommunityResult};
use chrono::Utc;
use std::time::Duration;
use tradepost_store::{Warning, WarningStore};
use tradepost_types::{GuildId, UserId};
use tracing::info;

/// Hard cap on timeouts (platform limit: 28 days).
pub const MAX_TIMEOUT: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Warning ledger over the flat-file store.
pub struct ModerationLog {
    store: WarningStore,
}

impl ModerationLog {
    /// Wraps a warning store.
    pub fn new(store: WarningStore) -> Self {
        Self { store }
    }

    /// Records a warning and returns the user's updated warning count.
    pub fn warn(
        &self,
        guild: &GuildId,
        user: &UserId,
        reason: impl Into<String>,
        moderator: UserId,
    ) -> CommunityResult<usize> {
        let warning = Warning {
            reason: reason.into(),
            timestamp: Utc::now(),
            moderator,
        };
        let count = self.store.add(guild, user, warning)?;
        info!(guild = guild.as_str(), user = user.as_str(), count, "warning issued");
        Ok(count)
    }

    /// Returns a user's warnings, oldest first.
    pub fn warnings_for(&self, guild: &GuildId, user: &UserId) -> CommunityResult<Vec<Warning>> {
        Ok(self.store.for_user(guild, user)?)
    }

    /// Clears all warnings for a user. Returns how many were removed.
    pub fn clear_all(&self, guild: &GuildId, user: &UserId) -> CommunityResult<usize> {
        Ok(self.store.clear_all(guild, user)?)
    }

    /// Clears a single warning by its 1-based position and returns it.
    pub fn clear_one(
        &self,
        guild: &GuildId,
        user: &UserId,
        index: usize,
    ) -> CommunityResult<Warning> {
        Ok(self.store.clear_one(guild, user, index)?)
    }
}

/// Parses a timeout of the form `<value><unit>` with unit `s`, `m`, `h` or
/// `d` (case-insensitive), e.g. `45s`, `30m`, `2h`, `1d`.
///
/// # Errors
///
/// [`CommunityError::InvalidTimeout`] for malformed input;
/// [`CommunityError::TimeoutTooLong`] beyond [`MAX_TIMEOUT`].
pub fn parse_timeout(spec: &str) -> CommunityResult<Duration> {
    let spec = spec.trim();
    let Some(unit) = spec.chars().last() else {
        return Err(CommunityError::InvalidTimeout(spec.to_string()));
    };
    let unit_secs: u64 = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return Err(CommunityError::InvalidTimeout(spec.to_string())),
    };
    let value: u64 = spec[..spec.len() - unit.len_utf8()]
        .trim()
        .parse()
        .map_err(|_| CommunityError::InvalidTimeout(spec.to_string()))?;

    let duration = Duration::from_secs(value.saturating_mul(unit_secs));
    if duration > MAX_TIMEOUT {
        return Err(CommunityError::TimeoutTooLong);
    }
    Ok(duration)
}

/// Renders a timeout the way the moderation notices word it, e.g.
/// `2 hour(s)`.
#[must_use]
pub fn format_timeout(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs > 0 && secs % 86_400 == 0 {
        format!("{} day(s)", secs / 86_400)
    } else if secs > 0 && secs % 3_600 == 0 {
        format!("{} hour(s)", secs / 3_600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{secs} second(s)")
    }
}
