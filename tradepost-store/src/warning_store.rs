//! Moderation warning persistence.
//!
//! Backed by `warnings.json`: guild → user → warnings, oldest first. Empty
//! lists and guild maps are pruned on removal so the file never accumulates
//! dead keys.

use crate::error::{StoreError, StoreResult};
use crate::json::JsonFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tradepost_types::{GuildId, UserId};

/// A single recorded warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Why the warning was issued.
    pub reason: String,
    /// When it was issued.
    pub timestamp: DateTime<Utc>,
    /// Who issued it.
    pub moderator: UserId,
}

/// Map shape of `warnings.json`.
pub type WarningMap = BTreeMap<GuildId, BTreeMap<UserId, Vec<Warning>>>;

/// Append/list/clear over the warning collection.
#[derive(Debug, Clone)]
pub struct WarningStore {
    warnings: JsonFile<WarningMap>,
}

impl WarningStore {
    /// Opens the warning store rooted at the given database directory
    /// (`<dir>/warnings.json`).
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            warnings: JsonFile::new(dir.as_ref().join("warnings.json")),
        }
    }

    /// Appends a warning and returns the user's new warning count.
    pub fn add(&self, guild: &GuildId, user: &UserId, warning: Warning) -> StoreResult<usize> {
        let mut warnings = self.warnings.load()?;
        let list = warnings
            .entry(guild.clone())
            .or_default()
            .entry(user.clone())
            .or_default();
        list.push(warning);
        let count = list.len();
        self.warnings.save(&warnings)?;
        Ok(count)
    }

    /// Returns a user's warnings, oldest first. Empty when none recorded.
    pub fn for_user(&self, guild: &GuildId, user: &UserId) -> StoreResult<Vec<Warning>> {
        Ok(self
            .warnings
            .load()?
            .get(guild)
            .and_then(|users| users.get(user))
            .cloned()
            .unwrap_or_default())
    }

    /// Clears all warnings for a user. Returns how many were removed.
    pub fn clear_all(&self, guild: &GuildId, user: &UserId) -> StoreResult<usize> {
        let mut warnings = self.warnings.load()?;
        let removed = warnings
            .get_mut(guild)
            .and_then(|users| users.remove(user))
            .map_or(0, |list| list.len());
        if removed > 0 {
            prune(&mut warnings, guild);
            self.warnings.save(&warnings)?;
        }
        Ok(removed)
    }

    /// Removes a single warning by its 1-based position and returns it.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidWarningIndex`] when the position is out of
    /// range (including for users with no warnings at all).
    pub fn clear_one(&self, guild: &GuildId, user: &UserId, index: usize) -> StoreResult<Warning> {
        let mut warnings = self.warnings.load()?;
        let list = warnings
            .get_mut(guild)
            .and_then(|users| users.get_mut(user));
        let count = list.as_ref().map_or(0, |l| l.len());
        let Some(list) = list else {
            return Err(StoreError::InvalidWarningIndex { index, count });
        };
        if index == 0 || index > count {
            return Err(StoreError::InvalidWarningIndex { index, count });
        }
        let removed = list.remove(index - 1);
        if list.is_empty() {
            if let Some(users) = warnings.get_mut(guild) {
                users.remove(user);
            }
            prune(&mut warnings, guild);
        }
        self.warnings.save(&warnings)?;
        Ok(removed)
    }
}

fn prune(warnings: &mut WarningMap, guild: &GuildId) {
    if warnings.get(guild).is_some_and(BTreeMap::is_empty) {
        warnings.remove(guild);
    }
}
