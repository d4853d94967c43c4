//! Achievement unlocking.
//!
//! `check` walks the catalog, skips anything already unlocked and records
//! every newly satisfied rule. Unlocks are append-only and never revoked.

mod catalog;
mod rules;

pub use catalog::{Achievement, AchievementCategory, CORE_SUBJECTS, by_id, catalog, counters};
pub use rules::{Progress, Rule, StatField};

use crate::clock::Clock;
use crate::models::PlayerStats;
use crate::stats::PlayerStatsStore;
use crate::storage::{Record, Storage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

impl Record for Vec<UnlockedAchievement> {
    const KEY: &'static str = "achievements";
    const VERSION: u32 = 1;
}

/// A catalog entry paired with the player's state for display.
#[derive(Debug, Clone)]
pub struct AchievementStatus {
    pub achievement: &'static Achievement,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress: Option<Progress>,
}

impl AchievementStatus {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

pub struct AchievementEngine {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl AchievementEngine {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn unlocked(&self) -> Vec<UnlockedAchievement> {
        self.storage.get()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked().iter().any(|u| u.id == id)
    }

    /// Unlock every achievement whose rule now holds.
    ///
    /// Pass the stats just returned by `PlayerStatsStore::update` to skip a
    /// second read. Returns the newly unlocked ids in catalog order.
    pub fn check(&self, snapshot: Option<&PlayerStats>) -> Vec<&'static str> {
        let loaded;
        let stats = match snapshot {
            Some(stats) => stats,
            None => {
                loaded = PlayerStatsStore::new(self.storage.clone()).load();
                &loaded
            }
        };

        let mut unlocked = self.unlocked();
        let already: HashSet<String> = unlocked.iter().map(|u| u.id.clone()).collect();
        let now = self.clock.now();

        let newly: Vec<&'static str> = catalog()
            .iter()
            .filter(|a| !already.contains(a.id))
            .filter(|a| a.rule.evaluate(stats))
            .map(|a| a.id)
            .collect();

        if !newly.is_empty() {
            unlocked.extend(newly.iter().map(|id| UnlockedAchievement {
                id: id.to_string(),
                unlocked_at: now,
            }));
            self.storage.set(&unlocked);
            info!("Unlocked achievements: {}", newly.join(", "));
        }

        newly
    }

    /// Every catalog entry with unlock time and progress, in catalog order.
    pub fn overview(&self, stats: &PlayerStats) -> Vec<AchievementStatus> {
        let unlocked = self.unlocked();
        catalog()
            .iter()
            .map(|achievement| AchievementStatus {
                achievement,
                unlocked_at: unlocked
                    .iter()
                    .find(|u| u.id == achievement.id)
                    .map(|u| u.unlocked_at),
                progress: achievement.rule.progress(stats),
            })
            .collect()
    }

    pub fn progress(&self, id: &str, stats: &PlayerStats) -> Option<Progress> {
        by_id(id).and_then(|a| a.rule.progress(stats))
    }
}
