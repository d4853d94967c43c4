//! Variety streak: days on which the player tried several different games.

use crate::clock::Clock;
use crate::storage::{Record, Storage};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Distinct game types needed on one day to count it.
pub const VARIETY_THRESHOLD: usize = 3;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VarietyDay {
    pub date: Option<NaiveDate>,
    pub games_played: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossGameStreak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub today: VarietyDay,
    pub last_streak_date: Option<NaiveDate>,
}

impl Record for CrossGameStreak {
    const KEY: &'static str = "cross_game_daily";
    const VERSION: u32 = 1;

    fn migrate(from: u32, mut data: Value) -> Option<Value> {
        if from != 0 {
            return None;
        }
        if let Some(map) = data.as_object_mut() {
            blank_to_null(map.get_mut("lastStreakDate"));
            if let Some(today) = map.get_mut("today").and_then(Value::as_object_mut) {
                blank_to_null(today.get_mut("date"));
            }
        }
        Some(data)
    }
}

fn blank_to_null(value: Option<&mut Value>) {
    if let Some(value) = value
        && value.as_str() == Some("")
    {
        *value = Value::Null;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarietyOutcome {
    pub data: CrossGameStreak,
    /// True only for the game that brought today to the threshold.
    pub variety_just_reached: bool,
}

pub struct CrossGameTracker {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl CrossGameTracker {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn load(&self) -> CrossGameStreak {
        self.storage.get()
    }

    pub fn record_game_played(&self, game_type: &str) -> VarietyOutcome {
        let today = self.clock.today();
        let mut data = self.load();

        if data.today.date != Some(today) {
            let yesterday = today - Duration::days(1);
            let continues = data
                .last_streak_date
                .is_some_and(|last| last == yesterday || last == today);
            if !continues {
                data.current_streak = 0;
            }
            data.today = VarietyDay {
                date: Some(today),
                games_played: Vec::new(),
            };
        }

        let was_below = data.today.games_played.len() < VARIETY_THRESHOLD;
        if !data.today.games_played.iter().any(|g| g == game_type) {
            data.today.games_played.push(game_type.to_string());
        }
        let just_reached = was_below && data.today.games_played.len() >= VARIETY_THRESHOLD;

        if just_reached {
            data.current_streak += 1;
            data.longest_streak = data.longest_streak.max(data.current_streak);
            data.last_streak_date = Some(today);
            info!("Variety goal reached (streak {})", data.current_streak);
        }

        self.storage.set(&data);
        VarietyOutcome {
            data,
            variety_just_reached: just_reached,
        }
    }

    pub fn today_variety_count(&self) -> usize {
        let data = self.load();
        if data.today.date == Some(self.clock.today()) {
            data.today.games_played.len()
        } else {
            0
        }
    }
}
