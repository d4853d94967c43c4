//! Daily challenge: one deterministic question set per calendar date, plus
//! the day-streak state machine.
//!
//! The set depends only on the date string and the pool, so every player and
//! every process sees the same five questions on the same day.

use crate::clock::Clock;
use crate::models::{Difficulty, Question};
use crate::pool::ContentPool;
use crate::storage::{Record, Storage};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const DAILY_QUESTION_COUNT: usize = 5;
/// How many completion dates the streak record remembers.
pub const COMPLETED_DATES_WINDOW: usize = 90;
pub const MILESTONE_STREAKS: [u32; 4] = [3, 7, 14, 30];

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MASK: u64 = 0x7fff_ffff;

/// `YYYY-MM-DD`, the seed source and idempotency key for a day.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Polynomial string hash (`h * 31 + unit`) wrapped to 32 bits each step.
pub fn seed_from_date(key: &str) -> i32 {
    key.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Linear congruential generator over 31-bit state.
#[derive(Debug, Clone)]
pub struct SeededSequence {
    state: u64,
}

impl SeededSequence {
    pub fn new(seed: i32) -> Self {
        Self {
            state: u64::from(seed.unsigned_abs()),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        self.state as f64 / (LCG_MASK + 1) as f64
    }

    /// Uniform index in `0..=upper`.
    fn next_index(&mut self, upper: usize) -> usize {
        let index = (self.next_unit() * (upper + 1) as f64).floor() as usize;
        index.min(upper)
    }
}

impl Iterator for SeededSequence {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_unit())
    }
}

/// The question set for `date`.
///
/// Medium questions are preferred (the whole pool is used when there are too
/// few), shuffled with a date-seeded Fisher-Yates, then one question per
/// subject is taken before backfilling from the rest of the shuffle.
pub fn daily_questions_for<P>(date: NaiveDate, pool: &P) -> Vec<Question>
where
    P: ContentPool + ?Sized,
{
    let medium = pool.by_difficulty(Difficulty::Medium);
    let mut shuffled: Vec<&Question> = if medium.len() >= DAILY_QUESTION_COUNT {
        medium
    } else {
        pool.questions().iter().collect()
    };

    let mut rng = SeededSequence::new(seed_from_date(&date_key(date)));
    for i in (1..shuffled.len()).rev() {
        let j = rng.next_index(i);
        shuffled.swap(i, j);
    }

    let mut selected: Vec<&Question> = Vec::with_capacity(DAILY_QUESTION_COUNT);
    let taken = |selected: &[&Question], question: &Question| {
        selected.iter().any(|s| s.id == question.id)
    };

    for subject in pool.subjects() {
        if selected.len() >= DAILY_QUESTION_COUNT {
            break;
        }
        if let Some(question) = shuffled
            .iter()
            .copied()
            .find(|q| q.subject == subject && !taken(&selected, q))
        {
            selected.push(question);
        }
    }

    for &question in &shuffled {
        if selected.len() >= DAILY_QUESTION_COUNT {
            break;
        }
        if !taken(&selected, question) {
            selected.push(question);
        }
    }

    selected.into_iter().cloned().collect()
}

pub fn milestone_message(streak: u32) -> Option<&'static str> {
    match streak {
        30.. => Some("Monthly Master! 30 days strong!"),
        14.. => Some("Fortnight Champion! 14 days!"),
        7.. => Some("Weekly Warrior! 7 days in a row!"),
        3.. => Some("Hot Streak! 3 days running!"),
        _ => None,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_played_date: Option<NaiveDate>,
    pub completed_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_score: Option<u32>,
    #[serde(default)]
    pub today_completed: bool,
}

impl Record for DailyStreakRecord {
    const KEY: &'static str = "daily_streak";
    const VERSION: u32 = 1;

    /// The browser build used `""` for "never played".
    fn migrate(from: u32, mut data: Value) -> Option<Value> {
        if from != 0 {
            return None;
        }
        if let Some(map) = data.as_object_mut()
            && map.get("lastPlayedDate").and_then(Value::as_str) == Some("")
        {
            map.insert("lastPlayedDate".to_string(), Value::Null);
        }
        Some(data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub completed: bool,
    pub is_today: bool,
}

pub struct DailyChallengeScheduler {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl DailyChallengeScheduler {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn today_key(&self) -> String {
        date_key(self.clock.today())
    }

    pub fn daily_questions<P>(&self, pool: &P) -> Vec<Question>
    where
        P: ContentPool + ?Sized,
    {
        daily_questions_for(self.clock.today(), pool)
    }

    /// The stored streak as it stands today.
    ///
    /// A gap of more than one day reports `current_streak = 0` here, but the
    /// stored record keeps its old value until the next completion.
    pub fn streak_view(&self) -> DailyStreakRecord {
        let data: DailyStreakRecord = self.storage.get();
        let today = self.clock.today();

        if let Some(last) = data.last_played_date
            && last != today
            && (today - last).num_days() > 1
        {
            return DailyStreakRecord {
                current_streak: 0,
                today_completed: false,
                today_score: None,
                ..data
            };
        }

        let done = data.completed_dates.contains(&today);
        DailyStreakRecord {
            today_completed: done,
            today_score: if done { data.today_score } else { None },
            ..data
        }
    }

    /// Credit today's challenge. A second call on the same date returns the
    /// record untouched.
    pub fn complete_today(&self, score: u32) -> DailyStreakRecord {
        let today = self.clock.today();
        let current = self.streak_view();

        if current.completed_dates.contains(&today) {
            debug!("Daily challenge for {} already completed", today);
            return current;
        }

        let yesterday = today - Duration::days(1);
        let continuing = current
            .last_played_date
            .is_some_and(|last| last == yesterday || last == today);
        let new_streak = if continuing {
            current.current_streak + 1
        } else {
            1
        };

        let mut completed_dates = current.completed_dates;
        completed_dates.push(today);
        if completed_dates.len() > COMPLETED_DATES_WINDOW {
            let excess = completed_dates.len() - COMPLETED_DATES_WINDOW;
            completed_dates.drain(..excess);
        }

        let updated = DailyStreakRecord {
            current_streak: new_streak,
            longest_streak: current.longest_streak.max(new_streak),
            last_played_date: Some(today),
            completed_dates,
            today_score: Some(score),
            today_completed: true,
        };
        self.storage.set(&updated);
        info!(
            "Daily challenge {} completed with score {} (streak {})",
            today, score, new_streak
        );
        updated
    }

    /// The last `days` dates, oldest first, with completion flags.
    pub fn calendar(&self, days: usize) -> Vec<CalendarDay> {
        let today = self.clock.today();
        let record = self.streak_view();
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset as i64);
                CalendarDay {
                    date,
                    completed: record.completed_dates.contains(&date),
                    is_today: date == today,
                }
            })
            .collect()
    }
}
