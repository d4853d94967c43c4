//! Declarative unlock conditions.
//!
//! A rule is a pure predicate over a stats snapshot. Some can stop holding
//! (the daily streak drops back), which is why unlocks are persisted
//! separately and never re-evaluated.

use crate::models::PlayerStats;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    TotalQuestionsAnswered,
    CorrectAnswers,
    LongestStreak,
    GamesPlayed,
    DailyStreak,
    PerfectRounds,
    TotalTimePlayed,
    FastestCorrectMs,
}

impl StatField {
    pub fn read(self, stats: &PlayerStats) -> u64 {
        match self {
            Self::TotalQuestionsAnswered => stats.total_questions_answered,
            Self::CorrectAnswers => stats.correct_answers,
            Self::LongestStreak => u64::from(stats.longest_streak),
            Self::GamesPlayed => u64::from(stats.games_played),
            Self::DailyStreak => u64::from(stats.daily_streak),
            Self::PerfectRounds => u64::from(stats.perfect_rounds),
            Self::TotalTimePlayed => stats.total_time_played,
            Self::FastestCorrectMs => stats.fastest_correct_ms,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// `field >= value`
    AtLeast { field: StatField, value: u64 },
    /// `0 < field < value`; zero means "not recorded yet".
    Under { field: StatField, value: u64 },
    /// Named per-mode counter `>= value`.
    Counter { name: String, value: u64 },
    /// At least `min_total` answers in `subject` with accuracy `>= min_ratio`.
    SubjectRatio {
        subject: String,
        min_total: u64,
        min_ratio: f64,
    },
    All { rules: Vec<Rule> },
    Any { rules: Vec<Rule> },
}

/// How far a player is towards a threshold rule.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub target: u64,
}

impl Rule {
    pub fn at_least(field: StatField, value: u64) -> Self {
        Self::AtLeast { field, value }
    }

    pub fn under(field: StatField, value: u64) -> Self {
        Self::Under { field, value }
    }

    pub fn counter(name: &str, value: u64) -> Self {
        Self::Counter {
            name: name.to_string(),
            value,
        }
    }

    pub fn subject_ratio(subject: &str, min_total: u64, min_ratio: f64) -> Self {
        Self::SubjectRatio {
            subject: subject.to_string(),
            min_total,
            min_ratio,
        }
    }

    pub fn evaluate(&self, stats: &PlayerStats) -> bool {
        match self {
            Self::AtLeast { field, value } => field.read(stats) >= *value,
            Self::Under { field, value } => {
                let current = field.read(stats);
                current > 0 && current < *value
            }
            Self::Counter { name, value } => stats.counter(name) >= *value,
            Self::SubjectRatio {
                subject,
                min_total,
                min_ratio,
            } => {
                let tally = stats.subject(subject);
                tally.total >= *min_total && tally.total > 0 && tally.ratio() >= *min_ratio
            }
            Self::All { rules } => rules.iter().all(|rule| rule.evaluate(stats)),
            Self::Any { rules } => rules.iter().any(|rule| rule.evaluate(stats)),
        }
    }

    /// Progress towards count-style rules; `None` for anything else.
    pub fn progress(&self, stats: &PlayerStats) -> Option<Progress> {
        let (current, target) = match self {
            Self::AtLeast { field, value } => (field.read(stats), *value),
            Self::Counter { name, value } => (stats.counter(name), *value),
            _ => return None,
        };
        Some(Progress {
            current: current.min(target),
            target,
        })
    }
}
