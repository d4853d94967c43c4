//! The single aggregate statistics record and its sanctioned mutation path.

use crate::achievements::counters;
use crate::models::{PlayerStats, SubjectTally};
use crate::storage::{Record, Storage};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Subjects need this many answers before they count as strongest/weakest.
const MIN_ANSWERS_FOR_RANKING: u64 = 5;

/// Top-level numeric fields the browser build kept for each game mode.
const LEGACY_COUNTERS: [(&str, &str); 13] = [
    ("connectionPuzzlesSolved", counters::CONNECTION_PUZZLES_SOLVED),
    ("connectionPerfects", counters::CONNECTION_PERFECTS),
    ("connectionDailyCount", counters::CONNECTION_DAILY_COUNT),
    ("sprintBestDistance", counters::SPRINT_BEST_DISTANCE),
    ("sprintMaxMultiplier", counters::SPRINT_MAX_MULTIPLIER),
    ("mosaicPerfects", counters::MOSAIC_PERFECTS),
    ("mosaicBestCombo", counters::MOSAIC_BEST_COMBO),
    ("arenaWins", counters::ARENA_WINS),
    ("arenaRoundsWon", counters::ARENA_ROUNDS_WON),
    ("arenaRebuttalWins", counters::ARENA_REBUTTAL_WINS),
    ("treasureStars", counters::TREASURE_STARS),
    ("treasureRegionsComplete", counters::TREASURE_REGIONS_COMPLETE),
    ("treasureBridgesComplete", counters::TREASURE_BRIDGES_COMPLETE),
];

impl Record for PlayerStats {
    const KEY: &'static str = "player_stats";
    const VERSION: u32 = 1;

    /// Version 0 kept game-mode progress as top-level fields; fold them into
    /// `counters`.
    fn migrate(from: u32, data: Value) -> Option<Value> {
        if from != 0 {
            return None;
        }
        let Value::Object(mut map) = data else {
            return None;
        };
        let mut folded = match map.remove("counters") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        let mut fold = |name: &str, value: u64| {
            folded.entry(name).or_insert(Value::from(value));
        };

        for (legacy, name) in LEGACY_COUNTERS {
            if let Some(value) = map.remove(legacy).as_ref().and_then(legacy_number) {
                fold(name, value);
            }
        }
        if let Some(used) = map.remove("sprintPowerUpsUsed") {
            fold(counters::SPRINT_POWER_UPS_USED, collection_len(&used));
        }
        if let Some(grids) = map.remove("mosaicGridsCompleted") {
            fold(counters::MOSAIC_GRIDS_COMPLETED, collection_len(&grids));
            let has_6x6 = grids
                .as_array()
                .is_some_and(|grids| grids.iter().any(|grid| grid.as_str() == Some("6x6")));
            if has_6x6 {
                fold(counters::MOSAIC_6X6_COMPLETED, 1);
            }
        }
        if let Some(beaten) = map.remove("arenaDevilBeaten") {
            fold(counters::ARENA_DEVIL_BEATEN, u64::from(beaten.as_bool() == Some(true)));
        }

        map.insert("counters".to_string(), Value::Object(folded));
        Some(Value::Object(map))
    }
}

/// Browser numbers may arrive as floats.
fn legacy_number(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
}

/// A `Set` stringified by the browser becomes an empty object.
fn collection_len(value: &Value) -> u64 {
    match value {
        Value::Array(items) => items.len() as u64,
        Value::Object(items) => items.len() as u64,
        _ => 0,
    }
}

pub struct PlayerStatsStore {
    storage: Storage,
}

impl PlayerStatsStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The persisted record, or all zeros when nothing usable is stored.
    pub fn load(&self) -> PlayerStats {
        self.storage.get()
    }

    /// Apply `transform` to the current record, persist and return the result.
    ///
    /// This is a plain read-modify-write. Two overlapping calls (say, two game
    /// events handled back to back from stale snapshots) race and the later
    /// write replaces the whole record, dropping the earlier increment.
    pub fn update(&self, transform: impl FnOnce(PlayerStats) -> PlayerStats) -> PlayerStats {
        self.storage.update(|current: PlayerStats| {
            let previous_longest = current.longest_streak;
            let next = transform(current);
            normalize(next, previous_longest)
        })
    }
}

fn normalize(mut next: PlayerStats, previous_longest: u32) -> PlayerStats {
    let longest = next
        .longest_streak
        .max(previous_longest)
        .max(next.current_streak);
    if longest != next.longest_streak {
        debug!(
            "Raising longest streak from {} to {}",
            next.longest_streak, longest
        );
        next.longest_streak = longest;
    }
    if next.correct_answers > next.total_questions_answered {
        debug!(
            "Clamping correct answers {} to total {}",
            next.correct_answers, next.total_questions_answered
        );
        next.correct_answers = next.total_questions_answered;
    }
    next
}

impl PlayerStats {
    /// Count one answered question.
    ///
    /// `elapsed_ms` only feeds the fastest-answer record when the answer was
    /// correct and actually timed.
    pub fn with_answer(mut self, subject: &str, correct: bool, elapsed_ms: Option<u64>) -> Self {
        self.total_questions_answered += 1;
        let tally = self.subject_accuracy.entry(subject.to_string()).or_default();
        tally.total += 1;

        if correct {
            self.correct_answers += 1;
            tally.correct += 1;
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);

            if let Some(ms) = elapsed_ms.filter(|ms| *ms > 0)
                && (self.fastest_correct_ms == 0 || ms < self.fastest_correct_ms)
            {
                self.fastest_correct_ms = ms;
            }
        } else {
            // Streak resets; longest_streak keeps the record
            self.current_streak = 0;
        }
        self
    }

    pub fn with_game_played(mut self, time_spent_ms: u64, perfect: bool) -> Self {
        self.games_played += 1;
        self.total_time_played += time_spent_ms;
        if perfect {
            self.perfect_rounds += 1;
        }
        self
    }

    pub fn with_counter(mut self, name: &str, delta: u64) -> Self {
        *self.counters.entry(name.to_string()).or_default() += delta;
        self
    }

    /// Keep the best value seen for a "personal best" style counter.
    pub fn with_counter_max(mut self, name: &str, value: u64) -> Self {
        let entry = self.counters.entry(name.to_string()).or_default();
        *entry = (*entry).max(value);
        self
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn subject(&self, subject: &str) -> SubjectTally {
        self.subject_accuracy.get(subject).copied().unwrap_or_default()
    }

    pub fn accuracy(&self) -> f64 {
        SubjectTally {
            correct: self.correct_answers,
            total: self.total_questions_answered,
        }
        .ratio()
    }

    /// Rounded accuracy percentage per subject.
    pub fn accuracy_by_subject(&self) -> BTreeMap<String, u32> {
        self.subject_accuracy
            .iter()
            .map(|(subject, tally)| (subject.clone(), tally.percent()))
            .collect()
    }

    pub fn strongest_subject(&self) -> Option<&str> {
        self.ranked_subjects()
            .fold(None, |best: Option<(&str, u32)>, (subject, pct)| match best {
                Some((_, best_pct)) if best_pct >= pct => best,
                _ => Some((subject, pct)),
            })
            .map(|(subject, _)| subject)
    }

    pub fn weakest_subject(&self) -> Option<&str> {
        self.ranked_subjects()
            .fold(None, |worst: Option<(&str, u32)>, (subject, pct)| match worst {
                Some((_, worst_pct)) if worst_pct <= pct => worst,
                _ => Some((subject, pct)),
            })
            .map(|(subject, _)| subject)
    }

    fn ranked_subjects(&self) -> impl Iterator<Item = (&str, u32)> {
        self.subject_accuracy
            .iter()
            .filter(|(_, tally)| tally.total >= MIN_ANSWERS_FOR_RANKING)
            .map(|(subject, tally)| (subject.as_str(), tally.percent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> PlayerStatsStore {
        PlayerStatsStore::new(Storage::in_memory())
    }

    #[test]
    fn test_load_defaults_to_zero() {
        let stats = store().load();
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn test_update_persists_and_returns_next() {
        let store = store();
        let next = store.update(|s| s.with_answer("science", true, Some(1500)));
        assert_eq!(next.total_questions_answered, 1);
        assert_eq!(next.fastest_correct_ms, 1500);
        assert_eq!(store.load(), next);
    }

    #[test]
    fn test_streak_resets_but_longest_is_kept() {
        let store = store();
        for _ in 0..5 {
            store.update(|s| s.with_answer("arts", true, None));
        }
        let stats = store.update(|s| s.with_answer("arts", false, None));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 5);
        assert_eq!(stats.subject("arts"), SubjectTally { correct: 5, total: 6 });
    }

    #[test]
    fn test_longest_streak_never_decreases() {
        let store = store();
        store.update(|mut s| {
            s.current_streak = 8;
            s.longest_streak = 8;
            s
        });

        // A careless transform that forgets the record
        let stats = store.update(|mut s| {
            s.current_streak = 2;
            s.longest_streak = 0;
            s
        });
        assert_eq!(stats.longest_streak, 8);

        let stats = store.update(|mut s| {
            s.current_streak = 11;
            s
        });
        assert_eq!(stats.longest_streak, 11);
    }

    #[test]
    fn test_correct_answers_clamped_to_total() {
        let stats = store().update(|mut s| {
            s.total_questions_answered = 3;
            s.correct_answers = 5;
            s
        });
        assert_eq!(stats.correct_answers, 3);
    }

    #[test]
    fn test_fastest_correct_only_improves() {
        let stats = PlayerStats::default()
            .with_answer("science", true, Some(900))
            .with_answer("science", true, Some(2500))
            .with_answer("science", false, Some(100));
        assert_eq!(stats.fastest_correct_ms, 900);
    }

    #[test]
    fn test_counters() {
        let stats = PlayerStats::default()
            .with_counter("treasure_stars", 3)
            .with_counter("treasure_stars", 2)
            .with_counter_max("sprint_best_distance", 400)
            .with_counter_max("sprint_best_distance", 250);
        assert_eq!(stats.counter("treasure_stars"), 5);
        assert_eq!(stats.counter("sprint_best_distance"), 400);
        assert_eq!(stats.counter("missing"), 0);
    }

    #[test]
    fn test_strongest_and_weakest_subject() {
        let mut stats = PlayerStats::default();
        stats.subject_accuracy.insert("science".into(), SubjectTally { correct: 9, total: 10 });
        stats.subject_accuracy.insert("arts".into(), SubjectTally { correct: 2, total: 10 });
        stats.subject_accuracy.insert("literature".into(), SubjectTally { correct: 1, total: 1 });

        assert_eq!(stats.strongest_subject(), Some("science"));
        assert_eq!(stats.weakest_subject(), Some("arts"));
        assert_eq!(stats.accuracy_by_subject()["literature"], 100);
    }

    #[test]
    fn test_no_ranking_without_enough_answers() {
        let stats = PlayerStats::default().with_answer("arts", true, None);
        assert_eq!(stats.strongest_subject(), None);
        assert_eq!(stats.weakest_subject(), None);
    }

    #[test]
    fn test_legacy_record_moves_game_fields_into_counters() {
        let legacy = r#"{
            "totalQuestionsAnswered": 40, "correctAnswers": 30, "gamesPlayed": 2,
            "connectionPuzzlesSolved": 5, "treasureStars": 12, "arenaWins": 3,
            "sprintPowerUpsUsed": ["shield", "boost"],
            "mosaicGridsCompleted": ["4x4", "6x6"],
            "arenaDevilBeaten": true
        }"#;
        let store = PlayerStatsStore::new(Storage::new(
            MemoryStorage::default().with_raw("player_stats", legacy),
        ));

        let stats = store.load();
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.correct_answers, 30);
        assert_eq!(stats.counter(counters::CONNECTION_PUZZLES_SOLVED), 5);
        assert_eq!(stats.counter(counters::TREASURE_STARS), 12);
        assert_eq!(stats.counter(counters::ARENA_WINS), 3);
        assert_eq!(stats.counter(counters::SPRINT_POWER_UPS_USED), 2);
        assert_eq!(stats.counter(counters::MOSAIC_GRIDS_COMPLETED), 2);
        assert_eq!(stats.counter(counters::MOSAIC_6X6_COMPLETED), 1);
        assert_eq!(stats.counter(counters::ARENA_DEVIL_BEATEN), 1);
        assert_eq!(stats.counter(counters::TREASURE_BRIDGES_COMPLETE), 0);
    }

    #[test]
    fn test_legacy_defaults_leave_flags_at_zero() {
        let legacy = r#"{"gamesPlayed": 1, "sprintPowerUpsUsed": {}, "mosaicGridsCompleted": ["4x4"], "arenaDevilBeaten": false}"#;
        let store = PlayerStatsStore::new(Storage::new(
            MemoryStorage::default().with_raw("player_stats", legacy),
        ));

        let stats = store.load();
        assert_eq!(stats.counter(counters::SPRINT_POWER_UPS_USED), 0);
        assert_eq!(stats.counter(counters::MOSAIC_GRIDS_COMPLETED), 1);
        assert_eq!(stats.counter(counters::MOSAIC_6X6_COMPLETED), 0);
        assert_eq!(stats.counter(counters::ARENA_DEVIL_BEATEN), 0);
    }
}
