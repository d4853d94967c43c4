//! The standard flows a game mode runs after something happens.
//!
//! Each flow performs its stat update first and then runs the achievement
//! check against the returned snapshot, so callers never see an unlock lag
//! one event behind.

use crate::achievements::AchievementEngine;
use crate::analytics::{Analytics, GameReport, GameResult};
use crate::clock::{Clock, SystemClock};
use crate::cross_game::{CrossGameTracker, VarietyOutcome};
use crate::daily::{DailyChallengeScheduler, DailyStreakRecord, MILESTONE_STREAKS, milestone_message};
use crate::journal::{MissReport, WrongAnswerEntry, WrongAnswerJournal};
use crate::level::ProfileStore;
use crate::models::{PlayerStats, Question};
use crate::stats::PlayerStatsStore;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub stats: PlayerStats,
    /// The journal entry written for a wrong answer.
    pub missed: Option<WrongAnswerEntry>,
    pub unlocked: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub result: GameResult,
    pub stats: PlayerStats,
    pub variety: VarietyOutcome,
    pub unlocked: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub streak: DailyStreakRecord,
    /// False when today had already been credited.
    pub newly_completed: bool,
    pub milestone: Option<&'static str>,
    pub unlocked: Vec<&'static str>,
}

#[derive(Clone)]
pub struct ProgressEngine {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl ProgressEngine {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn with_system_clock(storage: Storage) -> Self {
        Self::new(storage, Arc::new(SystemClock))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn stats(&self) -> PlayerStatsStore {
        PlayerStatsStore::new(self.storage.clone())
    }

    pub fn achievements(&self) -> AchievementEngine {
        AchievementEngine::new(self.storage.clone(), self.clock.clone())
    }

    pub fn journal(&self) -> WrongAnswerJournal {
        WrongAnswerJournal::new(self.storage.clone(), self.clock.clone())
    }

    pub fn daily(&self) -> DailyChallengeScheduler {
        DailyChallengeScheduler::new(self.storage.clone(), self.clock.clone())
    }

    pub fn profile(&self) -> ProfileStore {
        ProfileStore::new(self.storage.clone(), self.clock.clone())
    }

    pub fn analytics(&self) -> Analytics {
        Analytics::new(self.storage.clone(), self.clock.clone())
    }

    pub fn cross_game(&self) -> CrossGameTracker {
        CrossGameTracker::new(self.storage.clone(), self.clock.clone())
    }

    /// Grade one answer. A wrong answer lands in the journal.
    pub fn answer(&self, question: &Question, choice: usize, elapsed_ms: Option<u64>) -> AnswerOutcome {
        let correct = question.is_correct(choice);
        let stats = self
            .stats()
            .update(|s| s.with_answer(&question.subject, correct, elapsed_ms));

        let missed = (!correct).then(|| {
            self.journal().record_miss(MissReport {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                subject: question.subject.clone(),
                user_answer_text: question.options.get(choice).cloned().unwrap_or_default(),
                correct_answer_text: question.correct_option().to_string(),
                explanation: question.explanation.clone(),
                deep_explanation: None,
            })
        });

        let unlocked = self.achievements().check(Some(&stats));
        AnswerOutcome {
            correct,
            stats,
            missed,
            unlocked,
        }
    }

    /// Record a finished game in history, stats and the variety streak.
    pub fn finish_game(&self, report: GameReport) -> GameOutcome {
        let result = self.analytics().record_game_result(report);
        let stats = self
            .stats()
            .update(|s| s.with_game_played(result.time_spent_ms, result.is_perfect()));
        let variety = self.cross_game().record_game_played(&result.game_type);
        self.profile().update_inferred_level(&stats);

        let unlocked = self.achievements().check(Some(&stats));
        GameOutcome {
            result,
            stats,
            variety,
            unlocked,
        }
    }

    /// Credit today's daily challenge and mirror the streak into the stats.
    pub fn complete_daily(&self, score: u32) -> DailyOutcome {
        let daily = self.daily();
        let newly_completed = !daily.streak_view().today_completed;
        let streak = daily.complete_today(score);

        if !newly_completed {
            debug!("Daily challenge already credited today");
            return DailyOutcome {
                streak,
                newly_completed,
                milestone: None,
                unlocked: Vec::new(),
            };
        }

        let current = streak.current_streak;
        let stats = self.stats().update(|mut s| {
            s.games_played += 1;
            s.daily_streak = current;
            s
        });
        let milestone = MILESTONE_STREAKS
            .contains(&current)
            .then(|| milestone_message(current))
            .flatten();

        let unlocked = self.achievements().check(Some(&stats));
        DailyOutcome {
            streak,
            newly_completed,
            milestone,
            unlocked,
        }
    }

    /// Add to a per-mode counter and check for unlocks.
    pub fn add_to_counter(&self, name: &str, delta: u64) -> Vec<&'static str> {
        let stats = self.stats().update(|s| s.with_counter(name, delta));
        self.achievements().check(Some(&stats))
    }

    /// Raise a personal-best counter and check for unlocks.
    pub fn record_best(&self, name: &str, value: u64) -> Vec<&'static str> {
        let stats = self.stats().update(|s| s.with_counter_max(name, value));
        self.achievements().check(Some(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::counters;
    use crate::clock::FixedClock;
    use crate::models::Difficulty;
    use chrono::NaiveDate;

    fn setup() -> (Arc<FixedClock>, ProgressEngine) {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()));
        (clock.clone(), ProgressEngine::new(Storage::in_memory(), clock))
    }

    fn question() -> Question {
        Question {
            id: "science-easy-1".to_string(),
            subject: "science".to_string(),
            difficulty: Difficulty::Easy,
            text: "What gas do plants absorb?".to_string(),
            options: vec!["Oxygen".into(), "Carbon dioxide".into(), "Helium".into()],
            correct_index: 1,
            explanation: Some("Photosynthesis uses CO2.".to_string()),
        }
    }

    #[test]
    fn test_wrong_answer_goes_to_journal() {
        let (_, engine) = setup();
        let outcome = engine.answer(&question(), 0, Some(4000));
        assert!(!outcome.correct);

        let entry = outcome.missed.unwrap();
        assert_eq!(entry.user_answer_text, "Oxygen");
        assert_eq!(entry.correct_answer_text, "Carbon dioxide");
        assert_eq!(engine.journal().active_count(), 1);
        assert_eq!(outcome.stats.current_streak, 0);
    }

    #[test]
    fn test_fast_correct_answers_unlock_speed_badges() {
        let (_, engine) = setup();
        let outcome = engine.answer(&question(), 1, Some(800));
        assert!(outcome.correct);
        assert!(outcome.missed.is_none());
        assert_eq!(outcome.unlocked, vec!["speed_demon", "lightning"]);

        for _ in 0..2 {
            engine.answer(&question(), 1, None);
        }
        assert!(engine.achievements().is_unlocked("streak_3"));
    }

    #[test]
    fn test_finish_game_updates_everything() {
        let (_, engine) = setup();
        let outcome = engine.finish_game(GameReport {
            game_type: "quiz".to_string(),
            score: 100,
            questions_answered: 10,
            correct_answers: 10,
            time_spent_ms: 120_000,
            subjects: vec!["arts".to_string()],
        });

        assert_eq!(outcome.stats.games_played, 1);
        assert_eq!(outcome.stats.perfect_rounds, 1);
        assert_eq!(outcome.stats.total_time_played, 120_000);
        assert_eq!(outcome.unlocked, vec!["first_game", "perfect_10"]);
        assert_eq!(engine.analytics().data().game_history.len(), 1);
        assert_eq!(engine.cross_game().today_variety_count(), 1);
        assert!(engine.profile().load().last_inferred_at.is_some());
    }

    #[test]
    fn test_complete_daily_mirrors_streak_once() {
        let (clock, engine) = setup();
        for _ in 0..3 {
            let outcome = engine.complete_daily(80);
            assert!(outcome.newly_completed);
            clock.advance_days(1);
        }
        let stats = engine.stats().load();
        assert_eq!(stats.daily_streak, 3);
        assert_eq!(stats.games_played, 3);
        assert!(engine.achievements().is_unlocked("daily_3"));

        clock.advance_days(-1);
        let repeat = engine.complete_daily(10);
        assert!(!repeat.newly_completed);
        assert!(repeat.unlocked.is_empty());
        assert_eq!(engine.stats().load().games_played, 3);
    }

    #[test]
    fn test_daily_milestone_message() {
        let (clock, engine) = setup();
        engine.complete_daily(50);
        clock.advance_days(1);
        assert_eq!(engine.complete_daily(50).milestone, None);
        clock.advance_days(1);
        let outcome = engine.complete_daily(50);
        assert_eq!(outcome.milestone, Some("Hot Streak! 3 days running!"));
        assert_eq!(outcome.unlocked, vec!["daily_3"]);
    }

    #[test]
    fn test_counters_unlock_mode_badges() {
        let (_, engine) = setup();
        assert_eq!(engine.record_best(counters::SPRINT_BEST_DISTANCE, 120), vec!["sprint_100"]);
        assert!(engine.record_best(counters::SPRINT_BEST_DISTANCE, 90).is_empty());
        assert_eq!(engine.stats().load().counter(counters::SPRINT_BEST_DISTANCE), 120);

        engine.add_to_counter(counters::TREASURE_STARS, 29);
        assert_eq!(engine.add_to_counter(counters::TREASURE_STARS, 1), vec!["treasure_30_stars"]);
    }
}
