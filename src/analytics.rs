//! Per-game history and the aggregates derived from it.

use crate::clock::Clock;
use crate::storage::{Record, Storage};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How many games feed the accuracy trend line.
pub const ACCURACY_TREND_LEN: usize = 20;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub game_type: String,
    pub score: u64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub time_spent_ms: u64,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl GameResult {
    /// Every question answered correctly across at least ten of them.
    pub fn is_perfect(&self) -> bool {
        self.questions_answered >= 10 && self.correct_answers == self.questions_answered
    }
}

/// A finished game as reported by a game mode; the timestamp is stamped on
/// recording.
#[derive(Debug, Clone, Default)]
pub struct GameReport {
    pub game_type: String,
    pub score: u64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub time_spent_ms: u64,
    pub subjects: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsData {
    pub game_history: Vec<GameResult>,
    pub total_time_played: u64,
    pub favorite_game: Option<String>,
    /// Rounded accuracy percent of the most recent games that had questions.
    pub accuracy_trend: Vec<u32>,
}

impl Record for AnalyticsData {
    const KEY: &'static str = "analytics";
    const VERSION: u32 = 1;
}

impl AnalyticsData {
    fn with_result(mut self, result: GameResult) -> Self {
        self.game_history.push(result);
        self.total_time_played = self.game_history.iter().map(|g| g.time_spent_ms).sum();
        self.favorite_game = favorite_game(&self.game_history);
        self.accuracy_trend = accuracy_trend(&self.game_history);
        self
    }
}

/// Most played game type. Ties go to the type that was played first.
fn favorite_game(history: &[GameResult]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for game in history {
        match counts.iter_mut().find(|(name, _)| *name == game.game_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((&game.game_type, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn accuracy_trend(history: &[GameResult]) -> Vec<u32> {
    let with_questions: Vec<&GameResult> = history
        .iter()
        .filter(|g| g.questions_answered > 0)
        .collect();
    let skip = with_questions.len().saturating_sub(ACCURACY_TREND_LEN);
    with_questions[skip..]
        .iter()
        .map(|g| {
            (f64::from(g.correct_answers) / f64::from(g.questions_answered) * 100.0).round() as u32
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStudyTime {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklySummary {
    /// 1 is the oldest week shown.
    pub week_number: usize,
    pub games: u32,
    pub questions: u64,
    pub correct: u64,
}

pub struct Analytics {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl Analytics {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn data(&self) -> AnalyticsData {
        self.storage.get()
    }

    pub fn record_game_result(&self, report: GameReport) -> GameResult {
        let result = GameResult {
            game_type: report.game_type,
            score: report.score,
            questions_answered: report.questions_answered,
            correct_answers: report.correct_answers.min(report.questions_answered),
            time_spent_ms: report.time_spent_ms,
            subjects: report.subjects,
            timestamp: self.clock.now(),
        };
        debug!(
            "Recording {} result: {}/{} in {}ms",
            result.game_type, result.correct_answers, result.questions_answered, result.time_spent_ms
        );
        let stored = result.clone();
        self.storage
            .update(|data: AnalyticsData| data.with_result(stored));
        result
    }

    /// Newest first.
    pub fn game_history(&self, limit: Option<usize>) -> Vec<GameResult> {
        let mut history = self.data().game_history;
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            history.truncate(limit);
        }
        history
    }

    /// Minutes played on each of the last `days` dates, oldest first.
    pub fn study_time_by_day(&self, days: usize) -> Vec<DayStudyTime> {
        let history = self.data().game_history;
        let today = self.clock.today();
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset as i64);
                let ms: u64 = history
                    .iter()
                    .filter(|g| g.timestamp.date_naive() == date)
                    .map(|g| g.time_spent_ms)
                    .sum();
                DayStudyTime {
                    date,
                    minutes: (ms as f64 / 60_000.0).round() as u64,
                }
            })
            .collect()
    }

    /// Totals for the last `weeks` trailing seven-day windows, oldest first.
    pub fn weekly_summary(&self, weeks: usize) -> Vec<WeeklySummary> {
        let history = self.data().game_history;
        let now = self.clock.now();

        (0..weeks)
            .map(|week| {
                let week_end = now - Duration::weeks((weeks - week - 1) as i64);
                let week_start = week_end - Duration::weeks(1);
                history
                    .iter()
                    .filter(|g| g.timestamp > week_start && g.timestamp <= week_end)
                    .fold(
                        WeeklySummary {
                            week_number: week + 1,
                            ..WeeklySummary::default()
                        },
                        |mut summary, g| {
                            summary.games += 1;
                            summary.questions += u64::from(g.questions_answered);
                            summary.correct += u64::from(g.correct_answers);
                            summary
                        },
                    )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn setup() -> (Arc<FixedClock>, Analytics) {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()));
        (clock.clone(), Analytics::new(Storage::in_memory(), clock))
    }

    fn report(game: &str, answered: u32, correct: u32, ms: u64) -> GameReport {
        GameReport {
            game_type: game.to_string(),
            score: u64::from(correct) * 10,
            questions_answered: answered,
            correct_answers: correct,
            time_spent_ms: ms,
            subjects: vec!["science".to_string()],
        }
    }

    #[test]
    fn test_derived_fields_follow_history() {
        let (_, analytics) = setup();
        analytics.record_game_result(report("quiz", 10, 7, 60_000));
        analytics.record_game_result(report("sprint", 0, 0, 30_000));
        analytics.record_game_result(report("sprint", 4, 1, 30_000));

        let data = analytics.data();
        assert_eq!(data.game_history.len(), 3);
        assert_eq!(data.total_time_played, 120_000);
        assert_eq!(data.favorite_game.as_deref(), Some("sprint"));
        assert_eq!(data.accuracy_trend, vec![70, 25]);
    }

    #[test]
    fn test_favorite_game_tie_goes_to_first_played() {
        let (_, analytics) = setup();
        analytics.record_game_result(report("mosaic", 1, 1, 1000));
        analytics.record_game_result(report("arena", 1, 1, 1000));
        assert_eq!(analytics.data().favorite_game.as_deref(), Some("mosaic"));
    }

    #[test]
    fn test_accuracy_trend_keeps_last_twenty() {
        let (_, analytics) = setup();
        for i in 0..25 {
            analytics.record_game_result(report("quiz", 4, i % 5, 1000));
        }
        let trend = analytics.data().accuracy_trend;
        assert_eq!(trend.len(), ACCURACY_TREND_LEN);
        assert_eq!(trend[0], 0);
        assert_eq!(trend[19], 100);
    }

    #[test]
    fn test_history_is_newest_first() {
        let (clock, analytics) = setup();
        analytics.record_game_result(report("first", 1, 1, 1000));
        clock.advance_days(1);
        analytics.record_game_result(report("second", 1, 1, 1000));

        let history = analytics.game_history(None);
        assert_eq!(history[0].game_type, "second");
        assert_eq!(analytics.game_history(Some(1)).len(), 1);
    }

    #[test]
    fn test_study_time_by_day() {
        let (clock, analytics) = setup();
        analytics.record_game_result(report("quiz", 5, 5, 90_000));
        clock.advance_days(2);
        analytics.record_game_result(report("quiz", 5, 5, 300_000));
        analytics.record_game_result(report("quiz", 5, 5, 60_000));

        let days = analytics.study_time_by_day(3);
        let minutes: Vec<u64> = days.iter().map(|d| d.minutes).collect();
        assert_eq!(minutes, vec![2, 0, 6]);
        assert_eq!(days[2].date, NaiveDate::from_ymd_opt(2025, 6, 12).unwrap());
    }

    #[test]
    fn test_weekly_summary_windows() {
        let (clock, analytics) = setup();
        analytics.record_game_result(report("quiz", 10, 8, 1000));
        clock.advance_days(8);
        analytics.record_game_result(report("quiz", 5, 2, 1000));
        analytics.record_game_result(report("sprint", 5, 5, 1000));

        let weeks = analytics.weekly_summary(3);
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].games, 0);
        assert_eq!((weeks[1].games, weeks[1].questions, weeks[1].correct), (1, 10, 8));
        assert_eq!((weeks[2].games, weeks[2].correct), (2, 7));
        assert_eq!(weeks[2].week_number, 3);
    }

    #[test]
    fn test_perfect_game() {
        let (_, analytics) = setup();
        assert!(analytics.record_game_result(report("quiz", 10, 10, 1)).is_perfect());
        assert!(!analytics.record_game_result(report("quiz", 5, 5, 1)).is_perfect());
        assert!(!analytics.record_game_result(report("quiz", 12, 11, 1)).is_perfect());
    }
}
