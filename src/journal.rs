//! Wrong-answer journal with a stepped spaced-repetition schedule.
//!
//! Entries are keyed by question id. A miss schedules a review one day out;
//! each explicit review pushes the next one further along `[1, 3, 7, 14]`
//! days. Missing the same question again restarts the schedule.

use crate::clock::Clock;
use crate::storage::{Record, Storage};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Days until the next review, indexed by review count and capped at the last step.
pub const REVIEW_INTERVALS: [i64; 4] = [1, 3, 7, 14];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WrongAnswerEntry {
    pub question_id: String,
    pub question_text: String,
    pub subject: String,
    pub user_answer_text: String,
    pub correct_answer_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_explanation: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub review_count: u32,
    pub next_review_at: DateTime<Utc>,
    pub learned: bool,
}

impl Record for Vec<WrongAnswerEntry> {
    const KEY: &'static str = "wrong_answers";
    const VERSION: u32 = 1;

    /// The browser build stored `question`, `userAnswer`, `correctAnswer`
    /// and `nextReview`.
    fn migrate(from: u32, data: Value) -> Option<Value> {
        if from != 0 {
            return None;
        }
        let Value::Array(entries) = data else {
            return None;
        };
        let renamed = entries
            .into_iter()
            .map(|entry| match entry {
                Value::Object(mut map) => {
                    for (old, new) in [
                        ("question", "questionText"),
                        ("userAnswer", "userAnswerText"),
                        ("correctAnswer", "correctAnswerText"),
                        ("nextReview", "nextReviewAt"),
                        ("deep_explanation", "deepExplanation"),
                    ] {
                        if let Some(value) = map.remove(old) {
                            map.entry(new).or_insert(value);
                        }
                    }
                    Value::Object(map)
                }
                other => other,
            })
            .collect();
        Some(Value::Array(renamed))
    }
}

/// What the caller knows about a missed question.
#[derive(Debug, Clone, Default)]
pub struct MissReport {
    pub question_id: String,
    pub question_text: String,
    pub subject: String,
    pub user_answer_text: String,
    pub correct_answer_text: String,
    pub explanation: Option<String>,
    pub deep_explanation: Option<String>,
}

fn interval_for(review_count: u32) -> Duration {
    let index = (review_count as usize).min(REVIEW_INTERVALS.len() - 1);
    Duration::days(REVIEW_INTERVALS[index])
}

pub struct WrongAnswerJournal {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl WrongAnswerJournal {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    fn all(&self) -> Vec<WrongAnswerEntry> {
        self.storage.get()
    }

    fn active(&self) -> impl Iterator<Item = WrongAnswerEntry> {
        self.all().into_iter().filter(|e| !e.learned)
    }

    pub fn get(&self, question_id: &str) -> Option<WrongAnswerEntry> {
        self.all().into_iter().find(|e| e.question_id == question_id)
    }

    /// Record a miss. A repeat miss on a tracked question is a relapse: the
    /// review count still goes up but the schedule restarts at one day and
    /// the entry leaves the learned state.
    pub fn record_miss(&self, report: MissReport) -> WrongAnswerEntry {
        let now = self.clock.now();
        let next_review_at = now + interval_for(0);
        let mut all = self.all();

        let entry = match all.iter_mut().find(|e| e.question_id == report.question_id) {
            Some(existing) => {
                existing.review_count += 1;
                existing.next_review_at = next_review_at;
                existing.learned = false;
                existing.timestamp = now;
                debug!(
                    "Relapse on {} (review count {})",
                    existing.question_id, existing.review_count
                );
                existing.clone()
            }
            None => {
                let entry = WrongAnswerEntry {
                    question_id: report.question_id,
                    question_text: report.question_text,
                    subject: report.subject,
                    user_answer_text: report.user_answer_text,
                    correct_answer_text: report.correct_answer_text,
                    explanation: report.explanation,
                    deep_explanation: report.deep_explanation,
                    timestamp: now,
                    review_count: 0,
                    next_review_at,
                    learned: false,
                };
                all.push(entry.clone());
                entry
            }
        };

        self.storage.set(&all);
        entry
    }

    /// Advance the schedule one step. Unknown ids are ignored.
    pub fn mark_reviewed(&self, question_id: &str) -> Option<WrongAnswerEntry> {
        let now = self.clock.now();
        self.modify(question_id, |entry| {
            entry.review_count += 1;
            entry.next_review_at = now + interval_for(entry.review_count);
        })
    }

    /// Retire an entry. It stays stored but leaves every active query.
    pub fn mark_learned(&self, question_id: &str) -> Option<WrongAnswerEntry> {
        self.modify(question_id, |entry| entry.learned = true)
    }

    fn modify(
        &self,
        question_id: &str,
        change: impl FnOnce(&mut WrongAnswerEntry),
    ) -> Option<WrongAnswerEntry> {
        let mut all = self.all();
        let Some(entry) = all.iter_mut().find(|e| e.question_id == question_id) else {
            debug!("Ignoring journal update for untracked question {}", question_id);
            return None;
        };
        change(entry);
        let updated = entry.clone();
        self.storage.set(&all);
        Some(updated)
    }

    /// Active entries whose review time has come, earliest due first.
    pub fn due_for_review(&self) -> Vec<WrongAnswerEntry> {
        let now = self.clock.now();
        let mut due: Vec<_> = self.active().filter(|e| e.next_review_at <= now).collect();
        due.sort_by(|a, b| a.next_review_at.cmp(&b.next_review_at));
        due
    }

    /// Active entries, most recent miss first.
    pub fn entries(&self, subject: Option<&str>, limit: Option<usize>) -> Vec<WrongAnswerEntry> {
        let mut entries: Vec<_> = self
            .active()
            .filter(|e| subject.is_none_or(|s| e.subject == s))
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn subject_breakdown(&self) -> BTreeMap<String, usize> {
        let mut breakdown = BTreeMap::new();
        for entry in self.active() {
            *breakdown.entry(entry.subject).or_insert(0) += 1;
        }
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn setup() -> (Arc<FixedClock>, WrongAnswerJournal) {
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        ));
        let journal = WrongAnswerJournal::new(Storage::in_memory(), clock.clone());
        (clock, journal)
    }

    fn miss(id: &str, subject: &str) -> MissReport {
        MissReport {
            question_id: id.to_string(),
            question_text: format!("Question {}", id),
            subject: subject.to_string(),
            user_answer_text: "wrong".to_string(),
            correct_answer_text: "right".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fresh_miss_is_due_in_one_day() {
        let (clock, journal) = setup();
        let entry = journal.record_miss(miss("q1", "science"));
        assert_eq!(entry.review_count, 0);
        assert_eq!(entry.next_review_at, clock.now() + Duration::days(1));
        assert!(journal.due_for_review().is_empty());

        clock.advance_days(1);
        assert_eq!(journal.due_for_review().len(), 1);
    }

    #[test]
    fn test_schedule_progression_plateaus() {
        let (clock, journal) = setup();
        journal.record_miss(miss("q1", "science"));
        let now = clock.now();

        let expected = [3, 7, 14, 14, 14];
        for days in expected {
            let entry = journal.mark_reviewed("q1").unwrap();
            assert_eq!(entry.next_review_at, now + Duration::days(days));
        }
        assert_eq!(journal.get("q1").unwrap().review_count, 5);
    }

    #[test]
    fn test_relapse_restarts_schedule() {
        let (clock, journal) = setup();
        journal.record_miss(miss("q1", "arts"));
        journal.mark_reviewed("q1");
        journal.mark_reviewed("q1");
        journal.mark_learned("q1");

        clock.advance_days(4);
        let entry = journal.record_miss(miss("q1", "arts"));
        assert_eq!(entry.review_count, 3);
        assert_eq!(entry.next_review_at, clock.now() + Duration::days(1));
        assert_eq!(entry.timestamp, clock.now());
        assert!(!entry.learned);
        assert_eq!(journal.active_count(), 1);
    }

    #[test]
    fn test_learned_entries_leave_active_pools() {
        let (clock, journal) = setup();
        journal.record_miss(miss("q1", "science"));
        journal.record_miss(miss("q2", "science"));
        journal.record_miss(miss("q3", "arts"));
        journal.mark_learned("q2");
        clock.advance_days(30);

        assert_eq!(journal.active_count(), 2);
        assert_eq!(journal.due_for_review().len(), 2);
        let breakdown = journal.subject_breakdown();
        assert_eq!(breakdown.get("science"), Some(&1));
        assert_eq!(breakdown.get("arts"), Some(&1));
        // The row itself is kept
        assert!(journal.get("q2").unwrap().learned);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let (_, journal) = setup();
        assert!(journal.mark_learned("ghost").is_none());
        assert!(journal.mark_reviewed("ghost").is_none());
        assert_eq!(journal.active_count(), 0);
    }

    #[test]
    fn test_due_sorted_earliest_first() {
        let (clock, journal) = setup();
        journal.record_miss(miss("late", "science"));
        journal.mark_reviewed("late"); // due in 3 days
        clock.advance_days(1);
        journal.record_miss(miss("early", "arts")); // due in 1 day from here
        clock.advance_days(5);

        let due: Vec<_> = journal
            .due_for_review()
            .into_iter()
            .map(|e| e.question_id)
            .collect();
        assert_eq!(due, vec!["early", "late"]);
    }

    #[test]
    fn test_entries_newest_first_with_filters() {
        let (clock, journal) = setup();
        journal.record_miss(miss("q1", "science"));
        clock.advance_days(1);
        journal.record_miss(miss("q2", "arts"));
        clock.advance_days(1);
        journal.record_miss(miss("q3", "science"));

        let ids: Vec<_> = journal.entries(None, None).into_iter().map(|e| e.question_id).collect();
        assert_eq!(ids, vec!["q3", "q2", "q1"]);

        let science: Vec<_> = journal
            .entries(Some("science"), Some(1))
            .into_iter()
            .map(|e| e.question_id)
            .collect();
        assert_eq!(science, vec!["q3"]);
    }

    #[test]
    fn test_legacy_entries_are_migrated() {
        let legacy = r#"[{
            "questionId": "q9", "question": "Largest ocean?", "subject": "science",
            "userAnswer": "Atlantic", "correctAnswer": "Pacific",
            "timestamp": "2025-01-01T10:00:00.000Z", "reviewCount": 1,
            "nextReview": "2025-01-04T10:00:00.000Z", "learned": false
        }]"#;
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        ));
        let journal = WrongAnswerJournal::new(
            Storage::new(MemoryStorage::default().with_raw("wrong_answers", legacy)),
            clock,
        );

        let entry = journal.get("q9").unwrap();
        assert_eq!(entry.question_text, "Largest ocean?");
        assert_eq!(entry.correct_answer_text, "Pacific");
        assert_eq!(journal.due_for_review().len(), 1);
    }
}
