use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Correct/total tally for one subject.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubjectTally {
    pub correct: u64,
    pub total: u64,
}

impl SubjectTally {
    pub fn ratio(&self) -> f64 {
        if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Accuracy as a rounded percentage.
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

/// Aggregate statistics across every game mode.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub total_questions_answered: u64,
    pub correct_answers: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub games_played: u32,
    pub daily_streak: u32,
    pub perfect_rounds: u32,
    /// Milliseconds.
    pub total_time_played: u64,
    /// Zero until the first timed correct answer.
    pub fastest_correct_ms: u64,
    pub subject_accuracy: BTreeMap<String, SubjectTally>,
    /// Per-mode counters reported by individual games (puzzles solved,
    /// treasure stars, arena wins, ...).
    pub counters: BTreeMap<String, u64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A gradeable multiple-choice item from the content pool.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_stats_fill_missing_fields() {
        let stats: PlayerStats =
            serde_json::from_str(r#"{"gamesPlayed": 4, "subjectAccuracy": {"arts": {"correct": 1, "total": 2}}}"#)
                .unwrap();
        assert_eq!(stats.games_played, 4);
        assert_eq!(stats.longest_streak, 0);
        assert!(stats.counters.is_empty());
        assert_eq!(stats.subject_accuracy["arts"].percent(), 50);
    }

    #[test]
    fn test_question_pool_format() {
        let question: Question = serde_json::from_str(
            r#"{"id": "q1", "subject": "science", "difficulty": "medium",
                "text": "Symbol for water?", "options": ["H2O", "CO2"], "correct_index": 0}"#,
        )
        .unwrap();
        assert_eq!(question.difficulty, Difficulty::Medium);
        assert!(question.is_correct(0));
        assert_eq!(question.correct_option(), "H2O");
        assert!(question.explanation.is_none());
    }
}
