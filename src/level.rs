//! Student level inference and the explanation style that goes with it.

use crate::clock::Clock;
use crate::models::PlayerStats;
use crate::storage::{Record, Storage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StudentLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl fmt::Display for StudentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        write!(f, "{}", label)
    }
}

/// Level from raw performance.
///
/// New players (under 50 answers) and players who never held a streak of 3
/// stay at beginner regardless of accuracy.
pub fn infer_level(stats: &PlayerStats) -> StudentLevel {
    let total = stats.total_questions_answered;
    let accuracy = stats.accuracy();
    let longest = stats.longest_streak;

    if total < 50 || (total > 0 && accuracy < 0.4) || longest < 3 {
        StudentLevel::Beginner
    } else if total > 200 && accuracy > 0.7 && longest > 10 {
        StudentLevel::Advanced
    } else {
        StudentLevel::Intermediate
    }
}

/// Level implied by a school grade.
pub fn grade_to_level(grade: u8) -> StudentLevel {
    match grade {
        0..=5 => StudentLevel::Beginner,
        6..=8 => StudentLevel::Intermediate,
        _ => StudentLevel::Advanced,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentLevelProfile {
    pub grade_level: Option<u8>,
    pub inferred_level: Option<StudentLevel>,
    pub profile_set_at: Option<DateTime<Utc>>,
    pub last_inferred_at: Option<DateTime<Utc>>,
}

impl Record for StudentLevelProfile {
    const KEY: &'static str = "student_profile";
    const VERSION: u32 = 1;
}

impl StudentLevelProfile {
    /// An explicit grade wins over inference, which wins over the default.
    pub fn effective_level(&self) -> StudentLevel {
        self.grade_level
            .map(grade_to_level)
            .or(self.inferred_level)
            .unwrap_or_default()
    }
}

/// Prompt shaping for generated explanations at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplanationConfig {
    pub max_tokens: u32,
    pub complexity: &'static str,
    pub vocabulary: &'static str,
    pub sentences: &'static str,
}

pub fn explanation_config(level: StudentLevel) -> ExplanationConfig {
    match level {
        StudentLevel::Beginner => ExplanationConfig {
            max_tokens: 200,
            complexity: "simple",
            vocabulary: "simple, analogies",
            sentences: "2-3",
        },
        StudentLevel::Intermediate => ExplanationConfig {
            max_tokens: 400,
            complexity: "moderate",
            vocabulary: "academic",
            sentences: "3-4",
        },
        StudentLevel::Advanced => ExplanationConfig {
            max_tokens: 600,
            complexity: "detailed",
            vocabulary: "technical",
            sentences: "4-6",
        },
    }
}

pub struct ProfileStore {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl ProfileStore {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn load(&self) -> StudentLevelProfile {
        self.storage.get()
    }

    pub fn set_grade_level(&self, grade: Option<u8>) -> StudentLevelProfile {
        let now = self.clock.now();
        self.storage.update(|mut profile: StudentLevelProfile| {
            profile.grade_level = grade;
            profile.profile_set_at = Some(now);
            profile
        })
    }

    /// Re-run inference against `stats` and store the result.
    pub fn update_inferred_level(&self, stats: &PlayerStats) -> StudentLevelProfile {
        let level = infer_level(stats);
        let now = self.clock.now();
        self.storage.update(|mut profile: StudentLevelProfile| {
            match profile.inferred_level {
                Some(previous) if previous != level => {
                    info!("Inferred level changed from {} to {}", previous, level)
                }
                None => info!("Inferred level set to {}", level),
                _ => {}
            }
            profile.inferred_level = Some(level);
            profile.last_inferred_at = Some(now);
            profile
        })
    }

    pub fn effective_level(&self) -> StudentLevel {
        self.load().effective_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn stats(total: u64, correct: u64, longest: u32) -> PlayerStats {
        PlayerStats {
            total_questions_answered: total,
            correct_answers: correct,
            longest_streak: longest,
            ..PlayerStats::default()
        }
    }

    #[test]
    fn test_infer_level_thresholds() {
        assert_eq!(infer_level(&PlayerStats::default()), StudentLevel::Beginner);
        assert_eq!(infer_level(&stats(49, 49, 20)), StudentLevel::Beginner);
        assert_eq!(infer_level(&stats(100, 30, 20)), StudentLevel::Beginner);
        assert_eq!(infer_level(&stats(100, 90, 2)), StudentLevel::Beginner);
        assert_eq!(infer_level(&stats(100, 60, 5)), StudentLevel::Intermediate);
        assert_eq!(infer_level(&stats(200, 190, 30)), StudentLevel::Intermediate);
        assert_eq!(infer_level(&stats(201, 150, 11)), StudentLevel::Advanced);
        assert_eq!(infer_level(&stats(300, 210, 10)), StudentLevel::Intermediate);
    }

    #[test]
    fn test_grade_mapping() {
        assert_eq!(grade_to_level(3), StudentLevel::Beginner);
        assert_eq!(grade_to_level(5), StudentLevel::Beginner);
        assert_eq!(grade_to_level(6), StudentLevel::Intermediate);
        assert_eq!(grade_to_level(8), StudentLevel::Intermediate);
        assert_eq!(grade_to_level(12), StudentLevel::Advanced);
    }

    #[test]
    fn test_grade_overrides_inference() {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
        let store = ProfileStore::new(Storage::in_memory(), clock);
        assert_eq!(store.load().inferred_level, None);
        assert_eq!(store.effective_level(), StudentLevel::Intermediate);

        let profile = store.update_inferred_level(&stats(400, 380, 40));
        assert_eq!(profile.inferred_level, Some(StudentLevel::Advanced));
        assert!(profile.last_inferred_at.is_some());
        assert_eq!(store.effective_level(), StudentLevel::Advanced);

        let profile = store.set_grade_level(Some(4));
        assert_eq!(profile.inferred_level, Some(StudentLevel::Advanced));
        assert_eq!(store.effective_level(), StudentLevel::Beginner);

        store.set_grade_level(None);
        assert_eq!(store.effective_level(), StudentLevel::Advanced);
    }

    #[test]
    fn test_profile_reads_browser_format() {
        let profile: StudentLevelProfile = serde_json::from_str(
            r#"{"gradeLevel": 7, "inferredLevel": "beginner", "profileSetAt": "2025-01-05T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(profile.grade_level, Some(7));
        assert_eq!(profile.effective_level(), StudentLevel::Intermediate);
        assert!(profile.last_inferred_at.is_none());
    }

    #[test]
    fn test_profile_with_null_inferred_level_keeps_grade() {
        let raw = r#"{"gradeLevel": 3, "inferredLevel": null, "profileSetAt": "2025-01-05T10:00:00Z", "lastInferredAt": null}"#;
        let storage = Storage::new(MemoryStorage::default().with_raw("student_profile", raw));
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
        let store = ProfileStore::new(storage.clone(), clock);

        let profile: StudentLevelProfile = storage.try_get().unwrap().unwrap();
        assert_eq!(profile.grade_level, Some(3));
        assert_eq!(profile.inferred_level, None);
        assert_eq!(store.effective_level(), StudentLevel::Beginner);

        let profile = store.update_inferred_level(&stats(400, 380, 40));
        assert_eq!(profile.grade_level, Some(3));
        assert_eq!(profile.inferred_level, Some(StudentLevel::Advanced));
        assert_eq!(store.effective_level(), StudentLevel::Beginner);
    }

    #[test]
    fn test_explanation_config_grows_with_level() {
        let beginner = explanation_config(StudentLevel::Beginner);
        let advanced = explanation_config(StudentLevel::Advanced);
        assert_eq!(beginner.max_tokens, 200);
        assert_eq!(beginner.sentences, "2-3");
        assert_eq!(explanation_config(StudentLevel::Intermediate).vocabulary, "academic");
        assert!(advanced.max_tokens > beginner.max_tokens);
    }
}
