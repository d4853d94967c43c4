//! The fixed achievement registry.
//!
//! Ids are persisted in unlock records and must never change once shipped.

use super::rules::{Rule, StatField};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Counters reported by individual game modes.
pub mod counters {
    pub const CONNECTION_PUZZLES_SOLVED: &str = "connection_puzzles_solved";
    pub const CONNECTION_PERFECTS: &str = "connection_perfects";
    pub const CONNECTION_DAILY_COUNT: &str = "connection_daily_count";
    pub const SPRINT_BEST_DISTANCE: &str = "sprint_best_distance";
    pub const SPRINT_MAX_MULTIPLIER: &str = "sprint_max_multiplier";
    pub const SPRINT_POWER_UPS_USED: &str = "sprint_power_ups_used";
    pub const MOSAIC_GRIDS_COMPLETED: &str = "mosaic_grids_completed";
    pub const MOSAIC_PERFECTS: &str = "mosaic_perfects";
    pub const MOSAIC_BEST_COMBO: &str = "mosaic_best_combo";
    pub const MOSAIC_6X6_COMPLETED: &str = "mosaic_6x6_completed";
    pub const ARENA_WINS: &str = "arena_wins";
    pub const ARENA_ROUNDS_WON: &str = "arena_rounds_won";
    pub const ARENA_DEVIL_BEATEN: &str = "arena_devil_beaten";
    pub const ARENA_REBUTTAL_WINS: &str = "arena_rebuttal_wins";
    pub const TREASURE_STARS: &str = "treasure_stars";
    pub const TREASURE_REGIONS_COMPLETE: &str = "treasure_regions_complete";
    pub const TREASURE_BRIDGES_COMPLETE: &str = "treasure_bridges_complete";
}

/// Subjects of the core question bank.
pub const CORE_SUBJECTS: [&str; 5] = [
    "science",
    "social_studies",
    "arts",
    "literature",
    "special_area",
];

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Exploration,
    Streak,
    Mastery,
    Speed,
    Special,
}

impl AchievementCategory {
    /// Display order.
    pub const ALL: [AchievementCategory; 5] = [
        Self::Exploration,
        Self::Streak,
        Self::Mastery,
        Self::Speed,
        Self::Special,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Exploration => "Exploration",
            Self::Streak => "Streak",
            Self::Mastery => "Mastery",
            Self::Speed => "Speed",
            Self::Special => "Special",
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub rule: Rule,
}

fn entry(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: AchievementCategory,
    rule: Rule,
) -> Achievement {
    Achievement {
        id,
        name,
        description,
        icon,
        category,
        rule,
    }
}

static CATALOG: Lazy<Vec<Achievement>> = Lazy::new(build_catalog);

/// Every achievement in declaration order.
pub fn catalog() -> &'static [Achievement] {
    &CATALOG
}

pub fn by_id(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

fn build_catalog() -> Vec<Achievement> {
    use AchievementCategory::*;
    use StatField::*;
    use counters::*;

    let mastery = |subject: &str| Rule::subject_ratio(subject, 50, 0.8);

    vec![
        // Exploration
        entry("first_game", "First Steps", "Complete your first game", "🎮", Exploration,
            Rule::at_least(GamesPlayed, 1)),
        entry("five_games", "Getting Started", "Complete 5 games", "🌟", Exploration,
            Rule::at_least(GamesPlayed, 5)),
        entry("twenty_five_games", "Dedicated Scholar", "Complete 25 games", "🎓", Exploration,
            Rule::at_least(GamesPlayed, 25)),
        entry("hundred_questions", "Century Club", "Answer 100 questions", "💯", Exploration,
            Rule::at_least(TotalQuestionsAnswered, 100)),
        entry("five_hundred_questions", "Knowledge Seeker", "Answer 500 questions", "📖", Exploration,
            Rule::at_least(TotalQuestionsAnswered, 500)),
        // Streaks
        entry("streak_3", "Hot Streak", "Get 3 correct answers in a row", "🔥", Streak,
            Rule::at_least(LongestStreak, 3)),
        entry("streak_7", "On Fire", "Get 7 correct answers in a row", "⚡", Streak,
            Rule::at_least(LongestStreak, 7)),
        entry("streak_15", "Unstoppable", "Get 15 correct answers in a row", "🌋", Streak,
            Rule::at_least(LongestStreak, 15)),
        entry("daily_3", "Consistent", "Play 3 days in a row", "📅", Streak,
            Rule::at_least(DailyStreak, 3)),
        entry("daily_7", "Weekly Warrior", "Play 7 days in a row", "🗓️", Streak,
            Rule::at_least(DailyStreak, 7)),
        entry("daily_14", "Fortnight Champion", "Play 14 days in a row", "🏅", Streak,
            Rule::at_least(DailyStreak, 14)),
        entry("daily_30", "Monthly Master", "Play 30 days in a row", "👑", Streak,
            Rule::at_least(DailyStreak, 30)),
        // Mastery
        entry("science_master", "Science Whiz", "Score 80%+ accuracy in Science (50+ questions)", "🔬", Mastery,
            mastery("science")),
        entry("literature_master", "Bookworm", "Score 80%+ accuracy in Literature (50+ questions)", "📚", Mastery,
            mastery("literature")),
        entry("arts_master", "Art Connoisseur", "Score 80%+ accuracy in Arts (50+ questions)", "🎨", Mastery,
            mastery("arts")),
        entry("social_studies_master", "World Citizen", "Score 80%+ accuracy in Social Studies (50+ questions)", "🌍", Mastery,
            mastery("social_studies")),
        entry("well_rounded", "Renaissance Scholar", "Answer questions in all 5 subjects", "🌈", Mastery,
            Rule::All {
                rules: CORE_SUBJECTS
                    .iter()
                    .map(|subject| Rule::subject_ratio(subject, 1, 0.0))
                    .collect(),
            }),
        // Speed
        entry("speed_demon", "Speed Demon", "Answer correctly in under 2 seconds", "⏱️", Speed,
            Rule::under(FastestCorrectMs, 2000)),
        entry("lightning", "Lightning Fast", "Answer correctly in under 1 second", "⚡", Speed,
            Rule::under(FastestCorrectMs, 1000)),
        // Special
        entry("perfect_10", "Perfect 10", "Get 10 questions right with no mistakes in a game", "💎", Special,
            Rule::at_least(PerfectRounds, 1)),
        entry("perfect_5", "Perfectionist", "Complete 5 perfect rounds", "✨", Special,
            Rule::at_least(PerfectRounds, 5)),
        // Connection Quest
        entry("connection_first", "Connected!", "Complete 1 Connection Quest puzzle", "🔗", Exploration,
            Rule::counter(CONNECTION_PUZZLES_SOLVED, 1)),
        entry("connection_perfect", "Perfect Connection", "Solve a puzzle with 0 mistakes", "💎", Special,
            Rule::counter(CONNECTION_PERFECTS, 1)),
        entry("connection_5", "Link Master", "Solve 5 Connection Quest puzzles", "🧩", Mastery,
            Rule::counter(CONNECTION_PUZZLES_SOLVED, 5)),
        entry("connection_daily_7", "Daily Connector", "Complete 7 daily puzzles", "📅", Streak,
            Rule::counter(CONNECTION_DAILY_COUNT, 7)),
        // Scholar Sprint
        entry("sprint_100", "Century Sprint", "Reach 100m in Scholar Sprint", "🏃", Exploration,
            Rule::counter(SPRINT_BEST_DISTANCE, 100)),
        entry("sprint_500", "Half Kilometer", "Reach 500m in Scholar Sprint", "🏃‍♂️", Mastery,
            Rule::counter(SPRINT_BEST_DISTANCE, 500)),
        entry("sprint_1km", "Kilometer Scholar", "Reach 1000m in Scholar Sprint", "🏅", Mastery,
            Rule::counter(SPRINT_BEST_DISTANCE, 1000)),
        entry("sprint_5x", "Maximum Velocity", "Reach 5x multiplier in Scholar Sprint", "🚀", Speed,
            Rule::counter(SPRINT_MAX_MULTIPLIER, 5)),
        entry("sprint_power", "Power Scholar", "Use all 4 power-up types in Scholar Sprint", "⚡", Special,
            Rule::counter(SPRINT_POWER_UPS_USED, 4)),
        // Memory Mosaic
        entry("mosaic_first", "First Match", "Complete a Memory Mosaic game", "🧩", Exploration,
            Rule::counter(MOSAIC_GRIDS_COMPLETED, 1)),
        entry("mosaic_perfect", "Perfect Memory", "Complete a mosaic with zero misses", "🧠", Special,
            Rule::counter(MOSAIC_PERFECTS, 1)),
        entry("mosaic_combo_5", "Combo Master", "Get a 5+ combo in Memory Mosaic", "🔥", Streak,
            Rule::counter(MOSAIC_BEST_COMBO, 5)),
        entry("mosaic_6x6", "Grand Mosaic", "Complete a 6x6 Memory Mosaic", "🖼️", Mastery,
            Rule::counter(MOSAIC_6X6_COMPLETED, 1)),
        // Argument Arena
        entry("arena_first", "Opening Argument", "Win your first Argument Arena match", "⚖️", Exploration,
            Rule::counter(ARENA_WINS, 1)),
        entry("arena_perfect", "Flawless Logic", "Win all 5 rounds in an Argument Arena match", "💎", Special,
            Rule::counter(ARENA_ROUNDS_WON, 5)),
        entry("arena_devil", "Devil's Defeat", "Beat The Devil's Advocate", "😈", Mastery,
            Rule::counter(ARENA_DEVIL_BEATEN, 1)),
        entry("arena_rebuttal", "Master Rebuttal", "Win a round using a rebuttal card", "🗡️", Special,
            Rule::counter(ARENA_REBUTTAL_WINS, 1)),
        // Treasure Hunt
        entry("treasure_first", "First Discovery", "Earn your first Treasure Hunt star", "⭐", Exploration,
            Rule::counter(TREASURE_STARS, 1)),
        entry("treasure_region", "Region Explorer", "Complete 1 Treasure Hunt region", "🗺️", Mastery,
            Rule::counter(TREASURE_REGIONS_COMPLETE, 1)),
        entry("treasure_all", "World Explorer", "Complete all 5 Treasure Hunt regions", "🌍", Mastery,
            Rule::counter(TREASURE_REGIONS_COMPLETE, 5)),
        entry("treasure_30_stars", "Star Collector", "Earn 30 total Treasure Hunt stars", "✨", Exploration,
            Rule::counter(TREASURE_STARS, 30)),
        entry("treasure_bridge", "Bridge Builder", "Complete a bridge challenge", "🌉", Special,
            Rule::counter(TREASURE_BRIDGES_COMPLETE, 1)),
    ]
}
