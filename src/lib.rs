//! Progression and mastery tracking for a multi-game study app: aggregate
//! stats, achievements, a spaced-repetition journal of missed questions and a
//! deterministic daily challenge with its streak.

pub mod achievements;
pub mod analytics;
pub mod clock;
pub mod config;
pub mod cross_game;
pub mod daily;
pub mod engine;
pub mod error;
pub mod journal;
pub mod level;
pub mod models;
pub mod pool;
pub mod stats;
pub mod storage;

pub use engine::ProgressEngine;
pub use error::AppError;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageAdapter};
