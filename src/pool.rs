//! Content pool the daily challenge draws from.

use crate::error::AppError;
use crate::models::{Difficulty, Question};
use std::fs;
use std::path::Path;

const SAMPLE_POOL: &str = include_str!("../data/sample_questions.json");

pub trait ContentPool {
    fn questions(&self) -> &[Question];

    /// Distinct subjects in pool order.
    fn subjects(&self) -> Vec<&str> {
        let mut subjects: Vec<&str> = Vec::new();
        for question in self.questions() {
            if !subjects.contains(&question.subject.as_str()) {
                subjects.push(&question.subject);
            }
        }
        subjects
    }

    fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.questions()
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect()
    }
}

impl ContentPool for Vec<Question> {
    fn questions(&self) -> &[Question] {
        self
    }
}

impl ContentPool for [Question] {
    fn questions(&self) -> &[Question] {
        self
    }
}

/// A question pool loaded from a JSON array.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The pool bundled with the binary.
    pub fn sample() -> Result<Self, AppError> {
        Self::from_json(SAMPLE_POOL)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl ContentPool for QuestionBank {
    fn questions(&self) -> &[Question] {
        &self.questions
    }
}
