use chrono::NaiveDate;
use scholartrack::ProgressEngine;
use scholartrack::achievements::AchievementStatus;
use scholartrack::analytics::{DayStudyTime, WeeklySummary};
use scholartrack::daily::{CalendarDay, DailyStreakRecord, date_key};
use scholartrack::engine::DailyOutcome;
use scholartrack::journal::WrongAnswerEntry;
use scholartrack::level::StudentLevel;
use scholartrack::models::{PlayerStats, Question};
use scholartrack::pool::QuestionBank;
use std::time::Instant;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ViewMode {
    Menu,
    Daily,
    Dashboard,
    Achievements,
    Review,
    Help,
}

/// Menu entries in display order
pub const MENU_OPTIONS: [(&str, ViewMode); 5] = [
    ("Daily Challenge", ViewMode::Daily),
    ("Dashboard", ViewMode::Dashboard),
    ("Achievements", ViewMode::Achievements),
    ("Review Journal", ViewMode::Review),
    ("Help", ViewMode::Help),
];

const MENU_STATUS: &str = "Select with ↑/↓ and press Enter";

pub const HEATMAP_DAYS: usize = 28;
const STUDY_DAYS: usize = 7;
const WEEKS_TO_SHOW: usize = 4;

/// What the dashboard shows, read once when the view opens.
pub struct DashboardData {
    pub stats: PlayerStats,
    pub streak: DailyStreakRecord,
    pub level: StudentLevel,
    pub variety_today: usize,
    pub due_reviews: usize,
    pub calendar: Vec<CalendarDay>,
    pub study_days: Vec<DayStudyTime>,
    pub weeks: Vec<WeeklySummary>,
}

impl DashboardData {
    fn load(engine: &ProgressEngine) -> Self {
        let analytics = engine.analytics();
        let daily = engine.daily();
        Self {
            stats: engine.stats().load(),
            streak: daily.streak_view(),
            level: engine.profile().effective_level(),
            variety_today: engine.cross_game().today_variety_count(),
            due_reviews: engine.journal().due_for_review().len(),
            calendar: daily.calendar(HEATMAP_DAYS),
            study_days: analytics.study_time_by_day(STUDY_DAYS),
            weeks: analytics.weekly_summary(WEEKS_TO_SHOW),
        }
    }
}

/// Today's daily challenge as it is being played.
pub struct DailySession {
    pub date: NaiveDate,
    pub questions: Vec<Question>,
    pub current: usize,
    pub correct: u32,
    pub feedback: Option<String>,
    pub outcome: Option<DailyOutcome>,
    asked_at: Instant,
}

impl DailySession {
    fn new(date: NaiveDate, questions: Vec<Question>) -> Self {
        Self {
            date,
            questions,
            current: 0,
            correct: 0,
            feedback: None,
            outcome: None,
            asked_at: Instant::now(),
        }
    }

    pub fn question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Percentage of questions answered correctly.
    pub fn score(&self) -> u32 {
        if self.questions.is_empty() {
            0
        } else {
            self.correct * 100 / self.questions.len() as u32
        }
    }
}

/// Application state
pub struct App {
    pub engine: ProgressEngine,
    pub pool: QuestionBank,
    pub view_mode: ViewMode,
    pub selected_menu_item: usize,
    pub status_message: String,
    pub should_quit: bool,
    pub help_scroll: u16,
    pub achievements_scroll: u16,
    pub review_entries: Vec<WrongAnswerEntry>,
    pub review_selected: usize,
    pub daily: Option<DailySession>,
    /// Streak shown once today's challenge is done.
    pub daily_streak: DailyStreakRecord,
    pub dashboard: Option<DashboardData>,
    pub achievements: Vec<AchievementStatus>,
    pub show_outcome_overlay: bool,
}

impl App {
    pub fn new(engine: ProgressEngine, pool: QuestionBank) -> Self {
        Self {
            engine,
            pool,
            view_mode: ViewMode::Menu,
            selected_menu_item: 0,
            status_message: MENU_STATUS.to_string(),
            should_quit: false,
            help_scroll: 0,
            achievements_scroll: 0,
            review_entries: Vec::new(),
            review_selected: 0,
            daily: None,
            daily_streak: DailyStreakRecord::default(),
            dashboard: None,
            achievements: Vec::new(),
            show_outcome_overlay: false,
        }
    }

    pub fn open_selected(&mut self) {
        let (_, view) = MENU_OPTIONS[self.selected_menu_item];
        self.open(view);
    }

    pub fn open(&mut self, view: ViewMode) {
        self.view_mode = view;
        self.status_message = match view {
            ViewMode::Menu => MENU_STATUS.to_string(),
            ViewMode::Daily => {
                self.start_daily();
                return;
            }
            ViewMode::Dashboard => {
                self.dashboard = Some(DashboardData::load(&self.engine));
                "Dashboard. Esc: back".to_string()
            }
            ViewMode::Achievements => {
                let stats = self.engine.stats().load();
                self.achievements = self.engine.achievements().overview(&stats);
                self.achievements_scroll = 0;
                "Achievements. ↑/↓: scroll, Esc: back".to_string()
            }
            ViewMode::Review => {
                self.refresh_review();
                "Review. r: reviewed, l: learned, Esc: back".to_string()
            }
            ViewMode::Help => {
                self.help_scroll = 0;
                "Help. ↑/↓: scroll, Esc: back".to_string()
            }
        };
    }

    pub fn return_to_menu(&mut self) {
        self.show_outcome_overlay = false;
        self.open(ViewMode::Menu);
    }

    pub fn refresh_review(&mut self) {
        self.review_entries = self.engine.journal().due_for_review();
        if self.review_selected >= self.review_entries.len() {
            self.review_selected = self.review_entries.len().saturating_sub(1);
        }
    }

    /// Resume today's unfinished session or start a new one.
    fn start_daily(&mut self) {
        let view = self.engine.daily().streak_view();
        let today = self.engine.clock().today();
        let key = date_key(today);
        if view.today_completed {
            self.daily = None;
            self.status_message = format!(
                "Daily challenge for {} already done (score {}). Esc: back",
                key,
                view.today_score.unwrap_or(0)
            );
            self.daily_streak = view;
            return;
        }

        if let Some(session) = self.daily.as_mut()
            && session.date == today
            && !session.is_finished()
        {
            session.asked_at = Instant::now();
            self.status_message = format!(
                "Daily challenge {} resumed at question {}. 1-4: answer, Esc: back",
                key,
                session.current + 1
            );
            return;
        }

        let questions = self.engine.daily().daily_questions(&self.pool);
        self.status_message = format!("Daily challenge {}. 1-4: answer, Esc: back", key);
        self.daily = Some(DailySession::new(today, questions));
    }

    /// Grade the current daily question and complete the day after the last one.
    pub fn answer_daily(&mut self, choice: usize) {
        let Some(session) = self.daily.as_mut() else {
            return;
        };
        let Some(question) = session.question().cloned() else {
            return;
        };
        if choice >= question.options.len() {
            return;
        }

        let elapsed_ms = session.asked_at.elapsed().as_millis() as u64;
        let outcome = self.engine.answer(&question, choice, Some(elapsed_ms));
        if outcome.correct {
            session.correct += 1;
            session.feedback = Some("Correct!".to_string());
        } else {
            session.feedback = Some(format!("Not quite. Answer: {}", question.correct_option()));
        }
        session.current += 1;
        session.asked_at = Instant::now();

        let mut unlocked = outcome.unlocked;
        if session.is_finished() {
            let daily = self.engine.complete_daily(session.score());
            unlocked.extend(daily.unlocked.iter().copied());
            session.outcome = Some(daily);
            self.show_outcome_overlay = true;
            self.status_message = "Daily challenge complete! Esc: back".to_string();
        }
        if !unlocked.is_empty() {
            self.status_message = format!("Unlocked: {}", unlocked.join(", "));
        }
    }

    pub fn select_next_review(&mut self) {
        if self.review_selected + 1 < self.review_entries.len() {
            self.review_selected += 1;
        }
    }

    pub fn select_previous_review(&mut self) {
        self.review_selected = self.review_selected.saturating_sub(1);
    }

    pub fn mark_selected_reviewed(&mut self) {
        if let Some(entry) = self.review_entries.get(self.review_selected) {
            let id = entry.question_id.clone();
            if let Some(updated) = self.engine.journal().mark_reviewed(&id) {
                self.status_message = format!(
                    "Reviewed. Next review on {}",
                    updated.next_review_at.format("%Y-%m-%d")
                );
            }
            self.refresh_review();
        }
    }

    pub fn mark_selected_learned(&mut self) {
        if let Some(entry) = self.review_entries.get(self.review_selected) {
            let id = entry.question_id.clone();
            if self.engine.journal().mark_learned(&id).is_some() {
                self.status_message = "Marked as learned".to_string();
            }
            self.refresh_review();
        }
    }
}
