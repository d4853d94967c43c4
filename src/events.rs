use crate::app::{App, MENU_OPTIONS, ViewMode};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use scholartrack::AppError;
use std::time::Duration;

/// Event polling interval in milliseconds
const EVENT_POLL_INTERVAL_MS: u64 = 100;

pub fn handle_events(app: &mut App) -> Result<(), AppError> {
    if event::poll(Duration::from_millis(EVENT_POLL_INTERVAL_MS))?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        handle_key(app, key);
    }
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }

    match app.view_mode {
        ViewMode::Menu => handle_menu_events(app, key),
        ViewMode::Daily => handle_daily_events(app, key),
        ViewMode::Review => handle_review_events(app, key),
        ViewMode::Achievements => {
            handle_scroll(&mut app.achievements_scroll, key);
            handle_back(app, key);
        }
        ViewMode::Help => {
            handle_scroll(&mut app.help_scroll, key);
            handle_back(app, key);
        }
        ViewMode::Dashboard => handle_back(app, key),
    }
}

fn handle_menu_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.selected_menu_item = app.selected_menu_item.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.selected_menu_item < MENU_OPTIONS.len() - 1 {
                app.selected_menu_item += 1;
            }
        }
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('d') => app.open(ViewMode::Daily),
        KeyCode::Char('s') => app.open(ViewMode::Dashboard),
        KeyCode::Char('a') => app.open(ViewMode::Achievements),
        KeyCode::Char('r') => app.open(ViewMode::Review),
        KeyCode::Char('h') => app.open(ViewMode::Help),
        _ => {}
    }
}

fn handle_daily_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            if !app.show_outcome_overlay {
                let choice = c as usize - '1' as usize;
                app.answer_daily(choice);
            }
        }
        KeyCode::Enter if app.show_outcome_overlay => {
            app.show_outcome_overlay = false;
        }
        _ => handle_back(app, key),
    }
}

fn handle_review_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next_review(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_review(),
        KeyCode::Char('r') => app.mark_selected_reviewed(),
        KeyCode::Char('l') => app.mark_selected_learned(),
        _ => handle_back(app, key),
    }
}

fn handle_scroll(offset: &mut u16, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => *offset = offset.saturating_add(1),
        KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_sub(1),
        _ => {}
    }
}

fn handle_back(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
        app.return_to_menu();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::crossterm::event::KeyModifiers;
    use scholartrack::clock::FixedClock;
    use scholartrack::pool::QuestionBank;
    use scholartrack::{ProgressEngine, Storage};
    use std::sync::Arc;

    fn app() -> App {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
        App::new(
            ProgressEngine::new(Storage::in_memory(), clock),
            QuestionBank::sample().unwrap(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_menu_navigation() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_menu_item, 0);
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected_menu_item, MENU_OPTIONS.len() - 1);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view_mode, ViewMode::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view_mode, ViewMode::Menu);
    }

    #[test]
    fn test_number_keys_answer_daily_questions() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.view_mode, ViewMode::Daily);

        press(&mut app, KeyCode::Char('1'));
        let session = app.daily.as_ref().unwrap();
        assert_eq!(session.current, 1);
        assert!(session.feedback.is_some());
        assert_eq!(app.engine.stats().load().total_questions_answered, 1);
    }

    #[test]
    fn test_quit_from_any_view() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
