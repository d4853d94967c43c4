use crate::app::{App, DailySession, MENU_OPTIONS, ViewMode};
use crate::help;
use crate::reports;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Overlay size as percentage of screen
const OVERLAY_SIZE_PERCENT: u16 = 60;
const OVERLAY_MARGIN: u16 = 2;
/// Minimum overlay dimensions
const MIN_OVERLAY_WIDTH: u16 = 40;
const MIN_OVERLAY_HEIGHT: u16 = 10;

/// Renders the user interface widgets.
pub fn render(app: &App, frame: &mut Frame) {
    // Header, content, status
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, layout[0]);

    match app.view_mode {
        ViewMode::Menu => render_menu_view(app, frame, layout[1]),
        ViewMode::Daily => render_daily_view(app, frame, layout[1]),
        ViewMode::Dashboard => {
            if let Some(data) = &app.dashboard {
                reports::render_dashboard(frame, layout[1], data)
            }
        }
        ViewMode::Achievements => {
            reports::render_achievements(frame, layout[1], &app.achievements, app.achievements_scroll)
        }
        ViewMode::Review => render_review_view(app, frame, layout[1]),
        ViewMode::Help => render_help_view(app, frame, layout[1]),
    }

    render_status_bar(app, frame, layout[2]);

    if app.show_outcome_overlay
        && let Some(session) = &app.daily
    {
        render_outcome_overlay(session, frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(" scholartrack: progress & mastery ")
        .style(Style::new().bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::TOP);
    let status_text = format!(" {} | q: quit ", app.status_message);
    let paragraph = Paragraph::new(status_text)
        .alignment(Alignment::Right)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_menu_view(app: &App, frame: &mut Frame, area: Rect) {
    // Center the menu box
    let menu_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Length(14),
            Constraint::Percentage(20),
        ])
        .split(area)[1];

    let menu_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(menu_area)[1];

    let block = Block::default()
        .title("Menu")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut menu_text = String::from("\n");
    for (i, (label, _)) in MENU_OPTIONS.iter().enumerate() {
        if i == app.selected_menu_item {
            menu_text.push_str(&format!("> {} <\n\n", label));
        } else {
            menu_text.push_str(&format!("{}\n\n", label));
        }
    }

    let paragraph = Paragraph::new(menu_text)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, menu_area);
}

fn render_daily_view(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title("Daily challenge")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let Some(session) = &app.daily else {
        let streak = &app.daily_streak;
        let text = format!(
            "\nToday's challenge is done.\n\nCurrent streak: {} day(s)\nBest streak: {} day(s)\n\nCome back tomorrow for a new set.",
            streak.current_streak, streak.longest_streak
        );
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![Line::from(format!(
        "Question {}/{}   Correct so far: {}",
        (session.current + 1).min(session.questions.len()),
        session.questions.len(),
        session.correct
    ))];
    if let Some(feedback) = &session.feedback {
        let color = if feedback.starts_with("Correct") {
            Color::Green
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(feedback.clone(), Style::default().fg(color))));
    }
    lines.push(Line::from(""));

    match session.question() {
        Some(question) => {
            lines.push(Line::from(Span::styled(
                format!("[{}] {}", question.subject, question.text),
                Style::default().bold(),
            )));
            lines.push(Line::from(""));
            for (i, option) in question.options.iter().enumerate() {
                lines.push(Line::from(format!("  {}. {}", i + 1, option)));
            }
        }
        None if session.questions.is_empty() => {
            lines.push(Line::from("The question pool is empty."));
        }
        None => {
            lines.push(Line::from(format!("Finished with a score of {}.", session.score())));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_review_view(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let list_block = Block::default()
        .title(format!("Due for review ({})", app.review_entries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let lines: Vec<Line> = if app.review_entries.is_empty() {
        vec![Line::from("Nothing due right now.")]
    } else {
        app.review_entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let text = format!("[{}] {}", entry.subject, entry.question_text);
                if i == app.review_selected {
                    Line::from(Span::styled(
                        format!("> {}", text),
                        Style::default().fg(Color::Yellow).bold(),
                    ))
                } else {
                    Line::from(format!("  {}", text))
                }
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(list_block), columns[0]);

    let detail_block = Block::default()
        .title("Details (r: reviewed, l: learned)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let detail = match app.review_entries.get(app.review_selected) {
        Some(entry) => {
            let mut lines = vec![
                Line::from(Span::styled(entry.question_text.clone(), Style::default().bold())),
                Line::from(""),
                Line::from(vec![
                    Span::raw("Your answer:    "),
                    Span::styled(entry.user_answer_text.clone(), Style::default().fg(Color::Red)),
                ]),
                Line::from(vec![
                    Span::raw("Correct answer: "),
                    Span::styled(
                        entry.correct_answer_text.clone(),
                        Style::default().fg(Color::Green),
                    ),
                ]),
                Line::from(format!("Reviews so far: {}", entry.review_count)),
            ];
            if let Some(explanation) = &entry.explanation {
                lines.push(Line::from(""));
                lines.push(Line::from(explanation.clone()));
            }
            lines
        }
        None => Vec::new(),
    };
    let paragraph = Paragraph::new(detail)
        .block(detail_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, columns[1]);
}

fn render_help_view(app: &App, frame: &mut Frame, area: Rect) {
    let help_content = help::get_help_content();
    let help_text = if help_content.is_empty() {
        "Help file not found.\n\nCreate docs/HELP.md and rebuild.".to_string()
    } else {
        help_content.to_string()
    };

    let block = Block::default()
        .title("Help (↑/↓ or j/k: scroll, Esc: back)")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_outcome_overlay(session: &DailySession, frame: &mut Frame) {
    let overlay_area = calculate_overlay_area(frame.area());
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Daily challenge complete (Enter: close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .style(Style::default().bg(Color::Black));

    let mut lines = vec![
        Line::from(""),
        Line::from(format!("Score: {}", session.score())),
    ];
    if let Some(outcome) = &session.outcome {
        lines.push(Line::from(format!(
            "Streak: {} day(s), best {}",
            outcome.streak.current_streak, outcome.streak.longest_streak
        )));
        if let Some(message) = outcome.milestone {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                message,
                Style::default().fg(Color::Yellow).bold(),
            )));
        }
        if !outcome.unlocked.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Unlocked: {}", outcome.unlocked.join(", "))));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, overlay_area);
}

fn calculate_overlay_area(full_area: Rect) -> Rect {
    let margin = OVERLAY_MARGIN;

    let max_overlay_width = full_area.width.saturating_sub(margin.saturating_mul(2));
    let max_overlay_height = full_area.height.saturating_sub(margin.saturating_mul(2));

    let overlay_width = full_area
        .width
        .saturating_mul(OVERLAY_SIZE_PERCENT)
        .saturating_div(100)
        .max(MIN_OVERLAY_WIDTH)
        .min(max_overlay_width);
    let overlay_height = full_area
        .height
        .saturating_mul(OVERLAY_SIZE_PERCENT)
        .saturating_div(100)
        .max(MIN_OVERLAY_HEIGHT)
        .min(max_overlay_height);
    let x = full_area.x + full_area.width.saturating_sub(overlay_width) / 2;
    let y = full_area.y + full_area.height.saturating_sub(overlay_height) / 2;

    Rect {
        x,
        y,
        width: overlay_width,
        height: overlay_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use scholartrack::clock::FixedClock;
    use scholartrack::pool::QuestionBank;
    use scholartrack::{ProgressEngine, Storage};
    use std::sync::Arc;

    #[test]
    fn test_calculate_overlay_area_standard() {
        let overlay = calculate_overlay_area(Rect::new(0, 0, 100, 40));

        // 60% of 100 is 60, 60% of 40 is 24
        assert_eq!(overlay.width, 60);
        assert_eq!(overlay.height, 24);
        assert_eq!(overlay.x, 20);
        assert_eq!(overlay.y, 8);
    }

    #[test]
    fn test_calculate_overlay_area_small_screen() {
        // margin=2 -> max_width = 40-4 = 36, max_height = 10-4 = 6
        let overlay = calculate_overlay_area(Rect::new(0, 0, 40, 10));
        assert_eq!(overlay.width, 36);
        assert_eq!(overlay.height, 6);
    }

    #[test]
    fn test_every_view_renders() {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()));
        let engine = ProgressEngine::new(Storage::in_memory(), clock);
        let mut app = App::new(engine, QuestionBank::sample().unwrap());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        for (_, view) in MENU_OPTIONS {
            app.open(view);
            terminal.draw(|frame| render(&app, frame)).unwrap();
        }
        app.return_to_menu();
        terminal.draw(|frame| render(&app, frame)).unwrap();
    }
}
