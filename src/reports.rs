use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::DashboardData;
use scholartrack::achievements::{AchievementCategory, AchievementStatus};
use scholartrack::analytics::{DayStudyTime, WeeklySummary};
use scholartrack::daily::CalendarDay;
use scholartrack::models::PlayerStats;

/// Room taken by labels and counts next to a bar
const BAR_LABEL_WIDTH: usize = 24;

pub fn render_dashboard(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(columns[1]);

    render_panel(frame, left[0], "Progress", Color::Cyan, create_summary(data));

    let bar_width = (left[1].width as usize).saturating_sub(BAR_LABEL_WIDTH + 2);
    render_panel(
        frame,
        left[1],
        "Subject accuracy",
        Color::Yellow,
        create_accuracy_bars(&data.stats, bar_width),
    );

    render_panel(
        frame,
        right[0],
        "Daily challenge (4 weeks)",
        Color::Green,
        create_heatmap(&data.calendar),
    );

    let chart_width = (right[1].width as usize).saturating_sub(BAR_LABEL_WIDTH + 2);
    render_panel(
        frame,
        right[1],
        "Study time",
        Color::Magenta,
        create_study_chart(&data.study_days, &data.weeks, chart_width),
    );
}

pub fn render_achievements(frame: &mut Frame, area: Rect, overview: &[AchievementStatus], scroll: u16) {
    let unlocked = overview.iter().filter(|s| s.is_unlocked()).count();

    let block = Block::default()
        .title(format!("Achievements {}/{}", unlocked, overview.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let paragraph = Paragraph::new(create_achievement_list(overview))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_panel(frame: &mut Frame, area: Rect, title: &str, color: Color, text: Text<'static>) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn create_summary(data: &DashboardData) -> Text<'static> {
    let stats = &data.stats;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<18}", label), Style::default().bold()),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        row("Level", data.level.to_string()),
        row(
            "Answered",
            format!(
                "{} ({}% correct)",
                stats.total_questions_answered,
                (stats.accuracy() * 100.0).round()
            ),
        ),
        row(
            "Answer streak",
            format!("{} (best {})", stats.current_streak, stats.longest_streak),
        ),
        row(
            "Daily streak",
            format!(
                "{} (best {})",
                data.streak.current_streak, data.streak.longest_streak
            ),
        ),
        row("Games played", stats.games_played.to_string()),
        row("Time played", format_minutes(stats.total_time_played)),
        row("Games today", format!("{} different", data.variety_today)),
        row("Due for review", data.due_reviews.to_string()),
    ];
    if let Some(subject) = stats.strongest_subject() {
        lines.push(row("Strongest", subject.to_string()));
    }
    Text::from(lines)
}

fn format_minutes(ms: u64) -> String {
    let minutes = ms / 60_000;
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

fn bar_len(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        0
    } else {
        (value as f64 / max as f64 * width as f64).round() as usize
    }
}

fn accuracy_color(percent: u32) -> Color {
    match percent {
        80.. => Color::Green,
        50.. => Color::Yellow,
        _ => Color::Red,
    }
}

fn create_accuracy_bars(stats: &PlayerStats, width: usize) -> Text<'static> {
    if stats.subject_accuracy.is_empty() {
        return Text::from("No answers yet");
    }

    let lines: Vec<Line> = stats
        .subject_accuracy
        .iter()
        .map(|(subject, tally)| {
            let percent = tally.percent();
            Line::from(vec![
                Span::raw(format!("{:<15}", subject)),
                Span::styled(
                    "█".repeat(bar_len(u64::from(percent), 100, width)),
                    Style::default().fg(accuracy_color(percent)),
                ),
                Span::raw(format!(" {}% ({})", percent, tally.total)),
            ])
        })
        .collect();
    Text::from(lines)
}

fn create_heatmap(calendar: &[CalendarDay]) -> Text<'static> {
    let mut lines = Vec::new();

    for week in calendar.chunks(7) {
        let mut spans = Vec::new();
        if let Some(first) = week.first() {
            spans.push(Span::raw(format!("{} ", first.date.format("%m/%d"))));
        }
        for day in week {
            let (symbol, style) = match (day.completed, day.is_today) {
                (true, _) => ("■", Style::default().fg(Color::Green).bold()),
                (false, true) => ("□", Style::default().fg(Color::Yellow)),
                (false, false) => ("□", Style::default().fg(Color::DarkGray)),
            };
            spans.push(Span::styled(format!(" {} ", symbol), style));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("■", Style::default().fg(Color::Green)),
        Span::raw(" completed  "),
        Span::styled("□", Style::default().fg(Color::Yellow)),
        Span::raw(" today"),
    ]));
    Text::from(lines)
}

fn create_study_chart(days: &[DayStudyTime], weeks: &[WeeklySummary], width: usize) -> Text<'static> {
    let mut lines = Vec::new();
    let max_minutes = days.iter().map(|d| d.minutes).max().unwrap_or(0);

    for day in days {
        lines.push(Line::from(vec![
            Span::raw(format!("{} ", day.date.format("%a %m/%d"))),
            Span::styled(
                "█".repeat(bar_len(day.minutes, max_minutes, width)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(" {}m", day.minutes)),
        ]));
    }

    lines.push(Line::from(""));
    for week in weeks {
        let percent = if week.questions > 0 {
            (week.correct as f64 / week.questions as f64 * 100.0).round() as u32
        } else {
            0
        };
        lines.push(Line::from(format!(
            "Week {}: {} games, {} questions, {}% correct",
            week.week_number, week.games, week.questions, percent
        )));
    }
    Text::from(lines)
}

/// One section per category; catalog order is kept inside each section.
fn create_achievement_list(overview: &[AchievementStatus]) -> Text<'static> {
    let mut lines = Vec::new();

    for category in AchievementCategory::ALL {
        let mut section = overview
            .iter()
            .filter(|status| status.achievement.category == category)
            .peekable();
        if section.peek().is_none() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category.label().to_string(),
            Style::default().bold().underlined(),
        )));
        lines.extend(section.map(create_achievement_line));
    }
    Text::from(lines)
}

fn create_achievement_line(status: &AchievementStatus) -> Line<'static> {
    let achievement = status.achievement;
    let mut spans = if status.is_unlocked() {
            vec![Span::styled(
                format!("{} {}", achievement.icon, achievement.name),
                Style::default().fg(Color::Green).bold(),
            )]
        } else {
            vec![Span::styled(
                format!("🔒 {}", achievement.name),
                Style::default().fg(Color::DarkGray),
            )]
        };
    spans.push(Span::raw(format!(": {}", achievement.description)));
    if let Some(progress) = status.progress.filter(|_| !status.is_unlocked()) {
        spans.push(Span::styled(
            format!(" ({}/{})", progress.current, progress.target),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}
