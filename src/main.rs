mod app;
mod events;
mod help;
mod reports;
mod tui;
mod ui;

use crate::app::App;
use scholartrack::pool::QuestionBank;
use scholartrack::{AppError, FileStorage, ProgressEngine, Storage, config};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const LOG_FILE: &str = "scholartrack.log";

fn main() -> Result<(), AppError> {
    let config = config::load()?;
    let data_dir = config.resolved_data_dir()?;
    fs::create_dir_all(&data_dir)?;
    init_logging(&data_dir, config.log_level())?;

    let pool = match &config.question_pool {
        Some(path) => QuestionBank::load(path)?,
        None => QuestionBank::sample()?,
    };
    info!(
        "Starting with {} questions, data in {}",
        pool.len(),
        data_dir.display()
    );

    let engine = ProgressEngine::with_system_clock(Storage::new(FileStorage::new(&data_dir)));
    let mut app = App::new(engine, pool);

    let mut tui = tui::init()?;
    let result = run(&mut tui, &mut app);
    tui::restore()?;
    result
}

fn run(tui: &mut tui::Tui, app: &mut App) -> Result<(), AppError> {
    while !app.should_quit {
        tui.draw(|frame| ui::render(app, frame))?;
        events::handle_events(app)?;
    }
    Ok(())
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_logging(data_dir: &Path, log_level: &str) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
