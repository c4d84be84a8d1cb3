use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};
use std::io;
use std::time::Duration;

mod actions;
mod app;
mod config;
mod effects;
mod keyboard;
mod logger;
mod reducer;
mod selectors;
mod state;
mod store;
mod views;

use app::App;
use config::SlideshowConfig;

fn main() -> anyhow::Result<()> {
    let log_file = logger::init()?;
    log::info!("Starting slideshow");

    let config = SlideshowConfig::load();

    // Effects run on the runtime's workers while the UI loop owns this thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _runtime = runtime.enter();

    let mut app = App::new(config);
    app.show()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("Slideshow failed: {:#}", err);
        eprintln!("Error: {:#}", err);
    }

    log::info!("Exiting slideshow");
    println!("Log written to {}", log_file.display());
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    while app.running {
        terminal.draw(|frame| views::render(app.view_model(), frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(command) = keyboard::command_for(&key) {
                    app.handle(command)?;
                }
            }
        }
    }

    Ok(())
}
