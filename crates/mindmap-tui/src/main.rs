use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent};
use crossterm::terminal;

use mindmap_tui::app::App;
use mindmap_tui::tracing_setup;
use mindmap_tui::user_config::UserConfig;

// Cap the poll timeout so the loop stays responsive to Ctrl-C even when no
// timer is armed.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> io::Result<()> {
    tracing_setup::init_tracing();

    let config = UserConfig::load().with_default_keymaps();
    let app = App::new(config).map_err(io::Error::other)?;

    terminal::enable_raw_mode()?;
    let result = run(&app);
    terminal::disable_raw_mode()?;
    result
}

fn run(app: &App) -> io::Result<()> {
    loop {
        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(IDLE_POLL, |until| until.min(IDLE_POLL));

        if event::poll(timeout)? {
            if let TermEvent::Key(key) = event::read()? {
                app.push_key(&key);
            }
        }
        app.pump(Instant::now());

        while let Ok(call) = app.calls.dequeue() {
            tracing::info!(%call, "command call");
            if call.name == "quit" {
                return Ok(());
            }
        }
    }
}
