//! Terminal User Interface for fakescope
//!
//! Pick a video from the working directory, submit it to the analysis
//! backend and browse the anomalous frames next to a real/fake bar chart.
//!
//! The event loop runs on a current-thread tokio runtime. At most one upload
//! is in flight, driven by the same `select!` that reads the keyboard.

pub mod app;
pub mod msg; // TEA message types (what happened)
pub mod state; // Pure state transformations (functional core)
pub mod ui;
pub mod update; // TEA update function (state transitions)
pub mod views;
pub mod widgets;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;

use crate::config::Config;
use crate::submission::{SubmissionError, SubmitOutcome};
use app::{Action, App, PendingSubmit};
use msg::{key_to_msg, Msg};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Run the TUI application
pub fn run(
    config: Config,
    dir: PathBuf,
    initial: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Create app state before entering raw mode
    let mut app = App::new(config, dir)?;
    if let Some(path) = initial {
        app.select_path(path);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app, ensuring cleanup happens even on error
    let result = run_app_inner(&mut terminal, &mut app);

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

fn run_app_inner<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let size = terminal.size()?;
    app.dispatch(Msg::Resize(size.width, size.height));

    runtime.block_on(run_event_loop(terminal, app))
}

async fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = EventStream::new();
    let mut ticks = tokio::time::interval(TICK_RATE);
    let mut inflight: Option<PendingSubmit> = None;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            biased;

            outcome = settle(&mut inflight) => {
                inflight = None;
                app.on_settled(outcome);
            }

            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let msg = key_to_msg(
                        key.code,
                        key.modifiers,
                        app.model.picker_open,
                        app.model.help_open,
                    );
                    match app.dispatch(msg) {
                        Action::Quit => {
                            if inflight.is_some() {
                                tracing::info!("quitting with an upload in flight, dropping it");
                            }
                            return Ok(());
                        }
                        Action::StartSubmit => {
                            if let Some(pending) = app.start_submit() {
                                inflight = Some(pending);
                            }
                        }
                        Action::Continue => {}
                    }
                }
                Some(Ok(Event::Resize(width, height))) => {
                    app.dispatch(Msg::Resize(width, height));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },

            _ = ticks.tick() => {
                app.dispatch(Msg::Tick);
                app.tick();
            }
        }
    }
}

/// Resolve when the in-flight submission settles; never resolves when idle
async fn settle(inflight: &mut Option<PendingSubmit>) -> Result<SubmitOutcome, SubmissionError> {
    match inflight {
        Some(pending) => pending.await,
        None => std::future::pending().await,
    }
}
