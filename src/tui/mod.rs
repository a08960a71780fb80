pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::watch;

/// Commands the TUI sends back to the engine loop.
#[derive(Debug, Clone)]
pub enum TuiCommand {
    Quit,
    Refresh,
    NextGroup,
    PrevGroup,
    ToggleFavorite,
    ClearFavorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Live,
    Future,
    Finished,
}

impl Section {
    pub fn next(self) -> Self {
        match self {
            Section::Live => Section::Future,
            Section::Future => Section::Finished,
            Section::Finished => Section::Live,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Live => "Live",
            Section::Future => "Future",
            Section::Finished => "Finished",
        }
    }
}

/// Local view state the engine never needs: which section has focus, which
/// row is selected, and whether the detail pane is open.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub section: Section,
    pub selected: usize,
    pub detail: bool,
}

impl ViewState {
    fn new() -> Self {
        Self {
            section: Section::Live,
            selected: 0,
            detail: false,
        }
    }
}

/// Run the TUI. Reads state from `state_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(
    state_rx: watch::Receiver<AppState>,
    cmd_tx: tokio::sync::mpsc::Sender<TuiCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state_rx: watch::Receiver<AppState>,
    cmd_tx: tokio::sync::mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut view = ViewState::new();

    loop {
        let state = state_rx.borrow().clone();

        // Keep the cursor valid when the focused section shrinks under it.
        let section_len = render::section_cards(&state.board, view.section).len();
        if view.selected >= section_len {
            view.selected = section_len.saturating_sub(1);
        }

        terminal.draw(|f| render::draw(f, &state, &view))?;

        // Poll for keyboard events with 100ms timeout; redraw on every pass
        // so engine updates show up without a keypress.
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => {
                            let _ = cmd_tx.send(TuiCommand::Quit).await;
                            return Ok(());
                        }
                        KeyCode::Char('r') => {
                            let _ = cmd_tx.send(TuiCommand::Refresh).await;
                        }
                        KeyCode::Tab => {
                            view.section = view.section.next();
                            view.selected = 0;
                            view.detail = false;
                        }
                        KeyCode::Up => {
                            view.selected = view.selected.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            if view.selected + 1 < section_len {
                                view.selected += 1;
                            }
                        }
                        KeyCode::Enter => {
                            if section_len > 0 {
                                view.detail = true;
                            }
                        }
                        KeyCode::Esc => {
                            view.detail = false;
                        }
                        KeyCode::Right => {
                            view.selected = 0;
                            view.detail = false;
                            let _ = cmd_tx.send(TuiCommand::NextGroup).await;
                        }
                        KeyCode::Left => {
                            view.selected = 0;
                            view.detail = false;
                            let _ = cmd_tx.send(TuiCommand::PrevGroup).await;
                        }
                        KeyCode::Char('f') => {
                            let _ = cmd_tx.send(TuiCommand::ToggleFavorite).await;
                        }
                        KeyCode::Char('c') => {
                            let _ = cmd_tx.send(TuiCommand::ClearFavorites).await;
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
