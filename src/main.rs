use anyhow::Result;
use chrono::Utc;
use oddsboard::config::Config;
use oddsboard::feed::the_odds_api::{TheOddsApi, UPCOMING_SPORT_KEY};
use oddsboard::feed::types::{group_sports, Event, SportGroup};
use oddsboard::feed::OddsFeed;
use oddsboard::pipeline::{build_board, next_group, ordered_groups, BoardSelections};
use oddsboard::tui::{self, state::AppState, TuiCommand};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

/// The TUI owns the terminal, so tracing output goes to a file.
const LOG_FILE: &str = "oddsboard.log";

fn init_logging() -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    Config::load_env_file();
    init_logging()?;

    let config = Config::load(Path::new("config.toml"))?;
    let api_key = Config::odds_api_key()?;

    let mut feed = TheOddsApi::new(
        api_key,
        &config.odds_feed.base_url,
        &config.odds_feed.regions,
        &config.odds_feed.markets,
    );

    // Validate the key and surface quota before taking over the terminal.
    let quota = feed.check_quota().await?;
    println!(
        "  API key ok — {} requests used, {} remaining",
        quota.requests_used, quota.requests_remaining
    );
    tracing::info!(
        used = quota.requests_used,
        remaining = quota.requests_remaining,
        "odds api key validated"
    );

    let selections = BoardSelections {
        name_match: config.board.name_match,
        game_duration: chrono::Duration::minutes(config.board.game_duration_mins),
        ..Default::default()
    };

    let (state_tx, state_rx) = watch::channel(AppState::new(selections.clone()));
    let (cmd_tx, cmd_rx) = mpsc::channel(16);

    let engine = BoardEngine::new(feed, &config, selections, state_tx);
    let engine_task = tokio::spawn(engine.run(cmd_rx));

    tui::run_tui(state_rx, cmd_tx).await?;
    let _ = engine_task.await;
    Ok(())
}

/// Owns the feed, the raw event snapshot, and the current selections; every
/// fetch or selection change rebuilds the board from scratch and publishes
/// a fresh AppState.
struct BoardEngine {
    feed: TheOddsApi,
    selections: BoardSelections,
    events: Vec<Event>,
    catalog: Vec<SportGroup>,
    poll_interval: Duration,
    quota_warning: u64,
    state_tx: watch::Sender<AppState>,
}

impl BoardEngine {
    fn new(
        feed: TheOddsApi,
        config: &Config,
        selections: BoardSelections,
        state_tx: watch::Sender<AppState>,
    ) -> Self {
        Self {
            feed,
            selections,
            events: Vec::new(),
            catalog: Vec::new(),
            poll_interval: Duration::from_secs(config.odds_feed.poll_interval_s.max(1)),
            quota_warning: config.odds_feed.quota_warning_threshold.unwrap_or(0),
            state_tx,
        }
    }

    /// Rebuild the board against one fixed "now" and push the snapshot out.
    fn publish(&self, refreshed: bool, error: Option<String>) {
        let now = Utc::now();
        let board = build_board(&self.events, &self.catalog, &self.selections, now);
        let groups = ordered_groups(&self.catalog, &self.selections.favorite_groups);
        let quota = self.feed.last_quota().unwrap_or_default();
        let selections = self.selections.clone();
        let quota_warning = self.quota_warning;

        self.state_tx.send_modify(move |s| {
            s.loading = false;
            s.error = error;
            s.board = board;
            s.groups = groups;
            s.selections = selections;
            s.api_requests_used = quota.requests_used;
            s.api_requests_remaining = quota.requests_remaining;
            s.quota_warning_threshold = quota_warning;
            if refreshed {
                s.last_refresh = Some(Instant::now());
            }
        });
    }

    fn log(&self, level: &str, message: String) {
        self.state_tx
            .send_modify(|s| s.push_log(level, message));
    }

    async fn fetch_odds(&mut self) {
        match self.feed.fetch_events(UPCOMING_SPORT_KEY).await {
            Ok(fetched) => {
                tracing::info!(events = fetched.len(), "odds fetch complete");
                self.log("INFO", format!("fetched {} events", fetched.len()));
                // Replace wholesale; there is no incremental merge.
                self.events = fetched;
                self.publish(true, None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "odds fetch failed");
                self.log("WARN", format!("odds fetch failed: {e}"));
                // Keep the previous board on screen with an error banner.
                self.publish(false, Some(format!("odds fetch failed: {e}")));
            }
        }
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<TuiCommand>) {
        match self.feed.fetch_sports().await {
            Ok(sports) => {
                self.catalog = group_sports(&sports);
                tracing::info!(groups = self.catalog.len(), "sports catalog loaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "sports catalog fetch failed");
                self.log("WARN", format!("sports catalog unavailable: {e}"));
            }
        }

        let mut last_poll: Option<Instant> = None;

        loop {
            let due = last_poll.map_or(true, |t| t.elapsed() >= self.poll_interval);
            if due {
                last_poll = Some(Instant::now());
                self.fetch_odds().await;
            }

            let wait = last_poll
                .map(|t| self.poll_interval.saturating_sub(t.elapsed()))
                .unwrap_or_default();

            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    None | Some(TuiCommand::Quit) => return,
                    Some(TuiCommand::Refresh) => {
                        last_poll = None;
                    }
                    Some(TuiCommand::NextGroup) => self.step_group(1),
                    Some(TuiCommand::PrevGroup) => self.step_group(-1),
                    Some(TuiCommand::ToggleFavorite) => {
                        if let Some(group) = self.selections.selected_group.clone() {
                            self.selections = self.selections.toggle_favorite(&group);
                            self.publish(false, None);
                        }
                    }
                    Some(TuiCommand::ClearFavorites) => {
                        self.selections = self.selections.clear_favorites();
                        self.publish(false, None);
                    }
                },
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    fn step_group(&mut self, step: i64) {
        let ordered = ordered_groups(&self.catalog, &self.selections.favorite_groups);
        let next = next_group(&ordered, self.selections.selected_group.as_deref(), step);
        self.selections = self.selections.with_group(next);
        self.publish(false, None);
    }
}
