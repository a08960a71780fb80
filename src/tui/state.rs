use crate::feed::types::SportGroup;
use crate::pipeline::{Board, BoardSelections};
use std::collections::VecDeque;
use std::time::Instant;

/// Snapshot published by the engine loop after every fetch or selection
/// change. The TUI only ever reads it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub loading: bool,
    pub error: Option<String>,
    pub board: Board,
    /// Filter-bar groups, favorites first.
    pub groups: Vec<SportGroup>,
    pub selections: BoardSelections,
    pub api_requests_used: u64,
    pub api_requests_remaining: u64,
    pub quota_warning_threshold: u64,
    pub last_refresh: Option<Instant>,
    pub start_time: Instant,
    pub logs: VecDeque<LogEntry>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new(selections: BoardSelections) -> Self {
        Self {
            loading: true,
            error: None,
            board: Board::default(),
            groups: Vec::new(),
            selections,
            api_requests_used: 0,
            api_requests_remaining: 0,
            quota_warning_threshold: 0,
            last_refresh: None,
            start_time: Instant::now(),
            logs: VecDeque::with_capacity(100),
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        if self.logs.len() >= 100 {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }

    /// Age of the last successful fetch, for the header.
    pub fn refresh_age(&self) -> String {
        match self.last_refresh {
            Some(t) => format!("{}s ago", t.elapsed().as_secs()),
            None => "never".to_string(),
        }
    }

    pub fn quota_low(&self) -> bool {
        self.quota_warning_threshold > 0
            && self.api_requests_remaining < self.quota_warning_threshold
    }
}
