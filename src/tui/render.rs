use super::state::AppState;
use super::{Section, ViewState};
use crate::engine::ranking::{h2h_comparison, rank_best_outcomes, H2H_MARKET};
use crate::pipeline::GameCard;
use crate::engine::schedule::parse_commence_time;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

pub fn draw(f: &mut Frame, state: &AppState, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // sport group filter bar
            Constraint::Length(1), // section tabs
            Constraint::Min(5),    // game table / detail
            Constraint::Length(5), // logs
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    draw_filter_bar(f, state, chunks[1]);
    draw_section_tabs(f, state, view, chunks[2]);
    if view.detail {
        draw_detail(f, state, view, chunks[3]);
    } else {
        draw_games(f, state, view, chunks[3]);
    }
    draw_logs(f, state, chunks[4]);
    draw_footer(f, view, chunks[5]);
}

/// Cards for one board section, list-order as the pipeline sorted them.
pub fn section_cards(board: &crate::pipeline::Board, section: Section) -> &[GameCard] {
    match section {
        Section::Live => &board.live,
        Section::Future => &board.future,
        Section::Finished => &board.finished,
    }
}

fn fmt_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.2}", p),
        None => "-".to_string(),
    }
}

/// Provider commence time rendered in the viewer's local timezone.
fn fmt_commence_local(raw: &str) -> String {
    match parse_commence_time(raw) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%b %d %H:%M")
            .to_string(),
        None => format!("?? {}", raw),
    }
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let quota_color = if state.quota_low() {
        Color::Red
    } else {
        Color::Green
    };

    let status = if state.loading {
        Span::styled("LOADING", Style::default().fg(Color::Yellow))
    } else if state.error.is_some() {
        Span::styled("ERROR", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("OK", Style::default().fg(Color::Green))
    };

    let mut spans = vec![
        Span::styled("ODDSBOARD ", Style::default().add_modifier(Modifier::BOLD)),
        status,
        Span::raw("  |  API quota "),
        Span::styled(
            format!(
                "{} used / {} left",
                state.api_requests_used, state.api_requests_remaining
            ),
            Style::default().fg(quota_color),
        ),
        Span::raw(format!(
            "  |  refreshed {}  |  up {}",
            state.refresh_age(),
            state.uptime()
        )),
    ];
    if let Some(err) = &state.error {
        spans.push(Span::styled(
            format!("  |  {}", err),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_filter_bar(f: &mut Frame, state: &AppState, area: Rect) {
    let favorites = &state.selections.favorite_groups;

    let mut titles: Vec<Line> = vec![Line::from("All")];
    for group in &state.groups {
        let mut spans = Vec::new();
        if favorites.contains(&group.group) {
            spans.push(Span::styled("★", Style::default().fg(Color::Yellow)));
        }
        spans.push(Span::raw(group.group.clone()));
        titles.push(Line::from(spans));
    }

    // Position 0 is "All"; group positions are shifted by one.
    let selected = state
        .selections
        .selected_group
        .as_deref()
        .and_then(|name| state.groups.iter().position(|g| g.group == name))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Sports"));
    f.render_widget(tabs, area);
}

fn draw_section_tabs(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let (live, future, finished) = state.board.counts();
    let sections = [
        (Section::Live, live, Color::Green),
        (Section::Future, future, Color::Cyan),
        (Section::Finished, finished, Color::DarkGray),
    ];

    let mut spans = Vec::new();
    for (section, count, color) in sections {
        let style = if section == view.section {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" {} ({}) ", section.title(), count),
            style,
        ));
        spans.push(Span::raw("|"));
    }
    spans.pop();

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_games(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let cards = section_cards(&state.board, view.section);

    let header = Row::new(vec!["Start", "Matchup", "League", "1", "X", "2", "Best via"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let e = &card.event;
            let league = e.league.clone().unwrap_or_else(|| e.sport_title.clone());
            let best_via = card
                .odds
                .home
                .bookmaker
                .clone()
                .or_else(|| card.odds.away.bookmaker.clone())
                .unwrap_or_else(|| "-".to_string());
            let style = if i == view.selected {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(fmt_commence_local(&e.commence_time)),
                Cell::from(format!("{} @ {}", e.away_team, e.home_team)),
                Cell::from(league),
                Cell::from(fmt_price(card.odds.home.price)),
                Cell::from(fmt_price(card.odds.draw.price)),
                Cell::from(fmt_price(card.odds.away.price)),
                Cell::from(best_via),
            ])
            .style(style)
        })
        .collect();

    let title = if cards.is_empty() {
        format!("{} — no games", view.section.title())
    } else {
        format!("{} games", view.section.title())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Min(28),
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(table, area);
}

/// Detail pane: per-bookmaker h2h comparison with the best price per column
/// highlighted, plus a read-only line per non-h2h market.
fn draw_detail(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let cards = section_cards(&state.board, view.section);
    let Some(card) = cards.get(view.selected) else {
        f.render_widget(
            Paragraph::new("No event selected")
                .block(Block::default().borders(Borders::ALL).title("Detail")),
            area,
        );
        return;
    };
    let event = &card.event;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(4), Constraint::Length(4)])
        .split(area.inner(ratatui::layout::Margin::new(1, 1)));

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} @ {}", event.away_team, event.home_team));
    f.render_widget(outer, area);

    let league = event
        .league
        .clone()
        .unwrap_or_else(|| event.sport_title.clone());
    let info = Paragraph::new(vec![Line::from(format!(
        "{}  |  starts {}  |  {} bookmakers",
        league,
        fmt_commence_local(&event.commence_time),
        event.bookmakers.len()
    ))]);
    f.render_widget(info, chunks[0]);

    let quotes = h2h_comparison(event, state.selections.name_match);
    let best = rank_best_outcomes(&event.bookmakers);
    let best_for = |team: &str| -> Option<f64> {
        best.iter().find(|b| b.name == team).map(|b| b.price)
    };
    let best_home = best_for(&event.home_team);
    let best_away = best_for(&event.away_team);
    let best_draw = best_for(crate::engine::ranking::DRAW_LABEL);

    let price_cell = |price: Option<f64>, best: Option<f64>| -> Cell {
        let text = fmt_price(price);
        match (price, best) {
            (Some(p), Some(b)) if p == b => Cell::from(text).style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            _ => Cell::from(text),
        }
    };

    let header = Row::new(vec!["Bookmaker", "1", "X", "2", "Updated"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = quotes
        .iter()
        .map(|q| {
            Row::new(vec![
                Cell::from(q.bookmaker.clone()),
                price_cell(q.home, best_home),
                price_cell(q.draw, best_draw),
                price_cell(q.away, best_away),
                Cell::from(q.last_update.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(22),
        ],
    )
    .header(header);
    f.render_widget(table, chunks[1]);

    f.render_widget(Paragraph::new(other_market_lines(event)), chunks[2]);
}

/// Compact read-only rendering of non-h2h markets (totals, spreads, ...):
/// one line per market key from the first bookmaker offering it.
fn other_market_lines(event: &crate::feed::types::Event) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for bm in &event.bookmakers {
        for market in &bm.markets {
            if market.key == H2H_MARKET || seen.contains(&market.key.as_str()) {
                continue;
            }
            seen.push(&market.key);
            let outcomes = market
                .outcomes
                .iter()
                .map(|o| {
                    let point = o
                        .point
                        .map(|p| format!(" {:+}", p))
                        .unwrap_or_default();
                    format!("{}{} @ {}", o.name, point, fmt_price(o.price.as_f64()))
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", market.key),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!("({}): {}", bm.title, outcomes)),
            ]));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "no other markets",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let level_color = match entry.level.as_str() {
                "WARN" | "ERROR" => Color::Red,
                _ => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    format!("{} {} ", entry.time, entry.level),
                    Style::default().fg(level_color),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    let logs = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"));
    f.render_widget(logs, area);
}

fn draw_footer(f: &mut Frame, view: &ViewState, area: Rect) {
    let help = if view.detail {
        "esc back | tab section | q quit"
    } else {
        "↑↓ select | enter detail | tab section | ←→ sport | f favorite | c clear favs | r refresh | q quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        area,
    );
}
