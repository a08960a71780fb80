use crate::feed::types::{Bookmaker, Event, Market};
use serde::Deserialize;

/// Market key for the head-to-head (moneyline) market; the only market type
/// the ranker consumes.
pub const H2H_MARKET: &str = "h2h";

/// Outcome label bookmakers use for a draw in three-way h2h markets.
pub const DRAW_LABEL: &str = "Draw";

/// Best price found for one distinct outcome name across all bookmakers.
#[derive(Debug, Clone, PartialEq)]
pub struct BestOutcome {
    pub name: String,
    pub price: f64,
    pub bookmaker: String,
}

/// Find the best (highest) price per distinct outcome name within the h2h
/// market of every bookmaker.
///
/// Bookmakers without an h2h market contribute nothing. Outcomes whose price
/// doesn't coerce to a number are skipped. Equal best prices keep the
/// first-seen bookmaker, so output is deterministic for a fixed input
/// ordering; result order is first-seen outcome order.
pub fn rank_best_outcomes(bookmakers: &[Bookmaker]) -> Vec<BestOutcome> {
    let mut best: Vec<BestOutcome> = Vec::new();

    for bookmaker in bookmakers {
        let Some(market) = bookmaker.markets.iter().find(|m| m.key == H2H_MARKET) else {
            continue;
        };
        for outcome in &market.outcomes {
            let Some(price) = outcome.price.as_f64() else {
                continue;
            };
            match best.iter_mut().find(|b| b.name == outcome.name) {
                Some(entry) if price > entry.price => {
                    entry.price = price;
                    entry.bookmaker = bookmaker.title.clone();
                }
                Some(_) => {}
                None => best.push(BestOutcome {
                    name: outcome.name.clone(),
                    price,
                    bookmaker: bookmaker.title.clone(),
                }),
            }
        }
    }

    best
}

/// How outcome names are matched against team names. Exact is the default:
/// team names can be substrings of each other, and bookmakers echo the
/// provider's team names verbatim on h2h markets. Contains is kept for feeds
/// that decorate outcome names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatch {
    #[default]
    Exact,
    Contains,
}

impl NameMatch {
    pub fn matches(self, outcome_name: &str, team: &str) -> bool {
        match self {
            NameMatch::Exact => outcome_name == team,
            NameMatch::Contains => outcome_name
                .to_lowercase()
                .contains(&team.to_lowercase()),
        }
    }
}

/// One matched home/away/draw slot. All fields None means "no price found",
/// which is distinct from a legitimate zero price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestSlot {
    pub price: Option<f64>,
    pub outcome: Option<String>,
    pub bookmaker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamOdds {
    pub home: BestSlot,
    pub away: BestSlot,
    pub draw: BestSlot,
}

fn pick_slot(best: &[BestOutcome], matches: impl Fn(&str) -> bool) -> BestSlot {
    let mut chosen: Option<&BestOutcome> = None;
    for candidate in best.iter().filter(|b| matches(&b.name)) {
        match chosen {
            Some(current) if candidate.price <= current.price => {}
            _ => chosen = Some(candidate),
        }
    }
    match chosen {
        Some(b) => BestSlot {
            price: Some(b.price),
            outcome: Some(b.name.clone()),
            bookmaker: Some(b.bookmaker.clone()),
        },
        None => BestSlot::default(),
    }
}

/// Map ranked outcomes onto home/away/draw slots for an event. The draw slot
/// always matches the literal "Draw" label exactly, regardless of mode.
pub fn select_team_odds(
    best: &[BestOutcome],
    home_team: &str,
    away_team: &str,
    mode: NameMatch,
) -> TeamOdds {
    TeamOdds {
        home: pick_slot(best, |name| mode.matches(name, home_team)),
        away: pick_slot(best, |name| mode.matches(name, away_team)),
        draw: pick_slot(best, |name| name == DRAW_LABEL),
    }
}

/// One bookmaker's h2h quote line for the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmakerQuote {
    pub bookmaker: String,
    pub last_update: String,
    pub home: Option<f64>,
    pub away: Option<f64>,
    pub draw: Option<f64>,
}

fn market_price(market: &Market, matches: impl Fn(&str) -> bool) -> Option<f64> {
    market
        .outcomes
        .iter()
        .filter(|o| matches(&o.name))
        .filter_map(|o| o.price.as_f64())
        .fold(None, |acc, p| match acc {
            Some(a) if a >= p => Some(a),
            _ => Some(p),
        })
}

/// Per-bookmaker h2h comparison rows for an event's detail view, in the
/// provider's bookmaker order. Bookmakers without an h2h market are omitted.
pub fn h2h_comparison(event: &Event, mode: NameMatch) -> Vec<BookmakerQuote> {
    event
        .bookmakers
        .iter()
        .filter_map(|bm| {
            let market = bm.markets.iter().find(|m| m.key == H2H_MARKET)?;
            Some(BookmakerQuote {
                bookmaker: bm.title.clone(),
                last_update: bm.last_update.clone(),
                home: market_price(market, |n| mode.matches(n, &event.home_team)),
                away: market_price(market, |n| mode.matches(n, &event.away_team)),
                draw: market_price(market, |n| n == DRAW_LABEL),
            })
        })
        .collect()
}
