use crate::engine::ranking::{rank_best_outcomes, select_team_odds, NameMatch, TeamOdds};
use crate::engine::schedule::{
    categorize_by_time, default_game_duration, filter_by_sport_keys, sort_by_commence_time,
    SortDirection,
};
use crate::feed::types::{Event, SportGroup};
use chrono::{DateTime, Duration, Utc};

/// Everything the user has selected, captured as one immutable value. A
/// changed selection produces a new value; the whole board is then rebuilt
/// from scratch against it, so there is no ambient filter state to drift.
#[derive(Debug, Clone)]
pub struct BoardSelections {
    /// Sport group driving the key filter; None browses everything.
    pub selected_group: Option<String>,
    /// Favorite groups, in the order they were marked. Rendered first in the
    /// filter bar; session-scoped only.
    pub favorite_groups: Vec<String>,
    pub name_match: NameMatch,
    pub game_duration: Duration,
}

impl Default for BoardSelections {
    fn default() -> Self {
        Self {
            selected_group: None,
            favorite_groups: Vec::new(),
            name_match: NameMatch::Exact,
            game_duration: default_game_duration(),
        }
    }
}

impl BoardSelections {
    pub fn with_group(&self, group: Option<String>) -> Self {
        Self {
            selected_group: group,
            ..self.clone()
        }
    }

    pub fn toggle_favorite(&self, group: &str) -> Self {
        let mut favorites = self.favorite_groups.clone();
        match favorites.iter().position(|g| g == group) {
            Some(idx) => {
                favorites.remove(idx);
            }
            None => favorites.push(group.to_string()),
        }
        Self {
            favorite_groups: favorites,
            ..self.clone()
        }
    }

    pub fn clear_favorites(&self) -> Self {
        Self {
            favorite_groups: Vec::new(),
            ..self.clone()
        }
    }
}

/// One list row: the event plus its best-price summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCard {
    pub event: Event,
    pub odds: TeamOdds,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub live: Vec<GameCard>,
    pub future: Vec<GameCard>,
    pub finished: Vec<GameCard>,
}

impl Board {
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.live.len(), self.future.len(), self.finished.len())
    }
}

/// Resolve a selected group name to its sport keys. Unknown or absent group
/// yields an empty key list, which the filter treats as "no filter".
pub fn selected_keys(groups: &[SportGroup], selected: Option<&str>) -> Vec<String> {
    match selected {
        Some(name) => groups
            .iter()
            .find(|g| g.group == name)
            .map(|g| g.keys.clone())
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Filter-bar ordering: favorites first (in the order they were marked),
/// then the rest in catalog order.
pub fn ordered_groups(groups: &[SportGroup], favorites: &[String]) -> Vec<SportGroup> {
    let mut ordered: Vec<SportGroup> = favorites
        .iter()
        .filter_map(|fav| groups.iter().find(|g| &g.group == fav).cloned())
        .collect();
    ordered.extend(
        groups
            .iter()
            .filter(|g| !favorites.contains(&g.group))
            .cloned(),
    );
    ordered
}

/// Step the group selection through [All, g0, g1, ...] in either direction,
/// wrapping at the ends. `groups` is the display order, so favorites come
/// up first when cycling forward from All.
pub fn next_group(groups: &[SportGroup], current: Option<&str>, step: i64) -> Option<String> {
    if groups.is_empty() {
        return None;
    }
    let n = groups.len() as i64;
    let cur = current
        .and_then(|name| groups.iter().position(|g| g.group == name))
        .map(|i| i as i64 + 1)
        .unwrap_or(0);
    let next = (cur + step).rem_euclid(n + 1);
    if next == 0 {
        None
    } else {
        Some(groups[(next - 1) as usize].group.clone())
    }
}

fn make_card(event: Event, name_match: NameMatch) -> GameCard {
    let best = rank_best_outcomes(&event.bookmakers);
    let odds = select_team_odds(&best, &event.home_team, &event.away_team, name_match);
    GameCard { event, odds }
}

/// Assemble the full board for one render: filter -> categorize -> sort
/// (live and future soonest-first, finished most-recent-first) -> best-price
/// summary per event. Pure in all four arguments; `now` comes from the
/// caller so every section of one render agrees on what "now" is.
pub fn build_board(
    events: &[Event],
    groups: &[SportGroup],
    selections: &BoardSelections,
    now: DateTime<Utc>,
) -> Board {
    let keys = selected_keys(groups, selections.selected_group.as_deref());
    let filtered = filter_by_sport_keys(events, &keys);
    let buckets = categorize_by_time(&filtered, now, selections.game_duration);

    let cards = |events: Vec<Event>, direction: SortDirection| -> Vec<GameCard> {
        sort_by_commence_time(&events, direction)
            .into_iter()
            .map(|e| make_card(e, selections.name_match))
            .collect()
    };

    Board {
        live: cards(buckets.live, SortDirection::Asc),
        future: cards(buckets.future, SortDirection::Asc),
        finished: cards(buckets.finished, SortDirection::Desc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, sport_key: &str, commence_time: &str) -> Event {
        Event {
            id: id.to_string(),
            sport_key: sport_key.to_string(),
            sport_title: String::new(),
            league: None,
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            commence_time: commence_time.to_string(),
            bookmakers: vec![],
        }
    }

    fn groups() -> Vec<SportGroup> {
        vec![
            SportGroup {
                group: "Soccer".into(),
                keys: vec!["soccer_epl".into(), "soccer_spain_la_liga".into()],
            },
            SportGroup {
                group: "Basketball".into(),
                keys: vec!["basketball_nba".into()],
            },
        ]
    }

    #[test]
    fn test_selected_keys_resolution() {
        let groups = groups();
        assert_eq!(
            selected_keys(&groups, Some("Soccer")),
            vec!["soccer_epl".to_string(), "soccer_spain_la_liga".to_string()]
        );
        assert!(selected_keys(&groups, Some("Cricket")).is_empty());
        assert!(selected_keys(&groups, None).is_empty());
    }

    #[test]
    fn test_ordered_groups_favorites_first() {
        let groups = groups();
        let ordered = ordered_groups(&groups, &["Basketball".to_string()]);
        assert_eq!(ordered[0].group, "Basketball");
        assert_eq!(ordered[1].group, "Soccer");
        // a stale favorite not in the catalog is skipped
        let ordered = ordered_groups(&groups, &["Cricket".to_string()]);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].group, "Soccer");
    }

    #[test]
    fn test_toggle_favorite_round_trip() {
        let selections = BoardSelections::default();
        let with_fav = selections.toggle_favorite("Soccer");
        assert_eq!(with_fav.favorite_groups, vec!["Soccer".to_string()]);
        let without = with_fav.toggle_favorite("Soccer");
        assert!(without.favorite_groups.is_empty());
        // original untouched
        assert!(selections.favorite_groups.is_empty());
    }

    #[test]
    fn test_next_group_wraps_both_ways() {
        let groups = groups();
        // forward: All -> Soccer -> Basketball -> All
        assert_eq!(next_group(&groups, None, 1).as_deref(), Some("Soccer"));
        assert_eq!(next_group(&groups, Some("Soccer"), 1).as_deref(), Some("Basketball"));
        assert_eq!(next_group(&groups, Some("Basketball"), 1), None);
        // backward from All wraps to the last group
        assert_eq!(next_group(&groups, None, -1).as_deref(), Some("Basketball"));
        // unknown current resets to All's neighbor
        assert_eq!(next_group(&groups, Some("Cricket"), 1).as_deref(), Some("Soccer"));
        // empty catalog stays on All
        assert_eq!(next_group(&[], None, 1), None);
    }

    #[test]
    fn test_build_board_filters_and_sorts() {
        let now = "2026-02-01T15:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let events = vec![
            event("f2", "soccer_epl", "2026-02-01T20:00:00Z"),
            event("f1", "soccer_epl", "2026-02-01T18:00:00Z"),
            event("nba", "basketball_nba", "2026-02-01T18:00:00Z"),
            event("live", "soccer_epl", "2026-02-01T14:00:00Z"),
            event("done-old", "soccer_epl", "2026-01-31T10:00:00Z"),
            event("done-recent", "soccer_epl", "2026-02-01T10:00:00Z"),
            event("bad-date", "soccer_epl", "garbage"),
        ];
        let selections = BoardSelections::default().with_group(Some("Soccer".into()));

        let board = build_board(&events, &groups(), &selections, now);

        assert_eq!(board.counts(), (1, 2, 2));
        assert_eq!(board.live[0].event.id, "live");
        // future ascending
        assert_eq!(board.future[0].event.id, "f1");
        assert_eq!(board.future[1].event.id, "f2");
        // finished descending (most recent first)
        assert_eq!(board.finished[0].event.id, "done-recent");
        assert_eq!(board.finished[1].event.id, "done-old");
        // NBA filtered out, bad date in no bucket
        assert!(board
            .future
            .iter()
            .chain(&board.live)
            .chain(&board.finished)
            .all(|c| c.event.sport_key == "soccer_epl" && c.event.id != "bad-date"));
    }

    #[test]
    fn test_build_board_no_selection_keeps_everything_parseable() {
        let now = "2026-02-01T15:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let events = vec![
            event("a", "soccer_epl", "2026-02-01T18:00:00Z"),
            event("b", "basketball_nba", "2026-02-01T19:00:00Z"),
        ];
        let board = build_board(&events, &groups(), &BoardSelections::default(), now);
        assert_eq!(board.counts(), (0, 2, 0));
    }

    #[test]
    fn test_build_board_empty_input() {
        let now = "2026-02-01T15:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let board = build_board(&[], &[], &BoardSelections::default(), now);
        assert_eq!(board.counts(), (0, 0, 0));
    }
}
