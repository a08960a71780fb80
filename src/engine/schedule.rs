use crate::feed::types::Event;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// Assumed maximum match duration: an event is treated as live for this long
/// after its start time. Overridable per call for sports that run longer.
pub const DEFAULT_GAME_DURATION_MINS: i64 = 180;

pub fn default_game_duration() -> Duration {
    Duration::minutes(DEFAULT_GAME_DURATION_MINS)
}

/// Sentinel sport key meaning "no filter".
pub const ALL_SPORTS: &str = "all";

/// Parse a provider commence time. None for anything that isn't RFC 3339;
/// callers treat that as a distinct invalid case rather than a panic.
pub fn parse_commence_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Default)]
pub struct GameBuckets {
    pub live: Vec<Event>,
    pub future: Vec<Event>,
    pub finished: Vec<Event>,
}

/// Partition events into live/future/finished against a caller-supplied
/// reference time.
///
/// Live means `start <= now <= start + duration` (both bounds inclusive);
/// future means `start > now`; finished means `start + duration < now`.
/// Events with unparseable start times land in no bucket at all — dropping
/// them surfaces malformed data instead of silently burying it under
/// "finished".
///
/// `now` is a parameter so two renders of the same snapshot agree on every
/// event's bucket; nothing here reads the wall clock.
pub fn categorize_by_time(events: &[Event], now: DateTime<Utc>, duration: Duration) -> GameBuckets {
    let mut buckets = GameBuckets::default();

    for event in events {
        let Some(start) = parse_commence_time(&event.commence_time) else {
            continue;
        };
        let end = start + duration;
        if start <= now && now <= end {
            buckets.live.push(event.clone());
        } else if start > now {
            buckets.future.push(event.clone());
        } else if end < now {
            buckets.finished.push(event.clone());
        }
    }

    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort events by commence time into a new list. Events with unparseable
/// times always sort after every valid one, in both directions. Equal
/// timestamps (and pairs of invalid times) tie-break by id, ascending, so
/// the order never depends on input ordering.
pub fn sort_by_commence_time(events: &[Event], direction: SortDirection) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| {
        let ta = parse_commence_time(&a.commence_time);
        let tb = parse_commence_time(&b.commence_time);
        match (ta, tb) {
            (None, None) => a.id.cmp(&b.id),
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let by_time = match direction {
                    SortDirection::Asc => x.cmp(&y),
                    SortDirection::Desc => y.cmp(&x),
                };
                by_time.then_with(|| a.id.cmp(&b.id))
            }
        }
    });
    sorted
}

/// Keep only events whose sport key is selected. An empty selection, or one
/// containing the "all" sentinel, means no filter; the full list is returned
/// as a fresh copy either way.
pub fn filter_by_sport_keys(events: &[Event], selected_keys: &[String]) -> Vec<Event> {
    if selected_keys.is_empty() || selected_keys.iter().any(|k| k == ALL_SPORTS) {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| selected_keys.iter().any(|k| k == &e.sport_key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_categorize_buckets_are_exhaustive_and_exclusive() {
        let now = at(1_700_000_000);
        let duration = default_game_duration();
        let events = vec![
            event("live", "soccer_epl", "2023-11-14T22:13:20Z"),   // start == now
            event("future", "soccer_epl", "2023-11-14T23:00:00Z"), // start > now
            event("done", "soccer_epl", "2023-11-14T17:00:00Z"),   // ended > 3h ago
        ];

        let buckets = categorize_by_time(&events, now, duration);
        assert_eq!(buckets.live.len(), 1);
        assert_eq!(buckets.future.len(), 1);
        assert_eq!(buckets.finished.len(), 1);
        assert_eq!(buckets.live[0].id, "live");
        assert_eq!(buckets.future[0].id, "future");
        assert_eq!(buckets.finished[0].id, "done");
    }

    #[test]
    fn test_categorize_window_bounds_are_inclusive() {
        let duration = Duration::minutes(180);
        let start = at(1_700_000_000);
        let events = vec![event("e", "soccer_epl", "2023-11-14T22:13:20Z")];

        // start == now -> live
        let b = categorize_by_time(&events, start, duration);
        assert_eq!(b.live.len(), 1);

        // now == start + duration -> still live (inclusive upper bound)
        let b = categorize_by_time(&events, start + duration, duration);
        assert_eq!(b.live.len(), 1);

        // one second past the window -> finished
        let b = categorize_by_time(&events, start + duration + Duration::seconds(1), duration);
        assert_eq!(b.finished.len(), 1);
        assert!(b.live.is_empty());

        // one second before start -> future
        let b = categorize_by_time(&events, start - Duration::seconds(1), duration);
        assert_eq!(b.future.len(), 1);
    }

    #[test]
    fn test_categorize_drops_unparseable_dates() {
        let now = at(1_700_000_000);
        let events = vec![
            event("bad", "soccer_epl", "not-a-date"),
            event("good", "soccer_epl", "2023-11-15T00:00:00Z"),
        ];
        let buckets = categorize_by_time(&events, now, default_game_duration());
        assert_eq!(buckets.future.len(), 1);
        assert_eq!(buckets.future[0].id, "good");
        assert!(buckets.live.is_empty());
        assert!(buckets.finished.is_empty());
    }

    #[test]
    fn test_categorize_custom_duration() {
        // With a 1-minute window the same event is finished, not live.
        let start = at(1_700_000_000);
        let events = vec![event("e", "soccer_epl", "2023-11-14T22:13:20Z")];
        let b = categorize_by_time(&events, start + Duration::minutes(5), Duration::minutes(1));
        assert_eq!(b.finished.len(), 1);
    }

    #[test]
    fn test_sort_ascending_with_id_tiebreak() {
        let events = vec![
            event("b", "soccer_epl", "2026-02-01T15:00:00Z"),
            event("a", "soccer_epl", "2026-02-01T15:00:00Z"),
        ];
        let sorted = sort_by_commence_time(&events, SortDirection::Asc);
        assert_eq!(sorted[0].id, "a");
        assert_eq!(sorted[1].id, "b");
    }

    #[test]
    fn test_sort_descending() {
        let events = vec![
            event("early", "soccer_epl", "2026-02-01T12:00:00Z"),
            event("late", "soccer_epl", "2026-02-01T18:00:00Z"),
        ];
        let sorted = sort_by_commence_time(&events, SortDirection::Desc);
        assert_eq!(sorted[0].id, "late");
        assert_eq!(sorted[1].id, "early");
    }

    #[test]
    fn test_sort_invalid_dates_always_last() {
        let events = vec![
            event("bad2", "soccer_epl", "???"),
            event("ok", "soccer_epl", "2026-02-01T12:00:00Z"),
            event("bad1", "soccer_epl", "not-a-date"),
        ];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_by_commence_time(&events, direction);
            assert_eq!(sorted[0].id, "ok");
            // invalid pair itself ordered by id
            assert_eq!(sorted[1].id, "bad1");
            assert_eq!(sorted[2].id, "bad2");
        }
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let events = vec![
            event("b", "soccer_epl", "2026-02-01T18:00:00Z"),
            event("a", "soccer_epl", "2026-02-01T12:00:00Z"),
        ];
        let _ = sort_by_commence_time(&events, SortDirection::Asc);
        assert_eq!(events[0].id, "b");
    }

    #[test]
    fn test_filter_by_sport_keys() {
        let events = vec![
            event("1", "soccer_epl", "2026-02-01T12:00:00Z"),
            event("2", "basketball_nba", "2026-02-01T12:00:00Z"),
            event("3", "soccer_epl", "2026-02-01T13:00:00Z"),
        ];

        let filtered = filter_by_sport_keys(&events, &["soccer_epl".to_string()]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, "1");
        assert_eq!(filtered[1].id, "3");

        // empty selection and the "all" sentinel both mean no filter
        assert_eq!(filter_by_sport_keys(&events, &[]).len(), 3);
        assert_eq!(filter_by_sport_keys(&events, &["all".to_string()]).len(), 3);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let events = vec![
            event("1", "soccer_epl", "2026-02-01T12:00:00Z"),
            event("2", "basketball_nba", "2026-02-01T12:00:00Z"),
        ];
        let keys = vec!["soccer_epl".to_string()];
        let once = filter_by_sport_keys(&events, &keys);
        let twice = filter_by_sport_keys(&once, &keys);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_inputs_return_empty_shapes() {
        let buckets = categorize_by_time(&[], at(0), default_game_duration());
        assert!(buckets.live.is_empty());
        assert!(buckets.future.is_empty());
        assert!(buckets.finished.is_empty());
        assert!(sort_by_commence_time(&[], SortDirection::Asc).is_empty());
        assert!(filter_by_sport_keys(&[], &["soccer_epl".to_string()]).is_empty());
    }
}
