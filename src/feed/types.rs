use serde::Deserialize;

/// the-odds-api.com v4 wire types. The provider's typing is loose in
/// practice: prices occasionally arrive as numeric strings and commence
/// times as strings that don't parse, so the raw values are kept here and
/// validated at the point of use.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    pub id: String,
    pub sport_key: String,
    #[serde(default)]
    pub sport_title: String,
    /// Competition name when the provider sends one (most sports don't).
    #[serde(default)]
    pub league: Option<String>,
    pub home_team: String,
    pub away_team: String,
    /// Raw provider string; may be unparseable (observed in the wild).
    pub commence_time: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: RawPrice,
    /// Line for totals/spreads markets; h2h outcomes don't carry one.
    #[serde(default)]
    pub point: Option<f64>,
}

/// A price as delivered: usually a JSON number, occasionally a
/// numeric-looking string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    /// Coerce to f64. Returns None for anything non-numeric so a bad price
    /// disqualifies its outcome instead of poisoning a max comparison with
    /// NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawPrice::Number(n) if n.is_finite() => Some(*n),
            RawPrice::Number(_) => None,
            RawPrice::Text(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        }
    }
}

/// Catalog row from the free `/v4/sports` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Sport {
    pub key: String,
    pub group: String,
    pub title: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub has_outrights: bool,
}

/// One filter-bar entry: a sport group and the event sport keys under it.
#[derive(Debug, Clone, PartialEq)]
pub struct SportGroup {
    pub group: String,
    pub keys: Vec<String>,
}

/// Group the catalog for the filter bar. Outright-only sports are skipped
/// since they have no h2h market to rank.
pub fn group_sports(sports: &[Sport]) -> Vec<SportGroup> {
    let mut groups: Vec<SportGroup> = Vec::new();
    for sport in sports.iter().filter(|s| s.active && !s.has_outrights) {
        match groups.iter_mut().find(|g| g.group == sport.group) {
            Some(group) => {
                if !group.keys.contains(&sport.key) {
                    group.keys.push(sport.key.clone());
                }
            }
            None => groups.push(SportGroup {
                group: sport.group.clone(),
                keys: vec![sport.key.clone()],
            }),
        }
    }
    groups
}

/// API usage quota extracted from response headers.
#[derive(Debug, Clone, Default)]
pub struct ApiQuota {
    pub requests_used: u64,
    pub requests_remaining: u64,
}
