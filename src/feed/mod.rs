pub mod the_odds_api;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::{ApiQuota, Event, Sport};

#[async_trait]
pub trait OddsFeed: Send + Sync {
    async fn fetch_events(&mut self, sport_key: &str) -> Result<Vec<Event>>;
    async fn fetch_sports(&mut self) -> Result<Vec<Sport>>;
    fn last_quota(&self) -> Option<ApiQuota>;
}
