pub mod ranking;
pub mod schedule;

pub use ranking::{BestOutcome, NameMatch, TeamOdds};
pub use schedule::{GameBuckets, SortDirection};
