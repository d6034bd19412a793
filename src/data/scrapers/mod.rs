//! Web scrapers for season ranking tables

pub mod teamrankings;

use crate::RankingEntry;
use std::fmt;

/// Trait for all ranking sources
pub trait RankingSource {
    /// Human-readable name of the ranking provider
    fn name(&self) -> &'static str;

    /// Fetch the published ranking table for a specific season year
    fn fetch_season(&self, year: u16) -> SeasonFetch;
}

/// Outcome of a single season fetch. Failures are values, not errors:
/// the orchestrator consumes a skip and moves to the next season.
#[derive(Debug, Clone)]
pub enum SeasonFetch {
    /// Parsed entries, in published table order
    Ranked(Vec<RankingEntry>),
    /// Nothing usable for this season
    Skipped(SkipReason),
}

/// Why a season produced no rankings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Remote answered with a non-success status
    HttpStatus(u16),
    /// Request failed before a usable response arrived
    Transport(String),
    /// Response carried no table with Team and Rank columns
    NoTable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HttpStatus(status) => write!(f, "HTTP {}", status),
            SkipReason::Transport(message) => write!(f, "request failed: {}", message),
            SkipReason::NoTable => write!(f, "no ranking table found"),
        }
    }
}
