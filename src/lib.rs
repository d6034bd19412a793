//! College basketball power ranking backfill
//!
//! Scrapes end-of-season predictive rankings per season and merges them
//! into a historical statistics table using fuzzy team-name matching.

pub mod data;
pub mod matching;
pub mod merge;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One ranked team as published for a season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    /// Scraped cell text, e.g. "Louisville (29-3)"
    pub raw_label: String,
    /// Label with the trailing win-loss record stripped; the matching key
    pub name: String,
    pub rank: u32,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum RankError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Season {0} is not supported by the ranking source")]
    UnsupportedSeason(u16),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, RankError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub scrape: ScrapeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub input_path: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Pause after each fetched season
    pub request_delay_secs: u64,
    /// Longer pause after a skipped season
    pub error_delay_secs: u64,
    pub first_season: u16,
    pub last_season: u16,
    pub excluded_seasons: Vec<u16>,
}

impl ScrapeConfig {
    /// Seasons to process, in order, with exclusions applied
    pub fn seasons(&self) -> Vec<u16> {
        (self.first_season..=self.last_season)
            .filter(|year| !self.excluded_seasons.contains(year))
            .collect()
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            input_path: "cbb2.csv".to_string(),
            output_path: "cbb2_ranked.csv".to_string(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            timeout_secs: 30,
            request_delay_secs: 2,
            error_delay_secs: 3,
            first_season: 2013,
            last_season: 2024,
            // The 2020 tournament was cancelled; no end-of-season table exists
            excluded_seasons: vec![2020],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig::default(),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RankError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| RankError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RankError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
