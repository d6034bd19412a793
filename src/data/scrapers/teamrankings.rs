//! teamrankings.com scraper for end-of-season predictive rankings
//!
//! Each season's table is published under a reference date; the April 1
//! snapshot captures the post-tournament state. Supports caching HTML
//! pages for offline runs and reduced load.

use super::{RankingSource, SeasonFetch, SkipReason};
use crate::{RankingEntry, Result, ScrapeConfig};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};

/// Scraper for teamrankings.com
pub struct TeamRankingsScraper {
    client: reqwest::blocking::Client,
    record_pattern: Regex,
    /// Optional cache directory for offline HTML files
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl TeamRankingsScraper {
    pub fn new(config: &ScrapeConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        TeamRankingsScraper {
            client,
            record_pattern: Regex::new(r"\s*\(\d+-\d+\)").unwrap(),
            cache_dir: None,
            offline_only: false,
        }
    }

    /// Create scraper with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    /// Ranking URL for a season, keyed by its April 1 reference date
    pub fn season_url(year: u16) -> String {
        let reference_date = NaiveDate::from_ymd_opt(i32::from(year), 4, 1)
            .expect("April 1 exists in every year");
        format!(
            "https://www.teamrankings.com/ncaa-basketball/ranking/predictive-by-other-type?date={}",
            reference_date.format("%Y-%m-%d")
        )
    }

    /// Get the cache file path for a URL
    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            let filename = url
                .replace("https://", "")
                .replace("http://", "")
                .replace('/', "_")
                .replace('?', "_")
                + ".html";
            dir.join(filename)
        })
    }

    /// Load HTML from cache if available
    fn load_from_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    /// Save HTML to cache
    fn save_to_cache(&self, url: &str, html: &str) -> Result<()> {
        if let Some(path) = self.cache_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, html)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    /// Parse a rankings page into entries, preserving table order.
    ///
    /// The ranking table is the first one whose header row carries both
    /// a Team and a Rank column; rows that do not yield an integer rank
    /// are skipped. Returns an empty list when no such table exists.
    pub fn parse_page(&self, html: &str) -> Vec<RankingEntry> {
        let document = Html::parse_document(html);

        let table_selector = Selector::parse("table").unwrap();
        let header_selector = Selector::parse("th").unwrap();
        let row_selector = Selector::parse("tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        for table in document.select(&table_selector) {
            let headers: Vec<String> = table
                .select(&header_selector)
                .map(|th| th.text().collect::<String>().trim().to_string())
                .collect();

            let rank_col = headers.iter().position(|h| h.eq_ignore_ascii_case("rank"));
            let team_col = headers.iter().position(|h| h.eq_ignore_ascii_case("team"));
            let (rank_col, team_col) = match (rank_col, team_col) {
                (Some(rank_col), Some(team_col)) => (rank_col, team_col),
                _ => continue,
            };

            let mut entries = Vec::new();
            for row in table.select(&row_selector) {
                let cells: Vec<String> = row
                    .select(&cell_selector)
                    .map(|td| td.text().collect::<String>().trim().to_string())
                    .collect();

                // Header rows carry no td cells and fall through here
                if cells.len() <= rank_col.max(team_col) {
                    continue;
                }

                let rank = match cells[rank_col].parse::<u32>() {
                    Ok(rank) => rank,
                    Err(_) => continue,
                };
                let raw_label = cells[team_col].clone();
                let name = self.clean_label(&raw_label);
                if name.is_empty() {
                    continue;
                }

                entries.push(RankingEntry {
                    raw_label,
                    name,
                    rank,
                });
            }

            if !entries.is_empty() {
                return entries;
            }
        }

        Vec::new()
    }

    /// Strip the trailing parenthetical win-loss record and trim.
    /// "Louisville (29-3)" becomes "Louisville".
    fn clean_label(&self, label: &str) -> String {
        self.record_pattern.replace_all(label, "").trim().to_string()
    }
}

impl RankingSource for TeamRankingsScraper {
    fn name(&self) -> &'static str {
        "teamrankings.com"
    }

    fn fetch_season(&self, year: u16) -> SeasonFetch {
        let url = Self::season_url(year);

        let html = if let Some(cached) = self.load_from_cache(&url) {
            cached
        } else if self.offline_only {
            return SeasonFetch::Skipped(SkipReason::Transport(format!(
                "no cached page for {} (offline mode)",
                url
            )));
        } else {
            log::debug!("Fetching {}", url);
            match self.client.get(&url).send() {
                Ok(response) if response.status().is_success() => match response.text() {
                    Ok(html) => {
                        if let Err(e) = self.save_to_cache(&url, &html) {
                            log::warn!("Failed to cache {}: {}", url, e);
                        }
                        html
                    }
                    Err(e) => return SeasonFetch::Skipped(SkipReason::Transport(e.to_string())),
                },
                Ok(response) => {
                    return SeasonFetch::Skipped(SkipReason::HttpStatus(
                        response.status().as_u16(),
                    ))
                }
                Err(e) => return SeasonFetch::Skipped(SkipReason::Transport(e.to_string())),
            }
        };

        let entries = self.parse_page(&html);
        if entries.is_empty() {
            return SeasonFetch::Skipped(SkipReason::NoTable);
        }

        for entry in entries.iter().take(3) {
            log::debug!("  #{} {}", entry.rank, entry.name);
        }

        SeasonFetch::Ranked(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANKINGS_PAGE: &str = r#"
        <html><body>
        <table class="datatable">
          <thead>
            <tr><th>Rank</th><th>Team</th><th>Rating</th></tr>
          </thead>
          <tbody>
            <tr><td>1</td><td>Louisville  (29-3)</td><td>25.1</td></tr>
            <tr><td>2</td><td>Florida (26-7)</td><td>24.3</td></tr>
            <tr><td>3</td><td>Miami (FL) (27-6)</td><td>23.8</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    fn scraper() -> TeamRankingsScraper {
        TeamRankingsScraper::new(&ScrapeConfig::default())
    }

    #[test]
    fn test_season_url_uses_reference_date() {
        let url = TeamRankingsScraper::season_url(2013);
        assert!(url.ends_with("?date=2013-04-01"));
    }

    #[test]
    fn test_clean_label() {
        let scraper = scraper();

        assert_eq!(scraper.clean_label("Louisville (29-3)"), "Louisville");
        assert_eq!(scraper.clean_label("  Gonzaga  "), "Gonzaga");
        // only the win-loss record is a candidate for removal
        assert_eq!(scraper.clean_label("Miami (FL) (27-6)"), "Miami (FL)");
    }

    #[test]
    fn test_parse_page() {
        let entries = scraper().parse_page(RANKINGS_PAGE);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].name, "Louisville");
        assert_eq!(entries[0].raw_label, "Louisville  (29-3)");
        assert_eq!(entries[2].name, "Miami (FL)");
    }

    #[test]
    fn test_parse_page_requires_team_and_rank_headers() {
        let html = r#"
            <table>
              <tr><th>Rank</th><th>Rating</th></tr>
              <tr><td>1</td><td>25.1</td></tr>
            </table>
        "#;
        assert!(scraper().parse_page(html).is_empty());
    }

    #[test]
    fn test_parse_page_without_table() {
        assert!(scraper().parse_page("<html><body>maintenance</body></html>").is_empty());
    }

    #[test]
    fn test_fetch_season_from_cache() {
        let cache = tempfile::tempdir().unwrap();
        let scraper = scraper().with_cache(cache.path()).offline_only(true);

        let url = TeamRankingsScraper::season_url(2013);
        scraper.save_to_cache(&url, RANKINGS_PAGE).unwrap();

        match scraper.fetch_season(2013) {
            SeasonFetch::Ranked(entries) => assert_eq!(entries.len(), 3),
            SeasonFetch::Skipped(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_fetch_season_offline_without_cache() {
        let cache = tempfile::tempdir().unwrap();
        let scraper = scraper().with_cache(cache.path()).offline_only(true);

        assert!(matches!(
            scraper.fetch_season(2014),
            SeasonFetch::Skipped(SkipReason::Transport(_))
        ));
    }
}
