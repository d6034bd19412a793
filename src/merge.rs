//! Merges fetched season rankings into the dataset
//!
//! Applies matched ranks row by row and drives the sequential
//! season-by-season enrichment loop with its polite delays.

use crate::data::scrapers::{RankingSource, SeasonFetch, SkipReason};
use crate::data::Dataset;
use crate::matching;
use crate::{RankingEntry, ScrapeConfig};
use std::collections::HashMap;
use std::time::Duration;

/// Below this many matches a season logs a sample of unmatched names
const LOW_MATCH_FLOOR: usize = 200;

/// At most this many unmatched names are kept per season
const UNMATCHED_SAMPLE_LEN: usize = 10;

/// Per-season outcome of the merge
#[derive(Debug, Clone)]
pub struct SeasonMergeReport {
    pub year: u16,
    /// Rows that received a rank this run
    pub matched: usize,
    /// Rows belonging to the season
    pub expected: usize,
    /// Sample of unmatched names, populated only for low match rates
    pub unmatched_sample: Vec<String>,
    /// Set when the season's fetch produced nothing to merge
    pub skipped: Option<SkipReason>,
}

impl SeasonMergeReport {
    fn skipped(year: u16, expected: usize, reason: SkipReason) -> Self {
        SeasonMergeReport {
            year,
            matched: 0,
            expected,
            unmatched_sample: Vec::new(),
            skipped: Some(reason),
        }
    }
}

/// Write matched ranks into every row of one season.
///
/// Each row searches the full candidate set independently; rows without
/// a confident match keep whatever rank they already had. With an empty
/// entry list no row is touched.
pub fn apply_season_rankings(
    dataset: &mut Dataset,
    year: u16,
    entries: &[RankingEntry],
) -> SeasonMergeReport {
    // Cleaned name -> rank; the first entry wins a duplicate key
    let mut rank_map: HashMap<&str, u32> = HashMap::new();
    for entry in entries {
        rank_map.entry(entry.name.as_str()).or_insert(entry.rank);
    }
    let candidates: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

    let mut matched = 0;
    let mut expected = 0;
    let mut unmatched = Vec::new();

    for row in dataset.season_rows_mut(year) {
        expected += 1;
        match matching::best_match(&row.team, candidates.iter().copied()) {
            Some(m) => {
                row.rank = Some(rank_map[m.name]);
                matched += 1;
            }
            None => {
                if unmatched.len() < UNMATCHED_SAMPLE_LEN {
                    unmatched.push(row.team.clone());
                }
            }
        }
    }

    SeasonMergeReport {
        year,
        matched,
        expected,
        unmatched_sample: if matched < LOW_MATCH_FLOOR {
            unmatched
        } else {
            Vec::new()
        },
        skipped: None,
    }
}

/// Delay policy for the season loop
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    /// Pause after a successfully fetched season
    pub request_delay: Duration,
    /// Longer pause after a skipped season
    pub error_delay: Duration,
}

impl EnrichOptions {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        EnrichOptions {
            request_delay: Duration::from_secs(config.request_delay_secs),
            error_delay: Duration::from_secs(config.error_delay_secs),
        }
    }

    /// No delays, for tests and cache-only runs
    pub fn immediate() -> Self {
        EnrichOptions {
            request_delay: Duration::ZERO,
            error_delay: Duration::ZERO,
        }
    }
}

/// Fetch and merge every requested season, in order.
///
/// A skipped season leaves its rows unranked and never aborts the run;
/// the loop throttles between seasons per the delay policy.
pub fn enrich(
    dataset: &mut Dataset,
    source: &dyn RankingSource,
    seasons: &[u16],
    options: &EnrichOptions,
) -> Vec<SeasonMergeReport> {
    let mut reports = Vec::new();

    for &year in seasons {
        log::info!("Fetching {} rankings for {}...", source.name(), year);

        match source.fetch_season(year) {
            SeasonFetch::Ranked(entries) => {
                let report = apply_season_rankings(dataset, year, &entries);
                log::info!(
                    "Year {}: matched {} / {} teams",
                    year,
                    report.matched,
                    report.expected
                );
                if !report.unmatched_sample.is_empty() {
                    log::info!("  Sample unmatched: {:?}", report.unmatched_sample);
                }
                reports.push(report);
                std::thread::sleep(options.request_delay);
            }
            SeasonFetch::Skipped(reason) => {
                log::warn!("Year {}: {} - skipping", year, reason);
                let expected = dataset.season_len(year);
                reports.push(SeasonMergeReport::skipped(year, expected, reason));
                std::thread::sleep(options.error_delay);
            }
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, rank: u32) -> RankingEntry {
        RankingEntry {
            raw_label: format!("{} (20-10)", name),
            name: name.to_string(),
            rank,
        }
    }

    /// Canned source: one ranked season, everything else a 404
    struct StubSource {
        year: u16,
        entries: Vec<RankingEntry>,
    }

    impl RankingSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn fetch_season(&self, year: u16) -> SeasonFetch {
            if year == self.year {
                SeasonFetch::Ranked(self.entries.clone())
            } else {
                SeasonFetch::Skipped(SkipReason::HttpStatus(404))
            }
        }
    }

    #[test]
    fn test_apply_sets_ranks_for_matches_only() {
        let mut dataset = Dataset::from_teams([
            (2013, "Univ. of Louisville"),
            (2013, "Duke"),
            (2013, "Totally Unknown School"),
            (2014, "Duke"),
        ]);
        let entries = vec![entry("Louisville", 1), entry("Duke", 2)];

        let report = apply_season_rankings(&mut dataset, 2013, &entries);

        assert_eq!(report.matched, 2);
        assert_eq!(report.expected, 3);
        assert_eq!(dataset.rows()[0].rank, Some(1));
        assert_eq!(dataset.rows()[1].rank, Some(2));
        assert_eq!(dataset.rows()[2].rank, None);
        // other seasons are untouched
        assert_eq!(dataset.rows()[3].rank, None);
    }

    #[test]
    fn test_apply_with_no_candidates_ranks_nothing() {
        let mut dataset = Dataset::from_teams([(2013, "Louisville"), (2013, "Duke")]);

        let report = apply_season_rankings(&mut dataset, 2013, &[]);

        assert_eq!(report.matched, 0);
        assert!(dataset.rows().iter().all(|r| r.rank.is_none()));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut dataset = Dataset::from_teams([(2013, "Louisville"), (2013, "Duke")]);
        let entries = vec![entry("Louisville", 1), entry("Duke", 2)];

        apply_season_rankings(&mut dataset, 2013, &entries);
        let first: Vec<_> = dataset.rows().to_vec();

        apply_season_rankings(&mut dataset, 2013, &entries);
        assert_eq!(dataset.rows(), first.as_slice());
    }

    #[test]
    fn test_apply_duplicate_cleaned_names_keep_first_rank() {
        let mut dataset = Dataset::from_teams([(2013, "Louisville")]);
        let entries = vec![entry("Louisville", 3), entry("Louisville", 9)];

        apply_season_rankings(&mut dataset, 2013, &entries);

        assert_eq!(dataset.rows()[0].rank, Some(3));
    }

    #[test]
    fn test_low_match_rate_samples_unmatched_names() {
        // 15 rows, none matchable: well under the floor of 200
        let teams: Vec<(u16, String)> = (0..15)
            .map(|i| (2013, format!("Nowhere Tech {:02}", i)))
            .collect();
        let mut dataset = Dataset::from_teams(teams);
        let entries = vec![entry("Louisville", 1)];

        let report = apply_season_rankings(&mut dataset, 2013, &entries);

        assert_eq!(report.matched, 0);
        assert_eq!(report.unmatched_sample.len(), UNMATCHED_SAMPLE_LEN);
        assert_eq!(report.unmatched_sample[0], "Nowhere Tech 00");
    }

    #[test]
    fn test_enrich_skipped_season_updates_nothing() {
        let mut dataset = Dataset::from_teams([(2013, "Louisville"), (2014, "Louisville")]);
        let source = StubSource {
            year: 2014,
            entries: vec![entry("Louisville", 5)],
        };

        let reports = enrich(
            &mut dataset,
            &source,
            &[2013, 2014],
            &EnrichOptions::immediate(),
        );

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].skipped, Some(SkipReason::HttpStatus(404)));
        assert_eq!(reports[0].matched, 0);
        assert_eq!(reports[0].expected, 1);
        assert_eq!(dataset.rows()[0].rank, None);

        assert!(reports[1].skipped.is_none());
        assert_eq!(dataset.rows()[1].rank, Some(5));
    }
}
