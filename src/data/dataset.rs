//! CSV season table management
//!
//! Loads the baseline statistics table, normalizes its column labels and
//! writes the enriched table back out with every other column untouched.

use crate::{RankError, Result};
use std::path::Path;

/// Canonical column labels after normalization
pub const TEAM_COL: &str = "TEAM";
pub const YEAR_COL: &str = "YEAR";
pub const RANK_COL: &str = "RK";

/// Source labels accepted for each canonical column
const TEAM_LABELS: &[&str] = &["TEAM", "Unnamed: 0", "School"];
const YEAR_LABELS: &[&str] = &["YEAR"];
const RANK_LABELS: &[&str] = &["RK", "Rank"];

/// One dataset row: the typed columns plus the full original record,
/// so statistic columns pass through load and save untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSeasonRow {
    pub team: String,
    pub year: u16,
    pub rank: Option<u32>,
    fields: Vec<String>,
}

/// The in-memory season table, passed explicitly through each
/// pipeline stage.
#[derive(Debug, Clone)]
pub struct Dataset {
    header: Vec<String>,
    team_idx: usize,
    year_idx: usize,
    rank_idx: usize,
    rows: Vec<TeamSeasonRow>,
}

impl Dataset {
    /// Load a season table from a CSV file.
    ///
    /// Column labels are normalized on load (`Unnamed: 0` becomes
    /// `TEAM`, `year` becomes `YEAR`); a missing rank column is
    /// appended with every row unset. Team cells are trimmed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;

        let mut header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let team_idx = find_column(&header, TEAM_LABELS)
            .ok_or_else(|| RankError::MissingColumn(TEAM_COL.to_string()))?;
        let year_idx = find_column(&header, YEAR_LABELS)
            .ok_or_else(|| RankError::MissingColumn(YEAR_COL.to_string()))?;
        header[team_idx] = TEAM_COL.to_string();
        header[year_idx] = YEAR_COL.to_string();

        let rank_idx = match find_column(&header, RANK_LABELS) {
            Some(idx) => {
                header[idx] = RANK_COL.to_string();
                idx
            }
            None => {
                header.push(RANK_COL.to_string());
                header.len() - 1
            }
        };

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            if fields.len() < header.len() {
                fields.resize(header.len(), String::new());
            }

            let team = fields[team_idx].trim().to_string();
            let year = fields[year_idx].trim().parse::<u16>().map_err(|_| {
                RankError::Parse(format!(
                    "bad year '{}' in data row {}",
                    fields[year_idx],
                    i + 1
                ))
            })?;
            let rank = parse_rank(&fields[rank_idx]);

            rows.push(TeamSeasonRow {
                team,
                year,
                rank,
                fields,
            });
        }

        Ok(Dataset {
            header,
            team_idx,
            year_idx,
            rank_idx,
            rows,
        })
    }

    /// Build a minimal three-column table in memory (for testing)
    pub fn from_teams<I, S>(teams: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        let rows = teams
            .into_iter()
            .map(|(year, team)| {
                let team = team.into();
                let fields = vec![team.clone(), year.to_string(), String::new()];
                TeamSeasonRow {
                    team,
                    year,
                    rank: None,
                    fields,
                }
            })
            .collect();

        Dataset {
            header: vec![
                TEAM_COL.to_string(),
                YEAR_COL.to_string(),
                RANK_COL.to_string(),
            ],
            team_idx: 0,
            year_idx: 1,
            rank_idx: 2,
            rows,
        }
    }

    /// Write the full table, normalized header first, preserving the
    /// input column order. Unmatched rows keep an empty rank cell.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(&self.header)?;

        for row in &self.rows {
            let mut fields = row.fields.clone();
            fields[self.team_idx] = row.team.clone();
            fields[self.rank_idx] = row.rank.map(|r| r.to_string()).unwrap_or_default();
            writer.write_record(&fields)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[TeamSeasonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years present in the table, ascending
    pub fn seasons(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Number of rows belonging to one season
    pub fn season_len(&self, year: u16) -> usize {
        self.rows.iter().filter(|r| r.year == year).count()
    }

    /// Mutable view of one season's rows
    pub fn season_rows_mut(&mut self, year: u16) -> impl Iterator<Item = &mut TeamSeasonRow> {
        self.rows.iter_mut().filter(move |r| r.year == year)
    }
}

fn find_column(header: &[String], labels: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|h| labels.iter().any(|l| h.trim().eq_ignore_ascii_case(l)))
}

/// Parse an existing rank cell. Whole-number floats are accepted
/// because the source table may have been written with missing values
/// promoting the column to floating point.
fn parse_rank(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(rank) = cell.parse::<u32>() {
        return Some(rank);
    }
    match cell.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 => Some(f as u32),
        _ => None,
    }
}
