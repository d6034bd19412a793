//! Dataset I/O and ranking scrapers
//!
//! The season statistics table and the web sources that rank it.

pub mod dataset;
pub mod scrapers;

pub use dataset::{Dataset, TeamSeasonRow};
