//! Power ranking backfill CLI
//!
//! Scrapes end-of-season predictive rankings and merges them into a
//! college basketball season statistics table.

use clap::{Parser, Subcommand};
use hooprank::{Config, Result};

#[derive(Parser)]
#[command(name = "hooprank")]
#[command(about = "Backfill college basketball power rankings", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch rankings for every season and merge them into the dataset
    Enrich {
        /// Override the input CSV path
        #[arg(long)]
        input: Option<String>,
        /// Override the output CSV path
        #[arg(long)]
        output: Option<String>,
        /// Cache directory for fetched HTML pages
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached pages (no network requests)
        #[arg(long)]
        offline: bool,
    },
    /// Preview the scraped ranking table for one season
    Fetch {
        /// Season year
        year: u16,
        /// Cache directory for fetched HTML pages
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached pages (no network requests)
        #[arg(long)]
        offline: bool,
    },
    /// Initialize a new project with default config
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Enrich {
            input,
            output,
            cache,
            offline,
        } => commands::enrich(&config, input, output, cache, offline),
        Commands::Fetch {
            year,
            cache,
            offline,
        } => commands::fetch(&config, year, cache, offline),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use hooprank::data::scrapers::teamrankings::TeamRankingsScraper;
    use hooprank::data::scrapers::{RankingSource, SeasonFetch};
    use hooprank::data::Dataset;
    use hooprank::merge::{self, EnrichOptions};
    use hooprank::RankError;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Edit {} to point at your season table", config_path);
        println!("  2. Run 'hooprank enrich' to fill the ranking column");

        Ok(())
    }

    fn build_scraper(config: &Config, cache: Option<String>, offline: bool) -> TeamRankingsScraper {
        let mut scraper = TeamRankingsScraper::new(&config.scrape);

        if let Some(cache_dir) = cache {
            println!("Using cache directory: {}", cache_dir);
            scraper = scraper.with_cache(&cache_dir);
        }
        if offline {
            println!("Offline mode: using cached pages only");
            scraper = scraper.offline_only(true);
        }

        scraper
    }

    pub fn enrich(
        config: &Config,
        input: Option<String>,
        output: Option<String>,
        cache: Option<String>,
        offline: bool,
    ) -> Result<()> {
        let input = input.unwrap_or_else(|| config.data.input_path.clone());
        let output = output.unwrap_or_else(|| config.data.output_path.clone());

        let mut dataset = Dataset::load(&input)?;
        println!("Loaded {} rows from {}", dataset.len(), input);

        let scraper = build_scraper(config, cache, offline);
        let seasons = config.scrape.seasons();

        println!("Fetching performance-based rankings...");
        let reports = merge::enrich(
            &mut dataset,
            &scraper,
            &seasons,
            &EnrichOptions::from_config(&config.scrape),
        );

        dataset.save(&output)?;

        let ranked: usize = reports.iter().map(|r| r.matched).sum();
        let skipped = reports.iter().filter(|r| r.skipped.is_some()).count();
        println!(
            "\nDone! Wrote {} rows ({} matched, {} seasons skipped) to {}",
            dataset.len(),
            ranked,
            skipped,
            output
        );

        Ok(())
    }

    pub fn fetch(config: &Config, year: u16, cache: Option<String>, offline: bool) -> Result<()> {
        if !config.scrape.seasons().contains(&year) {
            return Err(RankError::UnsupportedSeason(year));
        }

        let scraper = build_scraper(config, cache, offline);

        match scraper.fetch_season(year) {
            SeasonFetch::Ranked(entries) => {
                println!("Year {}: {} ranked teams", year, entries.len());
                for entry in entries {
                    println!("  {:>3}  {}", entry.rank, entry.name);
                }
            }
            SeasonFetch::Skipped(reason) => {
                println!("Year {}: {} - skipping", year, reason);
            }
        }

        Ok(())
    }
}
