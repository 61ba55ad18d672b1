//! Collect command handler.

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use trendcast_collectors::{
    default_collectors, run_collectors, CollectionReport, Collector, OutcomeStatus, PageFetcher,
    ReelsCollector, ReelsSection, TrendingAudioCollector, TwitterTrendsCollector,
};
use trendcast_core::{config::AppConfig, TabularStore};

/// Collector names accepted by `--only`.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CollectorArg {
    Twitter,
    Reels,
    Archived,
    Audio,
}

impl CollectorArg {
    fn build(self) -> Box<dyn Collector> {
        match self {
            CollectorArg::Twitter => Box::new(TwitterTrendsCollector::new()),
            CollectorArg::Reels => Box::new(ReelsCollector::new(ReelsSection::Current)),
            CollectorArg::Archived => Box::new(ReelsCollector::new(ReelsSection::Archived)),
            CollectorArg::Audio => Box::new(TrendingAudioCollector::new()),
        }
    }
}

/// Run the collectors once and report per-collector results
#[derive(Args, Debug)]
pub struct CollectCommand {
    /// Run only these collectors (repeatable; default: all)
    #[arg(long, value_enum)]
    pub only: Vec<CollectorArg>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CollectCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let collectors = if self.only.is_empty() {
            default_collectors()
        } else {
            self.only.iter().map(|arg| arg.build()).collect()
        };

        let fetcher = PageFetcher::new(&config.collectors)?;
        let store = TabularStore::new(config.data_dir.clone());
        let report = run_collectors(&collectors, &fetcher, &store).await;

        if self.json {
            let output = serde_json::to_string_pretty(&report)
                .context("Failed to serialize collection report")?;
            println!("{}", output);
        } else {
            print_report(&report, &store);
        }

        if report.all_failed() {
            bail!("All {} collectors failed", report.outcomes.len());
        }
        Ok(())
    }
}

fn print_report(report: &CollectionReport, store: &TabularStore) {
    println!("Collection started {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    for outcome in &report.outcomes {
        let elapsed_ms = outcome.elapsed.as_millis();
        match &outcome.status {
            OutcomeStatus::Ok { rows } => println!(
                "  ✓ {:<9} {:>4} rows  {:>6} ms  {}",
                outcome.name,
                rows,
                elapsed_ms,
                store.path(outcome.table).display()
            ),
            OutcomeStatus::Failed { error } => {
                println!("  ✗ {:<9} failed     {:>6} ms  {}", outcome.name, elapsed_ms, error)
            }
        }
    }
    println!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_arg_matches_collector_name() {
        for arg in CollectorArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(arg.build().name(), name);
        }
    }
}
