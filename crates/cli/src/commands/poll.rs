//! Poll command handler.

use anyhow::bail;
use clap::Args;
use std::time::Duration;
use trendcast_collectors::{default_collectors, poll, PageFetcher};
use trendcast_core::{config::AppConfig, TabularStore};

/// Run every collector on a fixed interval until Ctrl-C
#[derive(Args, Debug)]
pub struct PollCommand {
    /// Minutes between rounds (overrides collectors.interval_mins)
    #[arg(long)]
    pub interval_mins: Option<u64>,

    /// Wait one interval before the first round
    #[arg(long)]
    pub no_immediate: bool,
}

impl PollCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let minutes = self.interval_mins.unwrap_or(config.collectors.interval_mins);
        if minutes == 0 {
            bail!("Poll interval must be at least one minute");
        }

        let collectors = default_collectors();
        let fetcher = PageFetcher::new(&config.collectors)?;
        let store = TabularStore::new(config.data_dir.clone());

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        let rounds = poll(
            &collectors,
            &fetcher,
            &store,
            poll_interval(minutes),
            !self.no_immediate,
            shutdown,
        )
        .await;

        println!("Stopped after {} round(s)", rounds);
        Ok(())
    }
}

fn poll_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}
