//! Search command handler.
//!
//! Builds a throwaway index from the Twitter trends table and prints the
//! closest matches, for checking what `/askai` would retrieve.

use anyhow::{bail, Context};
use clap::Args;
use trendcast_core::{config::AppConfig, Table, TabularStore, TrendRecord};
use trendcast_retrieval::{create_provider, RelevanceIndex};

/// Show the trends most relevant to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of matches (default: server.top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        config.validate_embedding()?;
        let top_k = self.top_k.unwrap_or(config.server.top_k);
        if top_k == 0 {
            bail!("-k must be at least 1");
        }

        let store = TabularStore::new(config.data_dir.clone());
        let records: Vec<TrendRecord> = store
            .read(Table::TwitterTrends)
            .await
            .context("Run `trendcast collect --only twitter` first")?;

        let provider = create_provider(&config.embedding, config.api_key.as_ref()).await?;
        let index = RelevanceIndex::build(records, provider).await?;
        let results = index.query(&self.query, top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No trends indexed.");
            return Ok(());
        }

        println!("Top {} of {} trends for \"{}\":", results.len(), index.len(), self.query);
        for (rank, hit) in results.iter().enumerate() {
            println!(
                "  {:>2}. {:.4}  {} (Tweet Count: {})",
                rank + 1,
                hit.score,
                hit.record.text,
                hit.record.count
            );
        }
        Ok(())
    }
}
