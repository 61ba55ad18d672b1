//! Serve command handler.

use anyhow::Context;
use clap::Args;
use trendcast_core::config::AppConfig;

/// Run the HTTP answering service until Ctrl-C
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }

        tracing::info!(
            bind = %config.server.bind,
            model = %config.llm.model,
            embedding = %config.embedding.provider,
            data_dir = ?config.data_dir,
            "Starting trendcast service"
        );

        trendcast_server::serve(&config)
            .await
            .context("Service stopped with an error")
    }
}
