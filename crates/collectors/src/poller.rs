//! Periodic collection until shutdown.

use crate::collector::Collector;
use crate::fetch::PageFetcher;
use crate::runner::run_collectors;
use std::future::Future;
use std::time::Duration;
use trendcast_core::TabularStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Run every collector once per `interval` until `shutdown` resolves.
///
/// With `run_immediately` the first round starts at once; otherwise it
/// starts after one interval. A round in progress is finished before the
/// shutdown is observed. Returns the number of completed rounds.
pub async fn poll<F>(
    collectors: &[Box<dyn Collector>],
    fetcher: &PageFetcher,
    store: &TabularStore,
    interval: Duration,
    run_immediately: bool,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut rounds = 0usize;

    tracing::info!(
        interval_secs = interval.as_secs(),
        run_immediately,
        collectors = collectors.len(),
        "Starting collector poller"
    );

    if !run_immediately && !wait_or_shutdown(interval, &mut shutdown).await {
        return rounds;
    }

    loop {
        let report = run_collectors(collectors, fetcher, store).await;
        rounds += 1;
        tracing::info!(
            round = rounds,
            succeeded = report.succeeded(),
            failed = report.failed(),
            next_in_secs = interval.as_secs(),
            "Poll round finished"
        );

        if !wait_or_shutdown(interval, &mut shutdown).await {
            break;
        }
    }

    tracing::info!(rounds, "Collector poller stopped");
    rounds
}

/// Sleep for `interval`. Returns false if shutdown fired first.
async fn wait_or_shutdown<F>(interval: Duration, shutdown: &mut std::pin::Pin<&mut F>) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = shutdown.as_mut() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fetcher, StubCollector};
    use trendcast_core::Table;

    #[tokio::test(start_paused = true)]
    async fn test_runs_each_interval_until_shutdown() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = TabularStore::new(temp.path());
        let stub = StubCollector::counting("twitter", Table::TwitterTrends);
        let calls = stub.calls();
        let collectors: Vec<Box<dyn Collector>> = vec![Box::new(stub)];

        let shutdown = tokio::time::sleep(Duration::from_secs(250));
        let rounds = poll(
            &collectors,
            &fetcher(),
            &store,
            Duration::from_secs(100),
            true,
            shutdown,
        )
        .await;

        // t=0, t=100, t=200; shutdown at t=250
        assert_eq!(rounds, 3);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_start() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = TabularStore::new(temp.path());
        let stub = StubCollector::counting("twitter", Table::TwitterTrends);
        let calls = stub.calls();
        let collectors: Vec<Box<dyn Collector>> = vec![Box::new(stub)];

        let rounds = poll(
            &collectors,
            &fetcher(),
            &store,
            Duration::from_secs(100),
            false,
            tokio::time::sleep(Duration::from_secs(50)),
        )
        .await;

        assert_eq!(rounds, 0);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
