//! Run a set of collectors and report per-collector outcomes.

use crate::collector::Collector;
use crate::fetch::PageFetcher;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use trendcast_core::{Table, TabularStore};

/// Result of one collector in one round.
#[derive(Debug, Clone, Serialize)]
pub struct CollectorOutcome {
    pub name: String,
    pub table: Table,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    Ok { rows: usize },
    Failed { error: String },
}

impl CollectorOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Ok { .. })
    }
}

/// Outcomes of one collection round, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<CollectorOutcome>,
}

impl CollectionReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when at least one collector ran and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded() == 0
    }
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Run `collectors` one after another. A failing collector is recorded and
/// the rest still run.
#[tracing::instrument(level = "info", skip_all, fields(collectors = collectors.len()))]
pub async fn run_collectors(
    collectors: &[Box<dyn Collector>],
    fetcher: &PageFetcher,
    store: &TabularStore,
) -> CollectionReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(collectors.len());

    for collector in collectors {
        let t0 = Instant::now();
        let status = match collector.collect(fetcher, store).await {
            Ok(rows) => {
                tracing::info!(collector = collector.name(), rows, "Collector finished");
                OutcomeStatus::Ok { rows }
            }
            Err(e) => {
                tracing::error!(
                    collector = collector.name(),
                    kind = e.kind(),
                    error = %e,
                    "Collector failed"
                );
                OutcomeStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        outcomes.push(CollectorOutcome {
            name: collector.name().to_string(),
            table: collector.table(),
            status,
            elapsed: t0.elapsed(),
        });
    }

    let report = CollectionReport {
        started_at,
        outcomes,
    };
    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Collection round complete"
    );
    report
}
