//! Test doubles and a scripted HTTP server shared by the collector tests.

use crate::collector::Collector;
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use trendcast_core::config::CollectorSettings;
use trendcast_core::{AppError, AppResult, Table, TabularStore, TrendRecord};

pub(crate) fn fetcher() -> PageFetcher {
    PageFetcher::new(&CollectorSettings::default()).unwrap()
}

/// Serve `responses` in order, one per connection, counting requests.
/// Each response is `"<status line>|<body>"`.
pub(crate) async fn scripted_server(responses: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        for (status_line, body) in responses.into_iter().map(split_response) {
            let (mut socket, _) = listener.accept().await.unwrap();
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/", addr), hits)
}

fn split_response(raw: &'static str) -> (&'static str, &'static str) {
    raw.split_once('|').unwrap_or((raw, ""))
}

/// Never touches the network; counts calls.
pub(crate) struct StubCollector {
    name: &'static str,
    table: Table,
    rows: Option<usize>,
    write: bool,
    calls: Arc<AtomicUsize>,
}

impl StubCollector {
    /// Writes `rows` trend records.
    pub(crate) fn ok(name: &'static str, table: Table, rows: usize) -> Self {
        Self::new(name, table, Some(rows), true)
    }

    /// Succeeds with zero rows and no write.
    pub(crate) fn counting(name: &'static str, table: Table) -> Self {
        Self::new(name, table, Some(0), false)
    }

    pub(crate) fn failing(name: &'static str, table: Table) -> Self {
        Self::new(name, table, None, false)
    }

    fn new(name: &'static str, table: Table, rows: Option<usize>, write: bool) -> Self {
        Self {
            name,
            table,
            rows,
            write,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Collector for StubCollector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn url(&self) -> &str {
        "http://stub.invalid/"
    }

    fn table(&self) -> Table {
        self.table
    }

    async fn collect(&self, _fetcher: &PageFetcher, store: &TabularStore) -> AppResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(rows) = self.rows else {
            return Err(AppError::Fetch("stub.invalid unreachable".to_string()));
        };
        if !self.write {
            return Ok(rows);
        }

        let records: Vec<TrendRecord> = (0..rows)
            .map(|i| TrendRecord::new(format!("#trend{}", i), i as u64))
            .collect();
        store.write(self.table, &records).await
    }
}
