//! # Worker Pipeline
//!
//! Fans a hostname stream out to a fixed pool of workers over a
//! bounded queue.
//!
//! The queue's capacity equals the worker count, so the producer
//! blocks once the pool is saturated and intake naturally throttles
//! to probe throughput. Workers terminate when the queue is closed
//! and drained; [`Pipeline::run`] returns only after every worker has
//! joined.

use std::sync::Arc;

use anyhow::Context;
use cloudsift_common::network::prefix::RangeIndex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::probe::Prober;
use crate::resolve::Resolver;

pub struct Pipeline {
    concurrency: usize,
    index: Arc<RangeIndex>,
    resolver: Arc<dyn Resolver>,
    prober: Arc<Prober>,
}

impl Pipeline {
    pub fn new(
        concurrency: usize,
        index: Arc<RangeIndex>,
        resolver: Arc<dyn Resolver>,
        prober: Arc<Prober>,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            index,
            resolver,
            prober,
        }
    }

    /// Consumes newline-delimited hostnames from `input` until EOF.
    ///
    /// All workers are started before the first line is read. Each
    /// hostname is delivered to exactly one worker; blank lines are
    /// skipped. Per-hostname failures never surface here, only input
    /// I/O errors and worker panics do.
    pub async fn run<R>(&self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let (tx, rx) = mpsc::channel::<String>(self.concurrency);
        let queue = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(self.concurrency);
        for _ in 0..self.concurrency {
            workers.push(tokio::spawn(worker(
                queue.clone(),
                self.index.clone(),
                self.resolver.clone(),
                self.prober.clone(),
            )));
        }

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("reading hostname input")? {
            let hostname = line.trim();
            if hostname.is_empty() {
                continue;
            }
            if tx.send(hostname.to_string()).await.is_err() {
                // Receiver gone means every worker has died; stop feeding.
                break;
            }
        }

        // Closing the channel is the only shutdown signal workers get.
        drop(tx);

        for handle in workers {
            handle.await.context("joining worker")?;
        }

        Ok(())
    }
}

async fn worker(
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    index: Arc<RangeIndex>,
    resolver: Arc<dyn Resolver>,
    prober: Arc<Prober>,
) {
    loop {
        // Lock held only across the dequeue, never while processing.
        let hostname = { queue.lock().await.recv().await };
        let Some(hostname) = hostname else {
            break;
        };
        process(&hostname, &index, resolver.as_ref(), &prober).await;
    }
}

async fn process(hostname: &str, index: &RangeIndex, resolver: &dyn Resolver, prober: &Prober) {
    let ips = match resolver.resolve(hostname).await {
        Ok(ips) => ips,
        Err(err) => {
            debug!("resolving {hostname} failed: {err}");
            return;
        }
    };

    let mut in_provider_space = false;
    for ip in &ips {
        let matches = index.lookup(*ip);
        if let Some(first) = matches.first() {
            debug!(
                "{hostname}: {ip} matches {} published block(s), first {} ({} {})",
                matches.len(),
                first.network,
                first.region,
                first.service,
            );
            in_provider_space = true;
        }
    }

    // One probe per hostname, however many of its addresses matched.
    if in_provider_space {
        prober.probe(hostname).await;
    }
}
