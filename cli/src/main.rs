mod commands;
mod terminal;

use std::sync::Arc;

use anyhow::Context;
use commands::CommandLine;
use cloudsift_common::config::Config;
use cloudsift_core::feed;
use cloudsift_core::pipeline::Pipeline;
use cloudsift_core::probe::Prober;
use cloudsift_core::resolve::SystemResolver;
use terminal::{logging, print::TerminalSink};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    let cfg = Config {
        concurrency: commands.concurrency,
        verbose: commands.verbose,
    };

    // The one fatal path: no provider ranges, no run.
    let index = feed::fetch()
        .await
        .context("fetching provider IP ranges")?;
    info!("loaded {} provider prefixes", index.len());

    let sink = Arc::new(TerminalSink::new(cfg.verbose));
    let prober = Arc::new(Prober::new(cfg.verbose, sink)?);

    let pipeline = Pipeline::new(
        cfg.concurrency,
        Arc::new(index),
        Arc::new(SystemResolver),
        prober,
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    pipeline.run(stdin).await
}
