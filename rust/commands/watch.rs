use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    cli::WatchArgs,
    clients::anthropic::AnthropicClient,
    config::{pipeline_options, provider_config},
    extract::PdfTextExtractor,
    generator::ContentGenerator,
    pipeline,
    processor::Processor,
    watcher::{DirWatcher, prepare_watch_dir},
};

use super::CommandContext;

pub async fn handle(args: WatchArgs, ctx: &CommandContext) -> Result<()> {
    prepare_watch_dir(&args.dir, args.create_dir)?;

    let client = AnthropicClient::new(provider_config(&args.model, ctx.api_key.clone()))?;
    let processor = Arc::new(Processor::new(
        PdfTextExtractor::new(args.extractor),
        ContentGenerator::new(client),
    ));

    let (tx, rx) = mpsc::channel(args.queue_capacity.max(1));

    let watcher = if args.backfill {
        DirWatcher::start_with_backfill(&args.dir, tx)?
    } else {
        DirWatcher::start(&args.dir, tx)?
    };

    let summary = pipeline::run(processor, rx, pipeline_options(&args), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c; stopping");
        }
    })
    .await
    .with_context(|| format!("Stopped watching {}", watcher.path().display()))?;

    drop(watcher);
    info!(
        generated = summary.generated,
        failed = summary.failed,
        "watch command finished"
    );
    Ok(())
}
