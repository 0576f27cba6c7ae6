use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, mpsc::Receiver},
    task::JoinSet,
    time::sleep,
};
use tracing::{error, info, warn};

use crate::{
    error::AgentError, extract::TextExtractor, generator::Generate, processor::Processor,
    watcher::PdfEvent,
};

pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_SETTLE_MS: u64 = 500;

#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    pub workers: usize,
    /// Wait between dequeuing a file and opening it, so writers can finish.
    pub settle: Duration,
}

#[derive(Debug)]
pub enum Outcome {
    Generated { path: PathBuf },
    Failed { path: PathBuf, error: AgentError },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub generated: usize,
    pub failed: usize,
}

impl PipelineSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Generated { .. } => self.generated += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    fn merge(&mut self, other: PipelineSummary) {
        self.generated += other.generated;
        self.failed += other.failed;
    }
}

type SharedQueue = Arc<Mutex<Receiver<PdfEvent>>>;

/// Drains `events` with `options.workers` concurrent workers until the queue closes,
/// `shutdown` resolves, or a worker hits a fatal error or panics. In-flight work is
/// aborted on shutdown.
pub async fn run<E, G, F>(
    processor: Arc<Processor<E, G>>,
    events: Receiver<PdfEvent>,
    options: PipelineOptions,
    shutdown: F,
) -> Result<PipelineSummary, AgentError>
where
    E: TextExtractor + 'static,
    G: Generate + 'static,
    F: Future<Output = ()>,
{
    let queue: SharedQueue = Arc::new(Mutex::new(events));
    let mut workers = JoinSet::new();
    for id in 0..options.workers.max(1) {
        workers.spawn(worker(id, queue.clone(), processor.clone(), options.settle));
    }

    let mut summary = PipelineSummary::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(in_flight = workers.len(), "shutdown requested; stopping workers");
                workers.shutdown().await;
                break;
            }
            joined = workers.join_next() => match joined {
                None => break,
                Some(Ok(Ok(stats))) => summary.merge(stats),
                Some(Ok(Err(fatal))) => {
                    error!(error = %fatal, "fatal error; stopping pipeline");
                    workers.shutdown().await;
                    return Err(fatal);
                }
                Some(Err(join_err)) if join_err.is_cancelled() => {
                    warn!(error = %join_err, "worker task cancelled");
                }
                Some(Err(join_err)) => {
                    error!(error = %join_err, "worker crashed; stopping pipeline");
                    workers.shutdown().await;
                    return Err(AgentError::Worker(join_err.to_string()));
                }
            },
        }
    }

    info!(generated = summary.generated, failed = summary.failed, "pipeline stopped");
    Ok(summary)
}

async fn worker<E, G>(
    id: usize,
    queue: SharedQueue,
    processor: Arc<Processor<E, G>>,
    settle: Duration,
) -> Result<PipelineSummary, AgentError>
where
    E: TextExtractor + 'static,
    G: Generate,
{
    let mut stats = PipelineSummary::default();
    loop {
        let next = queue.lock().await.recv().await;
        let Some(event) = next else {
            return Ok(stats);
        };

        if !settle.is_zero() {
            sleep(settle).await;
        }

        info!(worker = id, path = %event.path.display(), "processing PDF");
        let outcome = match processor.process(&event.path).await {
            Ok(()) => Outcome::Generated { path: event.path },
            Err(error) => Outcome::Failed {
                path: event.path,
                error,
            },
        };
        report(id, &outcome);
        stats.record(&outcome);

        if let Outcome::Failed { error, .. } = outcome
            && error.is_fatal()
        {
            return Err(error);
        }
    }
}

fn report(worker: usize, outcome: &Outcome) {
    match outcome {
        Outcome::Generated { path } => {
            info!(worker, path = %path.display(), "content generated for PDF");
        }
        Outcome::Failed { path, error } => {
            error!(worker, path = %path.display(), error = %error, "failed to process PDF");
        }
    }
}
