// Where: Directory watch front of the pipeline.
// What: Turns notify create events for `*.pdf` names into queued PdfEvents.
// Why: Keeps detection on notify's thread so slow generations never delay it.
use std::{
    fs,
    path::{Path, PathBuf},
};

use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::CreateKind,
};
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, trace, warn};

use crate::error::AgentError;

pub const DEFAULT_WATCH_DIR: &str = "./content_dropbox";

const PDF_SUFFIX: &[u8] = b".pdf";

/// A newly created PDF, with the path exactly as the event source reported it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfEvent {
    pub path: PathBuf,
}

/// Case-sensitive match on the file name ending in `.pdf`.
pub fn is_pdf_path(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(PDF_SUFFIX))
}

/// PDF events carried by one notify event. Only file creations count.
pub fn pdf_events(event: &Event) -> Vec<PdfEvent> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .iter()
            .filter(|path| is_pdf_path(path))
            .map(|path| PdfEvent { path: path.clone() })
            .collect(),
        _ => Vec::new(),
    }
}

/// Checks the watched directory before any watch is installed.
pub fn prepare_watch_dir(path: &Path, create: bool) -> Result<(), AgentError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(AgentError::watch_setup(path, "not a directory"));
    }
    if !create {
        return Err(AgentError::watch_setup(
            path,
            "directory does not exist (pass --create-dir to create it)",
        ));
    }

    fs::create_dir_all(path).map_err(|e| AgentError::watch_setup(path, e))?;
    info!(path = %path.display(), "created watch directory");
    Ok(())
}

/// PDFs already present in `path`, sorted by name.
pub fn existing_pdfs(path: &Path) -> Result<Vec<PdfEvent>, AgentError> {
    let entries = fs::read_dir(path).map_err(|e| AgentError::watch_setup(path, e))?;

    let mut events: Vec<PdfEvent> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_pdf_path(path))
        .map(|path| PdfEvent { path })
        .collect();
    events.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(events)
}

/// Live watch on one directory. Dropping it stops monitoring and releases the queue sender.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl DirWatcher {
    pub fn start(path: &Path, queue: Sender<PdfEvent>) -> Result<Self, AgentError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let events = pdf_events(&event);
                if events.is_empty() {
                    trace!(kind = ?event.kind, paths = ?event.paths, "ignoring fs event");
                }
                for pdf in events {
                    debug!(path = %pdf.path.display(), "pdf created");
                    if queue.blocking_send(pdf).is_err() {
                        trace!("queue closed; dropping event");
                    }
                }
            }
            Err(e) => warn!(error = %e, "file watch error"),
        })
        .map_err(|e| AgentError::watch_setup(path, e))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| AgentError::watch_setup(path, e))?;

        info!(path = %path.display(), "watching for new PDFs");
        Ok(Self {
            _watcher: watcher,
            path: path.to_path_buf(),
        })
    }

    /// Starts the watch, then queues the PDFs already in `path`. A file created
    /// between the two steps may be queued twice; none is missed.
    pub fn start_with_backfill(path: &Path, queue: Sender<PdfEvent>) -> Result<Self, AgentError> {
        let watcher = Self::start(path, queue.clone())?;

        let existing = existing_pdfs(path)?;
        info!(count = existing.len(), "queueing PDFs already in the watched directory");
        tokio::spawn(async move {
            for event in existing {
                if queue.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(watcher)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
