use std::{path::Path, process::Command};

use clap::ValueEnum;
use gag::Gag;
use tracing::debug;

use crate::{error::AgentError, sink::console_lock};

const FORM_FEED: char = '\x0c';

/// Backend used to pull page text out of a PDF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExtractorKind {
    /// `pdftotext` first, `pdf-extract` when that fails.
    Auto,
    /// Poppler's `pdftotext` binary.
    Pdftotext,
    /// The pure-Rust `pdf-extract` parser.
    #[default]
    PdfExtract,
}

/// Produces the text of every page of a PDF, in page order.
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, AgentError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PdfTextExtractor {
    kind: ExtractorKind,
}

impl PdfTextExtractor {
    pub fn new(kind: ExtractorKind) -> Self {
        Self { kind }
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, AgentError> {
        match self.kind {
            ExtractorKind::PdfExtract => extract_with_pdf_extract(path),
            ExtractorKind::Pdftotext => extract_with_pdftotext(path),
            ExtractorKind::Auto => extract_with_pdftotext(path).or_else(|primary_err| {
                debug!(
                    path = %path.display(),
                    error = %primary_err,
                    "pdftotext failed, falling back to pdf-extract"
                );
                extract_with_pdf_extract(path).map_err(|fallback_err| {
                    AgentError::extraction(
                        path,
                        format!("pdftotext ({primary_err}) and pdf-extract ({fallback_err}) both failed"),
                    )
                })
            }),
        }
    }
}

/// Concatenates page texts in order, each page terminated by a single newline.
/// Line breaks the extractors put around a page are dropped first.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.trim_matches(['\r', '\n']));
        text.push('\n');
    }
    text
}

fn extract_with_pdf_extract(path: &Path) -> Result<Vec<String>, AgentError> {
    // pdf-extract prints font diagnostics to stdout; hold the console while it is silenced.
    let _console = console_lock();
    let _gag_out = Gag::stdout().ok();
    let _gag_err = Gag::stderr().ok();
    pdf_extract::extract_text_by_pages(path)
        .map_err(|e| AgentError::extraction(path, format!("pdf-extract: {e:?}")))
}

fn extract_with_pdftotext(path: &Path) -> Result<Vec<String>, AgentError> {
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| {
            AgentError::extraction(
                path,
                format!("failed to spawn pdftotext ({e}); ensure poppler is installed"),
            )
        })?;

    if !output.status.success() {
        return Err(AgentError::extraction(
            path,
            format!("pdftotext exited with status {}", output.status),
        ));
    }

    let text = String::from_utf8(output.stdout)
        .map_err(|_| AgentError::extraction(path, "pdftotext output was not valid UTF-8"))?;
    Ok(split_form_feed_pages(&text))
}

// pdftotext terminates every page, including the last, with a form feed.
fn split_form_feed_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
    if pages.last().is_some_and(|last| last.trim().is_empty()) {
        pages.pop();
    }
    pages
}
