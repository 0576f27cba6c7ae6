use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cli::ExtractArgs,
    extract::{PdfTextExtractor, TextExtractor, join_pages},
};

pub async fn handle(args: ExtractArgs) -> Result<()> {
    let extractor = PdfTextExtractor::new(args.extractor);
    let path = args.file_path.clone();
    let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&path))
        .await
        .context("PDF extraction task failed")??;

    info!(
        source = %args.file_path.display(),
        page_count = pages.len(),
        "extract command finished"
    );

    print!("{}", join_pages(&pages));
    Ok(())
}
