use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cli::GenerateArgs,
    clients::anthropic::AnthropicClient,
    config::provider_config,
    extract::PdfTextExtractor,
    generator::ContentGenerator,
    processor::Processor,
};

use super::CommandContext;

pub async fn handle(args: GenerateArgs, ctx: &CommandContext) -> Result<()> {
    let client = AnthropicClient::new(provider_config(&args.model, ctx.api_key.clone()))?;
    let processor = Processor::new(
        PdfTextExtractor::new(args.extractor),
        ContentGenerator::new(client),
    );

    info!(source = %args.file_path.display(), model = %args.model.model, "generate command started");

    processor
        .process(&args.file_path)
        .await
        .with_context(|| format!("Failed to generate content for {}", args.file_path.display()))
}
