use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    clients::anthropic::{
        DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
    },
    extract::ExtractorKind,
    pipeline::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SETTLE_MS, DEFAULT_WORKERS},
    watcher::DEFAULT_WATCH_DIR,
};

#[derive(Parser, Debug)]
#[command(
    name = "pdf-video-agent",
    version,
    about = "Watch a folder for new PDFs and turn each one into a video script, title, description and marketing copy",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Watch options used when no subcommand is given.
    #[command(flatten)]
    pub watch: WatchArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Watch a directory and generate content for every new PDF (default)")]
    Watch(WatchArgs),
    #[command(about = "Extract the text of one PDF and print it (no generation)")]
    Extract(ExtractArgs),
    #[command(about = "Extract one PDF and generate content for it once")]
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_WATCH_DIR,
        help = "Directory to watch (non-recursively) for new PDF files"
    )]
    pub dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_WORKERS, help = "Number of concurrent processing workers")]
    pub workers: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        help = "Detected PDFs that may wait for a worker before detection blocks"
    )]
    pub queue_capacity: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_SETTLE_MS,
        help = "Milliseconds to wait after detection before opening a PDF"
    )]
    pub settle_ms: u64,

    #[arg(long, help = "Also process PDFs already present in the directory at startup")]
    pub backfill: bool,

    #[arg(long, help = "Create the watched directory if it does not exist")]
    pub create_dir: bool,

    #[arg(long, value_enum, default_value_t = ExtractorKind::default(), help = "PDF text extraction backend")]
    pub extractor: ExtractorKind,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, value_name = "PATH", required = true, help = "PDF file to extract")]
    pub file_path: PathBuf,

    #[arg(long, value_enum, default_value_t = ExtractorKind::default(), help = "PDF text extraction backend")]
    pub extractor: ExtractorKind,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_name = "PATH", required = true, help = "PDF file to generate content from")]
    pub file_path: PathBuf,

    #[arg(long, value_enum, default_value_t = ExtractorKind::default(), help = "PDF text extraction backend")]
    pub extractor: ExtractorKind,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(long, default_value = DEFAULT_MODEL, help = "Model identifier sent with every request")]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS, help = "Maximum output tokens per response")]
    pub max_tokens: u32,

    #[arg(
        long,
        env = "ANTHROPIC_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the Anthropic API"
    )]
    pub api_base_url: String,

    #[arg(
        long,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        help = "Seconds before a generation request is abandoned"
    )]
    pub request_timeout_secs: u64,
}

impl Cli {
    /// The subcommand to run; a bare invocation watches with the top-level options.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Watch(self.watch))
    }
}
