//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod helpers;
mod parse;
mod providers;
mod review;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use patent_annotate::annotation::RenderMode;
use patent_annotate::config::Config;
use patent_annotate::llm::LlmProvider;

/// How annotations are rendered in HTML output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderModeArg {
    /// Highlight with an indicator; the comment lives in a data attribute
    #[default]
    Inline,
    /// Also render the comment in a hover tooltip
    Visual,
}

impl From<RenderModeArg> for RenderMode {
    fn from(arg: RenderModeArg) -> Self {
        match arg {
            RenderModeArg::Inline => RenderMode::Inline,
            RenderModeArg::Visual => RenderMode::VisualOnly,
        }
    }
}

#[derive(Parser)]
#[command(name = "patent-annotate")]
#[command(about = "Review patent documents with an LLM and annotate the findings")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a Word or PDF document and print its text
    Parse {
        /// Document to parse (.docx or .pdf)
        file: PathBuf,
        /// Declared MIME type (overrides extension sniffing)
        #[arg(long)]
        mime: Option<String>,
        /// Print display HTML instead of the raw parsed text
        #[arg(long)]
        display: bool,
    },

    /// Review a document and render the annotated result
    Review {
        /// Document to review (.docx or .pdf)
        file: PathBuf,
        /// Review requirements sent with the document
        #[arg(short, long)]
        prompt: Option<String>,
        /// LLM provider (kimi, deepseek, custom)
        #[arg(long)]
        provider: Option<LlmProvider>,
        /// Model name (overrides the provider default)
        #[arg(long)]
        model: Option<String>,
        /// API base URL (required for the custom provider)
        #[arg(long)]
        base_url: Option<String>,
        /// API key (prefer ANNOTATE_API_KEY in the environment)
        #[arg(long)]
        api_key: Option<String>,
        /// Declared MIME type (overrides extension sniffing)
        #[arg(long)]
        mime: Option<String>,
        /// Use the offline keyword reviewer instead of the LLM
        #[arg(long)]
        mock: bool,
        /// Annotation rendering mode
        #[arg(long, value_enum, default_value = "inline")]
        mode: RenderModeArg,
        /// Output the full report as JSON instead of an HTML page
        #[arg(long)]
        json: bool,
        /// Seed for fallback sentence sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List LLM provider presets and the resolved configuration
    Providers,
}

/// Load config from `--config` or by discovery.
async fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_path(&path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e)),
        None => Ok(Config::load().await),
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;

    match cli.command {
        Commands::Parse {
            file,
            mime,
            display,
        } => parse::cmd_parse(&file, mime.as_deref(), display).await,
        Commands::Review {
            file,
            prompt,
            provider,
            model,
            base_url,
            api_key,
            mime,
            mock,
            mode,
            json,
            seed,
            output,
        } => {
            let overrides = review::LlmOverrides {
                provider,
                model,
                base_url,
                api_key,
            };
            let options = review::ReviewOptions {
                prompt,
                mime,
                mock,
                mode: mode.into(),
                json,
                seed,
                output,
            };
            review::cmd_review(config, &file, overrides, options).await
        }
        Commands::Providers => providers::cmd_providers(&config),
    }
}
