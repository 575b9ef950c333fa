//! Document review command.

use std::path::{Path, PathBuf};

use console::style;

use patent_annotate::annotation::RenderMode;
use patent_annotate::config::Config;
use patent_annotate::llm::{LlmClient, LlmConfig, LlmProvider};
use patent_annotate::services::{LlmReviewer, MockReviewer, ReviewBackend, ReviewService};

use super::helpers::{html_page, spinner, truncate, write_output};

/// Connection settings given on the command line.
#[derive(Debug, Default)]
pub struct LlmOverrides {
    pub provider: Option<LlmProvider>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl LlmOverrides {
    fn apply(self, mut llm: LlmConfig) -> LlmConfig {
        if let Some(provider) = self.provider {
            if provider != llm.provider {
                // A key picked up for another provider must not leak across
                llm.api_key = None;
                llm.provider = provider;
                llm = llm.with_env_overrides();
            }
        }
        if let Some(model) = self.model {
            llm.model = Some(model);
        }
        if let Some(base_url) = self.base_url {
            llm.base_url = Some(base_url);
        }
        if let Some(api_key) = self.api_key {
            llm.api_key = Some(api_key);
        }
        llm
    }
}

/// Output and pipeline options for one review.
#[derive(Debug, Default)]
pub struct ReviewOptions {
    pub prompt: Option<String>,
    pub mime: Option<String>,
    pub mock: bool,
    pub mode: RenderMode,
    pub json: bool,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

/// Review a document and write the annotated HTML or JSON report.
pub async fn cmd_review(
    config: Config,
    file: &Path,
    overrides: LlmOverrides,
    options: ReviewOptions,
) -> anyhow::Result<()> {
    let backend: Box<dyn ReviewBackend> = if options.mock {
        Box::new(MockReviewer::default())
    } else {
        let llm = overrides.apply(config.llm.clone());
        let client = LlmClient::new(llm)?;
        eprintln!(
            "{} Using {} at {}",
            style("→").cyan(),
            client.endpoint().model,
            client.endpoint().base_url
        );
        Box::new(LlmReviewer::new(client))
    };

    let service = ReviewService::new(backend)
        .with_fallback(config.fallback.annotator())
        .with_mode(options.mode)
        .with_seed(options.seed);

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    let pb = spinner(format!("Reviewing {}...", file_name));
    let result = service
        .review_path(file, options.mime.as_deref(), options.prompt.as_deref())
        .await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Review failed: {}", style("✗").red(), e);
            return Err(e.into());
        }
    };

    eprintln!(
        "{} {} annotations from {}",
        style("✓").green(),
        report.annotations.len(),
        report.backend
    );
    for (i, ann) in report.annotations.iter().enumerate() {
        eprintln!(
            "  {} [{}..{}] {}",
            style(format!("{}.", i + 1)).dim(),
            ann.start_index,
            ann.end_index,
            truncate(&ann.text, 40)
        );
    }

    let content = if options.json {
        serde_json::to_string_pretty(&report)?
    } else {
        html_page(&file_name, &report.html)
    };
    write_output(options.output.as_deref(), &content)?;

    if let Some(path) = &options.output {
        eprintln!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}
