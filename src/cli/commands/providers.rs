//! Provider listing command.

use console::style;

use patent_annotate::config::Config;
use patent_annotate::llm::ProviderPresets;

use super::helpers::mask_secret;

/// List provider presets and show how the current config resolves.
pub fn cmd_providers(config: &Config) -> anyhow::Result<()> {
    let presets = ProviderPresets::builtin();
    let llm = &config.llm;

    println!("\n{}", style("LLM Providers").bold());
    println!("{}", "-".repeat(60));
    for preset in presets.iter() {
        let marker = if preset.provider == llm.provider {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<10} {:<28} {}",
            marker,
            preset.provider.id(),
            preset.label,
            preset.model
        );
        println!(
            "  {:<10} {}",
            "",
            style(preset.base_url.as_deref().unwrap_or("(base URL required)")).dim()
        );
    }

    println!("\n{}", style("Resolved configuration").bold());
    println!("{}", "-".repeat(60));
    match &config.source_path {
        Some(path) => println!("{:<14} {}", "Config file:", path.display()),
        None => println!("{:<14} {}", "Config file:", style("(none)").dim()),
    }
    println!("{:<14} {}", "Provider:", llm.provider);

    match llm.resolve(&presets) {
        Ok(endpoint) => {
            println!("{:<14} {}", "Base URL:", endpoint.base_url);
            println!("{:<14} {}", "Model:", endpoint.model);
            println!("{:<14} {}", "API key:", mask_secret(&endpoint.api_key));
            println!("\n{} Ready to review", style("✓").green());
        }
        Err(e) => {
            println!("\n{} {}", style("!").yellow(), e);
            println!("  Set ANNOTATE_API_KEY or add api_key to the [llm] config section");
        }
    }

    Ok(())
}
