//! Document parsing command.

use std::path::Path;

use console::style;

use patent_annotate::parser::DocumentParser;
use patent_annotate::utils::format_text_for_display;

/// Parse a document and print its text or display HTML.
pub async fn cmd_parse(file: &Path, mime: Option<&str>, display: bool) -> anyhow::Result<()> {
    let document = DocumentParser::new().parse_path(file, mime).await?;

    eprintln!(
        "{} Parsed {} document ({} chars, {:?})",
        style("✓").green(),
        document.format,
        document.text.chars().count(),
        document.method
    );

    if display {
        println!("{}", format_text_for_display(&document.text));
    } else {
        println!("{}", document.text);
    }

    Ok(())
}
