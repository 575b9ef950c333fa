//! `.docx` → simple HTML markup.
//!
//! The main document part (`word/document.xml`) is streamed with quick-xml.
//! Paragraphs become `<p>`, `Heading 1`-`Heading 3` styles become `<h1>`-`<h3>`,
//! bold runs `<strong>` and italic runs `<em>`. Tables keep their row/cell
//! structure. Empty paragraphs are dropped.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::utils::html_escape;

const DOCUMENT_PART: &str = "word/document.xml";

/// Errors from reading a Word archive.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a zip archive: {0}")]
    Archive(#[from] ZipError),

    #[error("archive has no word/document.xml")]
    MissingDocument,

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert the bytes of a `.docx` file to HTML.
pub fn docx_to_html(bytes: &[u8]) -> Result<String, DocxError> {
    let xml = read_document_part(bytes)?;
    document_xml_to_html(&xml)
}

fn read_document_part(bytes: &[u8]) -> Result<String, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Err(DocxError::MissingDocument),
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

#[derive(Debug, Default)]
struct Paragraph {
    tag: Option<&'static str>,
    body: String,
}

#[derive(Debug, Default)]
struct Run {
    bold: bool,
    italic: bool,
    text: String,
}

impl Run {
    fn render(self) -> String {
        if self.text.is_empty() {
            return self.text;
        }
        let mut out = self.text;
        if self.italic {
            out = format!("<em>{}</em>", out);
        }
        if self.bold {
            out = format!("<strong>{}</strong>", out);
        }
        out
    }
}

/// Convert the XML of the main document part to HTML.
pub fn document_xml_to_html(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut html = String::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut run: Option<Run> = None;
    let mut in_run_props = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(Paragraph::default()),
                b"w:r" => run = Some(Run::default()),
                b"w:rPr" => in_run_props = true,
                b"w:t" => in_text = true,
                b"w:tbl" => html.push_str("<table>"),
                b"w:tr" => html.push_str("<tr>"),
                b"w:tc" => html.push_str("<td>"),
                name => apply_property(name, e, in_run_props, &mut paragraph, &mut run),
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:tab" => push_run_text(&mut run, "\t"),
                b"w:br" => push_run_text(&mut run, "<br />"),
                name => apply_property(name, e, in_run_props, &mut paragraph, &mut run),
            },
            Event::Text(ref t) if in_text => {
                let text = t.unescape()?;
                push_run_text(&mut run, &html_escape(&text));
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:rPr" => in_run_props = false,
                b"w:r" => {
                    if let (Some(finished), Some(p)) = (run.take(), paragraph.as_mut()) {
                        p.body.push_str(&finished.render());
                    }
                }
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        if !p.body.trim().is_empty() {
                            let tag = p.tag.unwrap_or("p");
                            html.push_str(&format!("<{tag}>{}</{tag}>", p.body));
                        }
                    }
                }
                b"w:tbl" => html.push_str("</table>"),
                b"w:tr" => html.push_str("</tr>"),
                b"w:tc" => html.push_str("</td>"),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(html)
}

fn push_run_text(run: &mut Option<Run>, text: &str) {
    if let Some(r) = run.as_mut() {
        r.text.push_str(text);
    }
}

/// Paragraph style and run formatting elements.
fn apply_property(
    name: &[u8],
    e: &BytesStart<'_>,
    in_run_props: bool,
    paragraph: &mut Option<Paragraph>,
    run: &mut Option<Run>,
) {
    match name {
        b"w:pStyle" => {
            if let (Some(p), Some(style)) = (paragraph.as_mut(), attribute(e, b"w:val")) {
                p.tag = heading_tag(&style);
            }
        }
        b"w:b" | b"w:i" if in_run_props => {
            let enabled = attribute(e, b"w:val")
                .map_or(true, |v| !matches!(v.as_str(), "0" | "false" | "off"));
            if let Some(r) = run.as_mut() {
                if name == b"w:b" {
                    r.bold = enabled;
                } else {
                    r.italic = enabled;
                }
            }
        }
        _ => {}
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// `Heading1`, `heading 2` and friends map to `h1`-`h3`.
fn heading_tag(style: &str) -> Option<&'static str> {
    let normalized: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    match normalized.strip_prefix("heading")? {
        "1" => Some("h1"),
        "2" => Some("h2"),
        "3" => Some("h3"),
        _ => None,
    }
}
