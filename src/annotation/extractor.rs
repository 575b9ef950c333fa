//! Structured extraction of quote/explanation pairs from model output.
//!
//! Reviews usually quote the offending passage and follow it with lines
//! labelled "问题" (problem), "建议" (suggestion) or "修改" (modification).
//! Blank lines are dropped before scanning. Only one issue is tracked at a
//! time and a new quote replaces the open one, so an issue is only emitted
//! once it reaches the last line. Earlier quotes in a multi-issue response
//! are lost; that is a known limitation.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::locator::{locate, Span};
use super::Annotation;
use crate::utils::strip_markup;

/// Quote glyph pairs accepted around a problem span: ASCII, curly and CJK
/// corner brackets.
static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“”'‘’「」『』]([^"“”'‘’「」『』]+)["“”'‘’「」『』]"#).unwrap()
});

/// Substrings that mark a line as part of an issue description.
const DESCRIPTION_MARKERS: [&str; 3] = ["问题", "建议", "修改"];

/// Issue opened by a located quote, waiting for description lines.
#[derive(Debug)]
struct PendingIssue {
    text: String,
    span: Span,
    notes: Vec<String>,
}

impl PendingIssue {
    fn into_annotation(self) -> Annotation {
        Annotation::new(self.text, self.span.start, self.span.end, self.notes.join("\n"))
    }
}

/// Parses model responses into annotations anchored in the original text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredExtractor;

impl StructuredExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract annotations from `response`; an empty result means the
    /// response had no recognisable structure.
    pub fn extract(&self, response: &str, original: &str) -> Vec<Annotation> {
        let cleaned = strip_markup(response);
        let lines: Vec<&str> = cleaned.lines().filter(|l| !l.trim().is_empty()).collect();
        let last = lines.len().saturating_sub(1);

        let mut annotations = Vec::new();
        let mut current: Option<PendingIssue> = None;

        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = QUOTED.captures(line) {
                let quoted = &caps[1];
                match locate(original, quoted) {
                    Some(span) => {
                        current = Some(PendingIssue {
                            text: quoted.to_string(),
                            span,
                            notes: Vec::new(),
                        });
                    }
                    None => debug!("Quoted text not found in document: {}", quoted),
                }
            }

            if let Some(issue) = current.as_mut() {
                if DESCRIPTION_MARKERS.iter().any(|m| line.contains(m)) {
                    issue.notes.push(line.trim().to_string());
                }
            }

            let closes = line.trim().is_empty() || i == last;
            if closes && current.as_ref().is_some_and(|c| !c.notes.is_empty()) {
                if let Some(issue) = current.take() {
                    annotations.push(issue.into_annotation());
                }
            }
        }

        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_quoted_issue_with_description() {
        let original = "本发明关于XX的描述不清晰，需要补充。";
        let response = "问题：\"关于XX的描述不清晰\"\n建议：补充具体参数\n\n";

        let anns = StructuredExtractor::new().extract(response, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "关于XX的描述不清晰");
        assert_eq!(anns[0].start_index, 3);
        assert_eq!(anns[0].end_index, 13);
        assert!(anns[0].annotation.contains("问题："));
        assert!(anns[0].annotation.contains("建议：补充具体参数"));
    }

    #[test]
    fn test_curly_and_corner_quotes() {
        let original = "外壳由金属制成，连接件等部件可拆卸。";
        let curly = "“外壳由金属制成”\n问题：材料不明确";
        let corner = "「连接件等部件」\n修改：列举全部部件";

        let anns = StructuredExtractor::new().extract(curly, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "外壳由金属制成");

        let anns = StructuredExtractor::new().extract(corner, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "连接件等部件");
        assert_eq!(anns[0].annotation, "修改：列举全部部件");
    }

    #[test]
    fn test_blank_lines_do_not_close_issues() {
        let original = "甲部件与乙部件连接。";
        let response = "“甲部件”\n问题：甲\n\n“乙部件”\n建议：乙";

        let anns = StructuredExtractor::new().extract(response, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "乙部件");
        assert_eq!(anns[0].span(), Span { start: 4, end: 7 });
        assert_eq!(anns[0].annotation, "建议：乙");
    }

    #[test]
    fn test_trailing_blank_lines_still_close_last_issue() {
        let original = "第一段内容。第二段内容。";
        let response = "“第二段内容”\n建议：展开说明\n\n\n";

        let anns = StructuredExtractor::new().extract(response, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "第二段内容");
    }

    #[test]
    fn test_quote_without_description_is_dropped() {
        let original = "一种装置。";
        let response = "“一种装置”\n这句话没问题的标记都没有\n";
        // "问题" appears, so it is a description line
        assert_eq!(StructuredExtractor::new().extract(response, original).len(), 1);

        let response = "“一种装置”\n看起来不错\n";
        assert!(StructuredExtractor::new().extract(response, original).is_empty());
    }

    #[test]
    fn test_unlocated_quote_is_ignored() {
        let original = "一种装置。";
        let response = "“不存在的句子”\n问题：找不到\n";
        assert!(StructuredExtractor::new().extract(response, original).is_empty());
    }

    #[test]
    fn test_reopened_quote_replaces_current_issue() {
        let original = "甲部件与乙部件连接。";
        let response = "“甲部件”\n“乙部件”\n问题：连接方式不明";

        let anns = StructuredExtractor::new().extract(response, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "乙部件");
        assert_eq!(anns[0].start_index, 4);
    }

    #[test]
    fn test_strips_markup_before_scanning() {
        let original = "装置包括外壳。";
        let response = "<p>“装置包括外壳”</p>\n<b>问题</b>：&nbsp;缺少细节";

        let anns = StructuredExtractor::new().extract(response, original);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].annotation, "问题： 缺少细节");
    }

    #[test]
    fn test_unstructured_response_is_empty() {
        let original = "一种装置。";
        let response = "整体写得不错，没有发现需要修正之处。";
        assert!(StructuredExtractor::new().extract(response, original).is_empty());
    }
}
