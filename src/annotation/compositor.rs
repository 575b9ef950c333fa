//! Render annotations over the original text as HTML.
//!
//! Annotations are ordered by start offset, highest first, and numbered in
//! that order (`data-index`). Every open/close tag is anchored to a character
//! offset of the *original* text, so inserting markup for one annotation never
//! shifts the offsets of another and annotated text is escaped exactly once.
//!
//! Overlapping ranges are not merged. A range nested in another renders as a
//! nested container; two ranges that cross are emitted as properly nested
//! fragments (the inner container is closed and reopened with the same
//! `data-index` around the outer one's end tag).

use std::collections::BTreeMap;

use tracing::debug;

use super::Annotation;
use crate::utils::{escape_angle_brackets, escape_attribute, newlines_to_breaks};

const INDICATOR: &str = r#"<span class="annotation-indicator"></span>"#;

/// How comments are exposed in the rendered markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Comment carried in `data-annotation`, shown through the indicator.
    #[default]
    Inline,
    /// Additionally renders the comment in a hover tooltip element.
    VisualOnly,
}

/// Tags anchored at one character offset. Closes are emitted before opens.
#[derive(Debug, Default)]
struct Boundary {
    opens: Vec<usize>,
    closes: Vec<usize>,
}

struct Mark<'a> {
    index: usize,
    annotation: &'a Annotation,
}

/// Wrap each annotation's span of `original` in a markable container.
///
/// Annotations whose range is empty or out of bounds are skipped. Newlines,
/// including those inside comments, become `<br>`.
pub fn apply(original: &str, annotations: &[Annotation], mode: RenderMode) -> String {
    if annotations.is_empty() {
        return newlines_to_breaks(original);
    }

    let total = original.chars().count();

    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by(|a, b| {
        b.start_index
            .cmp(&a.start_index)
            .then_with(|| b.end_index.cmp(&a.end_index))
            .then_with(|| a.annotation.cmp(&b.annotation))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut marks = Vec::with_capacity(ordered.len());
    let mut boundaries: BTreeMap<usize, Boundary> = BTreeMap::new();

    for (index, annotation) in ordered.into_iter().enumerate() {
        if !annotation.fits(total) {
            debug!(
                "Skipping annotation with invalid range [{}, {}) over {} chars",
                annotation.start_index, annotation.end_index, total
            );
            continue;
        }
        let id = marks.len();
        marks.push(Mark { index, annotation });
        boundaries
            .entry(annotation.start_index)
            .or_default()
            .opens
            .push(id);
        boundaries
            .entry(annotation.end_index)
            .or_default()
            .closes
            .push(id);
    }

    let mut writer = MarkupWriter::new(&marks, mode, original.len());
    let mut pending = boundaries.into_iter().peekable();

    for (pos, ch) in original.chars().enumerate() {
        while let Some((_, boundary)) = pending.next_if(|(at, _)| *at == pos) {
            writer.boundary(boundary);
        }
        writer.push_char(ch);
    }
    for (_, boundary) in pending {
        writer.boundary(boundary);
    }

    newlines_to_breaks(&writer.out)
}

struct MarkupWriter<'a> {
    marks: &'a [Mark<'a>],
    mode: RenderMode,
    out: String,
    open: Vec<usize>,
}

impl<'a> MarkupWriter<'a> {
    fn new(marks: &'a [Mark<'a>], mode: RenderMode, capacity: usize) -> Self {
        Self {
            marks,
            mode,
            out: String::with_capacity(capacity * 2),
            open: Vec::new(),
        }
    }

    fn boundary(&mut self, boundary: Boundary) {
        for id in boundary.closes {
            self.close(id);
        }
        for id in boundary.opens {
            self.open_mark(id);
        }
    }

    fn push_char(&mut self, ch: char) {
        if self.open.is_empty() {
            self.out.push(ch);
        } else {
            match ch {
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                _ => self.out.push(ch),
            }
        }
    }

    fn open_mark(&mut self, id: usize) {
        let mark = &self.marks[id];
        self.out.push_str(&format!(
            r#"<span class="annotation" data-annotation="{}" data-index="{}">"#,
            escape_attribute(&mark.annotation.annotation),
            mark.index
        ));
        self.open.push(id);
    }

    /// Close `id`, temporarily closing and then reopening anything opened
    /// after it so the output stays well nested.
    fn close(&mut self, id: usize) {
        let Some(depth) = self.open.iter().rposition(|&o| o == id) else {
            return;
        };

        let crossed = self.open.split_off(depth + 1);
        for _ in &crossed {
            self.out.push_str("</span>");
        }

        self.open.pop();
        self.out.push_str(INDICATOR);
        if self.mode == RenderMode::VisualOnly {
            self.out.push_str(&format!(
                r#"<span class="annotation-tooltip">{}</span>"#,
                escape_angle_brackets(&self.marks[id].annotation.annotation)
            ));
        }
        self.out.push_str("</span>");

        for other in crossed {
            self.open_mark(other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(comment: &str, index: usize) -> String {
        format!(
            r#"<span class="annotation" data-annotation="{}" data-index="{}">"#,
            comment, index
        )
    }

    fn close() -> String {
        format!("{}</span>", INDICATOR)
    }

    #[test]
    fn test_empty_annotations_only_converts_newlines() {
        assert_eq!(apply("a<b>\nc", &[], RenderMode::Inline), "a<b><br>c");
    }

    #[test]
    fn test_single_annotation_inline() {
        let anns = [Annotation::new("bcd", 1, 4, "note")];
        assert_eq!(
            apply("abcde", &anns, RenderMode::Inline),
            format!("a{}bcd{}e", open("note", 0), close())
        );
    }

    #[test]
    fn test_visual_mode_adds_tooltip() {
        let anns = [Annotation::new("b", 1, 2, "x<y>")];
        let html = apply("abc", &anns, RenderMode::VisualOnly);
        assert_eq!(
            html,
            format!(
                r#"a{}b{}<span class="annotation-tooltip">x&lt;y&gt;</span></span>c"#,
                open("x<y>", 0),
                INDICATOR
            )
        );
    }

    #[test]
    fn test_escapes_only_angle_brackets_in_span() {
        let text = "<p>专利&“引号”</p>";
        let anns = [Annotation::new(text, 0, text.chars().count(), "c")];
        let html = apply(text, &anns, RenderMode::Inline);
        assert!(html.contains("&lt;p&gt;专利&“引号”&lt;/p&gt;"));
    }

    #[test]
    fn test_text_outside_spans_is_verbatim() {
        let anns = [Annotation::new("x", 4, 5, "c")];
        let html = apply("<b>\nx", &anns, RenderMode::Inline);
        assert!(html.starts_with("<b><br>"));
    }

    #[test]
    fn test_attribute_quotes_escaped() {
        let anns = [Annotation::new("a", 0, 1, "say \"hi\" it's")];
        let html = apply("a", &anns, RenderMode::Inline);
        assert!(html.contains(r#"data-annotation="say &quot;hi&quot; it&#39;s""#));
    }

    #[test]
    fn test_comment_newlines_become_breaks() {
        let anns = [Annotation::new("a", 0, 1, "问题\n建议")];
        let html = apply("a", &anns, RenderMode::VisualOnly);
        assert!(html.contains(r#"data-annotation="问题<br>建议""#));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn test_indices_assigned_in_descending_start_order() {
        let anns = [
            Annotation::new("a", 0, 1, "first"),
            Annotation::new("c", 2, 3, "second"),
        ];
        assert_eq!(
            apply("abc", &anns, RenderMode::Inline),
            format!(
                "{}a{}b{}c{}",
                open("first", 1),
                close(),
                open("second", 0),
                close()
            )
        );
    }

    #[test]
    fn test_invalid_ranges_are_skipped() {
        let anns = [
            Annotation::new("", 2, 2, "empty"),
            Annotation::new("x", 3, 2, "reversed"),
            Annotation::new("x", 1, 99, "overflow"),
            Annotation::new("b", 1, 2, "ok"),
        ];
        let html = apply("abc", &anns, RenderMode::Inline);
        assert_eq!(html.matches(r#"class="annotation""#).count(), 1);
        assert!(html.contains("data-annotation=\"ok\""));
        assert!(html.starts_with('a'));
        assert!(html.ends_with('c'));
    }

    #[test]
    fn test_nested_ranges() {
        let anns = [
            Annotation::new("abcdefghij", 0, 10, "outer"),
            Annotation::new("def", 3, 6, "inner"),
        ];
        assert_eq!(
            apply("abcdefghij", &anns, RenderMode::Inline),
            format!(
                "{}abc{}def{}ghij{}",
                open("outer", 1),
                open("inner", 0),
                close(),
                close()
            )
        );
    }

    #[test]
    fn test_crossing_ranges_are_split_into_fragments() {
        let anns = [
            Annotation::new("abcde", 0, 5, "a"),
            Annotation::new("defgh", 3, 8, "b"),
        ];
        assert_eq!(
            apply("abcdefghij", &anns, RenderMode::Inline),
            format!(
                "{}abc{}de</span>{}{}fgh{}ij",
                open("a", 1),
                open("b", 0),
                close(),
                open("b", 0),
                close()
            )
        );
    }

    #[test]
    fn test_same_start_nests_longer_outside() {
        let anns = [
            Annotation::new("ab", 0, 2, "short"),
            Annotation::new("abcd", 0, 4, "long"),
        ];
        assert_eq!(
            apply("abcd", &anns, RenderMode::Inline),
            format!(
                "{}{}ab{}cd{}",
                open("long", 0),
                open("short", 1),
                close(),
                close()
            )
        );
    }

    #[test]
    fn test_adjacent_ranges_do_not_nest() {
        let anns = [
            Annotation::new("ab", 0, 2, "x"),
            Annotation::new("cd", 2, 4, "y"),
        ];
        assert_eq!(
            apply("abcd", &anns, RenderMode::Inline),
            format!("{}ab{}{}cd{}", open("x", 1), close(), open("y", 0), close())
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let text = "一种装置，包括外壳、底座等部件。\n外壳由金属制成。";
        let anns = vec![
            Annotation::new("外壳", 7, 9, "甲"),
            Annotation::new("底座等部件", 10, 15, "乙"),
            Annotation::new("一种装置，包括外壳", 0, 9, "丙"),
            Annotation::new("外壳由金属制成。", 17, 25, "丁"),
        ];
        let mut reversed = anns.clone();
        reversed.reverse();
        let mut rotated = anns.clone();
        rotated.rotate_left(2);

        let expected = apply(text, &anns, RenderMode::VisualOnly);
        assert_eq!(apply(text, &reversed, RenderMode::VisualOnly), expected);
        assert_eq!(apply(text, &rotated, RenderMode::VisualOnly), expected);
    }
}
