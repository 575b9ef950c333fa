//! Substring location over character offsets.
//!
//! All offsets handed out by this module count `char`s, not bytes, so that
//! annotation ranges line up with what a reader sees in CJK text.

use std::ops::Range;

/// Half-open character range `[start, end)` into a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Find the leftmost occurrence of `needle` in `haystack`.
///
/// Returns `None` for an empty needle or when there is no match; callers skip
/// span creation in that case.
pub fn locate(haystack: &str, needle: &str) -> Option<Span> {
    locate_from(haystack, needle, 0)
}

/// Like [`locate`], but only considers matches starting at or after the
/// character offset `from`.
pub fn locate_from(haystack: &str, needle: &str, from: usize) -> Option<Span> {
    if needle.is_empty() {
        return None;
    }

    let offset = byte_offset(haystack, from)?;
    let found = haystack[offset..].find(needle)?;
    let start = from + haystack[offset..offset + found].chars().count();

    Some(Span {
        start,
        end: start + needle.chars().count(),
    })
}

/// Every occurrence of `needle`, overlapping ones included, left to right.
///
/// Each search resumes one character after the previous match start. The
/// text is walked once, carrying byte and char cursors together.
pub fn locate_all(haystack: &str, needle: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    if needle.is_empty() {
        return spans;
    }

    let width = needle.chars().count();
    let mut byte = 0;
    let mut chars = 0;

    while let Some(found) = haystack[byte..].find(needle) {
        chars += haystack[byte..byte + found].chars().count();
        spans.push(Span {
            start: chars,
            end: chars + width,
        });

        let step = haystack[byte + found..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        byte += found + step;
        chars += 1;
    }

    spans
}

/// Byte offset of the character at `char_pos`; `char_pos == len` maps to the
/// end of the string. Positions past the end return `None`.
pub fn byte_offset(text: &str, char_pos: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(char_pos)
}

/// Byte range for the character range `[start, end)`, if it is valid.
pub fn byte_range(text: &str, start: usize, end: usize) -> Option<Range<usize>> {
    if start >= end {
        return None;
    }
    let begin = byte_offset(text, start)?;
    let finish = begin + byte_offset(&text[begin..], end - start)?;
    Some(begin..finish)
}

/// Slice `text` by character offsets.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    byte_range(text, start, end).map(|r| &text[r])
}

/// Sentence containing the character at `at`, whitespace-trimmed.
///
/// Starts after the nearest preceding `。` or newline and runs up to and
/// including the next `。`, or up to (not including) the next newline.
pub fn sentence_at(chars: &[char], at: usize) -> Span {
    let is_break = |c: &char| *c == '。' || *c == '\n';
    let at = at.min(chars.len());

    let mut start = chars[..at].iter().rposition(is_break).map_or(0, |p| p + 1);
    let mut end = match chars[at..].iter().position(is_break) {
        Some(p) if chars[at + p] == '。' => at + p + 1,
        Some(p) => at + p,
        None => chars.len(),
    };

    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }

    Span { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_sentence_at() {
        let text = chars("第一句。 第二句等\n第三句");
        assert_eq!(sentence_at(&text, 1), Span { start: 0, end: 4 });
        assert_eq!(sentence_at(&text, 8), Span { start: 5, end: 9 });
        assert_eq!(sentence_at(&text, 11), Span { start: 10, end: 13 });
    }

    #[test]
    fn test_locate_ascii() {
        assert_eq!(
            locate("hello world", "world"),
            Some(Span { start: 6, end: 11 })
        );
        assert_eq!(locate("hello world", "mars"), None);
    }

    #[test]
    fn test_locate_counts_chars_not_bytes() {
        let text = "本发明包括一个外壳等部件。";
        let span = locate(text, "外壳").unwrap();
        assert_eq!(span, Span { start: 7, end: 9 });
        assert_eq!(char_slice(text, span.start, span.end), Some("外壳"));
    }

    #[test]
    fn test_locate_first_occurrence() {
        assert_eq!(locate("abcabc", "bc"), Some(Span { start: 1, end: 3 }));
    }

    #[test]
    fn test_locate_empty_needle() {
        assert_eq!(locate("anything", ""), None);
        assert_eq!(locate("", ""), None);
    }

    #[test]
    fn test_locate_from_resumes() {
        let text = "等一等再等";
        assert_eq!(locate_from(text, "等", 0).map(|s| s.start), Some(0));
        assert_eq!(locate_from(text, "等", 1).map(|s| s.start), Some(2));
        assert_eq!(locate_from(text, "等", 3).map(|s| s.start), Some(4));
        assert_eq!(locate_from(text, "等", 5), None);
        assert_eq!(locate_from(text, "等", 99), None);
    }

    #[test]
    fn test_locate_all_overlapping_and_multibyte() {
        let starts: Vec<usize> = locate_all("等一等再等", "等").iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 2, 4]);

        let spans = locate_all("等等等", "等等");
        assert_eq!(
            spans,
            vec![Span { start: 0, end: 2 }, Span { start: 1, end: 3 }]
        );

        assert!(locate_all("外壳", "").is_empty());
        assert!(locate_all("外壳", "底座").is_empty());
    }

    #[test]
    fn test_locate_all_agrees_with_locate_from() {
        let text = "a等b，可以c等。\n等d";
        let mut expected = Vec::new();
        let mut from = 0;
        while let Some(hit) = locate_from(text, "等", from) {
            expected.push(hit);
            from = hit.start + 1;
        }
        assert_eq!(locate_all(text, "等"), expected);
    }

    #[test]
    fn test_char_slice_bounds() {
        let text = "外壳ab";
        assert_eq!(char_slice(text, 1, 3), Some("壳a"));
        assert_eq!(char_slice(text, 0, 4), Some("外壳ab"));
        assert_eq!(char_slice(text, 2, 2), None);
        assert_eq!(char_slice(text, 3, 5), None);
    }
}
