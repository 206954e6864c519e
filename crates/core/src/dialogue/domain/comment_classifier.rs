use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment pattern"));

const LINE_COMMENT: &[u8] = b"//";

/// Decides whether positions in a script lie inside `//` or `/* */` comments.
///
/// Block comment spans are collected once per buffer snapshot. Comment markers
/// inside string literals are treated as real markers.
pub struct CommentClassifier<'a> {
    buffer: &'a str,
    block_spans: Vec<Range<usize>>,
}

impl<'a> CommentClassifier<'a> {
    pub fn new(buffer: &'a str) -> Self {
        let block_spans = BLOCK_COMMENT
            .find_iter(buffer)
            .map(|m| m.range())
            .collect();
        Self {
            buffer,
            block_spans,
        }
    }

    /// Byte ranges of every terminated `/* ... */` comment.
    pub fn block_spans(&self) -> &[Range<usize>] {
        &self.block_spans
    }

    /// True if the byte `offset` falls in a block comment, or at or after a
    /// `//` marker on its own line.
    pub fn is_offset_in_comment(&self, offset: usize) -> bool {
        if self.block_spans.iter().any(|span| span.contains(&offset)) {
            return true;
        }

        let bytes = self.buffer.as_bytes();
        let offset = offset.min(bytes.len());
        let line_start = line_start(bytes, offset);
        let line_end = line_end(bytes, offset);

        match find_marker(&bytes[line_start..line_end]) {
            Some(marker) => offset - line_start >= marker,
            None => false,
        }
    }

    /// True if the 0-based line overlaps a block comment or starts with `//`
    /// once leading whitespace is trimmed.
    pub fn is_line_in_comment(&self, line_number: usize) -> bool {
        let Some(text) = self.buffer.lines().nth(line_number) else {
            return false;
        };

        let in_block = self.block_spans.iter().any(|span| {
            let first = line_of_offset(self.buffer, span.start);
            let last = line_of_offset(self.buffer, span.end);
            (first..=last).contains(&line_number)
        });

        in_block || text.trim().starts_with("//")
    }
}

/// 0-based line number containing the byte `offset`.
pub fn line_of_offset(buffer: &str, offset: usize) -> usize {
    let offset = offset.min(buffer.len());
    buffer.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}

pub fn is_offset_in_comment(buffer: &str, offset: usize) -> bool {
    CommentClassifier::new(buffer).is_offset_in_comment(offset)
}

pub fn is_line_in_comment(buffer: &str, line_number: usize) -> bool {
    CommentClassifier::new(buffer).is_line_in_comment(line_number)
}

fn line_start(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn line_end(bytes: &[u8], offset: usize) -> usize {
    bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| offset + i)
        .unwrap_or(bytes.len())
}

fn find_marker(line: &[u8]) -> Option<usize> {
    line.windows(LINE_COMMENT.len())
        .position(|w| w == LINE_COMMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SCRIPT: &str = "\
func void DIA_Test()
{
    AI_Output(self, other, \"DIA_001\"); //Hello there
    // AI_Output(self, other, \"DIA_002\");
    /* AI_Output(self, other, \"DIA_003\");
       still in block */
    AI_Output(self, other, \"DIA_004\");
};
";

    fn offset_of(needle: &str) -> usize {
        SCRIPT.find(needle).unwrap()
    }

    #[test]
    fn test_code_before_line_comment_is_not_comment() {
        assert!(!is_offset_in_comment(SCRIPT, offset_of("AI_Output(self, other, \"DIA_001")));
    }

    #[test]
    fn test_text_after_line_comment_is_comment() {
        assert!(is_offset_in_comment(SCRIPT, offset_of("Hello there")));
    }

    #[test]
    fn test_commented_out_call_is_comment() {
        assert!(is_offset_in_comment(SCRIPT, offset_of("AI_Output(self, other, \"DIA_002")));
    }

    #[test]
    fn test_call_inside_block_is_comment() {
        assert!(is_offset_in_comment(SCRIPT, offset_of("AI_Output(self, other, \"DIA_003")));
    }

    #[test]
    fn test_block_end_is_exclusive() {
        let classifier = CommentClassifier::new(SCRIPT);
        let span = classifier.block_spans()[0].clone();
        assert!(classifier.is_offset_in_comment(span.start));
        assert!(classifier.is_offset_in_comment(span.end - 1));
        // Just past "*/" is the newline of the same line, which has no `//`.
        assert!(!classifier.is_offset_in_comment(span.end));
    }

    #[test]
    fn test_call_after_block_is_not_comment() {
        assert!(!is_offset_in_comment(SCRIPT, offset_of("AI_Output(self, other, \"DIA_004")));
    }

    #[test]
    fn test_unterminated_block_is_not_a_span() {
        let text = "/* open\nAI_Output(a, b, \"X\");";
        assert!(CommentClassifier::new(text).block_spans().is_empty());
        assert!(!is_offset_in_comment(text, text.find("AI_").unwrap()));
    }

    #[test]
    fn test_offset_past_end_does_not_panic() {
        assert!(!is_offset_in_comment("abc", 100));
        assert!(is_offset_in_comment("x // y", 100));
    }

    #[test]
    fn test_offset_inside_multibyte_char_does_not_panic() {
        let text = "ä // ö";
        assert!(!is_offset_in_comment(text, 1));
        assert!(is_offset_in_comment(text, 5));
    }

    #[rstest]
    #[case::code_with_trailing_comment(2, false)]
    #[case::commented_line(3, true)]
    #[case::block_first_line(4, true)]
    #[case::block_last_line(5, true)]
    #[case::plain_code(6, false)]
    #[case::past_end(99, false)]
    fn test_is_line_in_comment(#[case] line: usize, #[case] expected: bool) {
        assert_eq!(is_line_in_comment(SCRIPT, line), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 0)]
    #[case(6, 1)]
    #[case(1000, 2)]
    fn test_line_of_offset(#[case] offset: usize, #[case] expected: usize) {
        assert_eq!(line_of_offset("abcde\nfg\nh", offset), expected);
    }
}
