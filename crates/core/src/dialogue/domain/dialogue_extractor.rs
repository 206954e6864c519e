use std::sync::LazyLock;

use regex::Regex;

use super::comment_classifier::{line_of_offset, CommentClassifier};
use super::dialogue_occurrence::{DialogueOccurrence, OccurrenceKind};

/// `AI_Output(speaker, listener, "ID")` with an optional `; //text` on the same line.
static OUTPUT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"AI_Output\s*\(\s*[^,\n]+,\s*[^,\n]+,\s*"([^"]+)"\s*\)(?:[^;\n]*;[ \t]*//([^\r\n]*))?"#,
    )
    .expect("valid output call pattern")
});

/// `name = "SVM_...";`
static SVM_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[A-Za-z_][A-Za-z0-9_]*\s*=\s*"(SVM_[^"]+)"\s*;"#)
        .expect("valid SVM assignment pattern")
});

/// Any quoted value assigned on a line; used for single-line lookup only.
static ANY_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"=\s*"([^"]+)"\s*;"#).expect("valid assignment pattern"));

pub struct DialogueExtractor;

impl DialogueExtractor {
    /// Scans the whole buffer for both pattern families.
    ///
    /// Output calls come first, then SVM assignments, each in left-to-right
    /// order. Matches whose start lies in a comment are dropped. An identifier
    /// matched by both families yields two occurrences.
    pub fn extract(buffer: &str) -> Vec<DialogueOccurrence> {
        let classifier = CommentClassifier::new(buffer);
        let mut occurrences = Vec::new();

        for caps in OUTPUT_CALL.captures_iter(buffer) {
            let Some(whole) = caps.get(0) else { continue };
            if classifier.is_offset_in_comment(whole.start()) {
                continue;
            }
            let expected_text = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            occurrences.push(DialogueOccurrence {
                identifier: caps[1].to_string(),
                line_number: line_of_offset(buffer, whole.start()),
                expected_text,
                kind: OccurrenceKind::OutputCall,
            });
        }

        for caps in SVM_ASSIGNMENT.captures_iter(buffer) {
            let Some(whole) = caps.get(0) else { continue };
            if classifier.is_offset_in_comment(whole.start()) {
                continue;
            }
            occurrences.push(DialogueOccurrence {
                identifier: caps[1].to_string(),
                line_number: line_of_offset(buffer, whole.start()),
                expected_text: String::new(),
                kind: OccurrenceKind::SvmAssignment,
            });
        }

        occurrences
    }

    /// Identifier referenced on a single 0-based line, for playback.
    ///
    /// Commented lines yield nothing. An output call wins over an assignment;
    /// assignments are not limited to the `SVM_` prefix here.
    pub fn identifier_on_line(buffer: &str, line_number: usize) -> Option<String> {
        if CommentClassifier::new(buffer).is_line_in_comment(line_number) {
            return None;
        }
        let line = buffer.lines().nth(line_number)?;

        OUTPUT_CALL
            .captures(line)
            .or_else(|| ANY_ASSIGNMENT.captures(line))
            .map(|caps| caps[1].to_string())
    }
}
