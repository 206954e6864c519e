/// Legacy sequences left behind by old Silesian-dialect script encodings.
///
/// Checked in order at every position; the first rule that matches wins.
pub const SILESIAN_REPLACEMENTS: &[(&str, &str)] = &[
    ("\u{014D}", "\u{00E4}"), // ō -> ä
    ("!O", "\u{00D4}"),       // !O -> Ô
    ("!o", "\u{00F4}"),       // !o -> ô
    ("@o", "\u{00E4}"),       // @o -> ä
];

/// Result of a replacement scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupResult {
    pub text: String,
    pub replacements: usize,
}

/// Single left-to-right pass. After a match the scan resumes behind the
/// matched sequence, so replacements never overlap.
pub fn fix_silesian(text: &str) -> FixupResult {
    replace_sequences(text, SILESIAN_REPLACEMENTS)
}

pub fn replace_sequences(text: &str, rules: &[(&str, &str)]) -> FixupResult {
    let mut out = String::with_capacity(text.len());
    let mut replacements = 0;
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        match rules.iter().find(|(search, _)| rest.starts_with(search)) {
            Some((search, replace)) => {
                out.push_str(replace);
                rest = &rest[search.len()..];
                replacements += 1;
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    FixupResult {
        text: out,
        replacements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_all_legacy_sequences() {
        let result = fix_silesian("Test \u{014D} text with !O and !o and @o");
        assert_eq!(result.text, "Test ä text with Ô and ô and ä");
        assert_eq!(result.replacements, 4);
        for (search, _) in SILESIAN_REPLACEMENTS {
            assert!(!result.text.contains(search));
        }
    }

    #[test]
    fn test_three_sequences_count() {
        let result = fix_silesian("!O!o\u{014D}");
        assert_eq!(result.text, "Ôôä");
        assert_eq!(result.replacements, 3);
    }

    #[test]
    fn test_no_matches_leaves_text_unchanged() {
        let result = fix_silesian("Nichts zu tun! Oder?");
        assert_eq!(result.text, "Nichts zu tun! Oder?");
        assert_eq!(result.replacements, 0);
    }

    #[test]
    fn test_scan_skips_past_match() {
        // "!!o": first '!' is kept, then "!o" is replaced once.
        let result = fix_silesian("!!o");
        assert_eq!(result.text, "!ô");
        assert_eq!(result.replacements, 1);
    }

    #[test]
    fn test_replacement_output_is_not_rescanned() {
        let rules = [("a", "aa")];
        let result = replace_sequences("aa", &rules);
        assert_eq!(result.text, "aaaa");
        assert_eq!(result.replacements, 2);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fix_silesian("").replacements, 0);
    }
}
