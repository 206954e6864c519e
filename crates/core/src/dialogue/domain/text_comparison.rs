const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Lower-cases, drops `. , ! ? ; :`, collapses whitespace runs and trims.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_was_space = false;

    for ch in lowered.chars() {
        if STRIPPED_PUNCTUATION.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            if !prev_was_space {
                out.push(' ');
                prev_was_space = true;
            }
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }

    out.trim().to_string()
}

/// Exact equality after [`normalize`]; no fuzzy matching.
pub fn compare_texts(expected: &str, transcribed: &str) -> bool {
    normalize(expected) == normalize(transcribed)
}
