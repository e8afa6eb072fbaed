//! Picking the word to look up from editor text.

/// Punctuation that may cling to a word in verse.
pub fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '!' | '?' | ':' | ';' | '-' | '—' | '(' | ')' | '"' | '\'' | '…' | '[' | ']' | '{' | '}'
    )
}

/// The trimmed text between two cursor positions, in either order.
///
/// Positions count `char`s (Unicode scalar values). Editors usually report
/// UTF-16 code units or byte offsets; convert those before calling.
/// `None` if a position is past the end or the selection is blank.
pub fn selected_word(text: &str, start: usize, end: usize) -> Option<String> {
    let (from, to) = (start.min(end), start.max(end));
    if to > text.chars().count() {
        return None;
    }
    let word: String = text.chars().skip(from).take(to - from).collect();
    let word = word.trim();
    (!word.is_empty()).then(|| word.to_string())
}

/// Strips leading and trailing punctuation; inner hyphens and apostrophes stay.
pub fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| is_punctuation(c) || c.is_whitespace())
}

/// Last word of a line, the one a rhyme has to match. Ignores a syllable hint.
pub fn line_ending_word(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let line = match line.rfind('·') {
        Some(pos) if line[pos + '·'.len_utf8()..].chars().all(|c| c.is_ascii_digit()) => &line[..pos],
        _ => line,
    };
    line.split_whitespace()
        .rev()
        .map(trim_punctuation)
        .find(|w| !w.is_empty())
}
