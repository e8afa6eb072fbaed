//! Syllable hints for poem lines.
//!
//! A hint is ` ·N` at the end of a non-blank line, N being the number of
//! vowels (one vowel per syllable in Russian). Hints are display-only: they
//! are stripped before content is compared or saved.

use std::sync::OnceLock;

use regex::Regex;

const VOWELS: &str = "аеёиоуыэюяАЕЁИОУЫЭЮЯ";

fn hint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*·[0-9]+\s*$").expect("hint pattern is valid"))
}

/// Number of Russian vowels in `text`. Latin letters do not count.
pub fn count_syllables(text: &str) -> usize {
    text.chars().filter(|c| VOWELS.contains(*c)).count()
}

/// Removes a trailing hint from every line.
pub fn strip_hints(text: &str) -> String {
    text.split('\n')
        .map(strip_line_hint)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line_hint(line: &str) -> &str {
    match hint_re().find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

/// Appends a fresh hint to every non-blank line, replacing any old one.
pub fn add_hints(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let clean = strip_line_hint(line);
            if clean.trim().is_empty() {
                clean.to_string()
            } else {
                format!("{} ·{}", clean, count_syllables(clean))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether an edited note differs from what was saved, ignoring hints and
/// surrounding whitespace in the body. Titles compare exactly.
pub fn content_changed(
    saved_title: &str,
    saved_content: &str,
    current_title: &str,
    current_content: &str,
) -> bool {
    let current = strip_hints(current_content);
    current_title != saved_title || current.trim() != saved_content.trim()
}
