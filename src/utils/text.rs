/// Lowercase, fold typographic quotes, collapse whitespace.
#[must_use]
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn bounded_at(haystack: &str, idx: usize, phrase: &str) -> bool {
    let starts_with_word = phrase.chars().next().is_some_and(is_word_char);
    let ends_with_word = phrase.chars().next_back().is_some_and(is_word_char);
    let before_ok =
        !starts_with_word || haystack[..idx].chars().next_back().is_none_or(|c| !is_word_char(c));
    let after_ok = !ends_with_word
        || haystack[idx + phrase.len()..]
            .chars()
            .next()
            .is_none_or(|c| !is_word_char(c));
    before_ok && after_ok
}

/// `phrase` occurs in `haystack` without being glued to a neighbouring word.
/// Both sides are expected to be normalized already.
#[must_use]
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    !phrase.is_empty()
        && haystack
            .match_indices(phrase)
            .any(|(idx, _)| bounded_at(haystack, idx, phrase))
}

/// Replace the occurrences of `phrase` that [`contains_phrase`] would match.
#[must_use]
pub fn replace_phrase(haystack: &str, phrase: &str, with: &str) -> String {
    if phrase.is_empty() {
        return haystack.to_string();
    }
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (idx, _) in haystack.match_indices(phrase) {
        if bounded_at(haystack, idx, phrase) {
            out.push_str(&haystack[last..idx]);
            out.push_str(with);
            last = idx + phrase.len();
        }
    }
    out.push_str(&haystack[last..]);
    out
}

#[must_use]
pub fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(haystack, p))
}

#[must_use]
pub fn first_match<'a>(haystack: &str, phrases: &[&'a str]) -> Option<&'a str> {
    phrases.iter().copied().find(|p| contains_phrase(haystack, p))
}

/// Word tokens, keeping inner apostrophes ("don't", "driver's").
pub fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
}

#[must_use]
pub fn word_count(s: &str) -> usize {
    words(s).count()
}

/// Upper-case the first character.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
