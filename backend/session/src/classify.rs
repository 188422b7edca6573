//! Message classification: photo, degrade command, links, or nothing.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use morejpeg_core::{IncomingMessage, PhotoVariant};

/// Scheme, optional `user[:pass]@`, a domain or IPv4 host, optional port,
/// then an optional path/query/fragment.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:https?|ftp)://",
        r"(?:[^\s:@/]+(?::[^\s@/]*)?@)?",
        r"(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}",
        r"|(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(?:\.(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)){3})\b",
        r"(?::\d{1,5})?",
        r"(?:[/?#]\S*)?",
    ))
    .unwrap()
});

/// Sentence punctuation that is almost never part of a pasted link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<'a> {
    /// Cache this photo variant as the chat's only candidate.
    Photo(&'a PhotoVariant),
    /// Run a degradation pass over the chat's active candidates.
    Degrade,
    /// Cache these links as the chat's candidates.
    Urls(Vec<String>),
    Ignore,
}

/// Classify a message. Photos win over any caption.
pub fn classify<'a>(msg: &'a IncomingMessage, trigger_phrase: &str) -> Intent<'a> {
    if let Some(variant) = best_variant(&msg.photo) {
        return Intent::Photo(variant);
    }
    let Some(text) = msg.text.as_deref() else {
        return Intent::Ignore;
    };
    if is_trigger(text, trigger_phrase) {
        return Intent::Degrade;
    }
    let urls = extract_urls(text);
    if urls.is_empty() {
        Intent::Ignore
    } else {
        Intent::Urls(urls)
    }
}

/// Whether `text` contains the degrade command anywhere, ignoring case.
pub fn is_trigger(text: &str, trigger_phrase: &str) -> bool {
    let phrase = trigger_phrase.trim();
    !phrase.is_empty() && text.to_lowercase().contains(&phrase.to_lowercase())
}

/// Distinct links in `text`, in order of first appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|url| seen.insert(*url))
        .map(str::to_owned)
        .collect()
}

/// Highest-resolution variant. Width and height are compared independently:
/// a later variant wins when it is wider or taller than the current best, so
/// an exact tie keeps the earlier one.
pub fn best_variant(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    let (first, rest) = variants.split_first()?;
    Some(rest.iter().fold(first, |best, candidate| {
        if candidate.width > best.width || candidate.height > best.height {
            candidate
        } else {
            best
        }
    }))
}
