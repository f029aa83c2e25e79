//! URL detection for placard text.
//!
//! Finds `http://` and `https://` URLs, replaces each with a `[Link]`
//! placeholder and collects them, in order, as [`ExtractedLink`]s so the
//! mapper can list them as references below the body text.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ExtractedLink;

/// Regex matching a URL: scheme followed by one or more non-whitespace characters.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Literal substituted for each URL in the body text.
pub const LINK_PLACEHOLDER: &str = "[Link]";

/// Longest display text kept verbatim.
const MAX_DISPLAY_CHARS: usize = 40;

/// Characters kept from a URL that is too long to display.
const TRUNCATED_DISPLAY_CHARS: usize = MAX_DISPLAY_CHARS - 3;

/// Text with its URLs replaced, plus the URLs that were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Input text with every URL replaced by the placeholder.
    pub text: String,

    /// URLs in first-occurrence order.
    pub links: Vec<ExtractedLink>,
}

impl NormalizedText {
    /// Whether any URL was found.
    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }
}

/// Extracts URLs from free text.
#[derive(Debug, Clone)]
pub struct LinkNormalizer {
    placeholder: String,
}

impl Default for LinkNormalizer {
    fn default() -> Self {
        Self {
            placeholder: LINK_PLACEHOLDER.to_string(),
        }
    }
}

impl LinkNormalizer {
    /// Create a normalizer using the `[Link]` placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different placeholder literal.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Replace every URL in `text` and collect the cleaned URLs.
    ///
    /// Trailing sentence punctuation is not part of the URL and stays in the
    /// text after the placeholder. When nothing is found the text is
    /// returned unchanged.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let mut output = String::with_capacity(text.len());
        let mut links = Vec::new();
        let mut copied_up_to = 0;

        for found in URL_REGEX.find_iter(text) {
            let url = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            if is_bare_scheme(url) {
                continue;
            }

            output.push_str(&text[copied_up_to..found.start()]);
            output.push_str(&self.placeholder);
            copied_up_to = found.start() + url.len();

            links.push(ExtractedLink {
                url: url.to_string(),
                display_text: display_text(url),
            });
        }

        if links.is_empty() {
            return NormalizedText {
                text: text.to_string(),
                links,
            };
        }

        output.push_str(&text[copied_up_to..]);
        log::debug!("Replaced {} link(s) in placard text", links.len());

        NormalizedText {
            text: output,
            links,
        }
    }
}

/// Shorten a URL for display: 37 characters plus `...` when longer than 40.
pub fn display_text(url: &str) -> String {
    if url.chars().count() > MAX_DISPLAY_CHARS {
        let mut shortened: String = url.chars().take(TRUNCATED_DISPLAY_CHARS).collect();
        shortened.push_str("...");
        shortened
    } else {
        url.to_string()
    }
}

/// A match like `https://` followed only by punctuation.
fn is_bare_scheme(url: &str) -> bool {
    url.split_once("://")
        .map(|(_, rest)| rest.is_empty())
        .unwrap_or(true)
}
