//! HTML text helpers used when building listings

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inline elements that never split a word
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "del", "em", "i", "kbd", "mark", "s", "small", "span", "strong",
    "sub", "sup", "u",
];

/// Strip HTML tags from a string
///
/// Block-level tag boundaries become a space so `<p>one</p><p>two</p>` reads
/// as two words; inline tags vanish without one. Content of `<script>` and
/// `<style>` elements is dropped.
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    let mut tag = String::new();
    let mut skip_until: Option<&'static str> = None;

    for c in s.chars() {
        match c {
            '<' if !in_tag => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .find(|part| !part.is_empty())
                    .unwrap_or("")
                    .to_ascii_lowercase();
                let closing = tag.starts_with('/');
                match skip_until {
                    Some(end) if closing && name == end => skip_until = None,
                    Some(_) => {}
                    None if !closing && name == "script" => skip_until = Some("script"),
                    None if !closing && name == "style" => skip_until = Some("style"),
                    None if INLINE_TAGS.contains(&name.as_str()) => {}
                    None => result.push(' '),
                }
            }
            _ if in_tag => tag.push(c),
            _ if skip_until.is_none() => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate text to at most `words` whitespace-separated words
///
/// Whitespace runs collapse to single spaces. `omission` is appended only
/// when something was cut.
pub fn truncate_words(s: &str, words: usize, omission: &str) -> String {
    let mut iter = s.split_whitespace();
    let kept: Vec<&str> = iter.by_ref().take(words).collect();
    let truncated = iter.next().is_some();

    let mut out = kept.join(" ");
    if truncated {
        out.push_str(omission);
    }
    out
}

/// Plain-text excerpt of an HTML fragment
pub fn excerpt_from_html(html: &str, words: usize) -> String {
    truncate_words(&strip_html(html), words, "…")
}
