//! MarkdownV2 escaping for field values
//!
//! Telegram's MarkdownV2 parser rejects a message outright when any reserved
//! character appears unescaped, so every piece of content interpolated into a
//! markup template goes through [`escape_markdown_v2`] first. Template
//! punctuation (the `*` around a bold name, for instance) is never escaped.

/// Characters reserved by MarkdownV2.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Prefix every reserved character with a backslash, in a single pass.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
