//! Live JSON preview: lenient build plus a small token scanner so the
//! TUI can color keys, values, and punctuation separately.

use crate::form::FormState;
use crate::pages::PageSpec;
use crate::payload::{BuildContext, BuildMode};

/// Renders the page's document as pretty-printed JSON using its embedded
/// preset. Build failures render as a comment line instead of clearing
/// the pane.
pub fn render(page: &PageSpec, state: &FormState, ctx: &BuildContext) -> String {
    render_with(&(page.preset)(), page, state, ctx)
}

/// Like [`render`], against a caller-supplied (possibly remote) preset.
pub fn render_with(
    preset: &serde_json::Value,
    page: &PageSpec,
    state: &FormState,
    ctx: &BuildContext,
) -> String {
    match (page.build)(preset, state, BuildMode::Preview, ctx) {
        Ok(doc) => serde_json::to_string_pretty(&doc)
            .unwrap_or_else(|e| format!("// preview unavailable: {e}")),
        Err(e) => format!("// preview unavailable: {e}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Object key, including its quotes.
    Key,
    /// String value.
    Str,
    /// Numeric value.
    Num,
    /// `true`, `false`, or `null`.
    Literal,
    /// Braces, brackets, commas, colons, whitespace, comments.
    Punct,
}

/// Splits one rendered line into colorable tokens. The scanner only has
/// to cope with `to_string_pretty` output, so strings never span lines.
pub fn classify(line: &str) -> Vec<(TokenKind, String)> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let start = i;
            i += 1;
            while i < chars.len() {
                if chars[i] == '\\' {
                    i += 2;
                    continue;
                }
                if chars[i] == '"' {
                    i += 1;
                    break;
                }
                i += 1;
            }
            let text: String = chars[start..i.min(chars.len())].iter().collect();
            // A string directly followed by a colon is a key.
            let mut j = i;
            while j < chars.len() && chars[j] == ' ' {
                j += 1;
            }
            let kind = if chars.get(j) == Some(&':') {
                TokenKind::Key
            } else {
                TokenKind::Str
            };
            tokens.push((kind, text));
        } else if c.is_ascii_digit()
            || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            let start = i;
            i += 1;
            while i < chars.len()
                && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'e' | 'E' | '+' | '-'))
            {
                i += 1;
            }
            tokens.push((TokenKind::Num, chars[start..i].iter().collect()));
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if matches!(word.as_str(), "true" | "false" | "null") {
                TokenKind::Literal
            } else {
                TokenKind::Punct
            };
            tokens.push((kind, word));
        } else {
            let start = i;
            while i < chars.len() {
                let c = chars[i];
                if c == '"' || c.is_ascii_digit() || c.is_ascii_alphabetic() {
                    break;
                }
                i += 1;
            }
            tokens.push((TokenKind::Punct, chars[start..i].iter().collect()));
        }
    }
    tokens
}
