//! Zero-copy tokenizer and character escaping.
//!
//! [`tokenize`] splits text on a delimiter without allocating: each [`Token`] is a view into the
//! input that is still escaped. An escape character makes the next character literal, so an
//! escaped delimiter does not split and two escape characters in a row stand for one literal
//! escape character.
//!
//! An escape character at the very end of the input has nothing to escape and is kept as a
//! literal character, both by the tokenizer and by [`unescape`].
//!
//! ```rust
//! use text_transform::escape::{escape, tokenize, unescape};
//!
//! let tokens: Vec<&str> = tokenize(r"a|b\|c|", '|', '\\', true).map(|t| t.as_str()).collect();
//! assert_eq!(tokens, vec!["a", r"b\|c", ""]);
//!
//! let specials = ['\\', '|'];
//! let escaped = escape("x|y", '\\', &specials);
//! assert_eq!(escaped, r"x\|y");
//! assert_eq!(unescape(&escaped, '\\', &specials), "x|y");
//! ```

use crate::ValueSequenceBuilder;
use std::borrow::Cow;
use std::iter::FusedIterator;

/// One element of a delimited text, still escaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the token within the tokenized input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Lazy, forward-only sequence of [`Token`]s. Created by [`tokenize`].
#[derive(Clone, Debug)]
pub struct TokenSequence<'a> {
    input: &'a str,
    delimiter: char,
    escape: char,
    emit_trailing_empty: bool,
    position: usize,
    finished: bool,
}

/// Splits `input` on unescaped occurrences of `delimiter`.
///
/// With `emit_trailing_empty` the split is exact: `n` delimiters yield `n + 1` tokens, so empty
/// input yields one empty token and a trailing delimiter yields a trailing empty token. Without
/// it a final empty segment is dropped, so empty input yields nothing.
///
/// # Examples
///
/// ```rust
/// use text_transform::escape::tokenize;
///
/// assert_eq!(tokenize("", '|', '\\', true).count(), 1);
/// assert_eq!(tokenize("", '|', '\\', false).count(), 0);
/// assert_eq!(tokenize("a|", '|', '\\', false).count(), 1);
/// ```
#[must_use]
pub fn tokenize(
    input: &str,
    delimiter: char,
    escape: char,
    emit_trailing_empty: bool,
) -> TokenSequence<'_> {
    TokenSequence {
        input,
        delimiter,
        escape,
        emit_trailing_empty,
        position: 0,
        finished: false,
    }
}

impl<'a> Iterator for TokenSequence<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let start = self.position;
        let rest = &self.input[start..];
        let mut escaped = false;
        for (i, ch) in rest.char_indices() {
            if escaped {
                escaped = false;
            } else if ch == self.escape {
                escaped = true;
            } else if ch == self.delimiter {
                self.position = start + i + ch.len_utf8();
                return Some(Token {
                    text: &rest[..i],
                    offset: start,
                });
            }
        }

        self.finished = true;
        if rest.is_empty() && !self.emit_trailing_empty {
            return None;
        }
        Some(Token {
            text: rest,
            offset: start,
        })
    }
}

impl FusedIterator for TokenSequence<'_> {}

/// Prefixes every member of `specials` in `text` with `escape`.
///
/// Include `escape` itself in `specials` to keep the result reversible.
#[must_use]
pub fn escape<'a>(text: &'a str, escape: char, specials: &[char]) -> Cow<'a, str> {
    if !text.contains(|c: char| specials.contains(&c)) {
        return Cow::Borrowed(text);
    }
    let mut result = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if specials.contains(&ch) {
            result.push(escape);
        }
        result.push(ch);
    }
    Cow::Owned(result)
}

/// Like [`escape`], writing into a builder.
pub fn escape_into(out: &mut ValueSequenceBuilder<'_>, text: &str, escape: char, specials: &[char]) {
    let Some(first) = text.find(|c: char| specials.contains(&c)) else {
        out.append(text);
        return;
    };
    out.append(&text[..first]);
    for ch in text[first..].chars() {
        if specials.contains(&ch) {
            out.push(escape);
        }
        out.push(ch);
    }
}

/// Drops `escape` wherever it precedes a member of `specials`.
///
/// An escape character followed by anything else (or by nothing) is kept.
#[must_use]
pub fn unescape<'a>(text: &'a str, escape: char, specials: &[char]) -> Cow<'a, str> {
    if !text.contains(escape) {
        return Cow::Borrowed(text);
    }
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == escape {
            if let Some(&next) = chars.peek() {
                if specials.contains(&next) {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(ch);
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str, emit_trailing_empty: bool) -> Vec<&str> {
        tokenize(input, '|', '\\', emit_trailing_empty)
            .map(|t| t.as_str())
            .collect()
    }

    #[test]
    fn test_plain_split() {
        assert_eq!(split("a|b|c", true), vec!["a", "b", "c"]);
        assert_eq!(split("a||c", true), vec!["a", "", "c"]);
        assert_eq!(split("|", true), vec!["", ""]);
        assert_eq!(split("|", false), vec![""]);
    }

    #[test]
    fn test_escaped_delimiter_does_not_split() {
        assert_eq!(split(r"a\|b|c", true), vec![r"a\|b", "c"]);
    }

    #[test]
    fn test_double_escape_escapes_itself() {
        assert_eq!(split(r"a\\|b", true), vec![r"a\\", "b"]);
        assert_eq!(split(r"a\\\|b", true), vec![r"a\\\|b"]);
    }

    #[test]
    fn test_trailing_escape_is_literal() {
        assert_eq!(split(r"a|b\", true), vec!["a", r"b\"]);
        assert_eq!(unescape(r"b\", '\\', &['\\', '|']), r"b\");
    }

    #[test]
    fn test_offsets() {
        let tokens: Vec<_> = tokenize("ab|∅|c", '|', '\\', true).collect();
        assert_eq!(tokens[0].offset(), 0);
        assert_eq!(tokens[1].offset(), 3);
        assert_eq!(tokens[2].offset(), 3 + '∅'.len_utf8() + 1);
        assert_eq!(tokens[2].as_str(), "c");
    }

    #[test]
    fn test_multibyte_delimiter() {
        let tokens: Vec<_> = tokenize("1∅2∅3", '∅', '\\', true).map(|t| t.as_str()).collect();
        assert_eq!(tokens, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unescape_only_listed_characters() {
        assert_eq!(unescape(r"\|\x\\", '\\', &['|', '\\']), r"|\x\");
        assert_eq!(unescape(r"\∅", '\\', &['|', '\\']), r"\∅");
        assert_eq!(unescape(r"\∅", '\\', &['∅']), "∅");
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape("plain", '\\', &['|']), Cow::Borrowed(_)));
        assert!(matches!(unescape("plain", '\\', &['|']), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_into_builder() {
        let mut initial = [0u8; 32];
        let mut out = ValueSequenceBuilder::new(&mut initial);
        escape_into(&mut out, r"ab|c\∅", '\\', &['\\', '∅', '|']);
        assert_eq!(out.as_str(), r"ab\|c\\\∅");
    }
}
