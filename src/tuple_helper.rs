//! Grammar driver for bordered, delimited, fixed-arity sequences.
//!
//! Tuples, key/value pairs and deconstructable records all speak the same grammar through
//! [`TupleHelper`], so escaping and null semantics are identical across product types.
//!
//! Parsing walks `parse_start → parse_element (→ parse_next → parse_element)* → parse_end`;
//! formatting mirrors it with `start_format → (format_element → add_delimiter)* → end_format`.
//!
//! ```rust
//! use text_transform::{TransformerStore, TupleHelper};
//!
//! let store = TransformerStore::default();
//! let ints = store.get::<i32>().unwrap();
//! let helper = TupleHelper::new(';', '∅', '\\', Some('('), Some(')')).unwrap();
//!
//! let mut cursor = helper.parse_start("(1;2)", "pair").unwrap();
//! let first = helper.parse_element(&cursor, &*ints).unwrap();
//! helper.parse_next(&mut cursor, 2, "pair").unwrap();
//! let second = helper.parse_element(&cursor, &*ints).unwrap();
//! helper.parse_end(&mut cursor, 2, "pair").unwrap();
//! assert_eq!((first, second), (1, 2));
//! ```

use crate::error::BorderSide;
use crate::escape::{escape_into, tokenize, unescape, Token, TokenSequence};
use crate::{Error, Formatted, Result, Transformer, ValueSequenceBuilder, STACK_CAPACITY};
use std::borrow::Cow;

/// Text of one element after the first unescaping pass.
pub(crate) enum ElementText<'a> {
    Null,
    Text(Cow<'a, str>),
}

/// Reads one raw element: unescapes `delimiters` and the escape character, recognizes the
/// null marker, then unescapes the null marker itself.
pub(crate) fn read_element<'a>(
    raw: &'a str,
    escape: char,
    null_marker: char,
    delimiters: &[char],
) -> ElementText<'a> {
    let mut specials = [escape; 4];
    let count = delimiters.len().min(3);
    specials[..count].copy_from_slice(&delimiters[..count]);
    let specials = &specials[..=count];

    let first = unescape(raw, escape, specials);
    if is_null_marker(&first, null_marker) {
        return ElementText::Null;
    }
    let text = match first {
        Cow::Borrowed(text) => unescape(text, escape, &[null_marker]),
        Cow::Owned(text) => Cow::Owned(unescape(&text, escape, &[null_marker]).into_owned()),
    };
    ElementText::Text(text)
}

fn is_null_marker(text: &str, null_marker: char) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(null_marker) && chars.next().is_none()
}

/// Parses one raw element, yielding the transformer's null value for the null marker.
pub(crate) fn parse_element_text<T>(
    raw: &str,
    escape: char,
    null_marker: char,
    delimiters: &[char],
    transformer: &dyn Transformer<T>,
) -> Result<T> {
    match read_element(raw, escape, null_marker, delimiters) {
        ElementText::Null => transformer.null(),
        ElementText::Text(text) => transformer.parse(&text),
    }
}

/// Formats one element into `out`, escaping every member of `specials` or writing the null
/// marker for a null value.
pub(crate) fn format_element_text<T>(
    out: &mut ValueSequenceBuilder<'_>,
    value: &T,
    transformer: &dyn Transformer<T>,
    escape: char,
    null_marker: char,
    specials: &[char],
) {
    let mut initial = [0u8; STACK_CAPACITY];
    let mut element = ValueSequenceBuilder::with_pool(&mut initial, out.pool());
    match transformer.format_into(value, &mut element) {
        Formatted::Text => escape_into(out, element.as_str(), escape, specials),
        Formatted::Null => out.push(null_marker),
    }
}

/// Strips configured borders (and the whitespace around them) from `input`.
pub(crate) fn unwrap_borders<'a>(
    input: &'a str,
    start: Option<char>,
    end: Option<char>,
    type_name: &str,
) -> Result<&'a str> {
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(input);
    };
    let trimmed = input.trim();
    let Some(rest) = trimmed.strip_prefix(start) else {
        return Err(Error::missing_border(type_name, BorderSide::Start, start, input));
    };
    let Some(interior) = rest.strip_suffix(end) else {
        return Err(Error::missing_border(type_name, BorderSide::End, end, input));
    };
    Ok(interior)
}

/// Position inside a sequence being parsed.
#[derive(Debug)]
pub struct TupleCursor<'a> {
    tokens: TokenSequence<'a>,
    current: Option<Token<'a>>,
}

impl<'a> TupleCursor<'a> {
    /// Raw (still escaped) text of the current element.
    #[must_use]
    pub fn current(&self) -> Option<&'a str> {
        self.current.map(|token| token.as_str())
    }
}

/// Stateless grammar driver configured with one kind's special characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleHelper {
    delimiter: char,
    null_marker: char,
    escape: char,
    start: Option<char>,
    end: Option<char>,
}

impl TupleHelper {
    /// Creates a helper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] when two special characters coincide or only one
    /// border is given.
    pub fn new(
        delimiter: char,
        null_marker: char,
        escape: char,
        start: Option<char>,
        end: Option<char>,
    ) -> Result<Self> {
        if start.is_some() != end.is_some() {
            return Err(Error::invalid_settings(
                "tuple grammar: start and end borders must be configured together",
            ));
        }
        let mut chars = vec![delimiter, null_marker, escape];
        chars.extend(start);
        chars.extend(end);
        for (i, c) in chars.iter().enumerate() {
            if chars[i + 1..].contains(c) {
                return Err(Error::invalid_settings(format!(
                    "tuple grammar: '{c}' is used for more than one purpose"
                )));
            }
        }
        Ok(TupleHelper {
            delimiter,
            null_marker,
            escape,
            start,
            end,
        })
    }

    #[must_use]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Checks borders, tokenizes the interior and positions the cursor at the first element.
    ///
    /// An empty interior still holds one empty element, so `()` parses as a single empty field.
    pub fn parse_start<'a>(&self, input: &'a str, type_name: &str) -> Result<TupleCursor<'a>> {
        let interior = unwrap_borders(input, self.start, self.end, type_name)?;
        let mut tokens = tokenize(interior, self.delimiter, self.escape, true);
        let current = tokens.next();
        Ok(TupleCursor { tokens, current })
    }

    /// Advances to element `index` (one-based).
    pub fn parse_next(&self, cursor: &mut TupleCursor<'_>, index: usize, type_name: &str) -> Result<()> {
        cursor.current = cursor.tokens.next();
        if cursor.current.is_none() {
            return Err(Error::element_not_found(type_name, index));
        }
        Ok(())
    }

    /// Parses the current element with `transformer`.
    pub fn parse_element<T>(
        &self,
        cursor: &TupleCursor<'_>,
        transformer: &dyn Transformer<T>,
    ) -> Result<T> {
        let raw = cursor.current().unwrap_or_default();
        parse_element_text(raw, self.escape, self.null_marker, &[self.delimiter], transformer)
    }

    /// Fails when elements remain after the last expected one.
    pub fn parse_end(&self, cursor: &mut TupleCursor<'_>, arity: usize, type_name: &str) -> Result<()> {
        if cursor.tokens.next().is_some() {
            return Err(Error::too_many_elements(type_name, arity));
        }
        Ok(())
    }

    pub fn start_format(&self, out: &mut ValueSequenceBuilder<'_>) {
        if let Some(start) = self.start {
            out.push(start);
        }
    }

    pub fn format_element<T>(
        &self,
        out: &mut ValueSequenceBuilder<'_>,
        value: &T,
        transformer: &dyn Transformer<T>,
    ) {
        format_element_text(
            out,
            value,
            transformer,
            self.escape,
            self.null_marker,
            &[self.escape, self.null_marker, self.delimiter],
        );
    }

    pub fn add_delimiter(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.push(self.delimiter);
    }

    /// Drops the delimiter added after the last element and closes the border.
    pub fn end_format(&self, out: &mut ValueSequenceBuilder<'_>) {
        if out.ends_with(self.delimiter) {
            out.pop();
        }
        if let Some(end) = self.end {
            out.push(end);
        }
    }
}
