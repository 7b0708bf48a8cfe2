//! Configuration of the text grammar for every composite kind.
//!
//! This module provides one settings type per composite kind plus the [`StoreSettings`]
//! bundle consumed by [`TransformerStore`](crate::TransformerStore):
//!
//! - [`CollectionSettings`]: lists, sets, queues, slices and arrays (`a|b|c`)
//! - [`DictionarySettings`]: maps (`k1=v1;k2=v2`) and their [`DictionaryBehaviour`]
//! - [`TupleSettings`]: tuples (`(a;b;c)`)
//! - [`KeyValuePairSettings`]: [`KeyValuePair`](crate::KeyValuePair) (`key=value`)
//! - [`RecordSettings`]: deconstructable records (`(a;b;c)`)
//! - [`EnumSettings`]: enum name matching
//!
//! Settings are built once and never mutated afterwards. All special characters of one kind
//! must be pairwise distinct, and borders are configured in pairs.
//!
//! ## Examples
//!
//! ```rust
//! use text_transform::{CollectionSettings, StoreSettings, TransformerStore};
//!
//! let settings = StoreSettings::new()
//!     .with_collection(CollectionSettings::new().with_delimiter(',').with_borders('[', ']'));
//! let store = TransformerStore::new(settings).unwrap();
//!
//! assert_eq!(store.format(&vec![1, 2, 3]).unwrap().as_deref(), Some("[1,2,3]"));
//! ```
//!
//! Settings derive `serde` traits, so a whole [`StoreSettings`] can come from a config file:
//!
//! ```rust
//! use text_transform::{DictionaryBehaviour, StoreSettings};
//!
//! let json = r#"{ "dictionary": { "behaviour": "ThrowOnDuplicate" } }"#;
//! let settings: StoreSettings = serde_json::from_str(json).unwrap();
//! assert_eq!(settings.dictionary.behaviour, DictionaryBehaviour::ThrowOnDuplicate);
//! assert_eq!(settings.dictionary.entry_delimiter, ';');
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default escape character.
pub const DEFAULT_ESCAPE: char = '\\';
/// Default null element marker.
pub const DEFAULT_NULL_MARKER: char = '∅';

/// How dictionary parsing treats a key that appears more than once.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use text_transform::{DictionaryBehaviour, DictionarySettings, StoreSettings, TransformerStore};
///
/// let settings = StoreSettings::new().with_dictionary(
///     DictionarySettings::new().with_behaviour(DictionaryBehaviour::DoNotOverrideKeys),
/// );
/// let store = TransformerStore::new(settings).unwrap();
/// let map: HashMap<String, i32> = store.parse("a=1;a=2").unwrap();
/// assert_eq!(map["a"], 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DictionaryBehaviour {
    /// Last value for a key wins.
    #[default]
    OverrideKeys,
    /// First value for a key wins; later duplicates are dropped.
    DoNotOverrideKeys,
    /// A second occurrence of a key is an error naming the key.
    ThrowOnDuplicate,
}

/// Largest presize accepted for [`CapacityEstimation::Fixed`].
pub const MAX_FIXED_CAPACITY: usize = 1 << 20;

/// How the destination container is presized before elements are added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityEstimation {
    /// Count delimiter occurrences in the input (one more element than delimiters).
    #[default]
    CountDelimiters,
    /// Always reserve this many elements.
    Fixed(usize),
    /// Do not presize.
    None,
}

impl CapacityEstimation {
    /// Estimates how many elements `input` holds when split on `delimiter`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text_transform::CapacityEstimation;
    ///
    /// assert_eq!(CapacityEstimation::CountDelimiters.estimate("a|b|c", '|'), 3);
    /// assert_eq!(CapacityEstimation::Fixed(8).estimate("a|b|c", '|'), 8);
    /// assert_eq!(CapacityEstimation::None.estimate("a|b|c", '|'), 0);
    /// ```
    #[must_use]
    pub fn estimate(&self, input: &str, delimiter: char) -> usize {
        match self {
            CapacityEstimation::CountDelimiters => {
                if input.is_empty() {
                    0
                } else {
                    input.chars().filter(|&c| c == delimiter).count() + 1
                }
            }
            CapacityEstimation::Fixed(capacity) => (*capacity).min(MAX_FIXED_CAPACITY),
            CapacityEstimation::None => 0,
        }
    }

    fn validate(&self, kind: &str) -> Result<()> {
        match self {
            CapacityEstimation::Fixed(capacity) if *capacity > MAX_FIXED_CAPACITY => {
                Err(Error::invalid_settings(format!(
                    "{kind}: fixed capacity {capacity} exceeds the limit of {MAX_FIXED_CAPACITY}"
                )))
            }
            _ => Ok(()),
        }
    }
}

fn ensure_distinct(kind: &str, chars: &[(&str, char)]) -> Result<()> {
    for (i, (left_name, left)) in chars.iter().enumerate() {
        for (right_name, right) in &chars[i + 1..] {
            if left == right {
                return Err(Error::invalid_settings(format!(
                    "{kind}: {left_name} and {right_name} must differ but both are '{left}'"
                )));
            }
        }
    }
    Ok(())
}

fn ensure_paired(kind: &str, start: Option<char>, end: Option<char>) -> Result<()> {
    if start.is_some() != end.is_some() {
        return Err(Error::invalid_settings(format!(
            "{kind}: start and end borders must be configured together"
        )));
    }
    Ok(())
}

fn special_chars<'a>(
    base: &[(&'a str, char)],
    start: Option<char>,
    end: Option<char>,
) -> Vec<(&'a str, char)> {
    let mut chars = base.to_vec();
    chars.extend(start.map(|c| ("start border", c)));
    chars.extend(end.map(|c| ("end border", c)));
    chars
}

/// Grammar of list-like shapes: `a|b|c`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub delimiter: char,
    pub null_marker: char,
    pub escape: char,
    pub start: Option<char>,
    pub end: Option<char>,
    pub capacity: CapacityEstimation,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        CollectionSettings {
            delimiter: '|',
            null_marker: DEFAULT_NULL_MARKER,
            escape: DEFAULT_ESCAPE,
            start: None,
            end: None,
            capacity: CapacityEstimation::default(),
        }
    }
}

impl CollectionSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_null_marker(mut self, null_marker: char) -> Self {
        self.null_marker = null_marker;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn with_borders(mut self, start: char, end: char) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: CapacityEstimation) -> Self {
        self.capacity = capacity;
        self
    }

    /// Characters escaped inside every element.
    pub(crate) fn specials(&self) -> [char; 3] {
        [self.escape, self.null_marker, self.delimiter]
    }

    pub fn validate(&self) -> Result<()> {
        ensure_paired("collection settings", self.start, self.end)?;
        self.capacity.validate("collection settings")?;
        ensure_distinct(
            "collection settings",
            &special_chars(
                &[
                    ("delimiter", self.delimiter),
                    ("null marker", self.null_marker),
                    ("escape", self.escape),
                ],
                self.start,
                self.end,
            ),
        )
    }
}

/// Grammar of map-like shapes: `k1=v1;k2=v2`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionarySettings {
    pub entry_delimiter: char,
    pub key_value_delimiter: char,
    pub null_marker: char,
    pub escape: char,
    pub start: Option<char>,
    pub end: Option<char>,
    pub behaviour: DictionaryBehaviour,
    pub capacity: CapacityEstimation,
}

impl Default for DictionarySettings {
    fn default() -> Self {
        DictionarySettings {
            entry_delimiter: ';',
            key_value_delimiter: '=',
            null_marker: DEFAULT_NULL_MARKER,
            escape: DEFAULT_ESCAPE,
            start: None,
            end: None,
            behaviour: DictionaryBehaviour::default(),
            capacity: CapacityEstimation::default(),
        }
    }
}

impl DictionarySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry_delimiter(mut self, delimiter: char) -> Self {
        self.entry_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_key_value_delimiter(mut self, delimiter: char) -> Self {
        self.key_value_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_null_marker(mut self, null_marker: char) -> Self {
        self.null_marker = null_marker;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn with_borders(mut self, start: char, end: char) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_behaviour(mut self, behaviour: DictionaryBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: CapacityEstimation) -> Self {
        self.capacity = capacity;
        self
    }

    /// Characters escaped inside every key and value.
    pub(crate) fn specials(&self) -> [char; 4] {
        [
            self.escape,
            self.null_marker,
            self.entry_delimiter,
            self.key_value_delimiter,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        ensure_paired("dictionary settings", self.start, self.end)?;
        self.capacity.validate("dictionary settings")?;
        ensure_distinct(
            "dictionary settings",
            &special_chars(
                &[
                    ("entry delimiter", self.entry_delimiter),
                    ("key/value delimiter", self.key_value_delimiter),
                    ("null marker", self.null_marker),
                    ("escape", self.escape),
                ],
                self.start,
                self.end,
            ),
        )
    }
}

macro_rules! fixed_arity_settings {
    ($(#[$meta:meta])* $name:ident, $kind:literal, delimiter: $delimiter:expr, borders: $start:expr, $end:expr $(, $extra:ident: $extra_ty:ty = $extra_default:expr)*) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub delimiter: char,
            pub null_marker: char,
            pub escape: char,
            pub start: Option<char>,
            pub end: Option<char>,
            $(pub $extra: $extra_ty,)*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    delimiter: $delimiter,
                    null_marker: DEFAULT_NULL_MARKER,
                    escape: DEFAULT_ESCAPE,
                    start: $start,
                    end: $end,
                    $($extra: $extra_default,)*
                }
            }
        }

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn with_delimiter(mut self, delimiter: char) -> Self {
                self.delimiter = delimiter;
                self
            }

            #[must_use]
            pub fn with_null_marker(mut self, null_marker: char) -> Self {
                self.null_marker = null_marker;
                self
            }

            #[must_use]
            pub fn with_escape(mut self, escape: char) -> Self {
                self.escape = escape;
                self
            }

            #[must_use]
            pub fn with_borders(mut self, start: char, end: char) -> Self {
                self.start = Some(start);
                self.end = Some(end);
                self
            }

            #[must_use]
            pub fn without_borders(mut self) -> Self {
                self.start = None;
                self.end = None;
                self
            }

            pub fn validate(&self) -> Result<()> {
                ensure_paired($kind, self.start, self.end)?;
                ensure_distinct(
                    $kind,
                    &special_chars(
                        &[
                            ("delimiter", self.delimiter),
                            ("null marker", self.null_marker),
                            ("escape", self.escape),
                        ],
                        self.start,
                        self.end,
                    ),
                )
            }

            /// Builds the grammar driver for this configuration.
            pub fn helper(&self) -> Result<$crate::TupleHelper> {
                $crate::TupleHelper::new(self.delimiter, self.null_marker, self.escape, self.start, self.end)
            }
        }
    };
}

fixed_arity_settings!(
    /// Grammar of tuples: `(a;b;c)`.
    TupleSettings, "tuple settings", delimiter: ';', borders: Some('('), Some(')')
);

fixed_arity_settings!(
    /// Grammar of [`KeyValuePair`](crate::KeyValuePair): `key=value`.
    KeyValuePairSettings, "key/value pair settings", delimiter: '=', borders: None, None
);

fixed_arity_settings!(
    /// Grammar of deconstructable records: `(a;b;c)`.
    ///
    /// With `use_field_empties` set, empty text parses to a record built from each field's
    /// empty value when the record has no empty value of its own.
    RecordSettings, "record settings", delimiter: ';', borders: Some('('), Some(')'),
    use_field_empties: bool = true
);

impl RecordSettings {
    #[must_use]
    pub fn with_field_empties(mut self, use_field_empties: bool) -> Self {
        self.use_field_empties = use_field_empties;
        self
    }
}

/// Name matching of enum transformers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumSettings {
    pub case_insensitive: bool,
    pub allow_numbers: bool,
}

impl Default for EnumSettings {
    fn default() -> Self {
        EnumSettings {
            case_insensitive: true,
            allow_numbers: true,
        }
    }
}

impl EnumSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    #[must_use]
    pub fn with_allow_numbers(mut self, allow_numbers: bool) -> Self {
        self.allow_numbers = allow_numbers;
        self
    }
}

/// Settings of every composite kind, handed to a [`TransformerStore`](crate::TransformerStore).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub collection: CollectionSettings,
    pub dictionary: DictionarySettings,
    pub tuple: TupleSettings,
    pub pair: KeyValuePairSettings,
    pub record: RecordSettings,
    pub enumeration: EnumSettings,
}

impl StoreSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_collection(mut self, settings: CollectionSettings) -> Self {
        self.collection = settings;
        self
    }

    #[must_use]
    pub fn with_dictionary(mut self, settings: DictionarySettings) -> Self {
        self.dictionary = settings;
        self
    }

    #[must_use]
    pub fn with_tuple(mut self, settings: TupleSettings) -> Self {
        self.tuple = settings;
        self
    }

    #[must_use]
    pub fn with_pair(mut self, settings: KeyValuePairSettings) -> Self {
        self.pair = settings;
        self
    }

    #[must_use]
    pub fn with_record(mut self, settings: RecordSettings) -> Self {
        self.record = settings;
        self
    }

    #[must_use]
    pub fn with_enumeration(mut self, settings: EnumSettings) -> Self {
        self.enumeration = settings;
        self
    }

    /// Validates every kind's settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] naming the first offending kind and characters.
    pub fn validate(&self) -> Result<()> {
        self.collection.validate()?;
        self.dictionary.validate()?;
        self.tuple.validate()?;
        self.pair.validate()?;
        self.record.validate()
    }
}
