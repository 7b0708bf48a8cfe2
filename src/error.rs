//! Error types for text parsing, formatting and transformer resolution.
//!
//! Every failure is raised synchronously to the caller; nothing is retried and a failed parse
//! never yields a partially populated value.
//!
//! ## Error Families
//!
//! - **Grammar**: missing borders, wrong element counts, malformed entries
//! - **Resolution**: no handler can produce a transformer for a type, or the type graph recurses
//! - **Policy**: duplicate or null dictionary keys
//! - **Value**: a leaf transformer rejected its text
//! - **Settings**: special characters collide or borders are half configured
//!
//! ## Examples
//!
//! ```rust
//! use text_transform::{ErrorKind, TransformerStore};
//!
//! let store = TransformerStore::default();
//! let err = store.parse::<(i32, i32, i32)>("(1;2)").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Grammar);
//! assert!(err.to_string().contains("3rd element was not found"));
//! ```

use std::fmt;
use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Grammar,
    Resolution,
    Policy,
    Value,
    Settings,
    Other,
}

/// Start or end border of a bordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSide {
    Start,
    End,
}

impl fmt::Display for BorderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BorderSide::Start => "start",
            BorderSide::End => "end",
        })
    }
}

/// Represents all possible errors raised while transforming text.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Bordered text does not begin or end with the configured border
    #[error("{type_name} text should {side} with '{expected}': \"{input}\"")]
    MissingBorder {
        type_name: String,
        side: BorderSide,
        expected: char,
        input: String,
    },

    /// Fewer elements than the fixed arity requires
    #[error("{} element was not found in {type_name}", ordinal(.index))]
    ElementNotFound { type_name: String, index: usize },

    /// More elements than the fixed arity allows
    #[error("{type_name} cannot have more than {arity} elements")]
    TooManyElements { type_name: String, arity: usize },

    /// Fixed-size destination received the wrong number of elements
    #[error("{type_name} expects exactly {expected} elements, found {found}")]
    LengthMismatch {
        type_name: String,
        expected: usize,
        found: usize,
    },

    /// Dictionary entry lacks (or repeats) its key/value delimiter
    #[error("{type_name} entry \"{entry}\" must be a single key and value separated by '{delimiter}'")]
    MalformedEntry {
        type_name: String,
        entry: String,
        delimiter: char,
    },

    /// A leaf transformer could not interpret its text
    #[error("\"{input}\" is not a valid {type_name}: {reason}")]
    InvalidValue {
        type_name: String,
        input: String,
        reason: String,
    },

    /// Type has no empty (or null) representation
    #[error("{type_name} has no empty value")]
    EmptyNotSupported { type_name: String },

    /// No handler produced a transformer for the type
    #[error("Type '{type_name}' is not supported for text transformation; implement `Transformable` or register a transformer for it")]
    UnsupportedType { type_name: String },

    /// A field, element, key or value type of a composite could not be resolved
    #[error("Type '{type_name}' is not supported: component #{position} of type '{component}' failed to resolve")]
    UnsupportedComponent {
        type_name: String,
        position: usize,
        component: String,
        #[source]
        source: Box<Error>,
    },

    /// Resolution re-entered a type that is still being resolved
    #[error("Recursive type graph while resolving transformers: {chain}")]
    RecursiveType { type_name: String, chain: String },

    /// Resolution nested deeper than the configured limit
    #[error("Resolution of '{type_name}' exceeded the maximum depth of {depth}")]
    ResolutionDepthExceeded { type_name: String, depth: usize },

    /// A handler produced a transformer for a different type than requested
    #[error("Handler '{handler}' returned a transformer for '{actual}' when '{expected}' was requested")]
    TransformerMismatch {
        handler: String,
        expected: String,
        actual: String,
    },

    /// Key met twice under `DictionaryBehaviour::ThrowOnDuplicate`
    #[error("The key '{key}' has already been added to {type_name}")]
    DuplicateKey { type_name: String, key: String },

    /// Null marker in key position
    #[error("Key equal to null is not supported in {type_name}")]
    NullKey { type_name: String },

    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn ordinal(index: &usize) -> String {
    let suffix = match (index % 10, index % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{index}{suffix}")
}

impl Error {
    /// Returns the family this error belongs to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text_transform::{Error, ErrorKind};
    ///
    /// let err = Error::duplicate_key("HashMap<String, i32>", "a");
    /// assert_eq!(err.kind(), ErrorKind::Policy);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingBorder { .. }
            | Error::ElementNotFound { .. }
            | Error::TooManyElements { .. }
            | Error::LengthMismatch { .. }
            | Error::MalformedEntry { .. } => ErrorKind::Grammar,
            Error::InvalidValue { .. } | Error::EmptyNotSupported { .. } => ErrorKind::Value,
            Error::UnsupportedType { .. }
            | Error::UnsupportedComponent { .. }
            | Error::RecursiveType { .. }
            | Error::ResolutionDepthExceeded { .. }
            | Error::TransformerMismatch { .. } => ErrorKind::Resolution,
            Error::DuplicateKey { .. } | Error::NullKey { .. } => ErrorKind::Policy,
            Error::InvalidSettings(_) => ErrorKind::Settings,
            Error::Custom(_) => ErrorKind::Other,
        }
    }

    pub fn missing_border(type_name: &str, side: BorderSide, expected: char, input: &str) -> Self {
        Error::MissingBorder {
            type_name: type_name.to_string(),
            side,
            expected,
            input: input.to_string(),
        }
    }

    /// Creates the "Nth element not found" error. `index` is one-based.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text_transform::Error;
    ///
    /// let err = Error::element_not_found("(i32, i32, i32)", 3);
    /// assert_eq!(err.to_string(), "3rd element was not found in (i32, i32, i32)");
    /// ```
    pub fn element_not_found(type_name: &str, index: usize) -> Self {
        Error::ElementNotFound {
            type_name: type_name.to_string(),
            index,
        }
    }

    pub fn too_many_elements(type_name: &str, arity: usize) -> Self {
        Error::TooManyElements {
            type_name: type_name.to_string(),
            arity,
        }
    }

    pub fn length_mismatch(type_name: &str, expected: usize, found: usize) -> Self {
        Error::LengthMismatch {
            type_name: type_name.to_string(),
            expected,
            found,
        }
    }

    pub fn malformed_entry(type_name: &str, entry: &str, delimiter: char) -> Self {
        Error::MalformedEntry {
            type_name: type_name.to_string(),
            entry: entry.to_string(),
            delimiter,
        }
    }

    /// Creates a value error for text a leaf transformer rejected.
    pub fn invalid_value<R: fmt::Display>(type_name: &str, input: &str, reason: R) -> Self {
        Error::InvalidValue {
            type_name: type_name.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn empty_not_supported(type_name: &str) -> Self {
        Error::EmptyNotSupported {
            type_name: type_name.to_string(),
        }
    }

    pub fn unsupported_type(type_name: &str) -> Self {
        Error::UnsupportedType {
            type_name: type_name.to_string(),
        }
    }

    /// Wraps a resolution failure of one component (field, element, key, value) of a composite.
    pub fn unsupported_component(
        type_name: &str,
        position: usize,
        component: &str,
        source: Error,
    ) -> Self {
        Error::UnsupportedComponent {
            type_name: type_name.to_string(),
            position,
            component: component.to_string(),
            source: Box::new(source),
        }
    }

    /// Follows nested component failures down to the error that started them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text_transform::Error;
    ///
    /// let inner = Error::unsupported_type("Opaque");
    /// let err = Error::unsupported_component("Vec<Opaque>", 1, "Opaque", inner);
    /// assert!(matches!(err.root_cause(), Error::UnsupportedType { .. }));
    /// ```
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Error::UnsupportedComponent { source, .. } = err {
            err = source;
        }
        err
    }

    pub fn duplicate_key(type_name: &str, key: &str) -> Self {
        Error::DuplicateKey {
            type_name: type_name.to_string(),
            key: key.to_string(),
        }
    }

    pub fn null_key(type_name: &str) -> Self {
        Error::NullKey {
            type_name: type_name.to_string(),
        }
    }

    pub fn invalid_settings<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidSettings(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text_transform::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
