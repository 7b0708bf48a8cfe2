//! # text_transform
//!
//! Bidirectional conversion of structured Rust values to and from one compact, delimited text
//! form, and back again without loss.
//!
//! ## What is it for?
//!
//! Configuration values, log fields, URL and CLI parameters often have to carry a list, a map
//! or a small record through a channel that only holds plain text. `text_transform` gives every
//! such type a single text representation that round-trips exactly, including nested
//! composites, empty values and nulls.
//!
//! ## Key Features
//!
//! - **One Grammar**: tuples `(a;b;c)`, lists `a|b|c`, maps `k1=v1;k2=v2`, null marker `∅`,
//!   escape character `\`, all configurable
//! - **Lossless Nesting**: inner delimiters are escaped, so any depth of composites round-trips
//! - **Empty vs Null**: an empty collection formats to `""`, a missing one to `None`
//! - **Cached Resolution**: transformers are built once per type and shared across threads
//! - **Allocation Light**: tokens borrow the input and formatting starts on a stack buffer
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use text_transform::TransformerStore;
//!
//! let store = TransformerStore::default();
//!
//! let text = store.format(&vec![1, 2, 3]).unwrap();
//! assert_eq!(text.as_deref(), Some("1|2|3"));
//!
//! let ports: BTreeMap<String, u16> = store.parse("http=80;https=443").unwrap();
//! assert_eq!(ports["https"], 443);
//!
//! let tuple: (i32, Option<String>, Vec<bool>) = store.parse("(7;∅;true|false)").unwrap();
//! assert_eq!(tuple, (7, None, vec![true, false]));
//! ```
//!
//! ### Records and Enums
//!
//! ```rust
//! use text_transform::{deconstructable, transformable_enum, TransformerStore};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! enum Role {
//!     Admin,
//!     Guest,
//! }
//!
//! transformable_enum!(Role { Admin, Guest });
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     roles: Vec<Role>,
//! }
//!
//! deconstructable!(User { id: u32, name: String, roles: Vec<Role> });
//!
//! let store = TransformerStore::default();
//! let user = User { id: 1, name: "Ada; Lovelace".into(), roles: vec![Role::Admin] };
//! let text = store.format(&user).unwrap().unwrap();
//! assert_eq!(text, r"(1;Ada\; Lovelace;Admin)");
//! assert_eq!(store.parse::<User>(&text).unwrap(), user);
//! ```
//!
//! ## Resolution
//!
//! A [`TransformerStore`] resolves a type by walking its handler chain in ascending priority:
//! leaves, `Option`, key/value pairs, enums, tuples, built-in collections and dictionaries,
//! custom collections and dictionaries, `FromStr` types, string-convertible types, records.
//! The first handler accepting the type builds its transformer, resolving component types
//! through the same store; the result is cached. Types nobody accepts fail with a message
//! naming them.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Failed parses return an error and never a partially built value
//! - Resolution of self-referential types fails with an error instead of overflowing the stack
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Formatting and parsing built-in types
//! - **`records.rs`** - Records, enums and nested composites
//! - **`custom_settings.rs`** - Custom grammar, duplicate-key policies and logging
//!
//! Run any of them with: `cargo run --example <name>`

pub mod builder;
pub mod collection;
pub mod convention;
pub mod dictionary;
pub mod enums;
pub mod error;
pub mod escape;
pub mod leaf;
pub mod macros;
pub mod nullable;
pub mod pair;
pub mod record;
pub mod settings;
pub mod store;
pub mod transformer;
pub mod tuple;
pub mod tuple_helper;

pub use builder::{BufferPool, ValueSequenceBuilder, STACK_CAPACITY};
pub use collection::{
    CollectionTarget, CollectionTransformer, FrozenSequence, FrozenSequenceTransformer,
};
pub use convention::{ParsableTransformer, StringConvertibleTransformer};
pub use dictionary::{DictionaryTarget, DictionaryTransformer};
pub use enums::{EnumTransformable, EnumTransformer};
pub use error::{BorderSide, Error, ErrorKind, Result};
pub use leaf::{LeafText, LeafTransformer};
pub use nullable::NullableTransformer;
pub use pair::{KeyValuePair, KeyValuePairTransformer};
pub use record::{Deconstructable, RecordTransformer};
pub use settings::{
    CapacityEstimation, CollectionSettings, DictionaryBehaviour, DictionarySettings,
    EnumSettings, KeyValuePairSettings, RecordSettings, StoreSettings, TupleSettings,
    MAX_FIXED_CAPACITY,
};
pub use store::{
    priority, Handler, RegisteredHandler, ShapeHandler, SinkHandler, StoreBuilder,
    TransformerStore, MAX_RESOLUTION_DEPTH,
};
pub use transformer::{
    CollectionKind, DictionaryKind, ErasedTransformer, Factory, Formatted, Shape, ShapeFamily,
    ShapeKind, Transformable, Transformer, TypeInfo,
};
pub use tuple::{TupleFields, TupleTransformer};
pub use tuple_helper::{TupleCursor, TupleHelper};
