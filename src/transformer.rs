//! The transformer contract and the type descriptions the store resolves against.
//!
//! A [`Transformer<T>`] is an immutable parse/format pair. Types become resolvable by
//! implementing [`Transformable`], which lists the [`Shape`]s of the type: a cheap
//! [`ShapeKind`] probed by handlers plus a monomorphized factory the chosen handler invokes.

use crate::builder::STACK_CAPACITY;
use crate::{Error, Result, TransformerStore, ValueSequenceBuilder};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Outcome of [`Transformer::format_into`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formatted {
    /// Text was written.
    Text,
    /// The value is null; nothing was written.
    Null,
}

/// Parse/format pair for `T`.
///
/// Implementors provide [`parse_core`](Transformer::parse_core) for non-empty text,
/// [`format_into`](Transformer::format_into) and [`empty`](Transformer::empty); the remaining
/// methods have defaults. Transformers are stateless after construction and shared freely
/// across threads.
///
/// # Examples
///
/// ```rust
/// use text_transform::{Formatted, Result, Transformer, ValueSequenceBuilder};
///
/// struct Upper;
///
/// impl Transformer<String> for Upper {
///     fn parse_core(&self, input: &str) -> Result<String> {
///         Ok(input.to_lowercase())
///     }
///
///     fn format_into(&self, value: &String, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
///         out.append(&value.to_uppercase());
///         Formatted::Text
///     }
///
///     fn empty(&self) -> Result<String> {
///         Ok(String::new())
///     }
/// }
///
/// assert_eq!(Upper.format(&"abc".to_string()).as_deref(), Some("ABC"));
/// assert_eq!(Upper.parse("ABC").unwrap(), "abc");
/// ```
pub trait Transformer<T>: Send + Sync {
    /// Parses non-empty text.
    fn parse_core(&self, input: &str) -> Result<T>;

    /// Writes the text form of `value`, or reports it as null.
    fn format_into(&self, value: &T, out: &mut ValueSequenceBuilder<'_>) -> Formatted;

    /// Value represented by empty text.
    fn empty(&self) -> Result<T>;

    /// Value represented by the null marker.
    fn null(&self) -> Result<T> {
        self.empty()
    }

    /// Whether empty text is a value of its own rather than the absence of one.
    fn empty_is_distinct(&self) -> bool {
        false
    }

    fn parse(&self, input: &str) -> Result<T> {
        if input.is_empty() {
            self.empty()
        } else {
            self.parse_core(input)
        }
    }

    /// Parses text that may itself be null.
    fn parse_nullable(&self, input: Option<&str>) -> Result<T> {
        match input {
            Some(text) => self.parse(text),
            None => self.null(),
        }
    }

    /// Formats `value`; `None` means null, which is distinct from empty text.
    fn format(&self, value: &T) -> Option<String> {
        let mut initial = [0u8; STACK_CAPACITY];
        let mut out = ValueSequenceBuilder::new(&mut initial);
        match self.format_into(value, &mut out) {
            Formatted::Text => Some(out.as_str().to_owned()),
            Formatted::Null => None,
        }
    }
}

/// A `Transformer<T>` with its type parameter erased, as stored in the resolution cache.
#[derive(Clone)]
pub struct ErasedTransformer {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedTransformer {
    pub fn new<T: 'static>(transformer: Arc<dyn Transformer<T>>) -> Self {
        ErasedTransformer {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(transformer),
        }
    }

    pub fn of<T: 'static, X: Transformer<T> + 'static>(transformer: X) -> Self {
        Self::new::<T>(Arc::new(transformer))
    }

    /// Name of the type the erased transformer handles.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn Transformer<T>>> {
        self.inner.downcast_ref::<Arc<dyn Transformer<T>>>().cloned()
    }
}

impl fmt::Debug for ErasedTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErasedTransformer")
            .field(&self.type_name)
            .finish()
    }
}

/// Builds a transformer for one concrete type, resolving component types through the store.
pub type Factory = fn(&TransformerStore) -> Result<ErasedTransformer>;

/// Well-known collection shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Deque,
    LinkedList,
    HashSet,
    SortedSet,
    OrderedSet,
    Heap,
    Slice,
    Array,
    Custom,
}

/// Well-known dictionary shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DictionaryKind {
    Hash,
    Sorted,
    Ordered,
    Custom,
}

/// Structural description of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Leaf,
    Nullable,
    KeyValuePair,
    Enum,
    Tuple(usize),
    Collection(CollectionKind),
    Dictionary(DictionaryKind),
    CustomCollection,
    CustomDictionary,
    Parsable,
    StringConvertible,
    Record(usize),
}

/// [`ShapeKind`] without its parameters; one built-in handler exists per family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    Leaf,
    Nullable,
    KeyValuePair,
    Enum,
    Tuple,
    Collection,
    Dictionary,
    CustomCollection,
    CustomDictionary,
    Parsable,
    StringConvertible,
    Record,
}

impl ShapeKind {
    #[must_use]
    pub fn family(&self) -> ShapeFamily {
        match self {
            ShapeKind::Leaf => ShapeFamily::Leaf,
            ShapeKind::Nullable => ShapeFamily::Nullable,
            ShapeKind::KeyValuePair => ShapeFamily::KeyValuePair,
            ShapeKind::Enum => ShapeFamily::Enum,
            ShapeKind::Tuple(_) => ShapeFamily::Tuple,
            ShapeKind::Collection(_) => ShapeFamily::Collection,
            ShapeKind::Dictionary(_) => ShapeFamily::Dictionary,
            ShapeKind::CustomCollection => ShapeFamily::CustomCollection,
            ShapeKind::CustomDictionary => ShapeFamily::CustomDictionary,
            ShapeKind::Parsable => ShapeFamily::Parsable,
            ShapeKind::StringConvertible => ShapeFamily::StringConvertible,
            ShapeKind::Record(_) => ShapeFamily::Record,
        }
    }
}

/// A [`ShapeKind`] together with the factory building the matching transformer.
#[derive(Clone, Copy)]
pub struct Shape {
    kind: ShapeKind,
    factory: Factory,
}

impl Shape {
    pub fn new(kind: ShapeKind, factory: Factory) -> Self {
        Shape { kind, factory }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn family(&self) -> ShapeFamily {
        self.kind.family()
    }

    pub fn build(&self, store: &TransformerStore) -> Result<ErasedTransformer> {
        (self.factory)(store)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shape").field(&self.kind).finish()
    }
}

/// A type the [`TransformerStore`] can resolve.
///
/// Built-in scalars, `Option`, tuples, std/indexmap collections and maps implement it already.
/// Records and enums usually get it from the [`deconstructable!`](crate::deconstructable) and
/// [`transformable_enum!`](crate::transformable_enum) macros; other types list their shapes
/// by hand:
///
/// ```rust
/// use std::fmt;
/// use std::str::FromStr;
/// use text_transform::{Shape, Transformable, TransformerStore};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl FromStr for Celsius {
///     type Err = String;
///     fn from_str(s: &str) -> Result<Self, String> {
///         s.trim_end_matches("°C").parse().map(Celsius).map_err(|_| format!("bad temperature {s}"))
///     }
/// }
///
/// impl fmt::Display for Celsius {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}°C", self.0)
///     }
/// }
///
/// impl Transformable for Celsius {
///     fn shapes() -> Vec<Shape> {
///         vec![Shape::parsable::<Celsius>()]
///     }
/// }
///
/// let store = TransformerStore::default();
/// let readings: Vec<Celsius> = store.parse("21.5°C|19°C").unwrap();
/// assert_eq!(readings, vec![Celsius(21.5), Celsius(19.0)]);
/// ```
pub trait Transformable: Sized + Send + Sync + 'static {
    fn shapes() -> Vec<Shape>;
}

/// Everything a handler may inspect about a requested type.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
    pub shapes: Vec<Shape>,
}

impl TypeInfo {
    pub fn of<T: Transformable>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shapes: T::shapes(),
        }
    }

    #[must_use]
    pub fn has_family(&self, family: ShapeFamily) -> bool {
        self.shapes.iter().any(|s| s.family() == family)
    }

    #[must_use]
    pub fn shape(&self, family: ShapeFamily) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.family() == family)
    }
}

/// Resolves the transformer of one component of a composite, naming the component on failure.
pub(crate) fn resolve_component<T: Transformable>(
    store: &TransformerStore,
    owner: &str,
    position: usize,
) -> Result<Arc<dyn Transformer<T>>> {
    store.get::<T>().map_err(|source| {
        Error::unsupported_component(owner, position, std::any::type_name::<T>(), source)
    })
}
