//! Transformer resolution: a priority-ordered chain of handlers in front of a lazy cache.
//!
//! [`TransformerStore::get`] returns the cached transformer for a type or walks the handler
//! chain in ascending [`Handler::priority`] order; the first handler whose
//! [`can_handle`](Handler::can_handle) accepts the type builds the transformer, which is then
//! cached for the life of the store. Composite factories call back into the same store for
//! their element, key, value and field types.
//!
//! The chain always ends in a sink handler that accepts every type and fails with
//! [`Error::UnsupportedType`], so resolution ends in either a transformer or a diagnostic.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use text_transform::TransformerStore;
//!
//! let store = TransformerStore::default();
//! let map: BTreeMap<String, Vec<i32>> = store.parse(r"a=1|2;b=3").unwrap();
//! assert_eq!(map["a"], vec![1, 2]);
//! assert_eq!(store.format(&map).unwrap().as_deref(), Some("a=1|2;b=3"));
//! ```

use crate::{
    ErasedTransformer, Error, Result, ShapeFamily, StoreSettings, Transformable, Transformer,
    TypeInfo,
};
use dashmap::DashMap;
use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// Deepest nesting of types resolved through one call.
pub const MAX_RESOLUTION_DEPTH: usize = 64;

/// Priorities of the built-in handlers. Lower values are tried first.
pub mod priority {
    pub const LEAF: u32 = 10;
    pub const NULLABLE: u32 = 20;
    pub const KEY_VALUE_PAIR: u32 = 30;
    pub const ENUM: u32 = 40;
    pub const TUPLE: u32 = 50;
    pub const COLLECTION: u32 = 70;
    pub const DICTIONARY: u32 = 80;
    pub const CUSTOM_DICTIONARY: u32 = 150;
    pub const CUSTOM_COLLECTION: u32 = 160;
    pub const PARSABLE: u32 = 200;
    pub const STRING_CONVERTIBLE: u32 = 250;
    pub const RECORD: u32 = 300;
    pub const SINK: u32 = u32::MAX;
}

/// One link of the resolution chain.
///
/// `can_handle` is probed for many types, so it must be cheap and free of side effects.
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> u32;

    fn can_handle(&self, info: &TypeInfo) -> bool;

    /// Builds the transformer for a type this handler accepted.
    fn create(&self, info: &TypeInfo, store: &TransformerStore) -> Result<ErasedTransformer>;
}

/// Handles every type exposing a shape of one family.
#[derive(Debug, Clone)]
pub struct ShapeHandler {
    name: &'static str,
    family: ShapeFamily,
    priority: u32,
}

impl ShapeHandler {
    #[must_use]
    pub fn new(name: &'static str, family: ShapeFamily, priority: u32) -> Self {
        ShapeHandler {
            name,
            family,
            priority,
        }
    }

    fn defaults() -> Vec<ShapeHandler> {
        vec![
            ShapeHandler::new("leaf", ShapeFamily::Leaf, priority::LEAF),
            ShapeHandler::new("nullable", ShapeFamily::Nullable, priority::NULLABLE),
            ShapeHandler::new("key-value-pair", ShapeFamily::KeyValuePair, priority::KEY_VALUE_PAIR),
            ShapeHandler::new("enum", ShapeFamily::Enum, priority::ENUM),
            ShapeHandler::new("tuple", ShapeFamily::Tuple, priority::TUPLE),
            ShapeHandler::new("collection", ShapeFamily::Collection, priority::COLLECTION),
            ShapeHandler::new("dictionary", ShapeFamily::Dictionary, priority::DICTIONARY),
            ShapeHandler::new("custom-dictionary", ShapeFamily::CustomDictionary, priority::CUSTOM_DICTIONARY),
            ShapeHandler::new("custom-collection", ShapeFamily::CustomCollection, priority::CUSTOM_COLLECTION),
            ShapeHandler::new("parsable", ShapeFamily::Parsable, priority::PARSABLE),
            ShapeHandler::new("string-convertible", ShapeFamily::StringConvertible, priority::STRING_CONVERTIBLE),
            ShapeHandler::new("record", ShapeFamily::Record, priority::RECORD),
        ]
    }
}

impl Handler for ShapeHandler {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, info: &TypeInfo) -> bool {
        info.has_family(self.family)
    }

    fn create(&self, info: &TypeInfo, store: &TransformerStore) -> Result<ErasedTransformer> {
        match info.shape(self.family) {
            Some(shape) => shape.build(store),
            None => Err(Error::unsupported_type(info.name)),
        }
    }
}

/// Serves a prebuilt transformer for exactly one type.
#[derive(Debug, Clone)]
pub struct RegisteredHandler {
    type_id: TypeId,
    priority: u32,
    transformer: ErasedTransformer,
}

impl RegisteredHandler {
    pub fn new<T: 'static>(priority: u32, transformer: Arc<dyn Transformer<T>>) -> Self {
        RegisteredHandler {
            type_id: TypeId::of::<T>(),
            priority,
            transformer: ErasedTransformer::new(transformer),
        }
    }
}

impl Handler for RegisteredHandler {
    fn name(&self) -> &str {
        self.transformer.type_name()
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, info: &TypeInfo) -> bool {
        info.id == self.type_id
    }

    fn create(&self, _info: &TypeInfo, _store: &TransformerStore) -> Result<ErasedTransformer> {
        Ok(self.transformer.clone())
    }
}

/// Last link of every chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkHandler;

impl Handler for SinkHandler {
    fn name(&self) -> &str {
        "sink"
    }

    fn priority(&self) -> u32 {
        priority::SINK
    }

    fn can_handle(&self, _info: &TypeInfo) -> bool {
        true
    }

    fn create(&self, info: &TypeInfo, _store: &TransformerStore) -> Result<ErasedTransformer> {
        Err(Error::unsupported_type(info.name))
    }
}

thread_local! {
    static RESOLVING: RefCell<Vec<(TypeId, &'static str)>> = RefCell::new(Vec::new());
}

/// Marks a type as being resolved on this thread for the guard's lifetime.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(id: TypeId, name: &'static str) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|(seen, _)| *seen == id) {
                let mut chain: Vec<&str> = stack
                    .iter()
                    .skip_while(|(seen, _)| *seen != id)
                    .map(|(_, name)| *name)
                    .collect();
                chain.push(name);
                return Err(Error::RecursiveType {
                    type_name: name.to_string(),
                    chain: chain.join(" -> "),
                });
            }
            if stack.len() >= MAX_RESOLUTION_DEPTH {
                return Err(Error::ResolutionDepthExceeded {
                    type_name: name.to_string(),
                    depth: MAX_RESOLUTION_DEPTH,
                });
            }
            stack.push((id, name));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Registry of handlers and cache of the transformers they built.
///
/// Construct it once and share it by reference; it is `Send + Sync` and resolution may run
/// concurrently from any number of threads.
pub struct TransformerStore {
    handlers: Vec<Box<dyn Handler>>,
    cache: DashMap<TypeId, ErasedTransformer>,
    settings: StoreSettings,
}

impl TransformerStore {
    /// Creates a store with the built-in handler chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] when `settings` fail validation.
    pub fn new(settings: StoreSettings) -> Result<Self> {
        StoreBuilder::new().settings(settings).build()
    }

    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    fn assemble(settings: StoreSettings, mut handlers: Vec<Box<dyn Handler>>) -> Self {
        handlers.extend(
            ShapeHandler::defaults()
                .into_iter()
                .map(|h| Box::new(h) as Box<dyn Handler>),
        );
        handlers.push(Box::new(SinkHandler));
        // stable: on equal priority, user handlers stay ahead of built-in ones
        handlers.sort_by_key(|h| h.priority());
        TransformerStore {
            handlers,
            cache: DashMap::new(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Handlers in the order they are tried.
    pub fn handlers(&self) -> impl Iterator<Item = &dyn Handler> + '_ {
        self.handlers.iter().map(|h| h.as_ref())
    }

    /// Returns the transformer for `T`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// Fails with a resolution error when no handler supports `T` or one of its components,
    /// or when the type graph of `T` is recursive.
    pub fn get<T: Transformable>(&self) -> Result<Arc<dyn Transformer<T>>> {
        let id = TypeId::of::<T>();
        if let Some(cached) = self.cache.get(&id).map(|entry| entry.value().clone()) {
            tracing::trace!(type_name = cached.type_name(), "transformer cache hit");
            return Self::typed(&cached, "cache");
        }

        let info = TypeInfo::of::<T>();
        let _guard = ResolutionGuard::enter(id, info.name)?;
        let (handler, created) = self.create(&info)?;
        let typed = Self::typed::<T>(&created, handler)?;
        // concurrent first resolutions may both build; the first stored instance wins
        let stored = self.cache.entry(id).or_insert(created).value().clone();
        Ok(stored.downcast::<T>().unwrap_or(typed))
    }

    fn create(&self, info: &TypeInfo) -> Result<(&str, ErasedTransformer)> {
        for handler in &self.handlers {
            if handler.can_handle(info) {
                tracing::debug!(
                    type_name = info.name,
                    handler = handler.name(),
                    priority = handler.priority(),
                    "building transformer"
                );
                return handler.create(info, self).map(|t| (handler.name(), t));
            }
        }
        Err(Error::unsupported_type(info.name))
    }

    fn typed<T: 'static>(erased: &ErasedTransformer, handler: &str) -> Result<Arc<dyn Transformer<T>>> {
        erased.downcast::<T>().ok_or_else(|| Error::TransformerMismatch {
            handler: handler.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: erased.type_name().to_string(),
        })
    }

    /// Parses `input` as `T`.
    pub fn parse<T: Transformable>(&self, input: &str) -> Result<T> {
        self.get::<T>()?.parse(input)
    }

    /// Parses possibly-null text as `T`.
    pub fn parse_nullable<T: Transformable>(&self, input: Option<&str>) -> Result<T> {
        self.get::<T>()?.parse_nullable(input)
    }

    /// Formats `value`; `Ok(None)` is null.
    pub fn format<T: Transformable>(&self, value: &T) -> Result<Option<String>> {
        Ok(self.get::<T>()?.format(value))
    }

    #[must_use]
    pub fn is_cached<T: 'static>(&self) -> bool {
        self.cache.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl Default for TransformerStore {
    fn default() -> Self {
        TransformerStore::assemble(StoreSettings::default(), Vec::new())
    }
}

impl fmt::Debug for TransformerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: Vec<(&str, u32)> = self.handlers().map(|h| (h.name(), h.priority())).collect();
        f.debug_struct("TransformerStore")
            .field("handlers", &handlers)
            .field("cached", &self.cache.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Configures a [`TransformerStore`]: settings, extra handlers and explicit transformers.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use text_transform::{priority, Formatted, Result, TransformerStore, Transformer, ValueSequenceBuilder};
///
/// struct YesNo;
///
/// impl Transformer<bool> for YesNo {
///     fn parse_core(&self, input: &str) -> Result<bool> {
///         Ok(input == "yes")
///     }
///     fn format_into(&self, value: &bool, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
///         out.append(if *value { "yes" } else { "no" });
///         Formatted::Text
///     }
///     fn empty(&self) -> Result<bool> {
///         Ok(false)
///     }
/// }
///
/// let store = TransformerStore::builder()
///     .transformer::<bool>(priority::LEAF - 1, Arc::new(YesNo))
///     .build()
///     .unwrap();
/// assert_eq!(store.format(&vec![true, false]).unwrap().as_deref(), Some("yes|no"));
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    settings: StoreSettings,
    handlers: Vec<Box<dyn Handler>>,
}

impl StoreBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn settings(mut self, settings: StoreSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds a handler to the chain.
    #[must_use]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Serves `transformer` for `T` at `priority`.
    #[must_use]
    pub fn transformer<T: 'static>(self, priority: u32, transformer: Arc<dyn Transformer<T>>) -> Self {
        self.handler(RegisteredHandler::new(priority, transformer))
    }

    /// Validates the settings and builds the store.
    pub fn build(self) -> Result<TransformerStore> {
        self.settings.validate()?;
        Ok(TransformerStore::assemble(self.settings, self.handlers))
    }
}
