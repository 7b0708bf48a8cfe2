//! Map-like shapes: `k1=v1;k2=v2`.
//!
//! Entries are split on the entry delimiter, then each entry on the key/value delimiter; both
//! delimiters, the escape character and the null marker are escaped inside keys and values.
//! A null key is always rejected. Repeated keys follow the configured
//! [`DictionaryBehaviour`].

use crate::escape::tokenize;
use crate::transformer::resolve_component;
use crate::tuple_helper::{format_element_text, parse_element_text, read_element, unwrap_borders, ElementText};
use crate::{
    DictionaryBehaviour, DictionaryKind, DictionarySettings, ErasedTransformer, Error, Formatted,
    Result, Shape, ShapeKind, Transformable, Transformer, TransformerStore, ValueSequenceBuilder,
};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// A container of unique keys with one value each.
pub trait DictionaryTarget: Sized + Send + Sync + 'static {
    type Key: Transformable;
    type Value: Transformable;

    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    const KIND: DictionaryKind = DictionaryKind::Custom;

    fn with_capacity(capacity: usize) -> Self;

    fn contains_key(&self, key: &Self::Key) -> bool;

    /// Inserts or replaces the value of `key`.
    fn insert(&mut self, key: Self::Key, value: Self::Value);

    fn entries(&self) -> Self::Iter<'_>;

    fn entry_count(&self) -> usize;
}

impl<K, V, S> DictionaryTarget for HashMap<K, V, S>
where
    K: Transformable + Eq + Hash,
    V: Transformable,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    type Key = K;
    type Value = V;
    type Iter<'a> = std::collections::hash_map::Iter<'a, K, V>;
    const KIND: DictionaryKind = DictionaryKind::Hash;

    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<K: Transformable + Ord, V: Transformable> DictionaryTarget for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = std::collections::btree_map::Iter<'a, K, V>;
    const KIND: DictionaryKind = DictionaryKind::Sorted;

    fn with_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> DictionaryTarget for IndexMap<K, V, S>
where
    K: Transformable + Eq + Hash,
    V: Transformable,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    type Key = K;
    type Value = V;
    type Iter<'a> = indexmap::map::Iter<'a, K, V>;
    const KIND: DictionaryKind = DictionaryKind::Ordered;

    fn with_capacity(capacity: usize) -> Self {
        IndexMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn contains_key(&self, key: &K) -> bool {
        IndexMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        IndexMap::insert(self, key, value);
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

/// Transformer of a [`DictionaryTarget`].
pub struct DictionaryTransformer<D: DictionaryTarget> {
    settings: DictionarySettings,
    key: Arc<dyn Transformer<D::Key>>,
    value: Arc<dyn Transformer<D::Value>>,
}

impl<D: DictionaryTarget> DictionaryTransformer<D> {
    pub fn new(
        settings: DictionarySettings,
        key: Arc<dyn Transformer<D::Key>>,
        value: Arc<dyn Transformer<D::Value>>,
    ) -> Self {
        DictionaryTransformer {
            settings,
            key,
            value,
        }
    }

    fn add(&self, target: &mut D, key_text: &str, key: D::Key, value: D::Value) -> Result<()> {
        match self.settings.behaviour {
            DictionaryBehaviour::OverrideKeys => target.insert(key, value),
            DictionaryBehaviour::DoNotOverrideKeys => {
                if !target.contains_key(&key) {
                    target.insert(key, value);
                }
            }
            DictionaryBehaviour::ThrowOnDuplicate => {
                if target.contains_key(&key) {
                    return Err(Error::duplicate_key(std::any::type_name::<D>(), key_text));
                }
                target.insert(key, value);
            }
        }
        Ok(())
    }
}

impl<D: DictionaryTarget> Transformer<D> for DictionaryTransformer<D> {
    fn parse_core(&self, input: &str) -> Result<D> {
        let type_name = std::any::type_name::<D>();
        let settings = &self.settings;
        let delimiters = [settings.entry_delimiter, settings.key_value_delimiter];

        let interior = unwrap_borders(input, settings.start, settings.end, type_name)?;
        let mut target = D::with_capacity(
            settings
                .capacity
                .estimate(interior, settings.entry_delimiter),
        );
        if interior.is_empty() {
            return Ok(target);
        }

        for entry in tokenize(interior, settings.entry_delimiter, settings.escape, true) {
            let mut parts = tokenize(
                entry.as_str(),
                settings.key_value_delimiter,
                settings.escape,
                true,
            );
            let (Some(raw_key), Some(raw_value), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(Error::malformed_entry(
                    type_name,
                    entry.as_str(),
                    settings.key_value_delimiter,
                ));
            };

            let key_text = match read_element(
                raw_key.as_str(),
                settings.escape,
                settings.null_marker,
                &delimiters,
            ) {
                ElementText::Null => return Err(Error::null_key(type_name)),
                ElementText::Text(text) => text,
            };
            let key = self.key.parse(&key_text)?;
            let value = parse_element_text(
                raw_value.as_str(),
                settings.escape,
                settings.null_marker,
                &delimiters,
                &*self.value,
            )?;
            self.add(&mut target, &key_text, key, value)?;
        }
        Ok(target)
    }

    fn format_into(&self, value: &D, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        if value.entry_count() == 0 {
            return Formatted::Text;
        }
        let settings = &self.settings;
        let specials = settings.specials();

        if let Some(start) = settings.start {
            out.push(start);
        }
        for (i, (key, entry_value)) in value.entries().enumerate() {
            if i > 0 {
                out.push(settings.entry_delimiter);
            }
            format_element_text(
                out,
                key,
                &*self.key,
                settings.escape,
                settings.null_marker,
                &specials,
            );
            out.push(settings.key_value_delimiter);
            format_element_text(
                out,
                entry_value,
                &*self.value,
                settings.escape,
                settings.null_marker,
                &specials,
            );
        }
        if let Some(end) = settings.end {
            out.push(end);
        }
        Formatted::Text
    }

    fn empty(&self) -> Result<D> {
        Ok(D::with_capacity(0))
    }

    fn empty_is_distinct(&self) -> bool {
        true
    }
}

fn build_dictionary<D: DictionaryTarget>(store: &TransformerStore) -> Result<ErasedTransformer> {
    let owner = std::any::type_name::<D>();
    let key = resolve_component::<D::Key>(store, owner, 1)?;
    let value = resolve_component::<D::Value>(store, owner, 2)?;
    Ok(ErasedTransformer::of::<D, _>(DictionaryTransformer::<D>::new(
        store.settings().dictionary.clone(),
        key,
        value,
    )))
}

impl Shape {
    /// Built-in dictionary shape of `D`.
    #[must_use]
    pub fn dictionary<D: DictionaryTarget>() -> Shape {
        Shape::new(ShapeKind::Dictionary(D::KIND), build_dictionary::<D>)
    }

    /// User dictionary shape, tried after the built-in catalog.
    #[must_use]
    pub fn custom_dictionary<D: DictionaryTarget>() -> Shape {
        Shape::new(ShapeKind::CustomDictionary, build_dictionary::<D>)
    }
}

impl<K, V, S> Transformable for HashMap<K, V, S>
where
    K: Transformable + Eq + Hash,
    V: Transformable,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn shapes() -> Vec<Shape> {
        vec![Shape::dictionary::<Self>()]
    }
}

impl<K: Transformable + Ord, V: Transformable> Transformable for BTreeMap<K, V> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::dictionary::<Self>()]
    }
}

impl<K, V, S> Transformable for IndexMap<K, V, S>
where
    K: Transformable + Eq + Hash,
    V: Transformable,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn shapes() -> Vec<Shape> {
        vec![Shape::dictionary::<Self>()]
    }
}
