//! List-like shapes: `a|b|c`.
//!
//! Growable containers implement [`CollectionTarget`]; fixed-size or immutable ones
//! ([`Box<[T]>`], [`Arc<[T]>`], `[T; N]`) implement [`FrozenSequence`] and are populated from
//! a `Vec` once every element has been parsed.
//!
//! Every element follows the tuple element grammar: the null marker stands for the element
//! type's null value, and the escape character, null marker and delimiter are escaped inside
//! element text. An empty collection formats to empty text.

use crate::escape::tokenize;
use crate::transformer::resolve_component;
use crate::tuple_helper::{format_element_text, parse_element_text, unwrap_borders};
use crate::{
    CollectionKind, CollectionSettings, ErasedTransformer, Error, Formatted, Result, Shape,
    ShapeKind, Transformable, Transformer, TransformerStore, ValueSequenceBuilder,
};
use indexmap::IndexSet;
use std::collections::{BTreeSet, BinaryHeap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// A container populated one element at a time.
///
/// # Examples
///
/// A user collection served through the custom-collection handler:
///
/// ```rust
/// use text_transform::{CollectionTarget, Shape, Transformable, TransformerStore};
///
/// #[derive(Debug, PartialEq)]
/// struct Tags(Vec<String>);
///
/// impl CollectionTarget for Tags {
///     type Element = String;
///     type Iter<'a> = std::slice::Iter<'a, String>;
///
///     fn with_capacity(capacity: usize) -> Self {
///         Tags(Vec::with_capacity(capacity))
///     }
///     fn add(&mut self, element: String) {
///         self.0.push(element.to_lowercase());
///     }
///     fn elements(&self) -> Self::Iter<'_> {
///         self.0.iter()
///     }
///     fn element_count(&self) -> usize {
///         self.0.len()
///     }
/// }
///
/// impl Transformable for Tags {
///     fn shapes() -> Vec<Shape> {
///         vec![Shape::custom_collection::<Tags>()]
///     }
/// }
///
/// let store = TransformerStore::default();
/// let tags: Tags = store.parse("Rust|CLI").unwrap();
/// assert_eq!(tags, Tags(vec!["rust".into(), "cli".into()]));
/// ```
pub trait CollectionTarget: Sized + Send + Sync + 'static {
    type Element: Transformable;

    type Iter<'a>: Iterator<Item = &'a Self::Element>
    where
        Self: 'a;

    const KIND: CollectionKind = CollectionKind::Custom;

    fn with_capacity(capacity: usize) -> Self;

    fn add(&mut self, element: Self::Element);

    fn elements(&self) -> Self::Iter<'_>;

    fn element_count(&self) -> usize;
}

impl<T: Transformable> CollectionTarget for Vec<T> {
    type Element = T;
    type Iter<'a> = std::slice::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::List;

    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn add(&mut self, element: T) {
        self.push(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T: Transformable> CollectionTarget for VecDeque<T> {
    type Element = T;
    type Iter<'a> = std::collections::vec_deque::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::Deque;

    fn with_capacity(capacity: usize) -> Self {
        VecDeque::with_capacity(capacity)
    }

    fn add(&mut self, element: T) {
        self.push_back(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T: Transformable> CollectionTarget for LinkedList<T> {
    type Element = T;
    type Iter<'a> = std::collections::linked_list::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::LinkedList;

    fn with_capacity(_capacity: usize) -> Self {
        LinkedList::new()
    }

    fn add(&mut self, element: T) {
        self.push_back(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T, S> CollectionTarget for HashSet<T, S>
where
    T: Transformable + Eq + Hash,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    type Element = T;
    type Iter<'a> = std::collections::hash_set::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::HashSet;

    fn with_capacity(capacity: usize) -> Self {
        HashSet::with_capacity_and_hasher(capacity, S::default())
    }

    fn add(&mut self, element: T) {
        self.insert(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T: Transformable + Ord> CollectionTarget for BTreeSet<T> {
    type Element = T;
    type Iter<'a> = std::collections::btree_set::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::SortedSet;

    fn with_capacity(_capacity: usize) -> Self {
        BTreeSet::new()
    }

    fn add(&mut self, element: T) {
        self.insert(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T, S> CollectionTarget for IndexSet<T, S>
where
    T: Transformable + Eq + Hash,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    type Element = T;
    type Iter<'a> = indexmap::set::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::OrderedSet;

    fn with_capacity(capacity: usize) -> Self {
        IndexSet::with_capacity_and_hasher(capacity, S::default())
    }

    fn add(&mut self, element: T) {
        self.insert(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T: Transformable + Ord> CollectionTarget for BinaryHeap<T> {
    type Element = T;
    type Iter<'a> = std::collections::binary_heap::Iter<'a, T>;
    const KIND: CollectionKind = CollectionKind::Heap;

    fn with_capacity(capacity: usize) -> Self {
        BinaryHeap::with_capacity(capacity)
    }

    fn add(&mut self, element: T) {
        self.push(element);
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn element_count(&self) -> usize {
        self.len()
    }
}

/// A sequence that is built once from all of its elements.
pub trait FrozenSequence: Sized + Send + Sync + 'static {
    type Element: Transformable;

    const KIND: CollectionKind;

    fn from_vec(elements: Vec<Self::Element>, type_name: &str) -> Result<Self>;

    fn as_slice(&self) -> &[Self::Element];
}

impl<T: Transformable> FrozenSequence for Box<[T]> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::Slice;

    fn from_vec(elements: Vec<T>, _type_name: &str) -> Result<Self> {
        Ok(elements.into_boxed_slice())
    }

    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T: Transformable> FrozenSequence for Arc<[T]> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::Slice;

    fn from_vec(elements: Vec<T>, _type_name: &str) -> Result<Self> {
        Ok(Arc::from(elements))
    }

    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T: Transformable, const N: usize> FrozenSequence for [T; N] {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::Array;

    fn from_vec(elements: Vec<T>, type_name: &str) -> Result<Self> {
        <[T; N]>::try_from(elements)
            .map_err(|elements| Error::length_mismatch(type_name, N, elements.len()))
    }

    fn as_slice(&self) -> &[T] {
        self
    }
}

/// Parses every element of bordered, delimited `input` and hands it to `add`.
///
/// Returns the capacity estimate first so the caller can presize its container.
fn parse_elements<E, C>(
    settings: &CollectionSettings,
    element: &dyn Transformer<E>,
    input: &str,
    type_name: &str,
    create: impl FnOnce(usize) -> C,
    mut add: impl FnMut(&mut C, E),
) -> Result<C> {
    let interior = unwrap_borders(input, settings.start, settings.end, type_name)?;
    let mut target = create(settings.capacity.estimate(interior, settings.delimiter));
    if interior.is_empty() {
        return Ok(target);
    }
    for token in tokenize(interior, settings.delimiter, settings.escape, true) {
        let value = parse_element_text(
            token.as_str(),
            settings.escape,
            settings.null_marker,
            &[settings.delimiter],
            element,
        )?;
        add(&mut target, value);
    }
    Ok(target)
}

fn format_elements<'e, E: 'e>(
    settings: &CollectionSettings,
    element: &dyn Transformer<E>,
    elements: impl Iterator<Item = &'e E>,
    out: &mut ValueSequenceBuilder<'_>,
) -> Formatted {
    let specials = settings.specials();
    let mut elements = elements.peekable();
    if elements.peek().is_none() {
        return Formatted::Text;
    }
    if let Some(start) = settings.start {
        out.push(start);
    }
    for (i, value) in elements.enumerate() {
        if i > 0 {
            out.push(settings.delimiter);
        }
        format_element_text(
            out,
            value,
            element,
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

/// Transformer of a [`CollectionTarget`].
pub struct CollectionTransformer<C: CollectionTarget> {
    settings: CollectionSettings,
    element: Arc<dyn Transformer<C::Element>>,
}

impl<C: CollectionTarget> CollectionTransformer<C> {
    pub fn new(settings: CollectionSettings, element: Arc<dyn Transformer<C::Element>>) -> Self {
        CollectionTransformer { settings, element }
    }
}

impl<C: CollectionTarget> Transformer<C> for CollectionTransformer<C> {
    fn parse_core(&self, input: &str) -> Result<C> {
        parse_elements(
            &self.settings,
            &*self.element,
            input,
            std::any::type_name::<C>(),
            C::with_capacity,
            C::add,
        )
    }

    fn format_into(&self, value: &C, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        format_elements(&self.settings, &*self.element, value.elements(), out)
    }

    fn empty(&self) -> Result<C> {
        Ok(C::with_capacity(0))
    }

    fn empty_is_distinct(&self) -> bool {
        true
    }
}

/// Transformer of a [`FrozenSequence`].
pub struct FrozenSequenceTransformer<S: FrozenSequence> {
    settings: CollectionSettings,
    element: Arc<dyn Transformer<S::Element>>,
}

impl<S: FrozenSequence> FrozenSequenceTransformer<S> {
    pub fn new(settings: CollectionSettings, element: Arc<dyn Transformer<S::Element>>) -> Self {
        FrozenSequenceTransformer { settings, element }
    }
}

impl<S: FrozenSequence> Transformer<S> for FrozenSequenceTransformer<S> {
    fn parse_core(&self, input: &str) -> Result<S> {
        let type_name = std::any::type_name::<S>();
        let elements = parse_elements(
            &self.settings,
            &*self.element,
            input,
            type_name,
            Vec::with_capacity,
            Vec::push,
        )?;
        S::from_vec(elements, type_name)
    }

    fn format_into(&self, value: &S, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        format_elements(&self.settings, &*self.element, value.as_slice().iter(), out)
    }

    fn empty(&self) -> Result<S> {
        S::from_vec(Vec::new(), std::any::type_name::<S>())
    }

    fn empty_is_distinct(&self) -> bool {
        true
    }
}

fn build_collection<C: CollectionTarget>(store: &TransformerStore) -> Result<ErasedTransformer> {
    let element = resolve_component::<C::Element>(store, std::any::type_name::<C>(), 1)?;
    Ok(ErasedTransformer::of::<C, _>(CollectionTransformer::<C>::new(
        store.settings().collection.clone(),
        element,
    )))
}

fn build_frozen<S: FrozenSequence>(store: &TransformerStore) -> Result<ErasedTransformer> {
    let element = resolve_component::<S::Element>(store, std::any::type_name::<S>(), 1)?;
    Ok(ErasedTransformer::of::<S, _>(FrozenSequenceTransformer::<S>::new(
        store.settings().collection.clone(),
        element,
    )))
}

impl Shape {
    /// Built-in collection shape of `C`.
    #[must_use]
    pub fn collection<C: CollectionTarget>() -> Shape {
        Shape::new(ShapeKind::Collection(C::KIND), build_collection::<C>)
    }

    /// User collection shape, tried after the built-in catalog.
    #[must_use]
    pub fn custom_collection<C: CollectionTarget>() -> Shape {
        Shape::new(ShapeKind::CustomCollection, build_collection::<C>)
    }

    #[must_use]
    pub fn frozen_sequence<S: FrozenSequence>() -> Shape {
        Shape::new(ShapeKind::Collection(S::KIND), build_frozen::<S>)
    }
}

impl<T: Transformable> Transformable for Vec<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T: Transformable> Transformable for VecDeque<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T: Transformable> Transformable for LinkedList<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T, S> Transformable for HashSet<T, S>
where
    T: Transformable + Eq + Hash,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T: Transformable + Ord> Transformable for BTreeSet<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T, S> Transformable for IndexSet<T, S>
where
    T: Transformable + Eq + Hash,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T: Transformable + Ord> Transformable for BinaryHeap<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::collection::<Self>()]
    }
}

impl<T: Transformable> Transformable for Box<[T]> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::frozen_sequence::<Self>()]
    }
}

impl<T: Transformable> Transformable for Arc<[T]> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::frozen_sequence::<Self>()]
    }
}

impl<T: Transformable, const N: usize> Transformable for [T; N] {
    fn shapes() -> Vec<Shape> {
        vec![Shape::frozen_sequence::<Self>()]
    }
}
