//! `Option<T>`: `None` is null, `Some` delegates to the inner transformer.
//!
//! Empty text parses to `Some(empty)` when the inner type treats empty text as a value of its
//! own (strings, collections) and to `None` otherwise, so `Option<Vec<T>>` keeps an empty
//! collection and a missing one apart.

use crate::transformer::resolve_component;
use crate::{
    ErasedTransformer, Formatted, Result, Shape, ShapeKind, Transformable, Transformer,
    ValueSequenceBuilder,
};
use std::sync::Arc;

pub struct NullableTransformer<T> {
    inner: Arc<dyn Transformer<T>>,
}

impl<T> NullableTransformer<T> {
    pub fn new(inner: Arc<dyn Transformer<T>>) -> Self {
        NullableTransformer { inner }
    }
}

impl<T> Transformer<Option<T>> for NullableTransformer<T> {
    fn parse_core(&self, input: &str) -> Result<Option<T>> {
        self.inner.parse_core(input).map(Some)
    }

    fn format_into(&self, value: &Option<T>, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        match value {
            Some(inner) => self.inner.format_into(inner, out),
            None => Formatted::Null,
        }
    }

    fn empty(&self) -> Result<Option<T>> {
        if self.inner.empty_is_distinct() {
            self.inner.empty().map(Some)
        } else {
            Ok(None)
        }
    }

    fn null(&self) -> Result<Option<T>> {
        Ok(None)
    }

    fn empty_is_distinct(&self) -> bool {
        self.inner.empty_is_distinct()
    }
}

impl<T: Transformable> Transformable for Option<T> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::new(ShapeKind::Nullable, |store| {
            let inner = resolve_component::<T>(store, std::any::type_name::<Option<T>>(), 1)?;
            Ok(ErasedTransformer::of::<Option<T>, _>(NullableTransformer::new(inner)))
        })]
    }
}

#[cfg(test)]
mod tests {
    use crate::TransformerStore;

    #[test]
    fn test_none_is_null() {
        let store = TransformerStore::default();
        assert_eq!(store.format(&None::<i32>).unwrap(), None);
        assert_eq!(store.format(&Some(5)).unwrap().as_deref(), Some("5"));
        assert_eq!(store.parse_nullable::<Option<i32>>(None).unwrap(), None);
    }

    #[test]
    fn test_empty_text_depends_on_inner() {
        let store = TransformerStore::default();
        assert_eq!(store.parse::<Option<i32>>("").unwrap(), None);
        assert_eq!(store.parse::<Option<String>>("").unwrap(), Some(String::new()));
        assert_eq!(store.parse::<Option<Vec<i32>>>("").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_nested_options_in_list() {
        let store = TransformerStore::default();
        let values = vec![Some(1), None, Some(3)];
        let text = store.format(&values).unwrap();
        assert_eq!(text.as_deref(), Some("1|∅|3"));
        assert_eq!(store.parse::<Vec<Option<i32>>>("1|∅|3").unwrap(), values);
    }
}
