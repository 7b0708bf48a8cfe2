//! [`KeyValuePair`]: a key and a value written `key=value`.

use crate::transformer::resolve_component;
use crate::{
    ErasedTransformer, Formatted, Result, Shape, ShapeKind, Transformable, Transformer,
    TupleHelper, ValueSequenceBuilder,
};
use std::sync::Arc;

/// A key with its value.
///
/// # Examples
///
/// ```rust
/// use text_transform::{KeyValuePair, TransformerStore};
///
/// let store = TransformerStore::default();
/// let pair = KeyValuePair::new("port".to_string(), 8080u16);
/// assert_eq!(store.format(&pair).unwrap().as_deref(), Some("port=8080"));
/// assert_eq!(store.parse::<KeyValuePair<String, u16>>("port=8080").unwrap(), pair);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValuePair<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValuePair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        KeyValuePair { key, value }
    }

    pub fn into_tuple(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for KeyValuePair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        KeyValuePair { key, value }
    }
}

pub struct KeyValuePairTransformer<K, V> {
    helper: TupleHelper,
    key: Arc<dyn Transformer<K>>,
    value: Arc<dyn Transformer<V>>,
}

impl<K, V> KeyValuePairTransformer<K, V> {
    pub fn new(
        helper: TupleHelper,
        key: Arc<dyn Transformer<K>>,
        value: Arc<dyn Transformer<V>>,
    ) -> Self {
        KeyValuePairTransformer { helper, key, value }
    }
}

impl<K: 'static, V: 'static> Transformer<KeyValuePair<K, V>> for KeyValuePairTransformer<K, V> {
    fn parse_core(&self, input: &str) -> Result<KeyValuePair<K, V>> {
        let type_name = std::any::type_name::<KeyValuePair<K, V>>();
        let mut cursor = self.helper.parse_start(input, type_name)?;
        let key = self.helper.parse_element(&cursor, &*self.key)?;
        self.helper.parse_next(&mut cursor, 2, type_name)?;
        let value = self.helper.parse_element(&cursor, &*self.value)?;
        self.helper.parse_end(&mut cursor, 2, type_name)?;
        Ok(KeyValuePair { key, value })
    }

    fn format_into(&self, pair: &KeyValuePair<K, V>, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        self.helper.start_format(out);
        self.helper.format_element(out, &pair.key, &*self.key);
        self.helper.add_delimiter(out);
        self.helper.format_element(out, &pair.value, &*self.value);
        self.helper.add_delimiter(out);
        self.helper.end_format(out);
        Formatted::Text
    }

    fn empty(&self) -> Result<KeyValuePair<K, V>> {
        Ok(KeyValuePair {
            key: self.key.empty()?,
            value: self.value.empty()?,
        })
    }
}

impl<K: Transformable, V: Transformable> Transformable for KeyValuePair<K, V> {
    fn shapes() -> Vec<Shape> {
        vec![Shape::new(ShapeKind::KeyValuePair, |store| {
            let owner = std::any::type_name::<KeyValuePair<K, V>>();
            let helper = store.settings().pair.helper()?;
            let key = resolve_component::<K>(store, owner, 1)?;
            let value = resolve_component::<V>(store, owner, 2)?;
            Ok(ErasedTransformer::of::<KeyValuePair<K, V>, _>(
                KeyValuePairTransformer::new(helper, key, value),
            ))
        })]
    }
}
