//! Records rebuilt from their deconstructed fields: `(a;b;c)`.
//!
//! A [`Deconstructable`] type names its ordered field types, a constructor taking them and a
//! deconstruction returning them. Its transformer is specialized once per type over
//! [`TupleFields`], so parsing and formatting go straight through the field transformers
//! resolved at construction.

use crate::{
    ErasedTransformer, Error, Formatted, Result, Shape, ShapeKind, Transformer, TransformerStore,
    TupleFields, TupleHelper, ValueSequenceBuilder,
};

/// A product type convertible to and from an ordered tuple of its fields.
///
/// Usually implemented with [`deconstructable!`](crate::deconstructable); by hand it looks like
/// this:
///
/// ```rust
/// use text_transform::{Deconstructable, Shape, Transformable, TransformerStore};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Deconstructable for Point {
///     type Fields = (i32, i32);
///
///     fn construct((x, y): (i32, i32)) -> Self {
///         Point { x, y }
///     }
///
///     fn deconstruct(&self) -> (i32, i32) {
///         (self.x, self.y)
///     }
/// }
///
/// impl Transformable for Point {
///     fn shapes() -> Vec<Shape> {
///         vec![Shape::record::<Point>()]
///     }
/// }
///
/// let store = TransformerStore::default();
/// assert_eq!(store.format(&Point { x: 1, y: -2 }).unwrap().as_deref(), Some("(1;-2)"));
/// assert_eq!(store.parse::<Point>("(3;4)").unwrap(), Point { x: 3, y: 4 });
/// ```
pub trait Deconstructable: Sized + Send + Sync + 'static {
    type Fields: TupleFields;

    fn construct(fields: Self::Fields) -> Self;

    fn deconstruct(&self) -> Self::Fields;

    /// Borrowed fields, for records that can lend them instead of cloning in [`deconstruct`].
    ///
    /// [`deconstruct`]: Deconstructable::deconstruct
    fn deconstruct_ref(&self) -> Option<<Self::Fields as TupleFields>::Refs<'_>> {
        None
    }

    /// Value represented by empty text, when the record has one of its own.
    fn empty() -> Option<Self> {
        None
    }
}

/// Transformer of a [`Deconstructable`] record.
pub struct RecordTransformer<R: Deconstructable> {
    helper: TupleHelper,
    fields: <R::Fields as TupleFields>::Transformers,
    use_field_empties: bool,
}

impl<R: Deconstructable> RecordTransformer<R> {
    pub fn new(
        helper: TupleHelper,
        fields: <R::Fields as TupleFields>::Transformers,
        use_field_empties: bool,
    ) -> Self {
        RecordTransformer {
            helper,
            fields,
            use_field_empties,
        }
    }
}

impl<R: Deconstructable> Transformer<R> for RecordTransformer<R> {
    fn parse_core(&self, input: &str) -> Result<R> {
        R::Fields::parse_fields(&self.helper, &self.fields, input, std::any::type_name::<R>())
            .map(R::construct)
    }

    fn format_into(&self, value: &R, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        match value.deconstruct_ref() {
            Some(refs) => R::Fields::format_refs(refs, &self.helper, &self.fields, out),
            None => value
                .deconstruct()
                .format_fields(&self.helper, &self.fields, out),
        }
        Formatted::Text
    }

    fn empty(&self) -> Result<R> {
        if let Some(empty) = R::empty() {
            return Ok(empty);
        }
        if self.use_field_empties {
            R::Fields::empty_fields(&self.fields).map(R::construct)
        } else {
            Err(Error::empty_not_supported(std::any::type_name::<R>()))
        }
    }
}

fn build_record<R: Deconstructable>(store: &TransformerStore) -> Result<ErasedTransformer> {
    let settings = &store.settings().record;
    let helper = settings.helper()?;
    let fields = R::Fields::resolve(store, std::any::type_name::<R>())?;
    Ok(ErasedTransformer::of::<R, _>(RecordTransformer::<R>::new(
        helper,
        fields,
        settings.use_field_empties,
    )))
}

impl Shape {
    #[must_use]
    pub fn record<R: Deconstructable>() -> Shape {
        Shape::new(
            ShapeKind::Record(<R::Fields as TupleFields>::ARITY),
            build_record::<R>,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, RecordSettings, StoreSettings, Transformable};

    #[derive(Debug, PartialEq)]
    struct Span {
        start: u32,
        label: Option<String>,
    }

    impl Deconstructable for Span {
        type Fields = (u32, Option<String>);

        fn construct((start, label): Self::Fields) -> Self {
            Span { start, label }
        }

        fn deconstruct(&self) -> Self::Fields {
            (self.start, self.label.clone())
        }
    }

    impl Transformable for Span {
        fn shapes() -> Vec<Shape> {
            vec![Shape::record::<Span>()]
        }
    }

    #[derive(Debug, PartialEq)]
    struct Marker;

    impl Deconstructable for Marker {
        type Fields = (bool,);

        fn construct(_: (bool,)) -> Self {
            Marker
        }

        fn deconstruct(&self) -> (bool,) {
            (true,)
        }

        fn empty() -> Option<Self> {
            Some(Marker)
        }
    }

    impl Transformable for Marker {
        fn shapes() -> Vec<Shape> {
            vec![Shape::record::<Marker>()]
        }
    }

    struct Unknown;

    impl Transformable for Unknown {
        fn shapes() -> Vec<Shape> {
            Vec::new()
        }
    }

    struct Holder {
        _inner: Unknown,
    }

    impl Deconstructable for Holder {
        type Fields = (i32, Unknown);

        fn construct((_, inner): Self::Fields) -> Self {
            Holder { _inner: inner }
        }

        fn deconstruct(&self) -> Self::Fields {
            (0, Unknown)
        }
    }

    impl Transformable for Holder {
        fn shapes() -> Vec<Shape> {
            vec![Shape::record::<Holder>()]
        }
    }

    #[test]
    fn test_round_trip_with_null_field() {
        let store = TransformerStore::default();
        let span = Span {
            start: 4,
            label: None,
        };
        let text = store.format(&span).unwrap().unwrap();
        assert_eq!(text, "(4;∅)");
        assert_eq!(store.parse::<Span>(&text).unwrap(), span);
    }

    #[test]
    fn test_empty_text() {
        let store = TransformerStore::default();
        assert_eq!(
            store.parse::<Span>("").unwrap(),
            Span {
                start: 0,
                label: None
            }
        );
        assert_eq!(store.parse::<Marker>("").unwrap(), Marker);

        let settings =
            StoreSettings::new().with_record(RecordSettings::new().with_field_empties(false));
        let strict = TransformerStore::new(settings).unwrap();
        let err = strict.parse::<Span>("").unwrap_err();
        assert!(matches!(err, Error::EmptyNotSupported { .. }));
        assert_eq!(strict.parse::<Marker>("").unwrap(), Marker);
    }

    #[test]
    fn test_unresolvable_field_is_named() {
        let store = TransformerStore::default();
        let err = store.get::<Holder>().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        let message = err.to_string();
        assert!(message.contains("Holder"), "{message}");
        assert!(message.contains("component #2"), "{message}");
        assert!(message.contains("Unknown"), "{message}");
    }

    #[test]
    fn test_arity_reported_for_record() {
        let store = TransformerStore::default();
        let err = store.parse::<Span>("(1)").unwrap_err();
        assert!(err.to_string().contains("2nd element was not found"));
        assert!(err.to_string().contains("Span"));
    }
}
