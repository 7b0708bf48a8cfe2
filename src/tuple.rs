//! Tuples of arity 1 through 8: `(a;b;c)`.
//!
//! [`TupleFields`] is the per-arity glue between a product type's ordered fields and the
//! [`TupleHelper`] grammar. Records reuse it for their deconstructed fields,
//! which may run up to 16.

use crate::transformer::resolve_component;
use crate::{
    ErasedTransformer, Formatted, Result, Shape, ShapeKind, Transformable, Transformer,
    TransformerStore, TupleHelper, ValueSequenceBuilder,
};
use std::sync::Arc;

/// An ordered, fixed-arity group of transformable fields.
pub trait TupleFields: Sized + Send + Sync + 'static {
    const ARITY: usize;

    /// One resolved transformer per field.
    type Transformers: Send + Sync;

    /// Resolves every field's transformer; failures name `owner` and the field position.
    fn resolve(store: &TransformerStore, owner: &str) -> Result<Self::Transformers>;

    fn parse_fields(
        helper: &TupleHelper,
        transformers: &Self::Transformers,
        input: &str,
        type_name: &str,
    ) -> Result<Self>;

    /// Borrowed form of the fields, one reference per field.
    type Refs<'a>
    where
        Self: 'a;

    fn as_refs(&self) -> Self::Refs<'_>;

    /// Formats borrowed fields, so records can be written without cloning their fields.
    fn format_refs(
        refs: Self::Refs<'_>,
        helper: &TupleHelper,
        transformers: &Self::Transformers,
        out: &mut ValueSequenceBuilder<'_>,
    );

    fn format_fields(
        &self,
        helper: &TupleHelper,
        transformers: &Self::Transformers,
        out: &mut ValueSequenceBuilder<'_>,
    ) {
        Self::format_refs(self.as_refs(), helper, transformers, out);
    }

    /// Fields built from each field's empty value.
    fn empty_fields(transformers: &Self::Transformers) -> Result<Self>;
}

macro_rules! tuple_fields {
    // Field glue only; records accept more fields than value tuples do
    (@fields $arity:literal => $($name:ident $idx:tt $pos:literal),+) => {
        impl<$($name: Transformable),+> TupleFields for ($($name,)+) {
            const ARITY: usize = $arity;

            type Transformers = ($(Arc<dyn Transformer<$name>>,)+);

            fn resolve(store: &TransformerStore, owner: &str) -> Result<Self::Transformers> {
                Ok(($(resolve_component::<$name>(store, owner, $pos)?,)+))
            }

            fn parse_fields(
                helper: &TupleHelper,
                transformers: &Self::Transformers,
                input: &str,
                type_name: &str,
            ) -> Result<Self> {
                let mut cursor = helper.parse_start(input, type_name)?;
                let fields = ($(
                    {
                        if $pos > 1 {
                            helper.parse_next(&mut cursor, $pos, type_name)?;
                        }
                        helper.parse_element(&cursor, &*transformers.$idx)?
                    },
                )+);
                helper.parse_end(&mut cursor, $arity, type_name)?;
                Ok(fields)
            }

            type Refs<'a> = ($(&'a $name,)+) where Self: 'a;

            fn as_refs(&self) -> Self::Refs<'_> {
                ($(&self.$idx,)+)
            }

            fn format_refs(
                refs: Self::Refs<'_>,
                helper: &TupleHelper,
                transformers: &Self::Transformers,
                out: &mut ValueSequenceBuilder<'_>,
            ) {
                helper.start_format(out);
                $(
                    helper.format_element(out, refs.$idx, &*transformers.$idx);
                    helper.add_delimiter(out);
                )+
                helper.end_format(out);
            }

            fn empty_fields(transformers: &Self::Transformers) -> Result<Self> {
                Ok(($(transformers.$idx.empty()?,)+))
            }
        }
    };

    ($arity:literal => $($name:ident $idx:tt $pos:literal),+) => {
        tuple_fields!(@fields $arity => $($name $idx $pos),+);

        impl<$($name: Transformable),+> Transformable for ($($name,)+) {
            fn shapes() -> Vec<Shape> {
                vec![Shape::new(ShapeKind::Tuple($arity), |store| {
                    let helper = store.settings().tuple.helper()?;
                    let transformers =
                        <Self as TupleFields>::resolve(store, std::any::type_name::<Self>())?;
                    Ok(ErasedTransformer::of::<Self, _>(TupleTransformer::<Self>::new(
                        helper,
                        transformers,
                    )))
                })]
            }
        }
    };
}

tuple_fields!(1 => A 0 1);
tuple_fields!(2 => A 0 1, B 1 2);
tuple_fields!(3 => A 0 1, B 1 2, C 2 3);
tuple_fields!(4 => A 0 1, B 1 2, C 2 3, D 3 4);
tuple_fields!(5 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5);
tuple_fields!(6 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6);
tuple_fields!(7 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7);
tuple_fields!(8 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8);

// Record field lists only; value tuples stop at 8
tuple_fields!(@fields 9 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9);
tuple_fields!(@fields 10 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10);
tuple_fields!(@fields 11 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11);
tuple_fields!(@fields 12 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12);
tuple_fields!(@fields 13 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12, M 12 13);
tuple_fields!(@fields 14 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12, M 12 13, N 13 14);
tuple_fields!(@fields 15 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12, M 12 13, N 13 14, O 14 15);
tuple_fields!(@fields 16 => A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12, M 12 13, N 13 14, O 14 15, P 15 16);

/// Transformer of a [`TupleFields`] type through one [`TupleHelper`].
pub struct TupleTransformer<F: TupleFields> {
    helper: TupleHelper,
    transformers: F::Transformers,
}

impl<F: TupleFields> TupleTransformer<F> {
    pub fn new(helper: TupleHelper, transformers: F::Transformers) -> Self {
        TupleTransformer {
            helper,
            transformers,
        }
    }
}

impl<F: TupleFields> Transformer<F> for TupleTransformer<F> {
    fn parse_core(&self, input: &str) -> Result<F> {
        F::parse_fields(
            &self.helper,
            &self.transformers,
            input,
            std::any::type_name::<F>(),
        )
    }

    fn format_into(&self, value: &F, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        value.format_fields(&self.helper, &self.transformers, out);
        Formatted::Text
    }

    fn empty(&self) -> Result<F> {
        F::empty_fields(&self.transformers)
    }
}
