//! Fieldless enums, written as their variant names.

use crate::{
    EnumSettings, ErasedTransformer, Error, Formatted, Result, Shape, ShapeKind, Transformer,
    ValueSequenceBuilder,
};
use std::fmt::Write;
use std::marker::PhantomData;

/// A fieldless enum with named variants and numeric discriminants.
///
/// [`transformable_enum!`](crate::transformable_enum) implements it together with
/// [`Transformable`](crate::Transformable).
pub trait EnumTransformable: Copy + Eq + Send + Sync + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn to_number(self) -> i64;
}

pub struct EnumTransformer<E> {
    settings: EnumSettings,
    marker: PhantomData<fn() -> E>,
}

impl<E: EnumTransformable> EnumTransformer<E> {
    #[must_use]
    pub fn new(settings: EnumSettings) -> Self {
        EnumTransformer {
            settings,
            marker: PhantomData,
        }
    }

    fn by_name(&self, text: &str) -> Option<E> {
        E::VARIANTS
            .iter()
            .find(|(name, _)| {
                if self.settings.case_insensitive {
                    name.eq_ignore_ascii_case(text)
                } else {
                    *name == text
                }
            })
            .map(|(_, variant)| *variant)
    }

    fn by_number(&self, text: &str) -> Option<E> {
        if !self.settings.allow_numbers {
            return None;
        }
        let number = text.parse::<i64>().ok()?;
        E::VARIANTS
            .iter()
            .map(|(_, variant)| *variant)
            .find(|variant| variant.to_number() == number)
    }
}

impl<E: EnumTransformable> Transformer<E> for EnumTransformer<E> {
    fn parse_core(&self, input: &str) -> Result<E> {
        let text = input.trim();
        self.by_name(text)
            .or_else(|| self.by_number(text))
            .ok_or_else(|| {
                let names: Vec<&str> = E::VARIANTS.iter().map(|(name, _)| *name).collect();
                Error::invalid_value(
                    std::any::type_name::<E>(),
                    input,
                    format!("expected one of {}", names.join(", ")),
                )
            })
    }

    fn format_into(&self, value: &E, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        match E::VARIANTS.iter().find(|(_, variant)| variant == value) {
            Some((name, _)) => out.append(name),
            None => {
                let _ = write!(out, "{}", value.to_number());
            }
        }
        Formatted::Text
    }

    fn empty(&self) -> Result<E> {
        Err(Error::empty_not_supported(std::any::type_name::<E>()))
    }
}

impl Shape {
    #[must_use]
    pub fn enumeration<E: EnumTransformable>() -> Shape {
        Shape::new(ShapeKind::Enum, |store| {
            Ok(ErasedTransformer::of::<E, _>(EnumTransformer::<E>::new(
                store.settings().enumeration.clone(),
            )))
        })
    }
}
