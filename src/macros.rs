/// Implements [`Deconstructable`](crate::Deconstructable) and
/// [`Transformable`](crate::Transformable) for a record.
///
/// Two forms are accepted:
///
/// - `Type { field: Ty, ... }` rebuilds the struct from its fields in the listed order and
///   clones them out again when formatting.
/// - `Type, (param: Ty, ...), construct = f, deconstruct = g` calls `f(param, ...)` to build a
///   value and `g(&value)` to take it apart, where `g` is a method or a free function taking the
///   instance first.
///
/// # Examples
///
/// ```rust
/// use text_transform::{deconstructable, TransformerStore};
///
/// #[derive(Debug, PartialEq)]
/// struct Endpoint {
///     host: String,
///     port: u16,
///     tags: Vec<String>,
/// }
///
/// deconstructable!(Endpoint { host: String, port: u16, tags: Vec<String> });
///
/// let store = TransformerStore::default();
/// let endpoint: Endpoint = store.parse("(localhost;8080;a|b)").unwrap();
/// assert_eq!(endpoint.port, 8080);
/// assert_eq!(store.format(&endpoint).unwrap().as_deref(), Some("(localhost;8080;a|b)"));
/// ```
#[macro_export]
macro_rules! deconstructable {
    // Handle the shared Transformable impl
    (@transformable $type:ty) => {
        impl $crate::Transformable for $type {
            fn shapes() -> ::std::vec::Vec<$crate::Shape> {
                ::std::vec![$crate::Shape::record::<$type>()]
            }
        }
    };

    // Handle structs with named fields
    ($type:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        impl $crate::Deconstructable for $type {
            type Fields = ($($ty,)+);

            fn construct(($($field,)+): Self::Fields) -> Self {
                $type { $($field),+ }
            }

            fn deconstruct(&self) -> Self::Fields {
                ($(::std::clone::Clone::clone(&self.$field),)+)
            }

            fn deconstruct_ref(
                &self,
            ) -> ::std::option::Option<<Self::Fields as $crate::TupleFields>::Refs<'_>> {
                ::std::option::Option::Some(($(&self.$field,)+))
            }
        }

        $crate::deconstructable!(@transformable $type);
    };

    // Handle explicit constructor and deconstruction functions
    ($type:ty, ($($param:ident : $ty:ty),+ $(,)?), construct = $construct:expr, deconstruct = $deconstruct:expr $(,)?) => {
        impl $crate::Deconstructable for $type {
            type Fields = ($($ty,)+);

            fn construct(($($param,)+): Self::Fields) -> Self {
                ($construct)($($param),+)
            }

            fn deconstruct(&self) -> Self::Fields {
                ($deconstruct)(self)
            }
        }

        $crate::deconstructable!(@transformable $type);
    };
}

/// Implements [`EnumTransformable`](crate::EnumTransformable) and
/// [`Transformable`](crate::Transformable) for a fieldless enum.
///
/// # Examples
///
/// ```rust
/// use text_transform::{transformable_enum, TransformerStore};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// enum Mode {
///     Read,
///     Write,
/// }
///
/// transformable_enum!(Mode { Read, Write });
///
/// let store = TransformerStore::default();
/// assert_eq!(store.parse::<Vec<Mode>>("read|Write").unwrap(), vec![Mode::Read, Mode::Write]);
/// ```
#[macro_export]
macro_rules! transformable_enum {
    ($type:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::EnumTransformable for $type {
            const VARIANTS: &'static [(&'static str, Self)] =
                &[$((::std::stringify!($variant), $type::$variant)),+];

            fn to_number(self) -> i64 {
                self as i64
            }
        }

        impl $crate::Transformable for $type {
            fn shapes() -> ::std::vec::Vec<$crate::Shape> {
                ::std::vec![$crate::Shape::enumeration::<$type>()]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Deconstructable, EnumTransformable, TransformerStore};

    #[derive(Debug, Clone, PartialEq)]
    struct Window {
        title: String,
        size: (u32, u32),
    }

    deconstructable!(Window { title: String, size: (u32, u32) });

    #[derive(Debug, PartialEq)]
    struct Money {
        cents: i64,
        currency: String,
    }

    impl Money {
        fn new(cents: i64, currency: String) -> Self {
            Money { cents, currency }
        }
    }

    fn money_parts(money: &Money) -> (i64, String) {
        (money.cents, money.currency.clone())
    }

    deconstructable!(Money, (cents: i64, currency: String), construct = Money::new, deconstruct = money_parts);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Shade {
        Light = 3,
        Dark = 7,
    }

    transformable_enum!(Shade { Light, Dark });

    #[test]
    fn test_named_fields() {
        let window = Window {
            title: "main".to_string(),
            size: (800, 600),
        };
        assert_eq!(window.deconstruct(), ("main".to_string(), (800, 600)));

        let store = TransformerStore::default();
        let text = store.format(&window).unwrap().unwrap();
        assert_eq!(text, r"(main;(800\;600))");
        assert_eq!(store.parse::<Window>(&text).unwrap(), window);
    }

    #[test]
    fn test_explicit_functions() {
        let store = TransformerStore::default();
        let money: Money = store.parse("(1999;EUR)").unwrap();
        assert_eq!(money, Money::new(1999, "EUR".to_string()));
        assert_eq!(store.format(&money).unwrap().as_deref(), Some("(1999;EUR)"));
    }

    #[test]
    fn test_enum_macro() {
        assert_eq!(Shade::VARIANTS.len(), 2);
        assert_eq!(Shade::Dark.to_number(), 7);
        let store = TransformerStore::default();
        assert_eq!(store.parse::<Shade>("3").unwrap(), Shade::Light);
        assert_eq!(store.format(&Shade::Dark).unwrap().as_deref(), Some("Dark"));
    }
}
