//! Adapters over conversions a type already exposes.
//!
//! - parsable: `FromStr` + `Display`
//! - string-convertible: `TryFrom<String>` + `Into<String>`
//!
//! Both are tried after every structural shape, so a type that also describes itself as a
//! collection or record is transformed structurally.

use crate::{
    ErasedTransformer, Error, Formatted, Result, Shape, ShapeKind, Transformable, Transformer,
    ValueSequenceBuilder,
};
use std::fmt::{self, Write};
use std::marker::PhantomData;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;

pub struct ParsableTransformer<T>(PhantomData<fn() -> T>);

impl<T> Default for ParsableTransformer<T> {
    fn default() -> Self {
        ParsableTransformer(PhantomData)
    }
}

impl<T> Transformer<T> for ParsableTransformer<T>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    fn parse_core(&self, input: &str) -> Result<T> {
        T::from_str(input).map_err(|e| Error::invalid_value(std::any::type_name::<T>(), input, e))
    }

    fn format_into(&self, value: &T, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        let _ = write!(out, "{value}");
        Formatted::Text
    }

    fn empty(&self) -> Result<T> {
        T::from_str("").map_err(|_| Error::empty_not_supported(std::any::type_name::<T>()))
    }
}

pub struct StringConvertibleTransformer<T>(PhantomData<fn() -> T>);

impl<T> Default for StringConvertibleTransformer<T> {
    fn default() -> Self {
        StringConvertibleTransformer(PhantomData)
    }
}

impl<T> Transformer<T> for StringConvertibleTransformer<T>
where
    T: TryFrom<String> + Into<String> + Clone,
    T::Error: fmt::Display,
{
    fn parse_core(&self, input: &str) -> Result<T> {
        T::try_from(input.to_owned())
            .map_err(|e| Error::invalid_value(std::any::type_name::<T>(), input, e))
    }

    fn format_into(&self, value: &T, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        let text: String = value.clone().into();
        out.append(&text);
        Formatted::Text
    }

    fn empty(&self) -> Result<T> {
        T::try_from(String::new())
            .map_err(|_| Error::empty_not_supported(std::any::type_name::<T>()))
    }
}

impl Shape {
    /// Shape of a type transformed through its `FromStr` and `Display` implementations.
    #[must_use]
    pub fn parsable<T>() -> Shape
    where
        T: Transformable + FromStr + fmt::Display,
        T::Err: fmt::Display,
    {
        Shape::new(ShapeKind::Parsable, |_| {
            Ok(ErasedTransformer::of::<T, _>(ParsableTransformer::<T>::default()))
        })
    }

    /// Shape of a type transformed through `TryFrom<String>` and `Into<String>`.
    #[must_use]
    pub fn string_convertible<T>() -> Shape
    where
        T: Transformable + TryFrom<String> + Into<String> + Clone,
        T::Error: fmt::Display,
    {
        Shape::new(ShapeKind::StringConvertible, |_| {
            Ok(ErasedTransformer::of::<T, _>(
                StringConvertibleTransformer::<T>::default(),
            ))
        })
    }
}

macro_rules! parsable_transformable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Transformable for $t {
                fn shapes() -> Vec<Shape> {
                    vec![Shape::parsable::<$t>()]
                }
            }
        )*
    };
}

parsable_transformable!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TransformerStore};

    #[derive(Clone, Debug, PartialEq)]
    struct Email(String);

    impl TryFrom<String> for Email {
        type Error = String;

        fn try_from(value: String) -> std::result::Result<Self, String> {
            if value.contains('@') {
                Ok(Email(value))
            } else {
                Err(format!("missing @ in {value}"))
            }
        }
    }

    impl From<Email> for String {
        fn from(email: Email) -> String {
            email.0
        }
    }

    impl Transformable for Email {
        fn shapes() -> Vec<Shape> {
            vec![Shape::string_convertible::<Email>()]
        }
    }

    #[test]
    fn test_network_addresses() {
        let store = TransformerStore::default();
        let addresses: Vec<IpAddr> = store.parse("127.0.0.1|::1").unwrap();
        assert_eq!(addresses[0], IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(addresses[1], IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(store.format(&addresses).unwrap().as_deref(), Some("127.0.0.1|::1"));

        let socket: SocketAddr = store.parse("10.0.0.1:8080").unwrap();
        assert_eq!(socket.port(), 8080);
        let err = store.parse::<Ipv4Addr>("300.1.1.1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(matches!(
            store.parse::<Ipv4Addr>("").unwrap_err(),
            Error::EmptyNotSupported { .. }
        ));
    }

    #[test]
    fn test_string_convertible() {
        let store = TransformerStore::default();
        let email: Email = store.parse("a@b.c").unwrap();
        assert_eq!(email, Email("a@b.c".to_string()));
        assert_eq!(store.format(&email).unwrap().as_deref(), Some("a@b.c"));

        let err = store.parse::<Email>("nobody").unwrap_err();
        assert!(err.to_string().contains("missing @ in nobody"));
        assert!(store.parse::<Email>("").is_err());
    }
}
