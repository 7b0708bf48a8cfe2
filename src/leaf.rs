//! Leaf scalar transformers.
//!
//! Each leaf is a plain parse/format pair described by [`LeafText`]; [`LeafTransformer`] plugs
//! any `LeafText` type into the store at leaf priority. Built in:
//!
//! - all integer types and `BigInt` (surrounding whitespace ignored, empty text is zero)
//! - `f32`/`f64`, with infinities written as `∞` and `-∞`
//! - `bool` (case-insensitive, empty text is `false`) and `char` (empty text is `'\0'`)
//! - `String`, for which empty text is a value of its own
//! - chrono dates and times (`%Y-%m-%d`, `%H:%M:%S%.f`, `%Y-%m-%dT%H:%M:%S%.f`, RFC 3339)

use crate::{
    ErasedTransformer, Error, Formatted, Result, Shape, ShapeKind, Transformable, Transformer,
    ValueSequenceBuilder,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use std::fmt::Write;
use std::marker::PhantomData;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const INFINITY: &str = "∞";

/// Text form of a scalar.
pub trait LeafText: Sized + Send + Sync + 'static {
    /// Parses non-empty text.
    fn parse_text(input: &str) -> Result<Self>;

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>);

    fn empty_value() -> Result<Self> {
        Err(Error::empty_not_supported(std::any::type_name::<Self>()))
    }

    /// Whether empty text is a value of its own.
    fn empty_is_distinct() -> bool {
        false
    }
}

/// [`Transformer`] over a [`LeafText`] type.
pub struct LeafTransformer<T>(PhantomData<fn() -> T>);

impl<T> LeafTransformer<T> {
    #[must_use]
    pub fn new() -> Self {
        LeafTransformer(PhantomData)
    }
}

impl<T> Default for LeafTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LeafText> Transformer<T> for LeafTransformer<T> {
    fn parse_core(&self, input: &str) -> Result<T> {
        T::parse_text(input)
    }

    fn format_into(&self, value: &T, out: &mut ValueSequenceBuilder<'_>) -> Formatted {
        value.write_text(out);
        Formatted::Text
    }

    fn empty(&self) -> Result<T> {
        T::empty_value()
    }

    fn empty_is_distinct(&self) -> bool {
        T::empty_is_distinct()
    }
}

impl Shape {
    /// Leaf shape served by [`LeafTransformer`].
    #[must_use]
    pub fn leaf<T: LeafText>() -> Shape {
        Shape::new(ShapeKind::Leaf, |_| {
            Ok(ErasedTransformer::of::<T, _>(LeafTransformer::<T>::new()))
        })
    }
}

fn invalid<T, R: std::fmt::Display>(input: &str, reason: R) -> Error {
    Error::invalid_value(std::any::type_name::<T>(), input, reason)
}

macro_rules! leaf_transformable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Transformable for $t {
                fn shapes() -> Vec<Shape> {
                    vec![Shape::leaf::<$t>()]
                }
            }
        )*
    };
}

macro_rules! integer_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl LeafText for $t {
                fn parse_text(input: &str) -> Result<Self> {
                    input.trim().parse::<$t>().map_err(|e| invalid::<$t, _>(input, e))
                }

                fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
                    let _ = write!(out, "{self}");
                }

                fn empty_value() -> Result<Self> {
                    Ok(0)
                }
            }
        )*
        leaf_transformable!($($t),*);
    };
}

integer_leaf!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl LeafText for $t {
                fn parse_text(input: &str) -> Result<Self> {
                    match input.trim() {
                        INFINITY | "+∞" => Ok(<$t>::INFINITY),
                        "-∞" => Ok(<$t>::NEG_INFINITY),
                        text => text.parse::<$t>().map_err(|e| invalid::<$t, _>(input, e)),
                    }
                }

                fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
                    if self.is_infinite() {
                        if self.is_sign_negative() {
                            out.push('-');
                        }
                        out.append(INFINITY);
                    } else {
                        let _ = write!(out, "{self}");
                    }
                }

                fn empty_value() -> Result<Self> {
                    Ok(0.0)
                }
            }
        )*
        leaf_transformable!($($t),*);
    };
}

float_leaf!(f32, f64);

impl LeafText for bool {
    fn parse_text(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(invalid::<bool, _>(input, "expected true or false"))
        }
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.append(if *self { "true" } else { "false" });
    }

    fn empty_value() -> Result<Self> {
        Ok(false)
    }
}

impl LeafText for char {
    fn parse_text(input: &str) -> Result<Self> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(invalid::<char, _>(input, "expected exactly one character")),
        }
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.push(*self);
    }

    fn empty_value() -> Result<Self> {
        Ok('\0')
    }
}

impl LeafText for String {
    fn parse_text(input: &str) -> Result<Self> {
        Ok(input.to_owned())
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.append(self);
    }

    fn empty_value() -> Result<Self> {
        Ok(String::new())
    }

    fn empty_is_distinct() -> bool {
        true
    }
}

impl LeafText for BigInt {
    fn parse_text(input: &str) -> Result<Self> {
        input.trim().parse::<BigInt>().map_err(|e| invalid::<BigInt, _>(input, e))
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        let _ = write!(out, "{self}");
    }

    fn empty_value() -> Result<Self> {
        Ok(BigInt::default())
    }
}

leaf_transformable!(bool, char, String, BigInt);

macro_rules! chrono_leaf {
    ($($t:ty => $format:expr),* $(,)?) => {
        $(
            impl LeafText for $t {
                fn parse_text(input: &str) -> Result<Self> {
                    <$t>::parse_from_str(input.trim(), $format).map_err(|e| invalid::<$t, _>(input, e))
                }

                fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
                    let _ = write!(out, "{}", self.format($format));
                }
            }
        )*
        leaf_transformable!($($t),*);
    };
}

chrono_leaf!(
    NaiveDate => DATE_FORMAT,
    NaiveTime => TIME_FORMAT,
    NaiveDateTime => DATE_TIME_FORMAT,
);

impl LeafText for DateTime<FixedOffset> {
    fn parse_text(input: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(input.trim()).map_err(|e| invalid::<Self, _>(input, e))
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.append(&self.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }
}

impl LeafText for DateTime<Utc> {
    fn parse_text(input: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(input.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| invalid::<Self, _>(input, e))
    }

    fn write_text(&self, out: &mut ValueSequenceBuilder<'_>) {
        out.append(&self.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
}

leaf_transformable!(DateTime<FixedOffset>, DateTime<Utc>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TransformerStore};

    fn round_trip<T: Transformable + PartialEq + std::fmt::Debug>(value: T, text: &str) {
        let store = TransformerStore::default();
        let transformer = store.get::<T>().unwrap();
        assert_eq!(transformer.format(&value).as_deref(), Some(text));
        assert_eq!(transformer.parse(text).unwrap(), value);
    }

    #[test]
    fn test_integers() {
        round_trip(-42i32, "-42");
        round_trip(u64::MAX, "18446744073709551615");
        round_trip(i128::MIN, "-170141183460469231731687303715884105728");

        let store = TransformerStore::default();
        assert_eq!(store.parse::<u8>(" 7 ").unwrap(), 7);
        assert_eq!(store.parse::<u8>("").unwrap(), 0);
        let err = store.parse::<u8>("256").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("\"256\""));
    }

    #[test]
    fn test_floats() {
        round_trip(1.5f64, "1.5");
        round_trip(f64::INFINITY, "∞");
        round_trip(f32::NEG_INFINITY, "-∞");

        let store = TransformerStore::default();
        assert!(store.parse::<f64>("NaN").unwrap().is_nan());
        assert_eq!(store.parse::<f64>("inf").unwrap(), f64::INFINITY);
        assert_eq!(store.parse::<f64>("").unwrap(), 0.0);
    }

    #[test]
    fn test_bool_and_char() {
        round_trip(true, "true");
        let store = TransformerStore::default();
        assert!(store.parse::<bool>("TRUE").unwrap());
        assert!(!store.parse::<bool>("").unwrap());
        assert!(store.parse::<bool>("yes").is_err());

        round_trip('∅', "∅");
        assert_eq!(store.parse::<char>("").unwrap(), '\0');
        assert!(store.parse::<char>("ab").is_err());
    }

    #[test]
    fn test_string_empty_is_distinct() {
        let store = TransformerStore::default();
        let strings = store.get::<String>().unwrap();
        assert!(strings.empty_is_distinct());
        assert_eq!(strings.parse("").unwrap(), "");
        assert_eq!(strings.format(&String::new()).as_deref(), Some(""));
        round_trip(" padded ".to_string(), " padded ");
    }

    #[test]
    fn test_big_integers() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        round_trip(big, "123456789012345678901234567890");
    }

    #[test]
    fn test_dates_and_times() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        round_trip(date, "2024-02-29");

        let time = NaiveTime::from_hms_milli_opt(13, 5, 9, 250).unwrap();
        round_trip(time, "13:05:09.250");

        round_trip(date.and_time(time), "2024-02-29T13:05:09.250");

        let utc = DateTime::parse_from_rfc3339("2024-02-29T13:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        round_trip(utc, "2024-02-29T13:05:09Z");

        let store = TransformerStore::default();
        let offset: DateTime<FixedOffset> = store.parse("2024-02-29T13:05:09+02:00").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 7200);
        assert!(store.parse::<NaiveDate>("").is_err());
        assert!(store.parse::<NaiveDate>("29/02/2024").is_err());
    }
}
