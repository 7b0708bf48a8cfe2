use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use text_transform::{
    deconstructable, transformable_enum, Deconstructable, EnumSettings, EnumTransformable,
    ErrorKind, RecordSettings, Shape, StoreSettings, Transformable, TransformerStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

transformable_enum!(Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Code {
    Ok = 200,
    NotFound = 404,
}

transformable_enum!(Code { Ok, NotFound });

#[derive(Debug, Clone, PartialEq)]
struct Target {
    name: String,
    level: Level,
    tags: Vec<String>,
}

deconstructable!(Target {
    name: String,
    level: Level,
    tags: Vec<String>,
});

#[derive(Debug, Clone, PartialEq)]
struct Range {
    low: i32,
    high: i32,
}

impl Range {
    fn new(low: i32, high: i32) -> Self {
        Range {
            low: low.min(high),
            high: low.max(high),
        }
    }

    fn bounds(&self) -> (i32, i32) {
        (self.low, self.high)
    }
}

deconstructable!(Range, (low: i32, high: i32), construct = Range::new, deconstruct = Range::bounds);

#[derive(Debug, Clone, PartialEq)]
struct Single {
    value: u8,
}

deconstructable!(Single { value: u8 });

#[test]
fn test_deconstructable_named_fields() {
    let target = Target {
        name: "net".to_string(),
        level: Level::Warn,
        tags: vec!["a".to_string(), "b".to_string()],
    };
    assert_eq!(
        target.deconstruct(),
        ("net".to_string(), Level::Warn, vec!["a".to_string(), "b".to_string()])
    );

    let store = TransformerStore::default();
    let text = store.format(&target).unwrap().unwrap();
    assert_eq!(text, "(net;Warn;a|b)");
    assert_eq!(store.parse::<Target>(&text).unwrap(), target);
}

#[test]
fn test_deconstructable_constructor_runs_on_parse() {
    let store = TransformerStore::default();
    let range: Range = store.parse("(9;-3)").unwrap();
    assert_eq!(range, Range { low: -3, high: 9 });
    assert_eq!(store.format(&range).unwrap().as_deref(), Some("(-3;9)"));
}

#[test]
fn test_single_field_record() {
    let store = TransformerStore::default();
    assert_eq!(store.format(&Single { value: 5 }).unwrap().as_deref(), Some("(5)"));
    assert_eq!(store.parse::<Single>("(5)").unwrap(), Single { value: 5 });

    let err = store.parse::<Single>("(5;6)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
}

#[test]
fn test_record_empty_from_field_empties() {
    let store = TransformerStore::default();
    let range: Range = store.parse("").unwrap();
    assert_eq!(range, Range { low: 0, high: 0 });

    let settings = StoreSettings::new().with_record(RecordSettings::new().with_field_empties(false));
    let store = TransformerStore::new(settings).unwrap();
    let err = store.parse::<Range>("").unwrap_err();
    assert!(err.to_string().contains("has no empty value"));
}

#[test]
fn test_record_missing_borders() {
    let store = TransformerStore::default();
    let err = store.parse::<Range>("1;2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert!(err.to_string().contains("'('"));
}

#[test]
fn test_enum_variants_listed_in_order() {
    let names: Vec<&str> = Level::VARIANTS.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["Trace", "Debug", "Info", "Warn", "Error"]);
    assert_eq!(Level::Info.to_number(), 2);
    assert_eq!(Code::NotFound.to_number(), 404);
}

#[test]
fn test_enum_name_matching() {
    let store = TransformerStore::default();
    assert_eq!(store.parse::<Level>("info").unwrap(), Level::Info);
    assert_eq!(store.parse::<Level>(" WARN ").unwrap(), Level::Warn);
    assert_eq!(store.parse::<Code>("404").unwrap(), Code::NotFound);
    assert_eq!(store.format(&Code::Ok).unwrap().as_deref(), Some("Ok"));

    let err = store.parse::<Level>("verbose").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.to_string().contains("Trace, Debug, Info, Warn, Error"));
}

#[test]
fn test_enum_strict_settings() {
    let settings = StoreSettings::new().with_enumeration(
        EnumSettings::new()
            .with_case_insensitive(false)
            .with_allow_numbers(false),
    );
    let store = TransformerStore::new(settings).unwrap();
    assert_eq!(store.parse::<Level>("Debug").unwrap(), Level::Debug);
    assert!(store.parse::<Level>("debug").is_err());
    assert!(store.parse::<Code>("200").is_err());
}

#[test]
fn test_enum_has_no_empty_value() {
    let store = TransformerStore::default();
    let err = store.parse::<Level>("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    station: u16,
    sensor: u8,
    celsius: i16,
    humidity: u8,
    pressure: u32,
    wind: i8,
    label: String,
    calibrated: bool,
    gust: Option<u8>,
    samples: Vec<u8>,
    offset: i32,
}

deconstructable!(Reading {
    station: u16,
    sensor: u8,
    celsius: i16,
    humidity: u8,
    pressure: u32,
    wind: i8,
    label: String,
    calibrated: bool,
    gust: Option<u8>,
    samples: Vec<u8>,
    offset: i32,
});

#[test]
fn test_record_wider_than_tuples() {
    let store = TransformerStore::default();
    let reading = Reading {
        station: 12,
        sensor: 3,
        celsius: -4,
        humidity: 55,
        pressure: 1013,
        wind: -2,
        label: "roof;north".to_string(),
        calibrated: true,
        gust: None,
        samples: vec![9, 10],
        offset: 7,
    };
    let text = store.format(&reading).unwrap().unwrap();
    assert_eq!(text, r"(12;3;-4;55;1013;-2;roof\;north;true;∅;9|10;7)");
    assert_eq!(store.parse::<Reading>(&text).unwrap(), reading);

    let err = store.parse::<Reading>("(12;3)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
}

static TALLY_CLONES: AtomicUsize = AtomicUsize::new(0);

/// Counts how often it is cloned.
#[derive(Debug, PartialEq)]
struct Tally(u32);

impl Clone for Tally {
    fn clone(&self) -> Self {
        TALLY_CLONES.fetch_add(1, Ordering::SeqCst);
        Tally(self.0)
    }
}

impl FromStr for Tally {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Tally)
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Transformable for Tally {
    fn shapes() -> Vec<Shape> {
        vec![Shape::parsable::<Tally>()]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Ledger {
    name: String,
    total: Tally,
}

deconstructable!(Ledger { name: String, total: Tally });

#[test]
fn test_record_format_borrows_fields() {
    let store = TransformerStore::default();
    let ledger = Ledger {
        name: "books".to_string(),
        total: Tally(42),
    };
    for _ in 0..10 {
        assert_eq!(store.format(&ledger).unwrap().as_deref(), Some("(books;42)"));
    }
    assert_eq!(TALLY_CLONES.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.deconstruct_ref(), Some((&"books".to_string(), &Tally(42))));
}
