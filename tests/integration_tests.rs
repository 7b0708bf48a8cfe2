use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use text_transform::{
    deconstructable, transformable_enum, DictionaryBehaviour, DictionarySettings, Error,
    ErrorKind, KeyValuePair, StoreSettings, Transformer, TransformerStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Pending,
    Shipped,
    Delivered,
}

transformable_enum!(Status { Pending, Shipped, Delivered });

#[derive(Debug, Clone, PartialEq)]
struct Customer {
    id: u32,
    name: String,
    email: Option<String>,
}

deconstructable!(Customer {
    id: u32,
    name: String,
    email: Option<String>,
});

#[derive(Debug, Clone, PartialEq)]
struct Order {
    order_id: u64,
    customer: Customer,
    items: Vec<String>,
    quantities: BTreeMap<String, u32>,
    status: Status,
    total: f64,
    note: Option<String>,
}

deconstructable!(Order {
    order_id: u64,
    customer: Customer,
    items: Vec<String>,
    quantities: BTreeMap<String, u32>,
    status: Status,
    total: f64,
    note: Option<String>,
});

fn sample_order() -> Order {
    Order {
        order_id: 9001,
        customer: Customer {
            id: 7,
            name: "Doe; John".to_string(),
            email: None,
        },
        items: vec!["widget|large".to_string(), "gadget".to_string()],
        quantities: BTreeMap::from([
            ("gadget".to_string(), 1),
            ("widget|large".to_string(), 3),
        ]),
        status: Status::Shipped,
        total: 42.5,
        note: Some(String::new()),
    }
}

#[test]
fn test_record_with_nested_record_round_trip() {
    let store = TransformerStore::default();
    let order = sample_order();

    let text = store.format(&order).unwrap().unwrap();
    println!("Order text: {}", text);

    assert!(text.starts_with(r"(9001;(7\;Doe\\\; John\;\∅);widget\\|large|gadget;"));
    assert!(text.ends_with(";Shipped;42.5;)"));
    assert_eq!(store.parse::<Order>(&text).unwrap(), order);
}

#[test]
fn test_nested_tuple_of_dictionary_of_list() {
    let store = TransformerStore::default();
    let mut map = HashMap::new();
    map.insert("primes".to_string(), vec![2, 3, 5]);
    map.insert("empty".to_string(), Vec::new());
    let value = (1u8, map, "tail".to_string());

    let text = store.format(&value).unwrap().unwrap();
    let parsed: (u8, HashMap<String, Vec<i32>>, String) = store.parse(&text).unwrap();
    assert_eq!(parsed, value);
}

#[test]
fn test_empty_collection_versus_null_collection() {
    let store = TransformerStore::default();

    let empty = store.format(&Some(Vec::<i32>::new())).unwrap();
    let null = store.format(&None::<Vec<i32>>).unwrap();
    assert_eq!(empty.as_deref(), Some(""));
    assert_eq!(null, None);

    let transformer = store.get::<Option<Vec<i32>>>().unwrap();
    assert_eq!(
        transformer.parse_nullable(empty.as_deref()).unwrap(),
        Some(Vec::new())
    );
    assert_eq!(transformer.parse_nullable(null.as_deref()).unwrap(), None);
}

#[test]
fn test_collection_with_one_null_element() {
    let store = TransformerStore::default();
    let value = vec![None::<String>];
    let text = store.format(&value).unwrap().unwrap();
    assert_eq!(text, "∅");
    assert_eq!(store.parse::<Vec<Option<String>>>(&text).unwrap(), value);
}

#[test]
fn test_elements_with_every_special_character() {
    let store = TransformerStore::default();
    let value: VecDeque<String> = VecDeque::from(vec![
        r"a|b\c∅d".to_string(),
        "|".to_string(),
        "\\".to_string(),
        "∅".to_string(),
    ]);
    let text = store.format(&value).unwrap().unwrap();
    assert_eq!(text, r"a\|b\\c\∅d|\||\\|\∅");
    assert_eq!(store.parse::<VecDeque<String>>(&text).unwrap(), value);
}

#[test]
fn test_duplicate_key_policies() {
    let cases = [
        (DictionaryBehaviour::OverrideKeys, Some(2)),
        (DictionaryBehaviour::DoNotOverrideKeys, Some(1)),
        (DictionaryBehaviour::ThrowOnDuplicate, None),
    ];

    for (behaviour, expected) in cases {
        let settings = StoreSettings::new()
            .with_dictionary(DictionarySettings::new().with_behaviour(behaviour));
        let store = TransformerStore::new(settings).unwrap();
        let result = store.parse::<HashMap<String, i32>>("a=1;a=2");
        match expected {
            Some(value) => assert_eq!(result.unwrap()["a"], value, "{behaviour:?}"),
            None => {
                let err = result.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Policy);
                assert!(err.to_string().contains("'a'"));
            }
        }
    }
}

#[test]
fn test_tuple_arity_mismatch() {
    let store = TransformerStore::default();

    let err = store.parse::<(i32, i32, i32)>("(1;2)").unwrap_err();
    assert!(err.to_string().contains("3rd element was not found"));

    let err = store.parse::<(i32, i32, i32)>("(1;2;3;4)").unwrap_err();
    assert!(err.to_string().contains("cannot have more than 3 elements"));
}

#[test]
fn test_concurrent_resolution() {
    let store = TransformerStore::default();
    let text = "a=1|2;b=3";

    let transformers: Vec<Arc<dyn Transformer<BTreeMap<String, Vec<i64>>>>> =
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.get::<BTreeMap<String, Vec<i64>>>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

    let expected = transformers[0].parse(text).unwrap();
    for transformer in &transformers {
        assert_eq!(transformer.parse(text).unwrap(), expected);
        assert_eq!(transformer.format(&expected).as_deref(), Some(text));
    }
    assert!(store.is_cached::<BTreeMap<String, Vec<i64>>>());
}

#[test]
fn test_concurrent_parsing_shares_store() {
    let store = TransformerStore::default();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let store = &store;
            scope.spawn(move || {
                for n in 0..50 {
                    let value = vec![i, n, i * n];
                    let text = store.format(&value).unwrap().unwrap();
                    assert_eq!(store.parse::<Vec<i32>>(&text).unwrap(), value);
                }
            });
        }
    });
}

#[test]
fn test_key_value_pairs_in_list() {
    let store = TransformerStore::default();
    let pairs = vec![
        KeyValuePair::new("x".to_string(), 1),
        KeyValuePair::new("y=z".to_string(), 2),
    ];
    let text = store.format(&pairs).unwrap().unwrap();
    assert_eq!(text, r"x=1|y\\=z=2");
    assert_eq!(store.parse::<Vec<KeyValuePair<String, i32>>>(&text).unwrap(), pairs);
}

#[test]
fn test_failed_parse_yields_no_value() {
    let store = TransformerStore::default();
    let err = store.parse::<Order>(r"(1;(2\;x\;∅);a;b=1;Lost;0;)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.to_string().contains("Lost"));
}

#[test]
fn test_unsupported_types_fail_fast() {
    struct Socket;
    impl text_transform::Transformable for Socket {
        fn shapes() -> Vec<text_transform::Shape> {
            Vec::new()
        }
    }

    let store = TransformerStore::default();
    let err = store.get::<HashMap<String, Socket>>().err().unwrap();
    assert!(matches!(err, Error::UnsupportedComponent { position: 2, .. }));
    assert!(err.to_string().contains("Socket"));
}
