//! Formatting and parsing built-in types.
//!
//! Run with: cargo run --example simple

use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use text_transform::TransformerStore;

fn main() -> Result<(), Box<dyn Error>> {
    let store = TransformerStore::default();

    // Lists
    let ports = vec![80u16, 443, 8080];
    let text = store.format(&ports)?.unwrap_or_default();
    println!("Ports: {}", text);
    let ports_back: Vec<u16> = store.parse(&text)?;
    assert_eq!(ports, ports_back);

    // Maps
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), 4u32);
    limits.insert("memory".to_string(), 2048);
    let text = store.format(&limits)?.unwrap_or_default();
    println!("Limits: {}", text);
    let limits_back: BTreeMap<String, u32> = store.parse(&text)?;
    assert_eq!(limits, limits_back);

    // Tuples with nulls
    let entry = (7u8, None::<String>, vec![true, false]);
    let text = store.format(&entry)?.unwrap_or_default();
    println!("Tuple: {}", text);
    let entry_back: (u8, Option<String>, Vec<bool>) = store.parse(&text)?;
    assert_eq!(entry, entry_back);

    // Special characters inside elements are escaped
    let words = vec!["a|b".to_string(), "∅".to_string(), "back\\slash".to_string()];
    let text = store.format(&words)?.unwrap_or_default();
    println!("Escaped: {}", text);
    let words_back: Vec<String> = store.parse(&text)?;
    assert_eq!(words, words_back);

    // Empty versus null
    let empty: Option<HashSet<i32>> = Some(HashSet::new());
    println!("Empty set: {:?}", store.format(&empty)?);
    println!("Missing set: {:?}", store.format(&None::<HashSet<i32>>)?);

    println!("✓ Round-trips successful");
    Ok(())
}
