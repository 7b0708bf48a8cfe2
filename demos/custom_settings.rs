//! Custom grammar, duplicate-key policies and resolution logging.
//!
//! Run with: RUST_LOG=text_transform=trace cargo run --example custom_settings

use std::collections::HashMap;
use std::error::Error;
use text_transform::{
    CollectionSettings, DictionaryBehaviour, DictionarySettings, StoreSettings, TransformerStore,
    TupleSettings,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("text_transform=debug")),
        )
        .init();

    let value = (
        vec!["alpha".to_string(), "beta".to_string()],
        HashMap::from([("retries".to_string(), 3u8)]),
    );

    // Default grammar
    let store = TransformerStore::default();
    println!("Default:   {}", store.format(&value)?.unwrap_or_default());

    // Comma lists in brackets, JSON-ish maps and angle-bracket tuples
    let settings = StoreSettings::new()
        .with_collection(CollectionSettings::new().with_delimiter(',').with_borders('[', ']'))
        .with_dictionary(
            DictionarySettings::new()
                .with_entry_delimiter(',')
                .with_key_value_delimiter(':')
                .with_borders('{', '}'),
        )
        .with_tuple(TupleSettings::new().with_delimiter(' ').with_borders('<', '>'));
    let custom = TransformerStore::new(settings)?;
    let text = custom.format(&value)?.unwrap_or_default();
    println!("Custom:    {}", text);
    let value_back: (Vec<String>, HashMap<String, u8>) = custom.parse(&text)?;
    assert_eq!(value, value_back);

    // Duplicate keys
    for behaviour in [
        DictionaryBehaviour::OverrideKeys,
        DictionaryBehaviour::DoNotOverrideKeys,
        DictionaryBehaviour::ThrowOnDuplicate,
    ] {
        let settings = StoreSettings::new()
            .with_dictionary(DictionarySettings::new().with_behaviour(behaviour));
        let store = TransformerStore::new(settings)?;
        match store.parse::<HashMap<String, i32>>("a=1;a=2") {
            Ok(map) => println!("{:?}: a = {}", behaviour, map["a"]),
            Err(e) => println!("{:?}: {}", behaviour, e),
        }
    }

    // Settings from a config file
    let json = r#"{ "collection": { "delimiter": "/" } }"#;
    let from_config = TransformerStore::new(serde_json::from_str(json)?)?;
    println!("Config:    {}", from_config.format(&vec![1, 2, 3])?.unwrap_or_default());

    // Conflicting characters are rejected up front
    let broken = StoreSettings::new().with_collection(CollectionSettings::new().with_delimiter('\\'));
    if let Err(e) = TransformerStore::new(broken) {
        println!("Rejected:  {}", e);
    }

    Ok(())
}
