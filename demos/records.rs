//! Records, enums and nested composites.
//!
//! Run with: cargo run --example records

use std::collections::BTreeMap;
use std::error::Error;
use text_transform::{deconstructable, transformable_enum, TransformerStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Active,
    Suspended,
}

transformable_enum!(Status { Active, Suspended });

#[derive(Debug, Clone, PartialEq)]
struct Address {
    street: String,
    city: String,
    zip: Option<String>,
}

deconstructable!(Address {
    street: String,
    city: String,
    zip: Option<String>,
});

#[derive(Debug, Clone, PartialEq)]
struct Customer {
    id: u32,
    name: String,
    status: Status,
    address: Address,
    tags: Vec<String>,
    balances: BTreeMap<String, f64>,
}

deconstructable!(Customer {
    id: u32,
    name: String,
    status: Status,
    address: Address,
    tags: Vec<String>,
    balances: BTreeMap<String, f64>,
});

/// A record built through a validating constructor.
#[derive(Debug, Clone, PartialEq)]
struct Percent {
    value: u8,
}

impl Percent {
    fn new(value: u8) -> Self {
        Percent {
            value: value.min(100),
        }
    }
}

deconstructable!(Percent, (value: u8), construct = Percent::new, deconstruct = |p: &Percent| (p.value,));

fn main() -> Result<(), Box<dyn Error>> {
    let store = TransformerStore::default();

    let customers = vec![
        Customer {
            id: 1,
            name: "Alice; Jr.".to_string(),
            status: Status::Active,
            address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                zip: None,
            },
            tags: vec!["vip".to_string(), "early|adopter".to_string()],
            balances: BTreeMap::from([("EUR".to_string(), 12.5), ("USD".to_string(), 0.0)]),
        },
        Customer {
            id: 2,
            name: "Bob".to_string(),
            status: Status::Suspended,
            address: Address {
                street: "2 Side Rd".to_string(),
                city: "Shelbyville".to_string(),
                zip: Some("49007".to_string()),
            },
            tags: Vec::new(),
            balances: BTreeMap::new(),
        },
    ];

    for customer in &customers {
        let text = store.format(customer)?.unwrap_or_default();
        println!("{}", text);
    }

    let text = store.format(&customers)?.unwrap_or_default();
    println!("\nAll customers:\n{}\n", text);
    let customers_back: Vec<Customer> = store.parse(&text)?;
    assert_eq!(customers, customers_back);

    // Enum names match case-insensitively and by number
    let statuses: Vec<Status> = store.parse("active|SUSPENDED|1")?;
    println!("Statuses: {:?}", statuses);

    let percent: Percent = store.parse("(250)")?;
    println!("Clamped: {:?}", percent);

    // A failed parse reports what went wrong and yields no value
    match store.parse::<Customer>("(3;Carol;Retired;(x\\;y\\;∅);;)") {
        Ok(customer) => println!("Unexpected: {:?}", customer),
        Err(e) => println!("Rejected: {}", e),
    }

    println!("✓ Round-trip successful");
    Ok(())
}
