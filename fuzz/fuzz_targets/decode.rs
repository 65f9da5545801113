#![no_main]
use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use recordmap::{Record, RecordMapper};
use serde_json::Value;

#[derive(Record)]
struct Address {
    street: String,
    city: String,
}

#[derive(Record)]
struct Person {
    name: String,
    age: i32,
    id: i64,
    address: Address,
}

#[derive(Record)]
struct Nothing;

static MAPPER: LazyLock<RecordMapper> =
    LazyLock::new(|| recordmap::options().with_integral_floats(true).build(recordmap::lookup!()));

fuzz_target!(|data: &[u8]| {
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(data) {
        let strict = MAPPER.from_typed::<Person>(&object);
        let matched = MAPPER.try_match::<Person>(&object);
        // Decoding is deterministic and `try_match` only absorbs value-level errors
        match (strict, matched) {
            (Ok(_), Ok(Some(_))) => {}
            (Err(error), Ok(None)) => assert!(error.is_value_level()),
            _ => panic!("`from_typed` and `try_match` disagree"),
        }
        assert!(MAPPER.from_typed::<Nothing>(&object).is_ok());
    }
});
