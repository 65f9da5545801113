use recordmap::{ErrorKind, Lookup, Record, RecordMapper};
use serde_json::{json, Map, Value};
use test_case::test_case;

fn object(value: &Value) -> &Map<String, Value> {
    value.as_object().expect("Test input is an object")
}

#[derive(Debug, PartialEq, Record)]
struct SimpleRecord {
    name: String,
    age: i32,
}

#[derive(Debug, PartialEq, Record)]
struct AddressRecord {
    street: String,
    city: String,
}

#[derive(Debug, PartialEq, Record)]
struct PersonRecord {
    name: String,
    age: i32,
    address: AddressRecord,
}

#[test]
fn simple_record() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "Alice", "age": 30});
    let result: SimpleRecord = mapper.from_typed(object(&value)).expect("valid record");
    assert_eq!(result.name, "Alice");
    assert_eq!(result.age, 30);
}

#[test]
fn simple_record_match() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "Alice", "age": 30});
    match mapper.try_match::<SimpleRecord>(object(&value)) {
        Ok(Some(SimpleRecord { name, age })) => {
            assert_eq!(name, "Alice");
            assert_eq!(age, 30);
        }
        other => panic!("Should match the record, got {other:?}"),
    }
}

#[test]
fn long_id() {
    #[derive(Record)]
    struct LongIdRecord {
        id: i64,
        description: String,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"id": 1_234_567_890_123_i64, "description": "A test item"});
    let result: LongIdRecord = mapper.from_typed(object(&value)).expect("valid record");
    assert_eq!(result.id, 1_234_567_890_123);
    assert_eq!(result.description, "A test item");
}

#[test]
fn nested_record() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({
        "name": "Bob",
        "age": 25,
        "address": {"street": "123 Main St", "city": "Anytown"}
    });
    let result: PersonRecord = mapper.from_value(&value).expect("valid record");
    assert_eq!(
        result,
        PersonRecord {
            name: "Bob".into(),
            age: 25,
            address: AddressRecord {
                street: "123 Main St".into(),
                city: "Anytown".into(),
            },
        }
    );
    // The nested decoder is memoized alongside the outer one
    assert_eq!(mapper.cached_decoders(), 2);
}

#[test]
fn nested_errors_point_at_the_field() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "Bob", "age": 25, "address": {"street": "123 Main St"}});
    let error = mapper
        .from_value::<PersonRecord>(&value)
        .expect_err("no city");
    assert_eq!(
        error.kind(),
        &ErrorKind::MissingField {
            name: "city".into()
        }
    );
    assert_eq!(error.to_string(), "Missing field 'city' at /address/city");
    assert_eq!(mapper.try_match::<PersonRecord>(object(&value)).ok(), Some(None));
}

#[derive(Debug, Record)]
struct UnsupportedTypeRecord {
    name: String,
    salary: f64,
}

#[test]
fn unsupported_type() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "Test", "salary": 50000.0});
    let error = mapper
        .from_value::<UnsupportedTypeRecord>(&value)
        .expect_err("f64 has no coercion");
    assert!(error.to_string().contains("Unsupported type: f64"));
    assert!(error.is_structural());
    // Never absorbed, and reported again on every attempt
    for _ in 0..2 {
        let error = mapper
            .try_match::<UnsupportedTypeRecord>(object(&value))
            .expect_err("f64 has no coercion");
        assert_eq!(
            error.kind(),
            &ErrorKind::UnsupportedFieldType { type_name: "f64" }
        );
    }
    assert_eq!(mapper.cached_decoders(), 0);
}

#[test]
fn unsupported_nested_type_fails_the_outer_record() {
    #[derive(Record)]
    struct Wrapper {
        inner: UnsupportedTypeRecord,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let error = mapper.decoder::<Wrapper>().expect_err("nested f64");
    assert_eq!(error.to_string(), "Unsupported type: f64");
}

#[test_case(json!({"name": "Charlie"}), "age"; "missing int")]
#[test_case(json!({"age": 40}), "name"; "missing string")]
#[test_case(json!({}), "name"; "missing both")]
fn missing_key(value: Value, missing: &str) {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let error = mapper
        .from_typed::<SimpleRecord>(object(&value))
        .expect_err("Expected an error when a key is missing from JSON");
    assert_eq!(
        error.kind(),
        &ErrorKind::MissingField {
            name: missing.into()
        }
    );
    assert_eq!(
        mapper
            .try_match::<SimpleRecord>(object(&value))
            .expect("value-level errors are absorbed"),
        None
    );
}

#[test_case(json!({"name": 1, "age": 30}), "/name"; "number for string")]
#[test_case(json!({"name": "Dora", "age": "30"}), "/age"; "string for int")]
#[test_case(json!({"name": "Dora", "age": 30.5}), "/age"; "float for int")]
#[test_case(json!({"name": "Dora", "age": null}), "/age"; "null for int")]
fn type_mismatch(value: Value, location: &str) {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let error = mapper
        .from_typed::<SimpleRecord>(object(&value))
        .expect_err("wrong type");
    assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));
    assert_eq!(error.location().to_string(), location);
    assert_eq!(
        mapper
            .try_match::<SimpleRecord>(object(&value))
            .expect("value-level errors are absorbed"),
        None
    );
}

#[test]
fn numeric_overflow() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "Eve", "age": 3_000_000_000_i64});
    let error = mapper
        .from_value::<SimpleRecord>(&value)
        .expect_err("too large for i32");
    assert_eq!(error.to_string(), "3000000000 is out of range for i32 at /age");
    assert_eq!(mapper.try_match::<SimpleRecord>(object(&value)).ok(), Some(None));
}

#[test]
fn integral_floats() {
    let value = json!({"name": "Finn", "age": 30.0});
    let strict = RecordMapper::of(recordmap::lookup!());
    assert!(strict.from_value::<SimpleRecord>(&value).is_err());

    let lenient = recordmap::options()
        .with_integral_floats(true)
        .build(recordmap::lookup!());
    let result: SimpleRecord = lenient.from_value(&value).expect("30.0 is integral");
    assert_eq!(result.age, 30);
}

#[test]
fn renamed_fields() {
    #[derive(Record)]
    struct ProductRecord {
        #[record(rename = "productId")]
        product_id: String,
        #[record(rename = "productName")]
        product_name: String,
        #[record(rename = "stockQuantity")]
        stock_quantity: i32,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"productId": "P123", "productName": "Test Product", "stockQuantity": 100});
    let result: ProductRecord = mapper.from_value(&value).expect("valid record");
    assert_eq!(result.product_id, "P123");
    assert_eq!(result.product_name, "Test Product");
    assert_eq!(result.stock_quantity, 100);

    // The Rust field name is not a key
    let value = json!({"product_id": "P123", "productName": "Test Product", "stockQuantity": 100});
    let error = mapper
        .from_value::<ProductRecord>(&value)
        .err()
        .expect("renamed key is missing");
    assert_eq!(error.location().to_string(), "/productId");
}

#[test]
fn decoder_per_distinct_record() {
    #[derive(Record)]
    struct CacheTestRecord1 {
        data: String,
    }
    #[derive(Record)]
    struct CacheTestRecord2 {
        data: String,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let json1 = json!({"data": "Data1"});
    let r1: CacheTestRecord1 = mapper.from_value(&json1).expect("valid record");
    assert_eq!(r1.data, "Data1");
    assert_eq!(mapper.cached_decoders(), 1);

    let r1_again: CacheTestRecord1 = mapper.from_value(&json1).expect("valid record");
    assert_eq!(r1_again.data, "Data1");
    assert_eq!(mapper.cached_decoders(), 1);

    let json2 = json!({"data": "Data2"});
    let r2: CacheTestRecord2 = mapper.from_value(&json2).expect("valid record");
    assert_eq!(r2.data, "Data2");
    assert_eq!(mapper.cached_decoders(), 2);
}

#[derive(Debug, PartialEq, Record)]
struct EmptyRecord {}

#[derive(Debug, PartialEq, Record)]
struct UnitRecord;

#[test_case(json!({}); "empty object")]
#[test_case(json!({"someKey": "someValue"}); "unrelated keys")]
#[test_case(json!({"name": null, "nested": {"a": [1, 2]}}); "arbitrary content")]
fn empty_records(value: Value) {
    let mapper = RecordMapper::of(recordmap::lookup!());
    assert_eq!(mapper.from_value::<EmptyRecord>(&value).expect("empty"), EmptyRecord {});
    assert_eq!(mapper.from_value::<UnitRecord>(&value).expect("unit"), UnitRecord);
}

#[test]
fn extra_keys_are_ignored() {
    let mapper = RecordMapper::of(recordmap::lookup!());
    let plain = json!({"name": "Alice", "age": 30});
    let noisy = json!({"name": "Alice", "age": 30, "email": "alice@example.com", "tags": ["a"]});
    assert_eq!(
        mapper.from_value::<SimpleRecord>(&plain).expect("plain"),
        mapper.from_value::<SimpleRecord>(&noisy).expect("noisy")
    );
}

#[test]
fn boxed_nested_record() {
    #[derive(Record)]
    struct Shipment {
        to: Box<AddressRecord>,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"to": {"street": "1 Dock Rd", "city": "Portside"}});
    let shipment: Shipment = mapper.from_value(&value).expect("valid record");
    assert_eq!(shipment.to.city, "Portside");
}

#[test]
fn self_referential_records_are_rejected() {
    #[derive(Debug, Record)]
    struct Category {
        name: String,
        parent: Box<Category>,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"name": "leaf", "parent": {"name": "root"}});
    let error = mapper
        .from_value::<Category>(&value)
        .expect_err("contains itself");
    assert!(matches!(error.kind(), ErrorKind::RecursiveType { .. }));
    // Structural, so `try_match` reports it too
    assert!(mapper.try_match::<Category>(object(&value)).is_err());
}

#[test]
fn generic_record() {
    #[derive(Record)]
    struct Envelope<T> {
        kind: String,
        payload: T,
    }

    let mapper = RecordMapper::of(recordmap::lookup!());
    let value = json!({"kind": "address", "payload": {"street": "2 Elm", "city": "Oakville"}});
    let envelope: Envelope<AddressRecord> = mapper.from_value(&value).expect("valid record");
    assert_eq!(envelope.kind, "address");
    assert_eq!(envelope.payload.street, "2 Elm");

    let value = json!({"kind": "count", "payload": 3});
    let envelope: Envelope<i64> = mapper.from_value(&value).expect("valid record");
    assert_eq!(envelope.payload, 3);
}

mod restricted {
    use recordmap::{Record, RecordMapper};
    use serde_json::Value;

    #[derive(Record)]
    struct Secret {
        code: i32,
    }

    #[derive(Record)]
    pub struct Open {
        pub code: i32,
    }

    pub(super) fn own_mapper() -> RecordMapper {
        RecordMapper::of(recordmap::lookup!())
    }

    pub(super) fn decode_secret(
        mapper: &RecordMapper,
        value: &Value,
    ) -> Result<i32, recordmap::Error> {
        mapper.from_value::<Secret>(value).map(|secret| secret.code)
    }
}

#[test]
fn private_records_need_a_lookup_that_sees_them() {
    let value = json!({"code": 7});

    let outsider = RecordMapper::of(recordmap::lookup!());
    let error = restricted::decode_secret(&outsider, &value).expect_err("not visible");
    assert!(matches!(error.kind(), ErrorKind::ConstructorAccess { .. }));
    assert!(error.is_structural());
    // Denials are never cached, so they recur on every attempt
    assert_eq!(outsider.cached_decoders(), 0);
    let error = restricted::decode_secret(&outsider, &value).expect_err("still not visible");
    assert!(matches!(error.kind(), ErrorKind::ConstructorAccess { .. }));
    assert_eq!(outsider.cached_decoders(), 0);

    let insider = restricted::own_mapper();
    assert_eq!(restricted::decode_secret(&insider, &value).expect("visible"), 7);
}

#[test]
fn public_lookup_reaches_public_records_only() {
    let value = json!({"code": 7});
    let mapper = RecordMapper::of(Lookup::public());
    let open: restricted::Open = mapper.from_value(&value).expect("public record");
    assert_eq!(open.code, 7);
    assert!(restricted::decode_secret(&mapper, &value).is_err());
    assert!(mapper.from_value::<SimpleRecord>(&json!({"name": "x", "age": 1})).is_err());
}
