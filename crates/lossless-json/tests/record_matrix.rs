use chrono::{DateTime, FixedOffset};
use lossless_json::{Describe, Lossless, LosslessError, LosslessRecord, Options};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    detail: String,
    #[serde(rename = "postCode")]
    post_code: String,
}

#[derive(Debug, Default, Describe)]
struct Person {
    name: String,
    age: i64,
    address: Address,
    #[lossless(rename = "Words")]
    words: Vec<String>,
    #[lossless(rename = "CreatedAt")]
    created_at: Option<DateTime<FixedOffset>>,
    #[lossless(skip)]
    ignored: bool,
    #[lossless(omit_empty)]
    omit: String,
    #[lossless(state)]
    state: Lossless,
}

const PERSON_JSON: &[u8] = br#"
{"name": "Jack Wolfington",
 "age": 42,
 "address": { "detail": "123 Fake St.", "postCode":"123456"},
 "words": ["aa","bb"],
 "CreatedAt": "2016-06-30T16:09:51.692226358+08:00",
 "Ignored": true,
 "Extra": {"foo": "bar"}}"#;

fn encoded_value<R: LosslessRecord>(record: &mut R) -> Value {
    let bytes = record.encode().expect("encode must succeed");
    serde_json::from_slice(&bytes).expect("encoded output must be valid JSON")
}

#[test]
fn record_matrix_decode_populates_declared_fields() {
    let person = Person::decode(PERSON_JSON).expect("decode must succeed");

    assert_eq!(person.name, "Jack Wolfington");
    assert_eq!(person.age, 42);
    assert_eq!(
        person.address,
        Address {
            detail: "123 Fake St.".into(),
            post_code: "123456".into(),
        }
    );
    assert_eq!(person.words, ["aa", "bb"], "case-folded key fallback");

    let created_at = person.created_at.expect("CreatedAt must decode");
    assert_eq!(
        created_at,
        DateTime::parse_from_rfc3339("2016-06-30T16:09:51.692226358+08:00").unwrap()
    );
    assert!(!person.ignored, "skipped fields are never populated");
}

#[test]
fn record_matrix_encode_fresh_record_with_extra_data() {
    let created_at = DateTime::parse_from_rfc3339("2024-02-29T08:30:00.5-05:00").unwrap();
    let mut person = Person {
        name: "Wolf Jackington".into(),
        age: 33,
        address: Address {
            detail: "742 Evergreen Terrace".into(),
            post_code: "123123".into(),
        },
        created_at: Some(created_at),
        ignored: true,
        ..Person::default()
    };
    person.set("Pi", 3.14159).unwrap();
    person.set("omit", "anything").unwrap();

    let out = encoded_value(&mut person);
    assert_eq!(out["name"], serde_json::json!("Wolf Jackington"));
    assert_eq!(out["age"], serde_json::json!(33));
    assert_eq!(
        out["address"],
        serde_json::json!({"detail": "742 Evergreen Terrace", "postCode": "123123"})
    );
    assert_eq!(out["CreatedAt"], serde_json::json!("2024-02-29T08:30:00.500-05:00"));
    assert_eq!(out["Pi"], serde_json::json!(3.14159));
    assert!(out.get("Ignored").is_none(), "skipped field must not be written");
    assert!(out.get("ignored").is_none(), "skipped field must not be written");
    assert!(out.get("omit").is_none(), "empty omit_empty field deletes its member");
}

#[test]
fn record_matrix_decode_mutate_encode_keeps_unknown_members() {
    let mut person = Person::decode(PERSON_JSON).expect("decode must succeed");

    person.age += 1;
    person.ignored = true;
    person.set("age_printed", "forty-three").unwrap();

    let out = encoded_value(&mut person);
    assert_eq!(out["age"], serde_json::json!(43));
    assert_eq!(out["Extra"]["foo"], serde_json::json!("bar"));
    assert_eq!(out["age_printed"], serde_json::json!("forty-three"));
    assert_eq!(
        out["Ignored"],
        serde_json::json!(true),
        "a payload member named like a skipped field is plain extra data"
    );
    assert_eq!(out["words"], serde_json::json!(["aa", "bb"]));
    assert_eq!(out["Words"], serde_json::json!(["aa", "bb"]));
}

#[derive(Debug, Default, Describe)]
struct Jack {
    name: String,
    age: i64,
    #[lossless(state)]
    state: Lossless,
}

#[test]
fn record_matrix_end_to_end_jack() {
    let mut jack = Jack::decode(br#"{"name":"Jack","age":42,"Extra":{"foo":"bar"}}"#)
        .expect("decode must succeed");
    jack.age += 1;
    jack.set("note", "hi").unwrap();

    assert_eq!(
        jack.encode().unwrap(),
        br#"{"name":"Jack","age":43,"Extra":{"foo":"bar"},"note":"hi"}"#
    );
}

#[test]
fn record_matrix_unknown_members_round_trip_unchanged() {
    let input = br#"{"z":[1,{"deep":null}],"name":"Jack","n":1.50,"big":123456789012345678901234567890,"age":7}"#;
    let mut jack = Jack::decode(input).unwrap();
    assert_eq!(jack.encode().unwrap(), input);
}

#[derive(Debug, Default, Describe)]
struct Renamed {
    #[lossless(rename = "fullName")]
    name: String,
    #[lossless(state)]
    state: Lossless,
}

#[test]
fn record_matrix_rename_uses_override_name_only() {
    let mut fresh = Renamed {
        name: "A".into(),
        ..Renamed::default()
    };
    assert_eq!(fresh.encode().unwrap(), br#"{"fullName":"A"}"#);

    let mut decoded = Renamed::decode(br#"{"name":"B","fullName":"C"}"#).unwrap();
    assert_eq!(decoded.name, "C");
    decoded.name = "D".into();
    assert_eq!(decoded.encode().unwrap(), br#"{"name":"B","fullName":"D"}"#);
}

#[derive(Debug, Default, Describe)]
struct Sparse {
    #[lossless(omit_empty)]
    tags: Vec<String>,
    #[lossless(omit_empty)]
    count: u32,
    #[lossless(omit_empty)]
    parent: Option<String>,
    #[lossless(state)]
    state: Lossless,
}

#[test]
fn record_matrix_omit_empty_deletes_or_writes() {
    let mut sparse = Sparse::decode(br#"{"tags":["a"],"count":2,"parent":"p","keep":1}"#).unwrap();
    sparse.tags.clear();
    sparse.count = 0;
    sparse.parent = None;
    assert_eq!(sparse.encode().unwrap(), br#"{"keep":1}"#);

    sparse.tags.push("b".into());
    sparse.parent = Some(String::new());
    assert_eq!(
        sparse.encode().unwrap(),
        br#"{"keep":1,"tags":["b"],"parent":""}"#,
        "Some(_) is never empty"
    );
}

#[derive(Debug, Default, Describe)]
struct Envelope {
    kind: String,
    #[lossless(omit_empty)]
    payload: Value,
    #[lossless(state)]
    state: Lossless,
}

#[test]
fn record_matrix_omit_empty_dynamic_value_only_drops_null() {
    let mut envelope = Envelope::decode(br#"{"kind":"a","payload":{"x":1}}"#).unwrap();
    for kept in [r#""""#, "false", "0", "[]", "{}"] {
        envelope.payload = serde_json::from_str(kept).unwrap();
        assert_eq!(
            envelope.encode().unwrap(),
            format!(r#"{{"kind":"a","payload":{kept}}}"#).into_bytes(),
            "{kept} is not null and must be written"
        );
    }

    envelope.payload = Value::Null;
    assert_eq!(envelope.encode().unwrap(), br#"{"kind":"a"}"#);
}

#[test]
fn record_matrix_weak_coercion_both_directions() {
    let jack = Jack::decode(br#"{"name":42,"age":"42"}"#).unwrap();
    assert_eq!(jack.name, "42");
    assert_eq!(jack.age, 42);

    let jack = Jack::decode(br#"{"name":true,"age":4.9}"#).unwrap();
    assert_eq!(jack.name, "1");
    assert_eq!(jack.age, 4);

    let mut jack = Jack::decode(br#"{"name":null,"age":null}"#).unwrap();
    assert_eq!(jack.name, "");
    assert_eq!(jack.age, 0);
    assert_eq!(jack.encode().unwrap(), br#"{"name":"","age":0}"#);
}

#[test]
fn record_matrix_strict_options_reject_mismatched_types() {
    let mut jack = Jack {
        state: Lossless::with_options(Options::strict()),
        ..Jack::default()
    };
    let err = jack
        .decode_in_place(br#"{"name":"Jack","age":"42"}"#)
        .expect_err("strict decode must reject a string age");
    match err {
        LosslessError::Coerce { target, .. } => assert_eq!(target, "age"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(jack.name, "Jack", "fields before the failure stay populated");
}

#[test]
fn record_matrix_case_insensitive_lookup_prefers_exact_key() {
    let jack = Jack::decode(br#"{"NAME":"upper","name":"exact","AGE":5}"#).unwrap();
    assert_eq!(jack.name, "exact");
    assert_eq!(jack.age, 5);

    let mut strict = Jack {
        state: Lossless::with_options(Options::default().with_case_insensitive(false)),
        ..Jack::default()
    };
    strict.decode_in_place(br#"{"NAME":"upper","AGE":5}"#).unwrap();
    assert_eq!(strict.name, "");
    assert_eq!(strict.age, 0);
}

#[test]
fn record_matrix_absent_members_leave_fields_untouched() {
    let mut jack = Jack {
        name: "kept".into(),
        age: 9,
        ..Jack::default()
    };
    jack.decode_in_place(br#"{"other":1}"#).unwrap();
    assert_eq!(jack.name, "kept");
    assert_eq!(jack.age, 9);
}

#[derive(Debug, Default, Describe)]
struct Nicknamed {
    name: String,
    age: i64,
    nick: Option<String>,
    #[lossless(state)]
    state: Lossless,
}

#[test]
fn record_matrix_null_members_leave_fields_untouched() {
    for options in [Options::default(), Options::strict()] {
        let mut jack = Nicknamed {
            name: "kept".into(),
            age: 9,
            nick: Some("j".into()),
            state: Lossless::with_options(options),
        };
        jack.decode_in_place(br#"{"name":null,"age":null,"nick":null}"#)
            .expect("null members must decode");
        assert_eq!(jack.name, "kept");
        assert_eq!(jack.age, 9);
        assert_eq!(jack.nick.as_deref(), Some("j"));

        assert_eq!(
            jack.encode().unwrap(),
            br#"{"name":"kept","age":9,"nick":"j"}"#,
            "encode writes the kept values over the nulls"
        );
    }
}

#[test]
fn record_matrix_encode_is_idempotent() {
    let mut person = Person::decode(PERSON_JSON).unwrap();
    let first = person.encode().unwrap();

    let mut again = Person::decode(&first).unwrap();
    let second = again.encode().unwrap();
    assert_eq!(first, second);
    assert_eq!(again.encode().unwrap(), second);
}

#[test]
fn record_matrix_path_mutations_append_in_insertion_order() {
    let mut jack = Jack::decode(br#"{"name":"Jack","age":1}"#).unwrap();
    jack.set("b", 1).unwrap();
    jack.set(["a", "x"], 2).unwrap();
    jack.set("c", 3).unwrap();
    jack.set(["a", "y"], 4).unwrap();

    assert_eq!(
        jack.encode().unwrap(),
        br#"{"name":"Jack","age":1,"b":1,"a":{"x":2,"y":4},"c":3}"#
    );
}

#[test]
fn record_matrix_extra_data_read_and_delete() {
    let mut person = Person::decode(PERSON_JSON).unwrap();
    assert_eq!(
        person.get(["Extra", "foo"]).unwrap(),
        Some(&serde_json::json!("bar"))
    );
    assert_eq!(
        person.delete("Extra").unwrap(),
        Some(serde_json::json!({"foo": "bar"}))
    );
    let out = encoded_value(&mut person);
    assert!(out.get("Extra").is_none());
}

#[test]
fn record_matrix_field_set_via_path_is_overwritten_on_encode() {
    let mut jack = Jack {
        name: "field".into(),
        ..Jack::default()
    };
    jack.set("name", "path").unwrap();
    assert_eq!(jack.encode().unwrap(), br#"{"name":"field","age":0}"#);
}

#[test]
fn record_matrix_non_object_payload_is_a_coerce_error() {
    let err = Jack::decode(b"[1,2,3]").expect_err("array payload must not decode");
    match err {
        LosslessError::Coerce { target, source } => {
            assert!(target.ends_with("Jack"), "target was {target}");
            assert_eq!(source.message(), "expected object, found array");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn record_matrix_pretty_output() {
    let mut jack = Jack {
        name: "Jack".into(),
        age: 1,
        state: Lossless::with_options(Options::default().with_pretty(true)),
    };
    let text = String::from_utf8(jack.encode().unwrap()).unwrap();
    assert_eq!(text, "{\n  \"name\": \"Jack\",\n  \"age\": 1\n}");
}
