//! Expand and flatten working against each other on a realistic table.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use fortiplug::types::{Dynamic, DynamicValue};
use fortiplug::{expand, flatten, ExpandOptions, Field, FlattenOptions, SortMode};
use serde_json::{json, Value};
use std::collections::HashMap;

fn route_fields() -> Vec<Field> {
    vec![
        Field::integer("seq_num").optional().computed().build(),
        Field::string("status").optional().computed().one_of(&["enable", "disable"]).build(),
        Field::string("dst").optional().computed().cidr().build(),
        Field::string("gateway").optional().computed().build(),
        Field::integer("distance").optional().computed().int_between(1, 255).build(),
        Field::string("comment").optional().max_length(255).build(),
        Field::string("psk").optional().sensitive().build(),
        Field::string_list("tags").optional().build(),
        Field::block(
            "sdwan_zone",
            vec![Field::string("name").optional().max_length(35).build()],
        )
        .optional()
        .sort_by("name")
        .build(),
    ]
}

fn state(json: Value) -> HashMap<String, Dynamic> {
    DynamicValue::decode_json(json.to_string().as_bytes())
        .unwrap()
        .to_fields()
        .unwrap()
}

#[test]
fn flatten_of_expand_is_identity_for_plain_fields() {
    let config = state(json!({
        "seq_num": 0,
        "status": "enable",
        "gateway": "192.168.1.254",
        "distance": 10,
        "comment": "default route",
        "tags": ["a", "b"],
        "sdwan_zone": [{"name": "zone1"}, {"name": "zone2"}]
    }));

    let wire = expand(&route_fields(), &config, &ExpandOptions::default()).unwrap();
    let back = flatten(&route_fields(), &wire, Some(&config), &FlattenOptions::default()).unwrap();

    assert_eq!(back, config);
}

#[test]
fn normalization_is_the_only_difference_for_cidr_and_sensitive_fields() {
    let config = state(json!({
        "dst": "10.0.0.0/8",
        "psk": "hunter2"
    }));

    let mut wire = expand(&route_fields(), &config, &ExpandOptions::default()).unwrap();
    assert_eq!(wire["dst"], json!("10.0.0.0/8"));
    assert_eq!(wire["psk"], json!("hunter2"));

    // the device answers in its own notation and hides secrets
    wire.insert("dst".to_string(), json!("10.0.0.0 255.0.0.0"));
    wire.insert("psk".to_string(), json!("ENC AAAA"));

    let back = flatten(&route_fields(), &wire, Some(&config), &FlattenOptions::default()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn sorted_tables_are_ascending_regardless_of_device_order() {
    let device = json!({"sdwan-zone": [{"name": "zone3"}, {"name": "zone1"}, {"name": "zone2"}]});
    let Value::Object(wire) = device else {
        unreachable!()
    };

    let back = flatten(
        &route_fields(),
        &wire,
        None,
        &FlattenOptions {
            sort: SortMode::Ascending,
            get_all_tables: true,
        },
    )
    .unwrap();

    let names: Vec<&str> = back["sdwan_zone"]
        .as_list()
        .unwrap()
        .iter()
        .map(|z| z.as_map().unwrap()["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["zone1", "zone2", "zone3"]);
}

#[test]
fn clearing_a_field_sends_null_or_empty_list() {
    let prior = state(json!({
        "comment": "old",
        "tags": ["a"],
        "sdwan_zone": [{"name": "zone1"}]
    }));
    let config = state(json!({"comment": ""}));

    let wire = expand(
        &route_fields(),
        &config,
        &ExpandOptions {
            prior: Some(&prior),
            device_version: None,
        },
    )
    .unwrap();

    assert_eq!(
        Value::Object(wire),
        json!({"comment": null, "tags": [], "sdwan-zone": []})
    );
}
