//! Purpose: Translate dictionary keys between the wire convention and the local one.
//! Exports: `to_local`, `to_wire`, `local_key`, `wire_key`.
//! Role: Single pure key mapping shared by the transport (outgoing) and loaders (incoming).
//! Invariants: Only object keys change; scalar values, including strings in arrays, never do.
//! Invariants: Recurses into nested objects and into objects held by arrays.
//! Invariants: `to_wire(to_local(x)) == x` for well-formed lowerCamelCase keys.
use heck::{ToLowerCamelCase, ToSnakeCase};
use serde_json::{Map, Value};

/// Local (snake_case) spelling of a wire key.
pub fn local_key(key: &str) -> String {
    key.to_snake_case()
}

/// Wire (lowerCamelCase) spelling of a local key.
pub fn wire_key(key: &str) -> String {
    key.to_lower_camel_case()
}

pub fn to_local(value: &Value) -> Value {
    map_keys(value, &local_key)
}

pub fn to_wire(value: &Value) -> Value {
    map_keys(value, &wire_key)
}

pub fn map_to_wire(map: &Map<String, Value>) -> Map<String, Value> {
    rename_map(map, &wire_key)
}

fn map_keys(value: &Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(rename_map(map, rename)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(_) | Value::Array(_) => map_keys(item, rename),
                    scalar => scalar.clone(),
                })
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

fn rename_map(map: &Map<String, Value>, rename: &dyn Fn(&str) -> String) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (rename(key), map_keys(value, rename)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{local_key, to_local, to_wire, wire_key};
    use serde_json::json;

    #[test]
    fn keys_convert_both_ways() {
        assert_eq!(local_key("isCircular"), "is_circular");
        assert_eq!(local_key("nextToken"), "next_token");
        assert_eq!(local_key("id"), "id");
        assert_eq!(wire_key("entity_registry_id"), "entityRegistryId");
        assert_eq!(wire_key("dna_sequence_ids"), "dnaSequenceIds");
    }

    #[test]
    fn wire_round_trip_with_nesting() {
        let wire = json!({
            "entityRegistryId": "seq001",
            "isCircular": false,
            "archiveRecord": {"reason": "Other"},
            "customFields": {"plasmidType": {"value": "backbone"}},
            "translations": [{"aminoAcids": "MKV", "start": 1, "regions": [{"start": 1}]}],
            "aliases": ["firstAlias", "second_alias"],
            "length": 12
        });
        let local = to_local(&wire);
        assert_eq!(local["entity_registry_id"], json!("seq001"));
        assert_eq!(local["custom_fields"]["plasmid_type"]["value"], json!("backbone"));
        assert_eq!(local["translations"][0]["amino_acids"], json!("MKV"));
        assert_eq!(local["aliases"], json!(["firstAlias", "second_alias"]));
        assert_eq!(to_wire(&local), wire);
    }

    #[test]
    fn local_round_trip() {
        let local = json!({
            "folder_id": "lib_1",
            "schema_id": null,
            "fields": {"inner_value": [1, 2, 3]}
        });
        assert_eq!(to_local(&to_wire(&local)), local);
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(to_wire(&json!("camelValue")), json!("camelValue"));
        assert_eq!(to_local(&json!([1, "twoWords"])), json!([1, "twoWords"]));
    }

    #[test]
    fn acronym_runs_normalize_on_load() {
        let local = to_local(&json!({"webURL": "https://example"}));
        assert_eq!(local, json!({"web_url": "https://example"}));
    }
}
