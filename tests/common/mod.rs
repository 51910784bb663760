#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use std::path::Path;

pub const SOVEREIGN_STATE: &str = "Q3624078";
pub const COUNTRY: &str = "Q6256";

pub fn item_statement(property: &str, id: &str) -> Value {
    json!({
        "property": {"id": property, "data_type": "wikibase-item"},
        "rank": "normal",
        "value": {"type": "value", "content": id}
    })
}

/// Minimal Wikibase REST item document.
pub fn entity_doc(id: &str, label: &str, classes: &[&str], borders: &[&str]) -> Value {
    json!({
        "id": id,
        "type": "item",
        "labels": {"en": label},
        "descriptions": {"en": format!("{} (fixture)", label)},
        "statements": {
            "P31": classes.iter().map(|c| item_statement("P31", c)).collect::<Vec<_>>(),
            "P47": borders.iter().map(|b| item_statement("P47", b)).collect::<Vec<_>>()
        }
    })
}

pub fn mock_search<'a>(server: &'a MockServer, name: &str, hit: Option<(&str, &str)>) -> Mock<'a> {
    let hits = match hit {
        Some((id, label)) => json!([{"id": id, "label": label, "description": "country"}]),
        None => json!([]),
    };
    server.mock(|when, then| {
        when.method(GET)
            .path("/w/api.php")
            .query_param("action", "wbsearchentities")
            .query_param("search", name);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"searchinfo": {"search": name}, "search": hits, "success": 1}));
    })
}

pub fn mock_entity<'a>(server: &'a MockServer, doc: Value) -> Mock<'a> {
    let path = format!("/entities/items/{}", doc["id"].as_str().unwrap());
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(doc);
    })
}

pub fn sparql_bindings(rows: Vec<Value>) -> Value {
    json!({"head": {"vars": []}, "results": {"bindings": rows}})
}

pub fn uri(id: &str) -> Value {
    json!({"type": "uri", "value": format!("http://www.wikidata.org/entity/{}", id)})
}

pub fn literal(value: &str) -> Value {
    json!({"type": "literal", "xml:lang": "en", "value": value})
}

pub fn write_input(dir: &Path, file: &str, content: &str) -> String {
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

pub fn read_output(dir: &Path, file: &str) -> String {
    std::fs::read_to_string(dir.join(file)).unwrap()
}
