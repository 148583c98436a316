//! Conversion of stored documents into plain JSON for responses.
//!
//! Documents coming out of MongoDB carry `ObjectId`s, which serde_json would
//! render as `{"$oid": "..."}`. Clients only ever see the hex string, at any
//! nesting depth. The conversion never touches its input.

use crate::utils::error::{AppError, AppResult};
use mongodb::bson::{self, Bson, Document};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Recursively converts a BSON value into JSON, replacing every ObjectId with
/// its hex string. Arrays and documents keep their order and shape.
pub fn sanitize(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Bson::Document(doc) => sanitize_document(doc),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Null => Value::Null,
        Bson::Int32(n) => Value::Number((*n).into()),
        Bson::Int64(n) => Value::Number((*n).into()),
        Bson::Double(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => value.clone().into_relaxed_extjson(),
        },
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => value.clone().into_relaxed_extjson(),
        },
        other => other.clone().into_relaxed_extjson(),
    }
}

pub fn sanitize_document(doc: &Document) -> Value {
    let map: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), sanitize(value)))
        .collect();
    Value::Object(map)
}

/// Serializes a model through BSON so its ObjectIds survive, then sanitizes it.
pub fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    let bson = bson::to_bson(value)?;
    Ok(sanitize(&bson))
}

pub fn to_json_list<T: Serialize>(values: &[T]) -> AppResult<Value> {
    values
        .iter()
        .map(to_json)
        .collect::<Result<Vec<_>, AppError>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn replaces_nested_object_ids() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let c = ObjectId::new();
        let input = doc! {
            "_id": a,
            "name": "Chai Point",
            "categories": [b, { "inner": [c, 1, "x"] }],
            "meta": { "owner": { "id": c, "active": true }, "score": 4.5, "note": Bson::Null },
        };

        let out = sanitize_document(&input);

        assert_eq!(
            out,
            json!({
                "_id": a.to_hex(),
                "name": "Chai Point",
                "categories": [b.to_hex(), { "inner": [c.to_hex(), 1, "x"] }],
                "meta": {
                    "owner": { "id": c.to_hex(), "active": true },
                    "score": 4.5,
                    "note": null
                },
            })
        );
    }

    #[test]
    fn leaves_input_untouched() {
        let id = ObjectId::new();
        let input = doc! { "list": [{ "id": id }] };
        let before = input.clone();

        let _ = sanitize_document(&input);

        assert_eq!(input, before);
        assert_eq!(
            input.get_array("list").unwrap()[0].as_document().unwrap().get_object_id("id").unwrap(),
            id
        );
    }

    #[test]
    fn preserves_key_order() {
        let input = doc! { "z": 1, "a": 2, "m": 3 };
        let out = sanitize_document(&input);
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn handles_deep_nesting() {
        let id = ObjectId::new();
        let mut value = Bson::ObjectId(id);
        let mut expected = json!(id.to_hex());
        for _ in 0..64 {
            value = Bson::Array(vec![Bson::Document(doc! { "v": value })]);
            expected = json!([{ "v": expected }]);
        }
        assert_eq!(sanitize(&value), expected);
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(sanitize(&Bson::Int32(7)), json!(7));
        assert_eq!(sanitize(&Bson::Int64(-3)), json!(-3));
        assert_eq!(sanitize(&Bson::Boolean(false)), json!(false));
        assert_eq!(sanitize(&Bson::String("mumbai".into())), json!("mumbai"));
    }

    #[test]
    fn to_json_serializes_models() {
        #[derive(Serialize)]
        struct Row {
            #[serde(rename = "_id")]
            id: ObjectId,
            refs: Vec<ObjectId>,
        }

        let row = Row { id: ObjectId::new(), refs: vec![ObjectId::new()] };
        let out = to_json(&row).unwrap();

        assert_eq!(out["_id"], json!(row.id.to_hex()));
        assert_eq!(out["refs"][0], json!(row.refs[0].to_hex()));
    }
}
