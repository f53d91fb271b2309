//! Rendering stored documents as API JSON.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// Relaxed extended JSON: numbers stay numbers, strings stay strings, and
/// only BSON-specific types (ObjectId, dates) get `$oid`/`$date` wrappers.
pub fn document_to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

pub fn documents_to_json(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(document_to_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_document_to_json_keeps_plain_values() {
        let value = document_to_json(doc! {
            "_id": "0190f1c2-0000-7000-8000-000000000001",
            "rate": 150_i64,
            "price": 12.5,
            "isDeleted": false,
            "tags": ["a"],
        });
        assert_eq!(
            value,
            json!({
                "_id": "0190f1c2-0000-7000-8000-000000000001",
                "rate": 150,
                "price": 12.5,
                "isDeleted": false,
                "tags": ["a"],
            })
        );
    }
}
