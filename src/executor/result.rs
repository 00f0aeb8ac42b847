//! Execution result types
//!
//! [`ResultData`] is the typed outcome of one executed command. It is
//! rendered to JSON once, at the response boundary, so executors never
//! deal in serialized text. Documents are rendered in relaxed extended
//! JSON so dates and ObjectIds survive the trip to the UI.

use mongodb::bson::{Bson, Document};
use serde_json::{Value, json};

/// Data returned from command execution
#[derive(Debug, Clone, PartialEq)]
pub enum ResultData {
    /// List of documents (find, aggregate)
    Documents(Vec<Document>),

    /// Single document passed through (db.stats)
    Document(Document),

    /// Count result
    Count(u64),

    /// Insert one result
    InsertOne { inserted_id: Bson },

    /// Insert many result
    InsertMany { inserted_ids: Vec<Bson> },

    /// Update result
    Update {
        matched: u64,
        modified: u64,
        upserted_id: Option<Bson>,
    },

    /// Delete result
    Delete { deleted: u64 },

    /// Bulk write summary accumulated across per-operation calls
    BulkWrite {
        inserted: u64,
        matched: u64,
        modified: u64,
        deleted: u64,
        /// Upserted ids keyed by operation index.
        upserted_ids: Vec<(usize, Bson)>,
    },

    /// List of collection names
    CollectionNames(Vec<String>),
}

impl ResultData {
    /// Render to the JSON shape the shell API returns.
    pub fn to_json(&self) -> Value {
        match self {
            ResultData::Documents(docs) => {
                Value::Array(docs.iter().map(document_to_json).collect())
            }

            ResultData::Document(doc) => document_to_json(doc),

            ResultData::Count(n) => json!(n),

            ResultData::InsertOne { inserted_id } => json!({
                "insertedId": bson_to_json(inserted_id),
                "insertedCount": 1,
            }),

            ResultData::InsertMany { inserted_ids } => json!({
                "insertedIds": inserted_ids.iter().map(bson_to_json).collect::<Vec<_>>(),
                "insertedCount": inserted_ids.len(),
            }),

            ResultData::Update {
                matched,
                modified,
                upserted_id,
            } => json!({
                "matchedCount": matched,
                "modifiedCount": modified,
                "upsertedId": upserted_id.as_ref().map(bson_to_json),
                "upsertedCount": if upserted_id.is_some() { 1 } else { 0 },
            }),

            ResultData::Delete { deleted } => json!({
                "deletedCount": deleted,
            }),

            ResultData::BulkWrite {
                inserted,
                matched,
                modified,
                deleted,
                upserted_ids,
            } => {
                let upserted: serde_json::Map<String, Value> = upserted_ids
                    .iter()
                    .map(|(index, id)| (index.to_string(), bson_to_json(id)))
                    .collect();
                json!({
                    "insertedCount": inserted,
                    "matchedCount": matched,
                    "modifiedCount": modified,
                    "deletedCount": deleted,
                    "upsertedCount": upserted_ids.len(),
                    "upsertedIds": upserted,
                })
            }

            ResultData::CollectionNames(names) => json!(names),
        }
    }
}

/// Relaxed extended JSON rendering for a document.
fn document_to_json(doc: &Document) -> Value {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}

fn bson_to_json(value: &Bson) -> Value {
    value.clone().into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_insert_one_shape() {
        let id = ObjectId::new();
        let value = ResultData::InsertOne {
            inserted_id: Bson::ObjectId(id),
        }
        .to_json();
        assert_eq!(value["insertedCount"], 1);
        assert_eq!(value["insertedId"]["$oid"], id.to_hex());
    }

    #[test]
    fn test_update_without_upsert() {
        let value = ResultData::Update {
            matched: 3,
            modified: 2,
            upserted_id: None,
        }
        .to_json();
        assert_eq!(value["matchedCount"], 3);
        assert_eq!(value["modifiedCount"], 2);
        assert_eq!(value["upsertedCount"], 0);
        assert!(value["upsertedId"].is_null());
    }

    #[test]
    fn test_bulk_write_upserted_ids_keyed_by_index() {
        let value = ResultData::BulkWrite {
            inserted: 1,
            matched: 0,
            modified: 0,
            deleted: 0,
            upserted_ids: vec![(2, Bson::Int64(7))],
        }
        .to_json();
        assert_eq!(value["upsertedCount"], 1);
        assert_eq!(value["upsertedIds"]["2"], 7);
    }

    #[test]
    fn test_documents_render_relaxed_extjson() {
        let value = ResultData::Documents(vec![doc! {"n": 1i64, "s": "x"}]).to_json();
        assert_eq!(value[0]["n"], 1);
        assert_eq!(value[0]["s"], "x");
    }

    #[test]
    fn test_collection_names() {
        let value =
            ResultData::CollectionNames(vec!["users".to_string(), "orders".to_string()]).to_json();
        assert_eq!(value, json!(["users", "orders"]));
    }
}
