//! API utility functions
//!
//! Contains helper functions used by API handlers for id parsing, the
//! BSON-to-JSON response conversion, and write-acknowledgment bodies.

use crate::db::CatalogDb;
use crate::error::AppError;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use mongodb::results::UpdateResult;
use serde_json::{json, Value};

/// Parse a path or body book id into an `ObjectId`
///
/// # Arguments
/// * `id` - The 24-character hex id string from the client
///
/// # Returns
/// * `Ok(ObjectId)` - Parsed id
/// * `Err(AppError)` - Malformed input, rejected before any store round trip
pub fn parse_book_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidBookId(id.to_string()))
}

/// Look up a user by email, failing when no document exists
///
/// Handlers that operate on a user's lists call this first so an unknown
/// email surfaces as a not-found error instead of an empty result.
pub async fn require_user(db: &CatalogDb, email: &str) -> Result<Document, AppError> {
    db.find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::UserNotFound(email.to_string()))
}

/// Convert a BSON value into the JSON shape clients expect
///
/// ObjectIds become their hex strings and datetimes RFC 3339 strings,
/// recursively through documents and arrays. Remaining scalar types pass
/// through relaxed extended JSON, which renders them as plain JSON values.
pub fn bson_to_json(bson: Bson) -> Value {
    match bson {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(datetime) => match datetime.try_to_rfc3339_string() {
            Ok(formatted) => Value::String(formatted),
            // Out-of-range datetimes fall back to the raw millisecond count.
            Err(_) => Value::from(datetime.timestamp_millis()),
        },
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Convert a stored document into a JSON response body
pub fn document_to_json(document: Document) -> Value {
    bson_to_json(Bson::Document(document))
}

/// Insert acknowledgment body: `{acknowledged, insertedId}`
pub fn insert_ack(inserted_id: Bson) -> Value {
    json!({
        "acknowledged": true,
        "insertedId": bson_to_json(inserted_id),
    })
}

/// Update acknowledgment body: matched/modified counts plus upsert info
pub fn update_ack(result: &UpdateResult) -> Value {
    write_ack(
        result.matched_count,
        result.modified_count,
        result.upserted_id.clone(),
    )
}

fn write_ack(matched_count: u64, modified_count: u64, upserted_id: Option<Bson>) -> Value {
    let upserted_count = u64::from(upserted_id.is_some());
    json!({
        "acknowledged": true,
        "matchedCount": matched_count,
        "modifiedCount": modified_count,
        "upsertedId": upserted_id.map(bson_to_json),
        "upsertedCount": upserted_count,
    })
}

/// Delete acknowledgment body: `{acknowledged, deletedCount}`
pub fn delete_ack(deleted_count: u64) -> Value {
    json!({
        "acknowledged": true,
        "deletedCount": deleted_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, DateTime};

    #[test]
    fn test_parse_book_id_valid() {
        let id = ObjectId::new();
        assert_eq!(parse_book_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_parse_book_id_malformed() {
        let result = parse_book_id("not-a-hex-id");
        match result {
            Err(AppError::InvalidBookId(id)) => assert_eq!(id, "not-a-hex-id"),
            other => panic!("Expected InvalidBookId, got: {:?}", other.map(|id| id.to_hex())),
        }
    }

    #[test]
    fn test_bson_to_json_object_id_becomes_hex() {
        let id = ObjectId::new();
        assert_eq!(bson_to_json(Bson::ObjectId(id)), Value::String(id.to_hex()));
    }

    #[test]
    fn test_bson_to_json_datetime_becomes_rfc3339() {
        // 2023-11-14T22:13:20Z
        let converted = bson_to_json(Bson::DateTime(DateTime::from_millis(1_700_000_000_000)));
        let text = converted.as_str().unwrap();
        assert!(text.starts_with("2023-11-14T22:13:20"), "got {}", text);
        assert!(text.ends_with('Z'), "got {}", text);
    }

    #[test]
    fn test_bson_to_json_recurses_into_documents_and_arrays() {
        let id = ObjectId::new();
        let document = doc! {
            "title": "Dune",
            "price": 42,
            "reviews": [ { "reviewer": id } ],
        };

        let converted = document_to_json(document);
        assert_eq!(converted["title"], json!("Dune"));
        assert_eq!(converted["price"], json!(42));
        assert_eq!(converted["reviews"][0]["reviewer"], json!(id.to_hex()));
    }

    #[test]
    fn test_insert_ack_shape() {
        let id = ObjectId::new();
        let ack = insert_ack(Bson::ObjectId(id));
        assert_eq!(
            ack,
            json!({ "acknowledged": true, "insertedId": id.to_hex() })
        );
    }

    #[test]
    fn test_write_ack_without_upsert() {
        let ack = write_ack(1, 0, None);
        assert_eq!(ack["acknowledged"], json!(true));
        assert_eq!(ack["matchedCount"], json!(1));
        assert_eq!(ack["modifiedCount"], json!(0));
        assert_eq!(ack["upsertedId"], Value::Null);
        assert_eq!(ack["upsertedCount"], json!(0));
    }

    #[test]
    fn test_write_ack_with_upsert() {
        let id = ObjectId::new();
        let ack = write_ack(0, 0, Some(Bson::ObjectId(id)));
        assert_eq!(ack["upsertedId"], json!(id.to_hex()));
        assert_eq!(ack["upsertedCount"], json!(1));
    }

    #[test]
    fn test_delete_ack_shape() {
        let ack = delete_ack(1);
        assert_eq!(ack, json!({ "acknowledged": true, "deletedCount": 1 }));
    }
}
