use mongodb::bson::Bson;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::Serialize;

use crate::utils::bson_to_json;

/// Write acknowledgements, shaped like the driver results clients already parse.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[schema(value_type = String)]
    pub inserted_id: serde_json::Value,
}

impl InsertAck {
    pub fn new(inserted_id: Bson) -> Self {
        Self {
            acknowledged: true,
            inserted_id: bson_to_json(inserted_id),
        }
    }
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        InsertAck::new(result.inserted_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    #[schema(value_type = Option<String>)]
    pub upserted_id: Option<serde_json::Value>,
    pub upserted_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        let mut ack = UpdateAck::new(result.matched_count, result.modified_count);
        if let Some(id) = result.upserted_id {
            ack.upserted_id = Some(bson_to_json(id));
            ack.upserted_count = 1;
        }
        ack
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        DeleteAck::new(result.deleted_count)
    }
}

/// Result of a conditional insert keyed on a uniqueness rule.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(InsertAck),
    AlreadyExists,
}
