use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub country: String,
    pub city: String,
}

/// A student as submitted on create. The store assigns `_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
    pub address: Address,
}

/// Parses a path identifier as a 24-character hex ObjectId.
pub fn parse_student_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}
