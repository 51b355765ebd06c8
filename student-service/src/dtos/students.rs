use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStudentResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsParams {
    pub country: Option<String>,
    pub age: Option<i64>,
}

/// One row of the list endpoint. Values are passed through from storage
/// untouched, since patches may have changed their types.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentSummary {
    pub name: Value,
    pub age: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub data: Vec<StudentSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: String,
    pub name: Value,
    pub age: Value,
    pub address: Value,
}

fn required_field(document: &Document, key: &str) -> Result<Value, AppError> {
    document
        .get(key)
        .cloned()
        .map(Bson::into_relaxed_extjson)
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Stored student is missing field '{}'",
                key
            ))
        })
}

impl TryFrom<Document> for StudentSummary {
    type Error = AppError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_field(&document, "name")?,
            age: required_field(&document, "age")?,
        })
    }
}

impl TryFrom<Document> for StudentResponse {
    type Error = AppError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let id = document.get_object_id("_id").map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Stored student has no ObjectId: {}", e))
        })?;

        Ok(Self {
            id: id.to_hex(),
            name: required_field(&document, "name")?,
            age: required_field(&document, "age")?,
            address: required_field(&document, "address")?,
        })
    }
}
