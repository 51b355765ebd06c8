use super::store::{StudentFilter, StudentStore};
use crate::models::NewStudent;
use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store with the same filter, projection and `$set`
/// semantics as the MongoDB backend. Documents keep insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStudentStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn project(document: &Document) -> Document {
    let mut projected = Document::new();
    for key in ["_id", "name", "age"] {
        if let Some(value) = document.get(key) {
            projected.insert(key, value.clone());
        }
    }
    projected
}

/// Sets `value` at a dotted `path`, creating intermediate documents.
fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<(), AppError> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(AppError::DatabaseError(anyhow::anyhow!(
                    "Cannot create field '{}' in element {{{}: non-document}}",
                    rest,
                    head
                ))),
            }
        }
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        let mut document = Document::new();
        document.insert("_id", id);
        for (key, value) in bson::to_document(student)? {
            document.insert(key, value);
        }

        self.documents.write().await.push(document);
        Ok(id)
    }

    async fn find(&self, filter: &StudentFilter, limit: i64) -> Result<Vec<Document>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|document| filter.matches(document))
            .take(limit)
            .map(project)
            .collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|document| document.get_object_id("_id").ok() == Some(id))
            .cloned())
    }

    async fn update(&self, id: ObjectId, fields: Document) -> Result<u64, AppError> {
        if fields.keys().any(|key| key == "_id") {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Performing an update on the path '_id' would modify the immutable field '_id'"
            )));
        }

        let mut documents = self.documents.write().await;
        let Some(document) = documents
            .iter_mut()
            .find(|document| document.get_object_id("_id").ok() == Some(id))
        else {
            return Ok(0);
        };

        // Apply to a copy so a failing path leaves the stored document intact.
        let mut updated = document.clone();
        for (key, value) in fields {
            set_path(&mut updated, &key, value)?;
        }
        *document = updated;
        Ok(1)
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|document| document.get_object_id("_id").ok() != Some(id));
        Ok((before - documents.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
