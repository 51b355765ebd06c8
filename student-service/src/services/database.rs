use super::store::{list_projection, StudentFilter, StudentStore};
use crate::models::NewStudent;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::FindOptions,
    Client as MongoClient, Collection,
};
use service_core::error::AppError;

/// MongoDB-backed store. One client is created at startup and shared by
/// every request; the driver pools connections internally.
#[derive(Clone)]
pub struct MongoStudentStore {
    client: MongoClient,
    students: Collection<Document>,
}

impl MongoStudentStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let students = client.database(database).collection(collection);
        tracing::info!(
            database = %database,
            collection = %collection,
            "Successfully connected to MongoDB database"
        );
        Ok(Self { client, students })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, AppError> {
        let result = self
            .students
            .clone_with_type::<NewStudent>()
            .insert_one(student, None)
            .await?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })
    }

    async fn find(&self, filter: &StudentFilter, limit: i64) -> Result<Vec<Document>, AppError> {
        let options = FindOptions::builder()
            .projection(list_projection())
            .limit(limit)
            .build();

        let cursor = self.students.find(filter.to_document(), options).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self.students.find_one(doc! { "_id": id }, None).await?)
    }

    async fn update(&self, id: ObjectId, fields: Document) -> Result<u64, AppError> {
        let result = self
            .students
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, None)
            .await?;
        Ok(result.matched_count)
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self.students.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
