use crate::dtos::ListStudentsParams;
use crate::models::NewStudent;
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use service_core::error::AppError;

/// Upper bound on documents returned by a filter query.
pub const LIST_LIMIT: i64 = 100;

/// Single-collection persistence for student documents.
///
/// Every method is one independent store operation; atomicity and isolation
/// are whatever the backend gives a single-document write.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, AppError>;

    /// Returns at most `limit` documents projected to `_id`, `name`, `age`.
    async fn find(&self, filter: &StudentFilter, limit: i64) -> Result<Vec<Document>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError>;

    /// `$set`s `fields` on the document, returning the matched count.
    async fn update(&self, id: ObjectId, fields: Document) -> Result<u64, AppError>;

    /// Returns the deleted count.
    async fn delete(&self, id: ObjectId) -> Result<u64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Query built from the list endpoint's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub country: Option<String>,
    pub min_age: Option<i64>,
}

impl From<ListStudentsParams> for StudentFilter {
    /// Empty `country` and zero `age` count as "not given".
    fn from(params: ListStudentsParams) -> Self {
        Self {
            country: params.country.filter(|c| !c.is_empty()),
            min_age: params.age.filter(|a| *a != 0),
        }
    }
}

impl StudentFilter {
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();
        if let Some(country) = &self.country {
            query.insert("address.country", country.clone());
        }
        if let Some(age) = self.min_age {
            query.insert("age", doc! { "$gte": age });
        }
        query
    }

    /// Evaluates the filter against a stored document the way the query
    /// from [`StudentFilter::to_document`] would.
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(country) = &self.country {
            let stored = document
                .get_document("address")
                .ok()
                .and_then(|address| address.get_str("country").ok());
            if stored != Some(country.as_str()) {
                return false;
            }
        }

        if let Some(min_age) = self.min_age {
            let at_least = match document.get("age") {
                Some(Bson::Int32(age)) => i64::from(*age) >= min_age,
                Some(Bson::Int64(age)) => *age >= min_age,
                Some(Bson::Double(age)) => *age >= min_age as f64,
                _ => false,
            };
            if !at_least {
                return false;
            }
        }

        true
    }
}

/// Fields returned by [`StudentStore::find`].
pub fn list_projection() -> Document {
    doc! { "name": 1, "age": 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(country: &str, age: Bson) -> Document {
        doc! {
            "_id": ObjectId::new(),
            "name": "Test",
            "age": age,
            "address": { "country": country, "city": "Somewhere" },
        }
    }

    #[test]
    fn no_params_matches_everything() {
        let filter = StudentFilter::from(ListStudentsParams::default());
        assert_eq!(filter.to_document(), Document::new());
        assert!(filter.matches(&student("US", Bson::Int64(1))));
    }

    #[test]
    fn builds_country_and_age_query() {
        let filter = StudentFilter::from(ListStudentsParams {
            country: Some("US".to_string()),
            age: Some(20),
        });
        assert_eq!(
            filter.to_document(),
            doc! { "address.country": "US", "age": { "$gte": 20_i64 } }
        );
    }

    #[test]
    fn falsy_params_are_ignored() {
        let filter = StudentFilter::from(ListStudentsParams {
            country: Some(String::new()),
            age: Some(0),
        });
        assert_eq!(filter, StudentFilter::default());
    }

    #[test]
    fn age_is_a_lower_bound() {
        let filter = StudentFilter {
            country: None,
            min_age: Some(20),
        };
        assert!(filter.matches(&student("US", Bson::Int64(20))));
        assert!(filter.matches(&student("US", Bson::Int32(35))));
        assert!(filter.matches(&student("US", Bson::Double(20.5))));
        assert!(!filter.matches(&student("US", Bson::Int64(19))));
        assert!(!filter.matches(&student("US", Bson::String("21".to_string()))));
    }

    #[test]
    fn country_is_an_exact_match() {
        let filter = StudentFilter {
            country: Some("US".to_string()),
            min_age: None,
        };
        assert!(filter.matches(&student("US", Bson::Int64(20))));
        assert!(!filter.matches(&student("us", Bson::Int64(20))));
        assert!(!filter.matches(&student("USA", Bson::Int64(20))));
        assert!(!filter.matches(&doc! { "name": "No address", "age": 20 }));
    }
}
