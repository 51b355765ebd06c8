use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
};
use mongodb::bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use service_core::error::AppError;

/// A body is read as JSON when `Content-Type` is absent or names a JSON
/// media type (`application/json`, `application/*+json`).
fn accepts_json(headers: &HeaderMap) -> Result<(), AppError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(());
    };

    let essence = value
        .to_str()
        .ok()
        .and_then(|raw| raw.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let is_json = match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    };

    if is_json {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Unsupported content type '{}', expected JSON",
            essence
        )))
    }
}

async fn json_bytes<S>(req: Request, state: &S) -> Result<Bytes, AppError>
where
    S: Send + Sync,
{
    accepts_json(req.headers())?;
    Bytes::from_request(req, state)
        .await
        .map_err(|e| AppError::ValidationError(e.body_text()))
}

/// JSON body extractor whose every rejection (syntax, missing or mistyped
/// field, content type) is reported as a 422 validation error.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = json_bytes(req, state).await?;
        let value = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// Query-string extractor with the same 422 rejection as [`ValidatedJson`].
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::ValidationError(e.body_text()))?;
        Ok(ValidatedQuery(value))
    }
}

/// Untyped patch document: an ordered map of field names to arbitrary JSON
/// values.
///
/// A missing, blank or `null` body yields an empty map. Anything else that
/// is not a JSON object is a 422. The values are not checked against the
/// student schema, so a patch can add unknown fields or change a field's
/// type.
pub struct PatchBody(pub Map<String, Value>);

impl PatchBody {
    /// Converts the fields to BSON as plain data. Extended-JSON shapes such
    /// as `{"$oid": ...}` stay nested documents.
    pub fn to_document(&self) -> Document {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), json_to_bson(value)))
            .collect()
    }
}

fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_bson(value)))
                .collect(),
        ),
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = json_bytes(req, state).await?;

        let text = std::str::from_utf8(&bytes)
            .map_err(|e| AppError::ValidationError(format!("Body is not UTF-8: {}", e)))?
            .trim();
        if text.is_empty() || text == "null" {
            return Ok(PatchBody(Map::new()));
        }

        let fields = serde_json::from_str::<Map<String, Value>>(text).map_err(|e| {
            AppError::ValidationError(format!("Patch body must be a JSON object: {}", e))
        })?;
        Ok(PatchBody(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use mongodb::bson::doc;
    use serde_json::json;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn json_media_types_are_accepted() {
        assert!(accepts_json(&headers(None)).is_ok());
        assert!(accepts_json(&headers(Some("application/json"))).is_ok());
        assert!(accepts_json(&headers(Some("application/json; charset=utf-8"))).is_ok());
        assert!(accepts_json(&headers(Some("application/merge-patch+json"))).is_ok());
    }

    #[test]
    fn other_media_types_are_rejected() {
        for value in ["text/plain", "application/xml", "multipart/form-data", "text/json"] {
            let err = accepts_json(&headers(Some(value))).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{}", value);
        }
    }

    #[test]
    fn extended_json_shapes_stay_plain_documents() {
        let Value::Object(map) = json!({
            "tag": { "$oid": "65f1c0ffee0000000000abcd" },
            "age": 30,
            "score": 1.5,
            "flags": [true, null],
        }) else {
            unreachable!()
        };

        let document = PatchBody(map).to_document();

        assert_eq!(
            document,
            doc! {
                "tag": { "$oid": "65f1c0ffee0000000000abcd" },
                "age": 30_i64,
                "score": 1.5,
                "flags": [true, Bson::Null],
            }
        );
        assert!(matches!(document.get("tag"), Some(Bson::Document(_))));
    }
}
