//! Domain DTOs and the uniform response envelope for the PetFriends API.
//!
//! # Design
//! These types mirror the service's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Pet fields
//! sent by the caller are kept as `serde_json::Value` so that non-string
//! input (booleans, nulls) reaches the server untouched and the server alone
//! decides whether it is acceptable.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Opaque key issued by `GET /api/key`, sent back as the `auth_key` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthKey {
    pub key: String,
}

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Extract the key from a `get_token` response.
    ///
    /// Only a 200 JSON object carrying a string `key` qualifies; anything else
    /// becomes `ApiError::InvalidToken` with the server's own body attached.
    pub fn from_response(response: &ApiResponse) -> Result<Self, ApiError> {
        let key = match (&response.body, response.status) {
            (ApiBody::Json(value), 200) => value.get("key").and_then(Value::as_str),
            _ => None,
        };
        match key {
            Some(key) => Ok(Self::new(key)),
            None => Err(ApiError::InvalidToken {
                status: response.status,
                body: response.body.to_string(),
            }),
        }
    }
}

/// A pet record as returned by the server. Identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PetList {
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Name, species and age sent when creating or updating a pet.
///
/// Values are not validated. In form and multipart encodings a string is
/// sent as-is, `null` omits the field, and any other value is sent as its
/// JSON text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PetFields {
    pub name: Value,
    pub animal_type: Value,
    pub age: Value,
}

impl PetFields {
    pub fn new(name: impl Into<Value>, animal_type: impl Into<Value>, age: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }

    /// Field pairs for form-style encodings, in declaration order.
    pub fn form_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("name", &self.name),
            ("animal_type", &self.animal_type),
            ("age", &self.age),
        ]
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s.clone())),
            other => Some((k, other.to_string())),
        })
        .collect()
    }
}

/// An image file ready to be attached to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Photo {
    /// Read the whole file into memory; the handle is closed before returning.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        let content_type = if is_png { "image/png" } else { "image/jpeg" };
        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            data,
        })
    }
}

/// Response payload: parsed JSON for a 200 JSON response, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
}

impl ApiBody {
    /// Field of a JSON object body. Text bodies have no fields.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            ApiBody::Json(value) => value.get(field),
            ApiBody::Text(_) => None,
        }
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiBody::Json(value) => Some(value),
            ApiBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ApiBody::Json(_) => None,
            ApiBody::Text(text) => Some(text),
        }
    }

    /// Type descriptor of the body: the JSON value kind, or `"text"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiBody::Json(Value::Object(_)) => "object",
            ApiBody::Json(Value::Array(_)) => "array",
            ApiBody::Json(Value::String(_)) => "string",
            ApiBody::Json(Value::Number(_)) => "number",
            ApiBody::Json(Value::Bool(_)) => "boolean",
            ApiBody::Json(Value::Null) => "null",
            ApiBody::Text(_) => "text",
        }
    }
}

impl std::fmt::Display for ApiBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiBody::Json(value) => write!(f, "{value}"),
            ApiBody::Text(text) => f.write_str(text),
        }
    }
}

/// The `(status, body)` pair every client operation returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ApiBody,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Decode a JSON body into `T`. Text bodies are a deserialization error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            ApiBody::Json(value) => {
                T::deserialize(value).map_err(|e| ApiError::Deserialization(e.to_string()))
            }
            ApiBody::Text(text) => Err(ApiError::Deserialization(format!(
                "HTTP {} returned a non-JSON body: {text}",
                self.status
            ))),
        }
    }

    pub fn into_parts(self) -> (u16, ApiBody) {
        (self.status, self.body)
    }
}
