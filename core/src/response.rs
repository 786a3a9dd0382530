//! Decoded responses: a status code plus a body that is either structured
//! JSON or the raw text the server sent.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PetFriendsError;
use crate::http::HttpResponse;
use crate::types::{ApiKey, AuthKey, PetList};

/// Response body, tagged by how it was decoded.
///
/// The two variants are never coerced into each other: a declared-JSON body
/// that fails to parse stays `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// The `(status, body)` pair every client operation returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Decode `response`, keeping the status untouched.
    pub fn from_http(response: HttpResponse) -> Self {
        let declares_json = response
            .header("content-type")
            .is_some_and(is_json_content_type);
        let body = if declares_json {
            match serde_json::from_str(&response.body) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(response.body),
            }
        } else {
            ResponseBody::Text(response.body)
        };
        Self {
            status: response.status,
            body,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.body, ResponseBody::Json(_))
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// The raw body, when it was not decoded as JSON.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    /// A top-level field of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json().and_then(|value| value.get(name))
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Deserialize a JSON body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PetFriendsError> {
        match &self.body {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value.clone())?),
            ResponseBody::Text(text) => Err(PetFriendsError::UnstructuredBody {
                status: self.status,
                body: text.clone(),
            }),
        }
    }

    /// The `key` of an authenticate response.
    pub fn auth_key(&self) -> Result<AuthKey, PetFriendsError> {
        self.decode::<ApiKey>().map(AuthKey::from)
    }

    /// The `pets` of a list response.
    pub fn pets(&self) -> Result<PetList, PetFriendsError> {
        self.decode()
    }
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json")
        || mime.to_ascii_lowercase().ends_with("+json")
}
