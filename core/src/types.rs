//! Domain DTOs for the PetFriends API.
//!
//! # Design
//! These mirror the service's JSON but are defined independently of the
//! mock-server crate; the scenario suite catches schema drift between the
//! two. `age` stays a string on both sides of the wire because the service
//! accepts and echoes whatever the form carried.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PetFriendsError;

/// A pet as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    /// `data:<mime>;base64,<payload>`, or empty when no photo is set.
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub created_at: String,
}

/// Body of a successful `GET /api/pets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn ids(&self) -> Vec<&str> {
        self.pets.iter().map(|pet| pet.id.as_str()).collect()
    }

    pub fn contains(&self, pet_id: &str) -> bool {
        self.pets.iter().any(|pet| pet.id == pet_id)
    }
}

/// Body of a successful `GET /api/key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey {
    pub key: String,
}

/// Opaque token sent as the `auth_key` header.
///
/// An empty key is legal and means the header is omitted entirely.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("AuthKey(<empty>)")
        } else {
            f.write_str("AuthKey(<redacted>)")
        }
    }
}

impl From<ApiKey> for AuthKey {
    fn from(value: ApiKey) -> Self {
        Self(value.key)
    }
}

/// The `filter` query parameter of `GET /api/pets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetFilter {
    /// Every pet on the service (`filter=`).
    All,
    /// Only pets owned by the authenticated account (`filter=my_pets`).
    MyPets,
    /// Any other value. The service rejects these; kept for negative tests.
    Other(String),
}

impl PetFilter {
    pub fn as_str(&self) -> &str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
            PetFilter::Other(value) => value,
        }
    }
}

/// Form fields shared by pet creation and pet update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl NewPet {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }

    pub(crate) fn form_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("animal_type", self.animal_type.as_str()),
            ("age", self.age.as_str()),
        ]
    }
}

/// An image file ready to be sent as the `pet_photo` multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Read `path` and infer the content type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, PetFriendsError> {
        let bytes = std::fs::read(path).map_err(|source| PetFriendsError::Photo {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            bytes,
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_tolerates_missing_optional_fields() {
        let pet: Pet =
            serde_json::from_str(r#"{"id":"p1","name":"Rex","animal_type":"dog","age":"2"}"#).unwrap();
        assert_eq!(pet.name, "Rex");
        assert!(pet.pet_photo.is_empty());
        assert!(pet.user_id.is_empty());
    }

    #[test]
    fn pet_list_membership() {
        let list: PetList = serde_json::from_str(
            r#"{"pets":[{"id":"a","name":"A","animal_type":"cat","age":"1"},
                        {"id":"b","name":"B","animal_type":"cat","age":"2"}]}"#,
        )
        .unwrap();
        assert_eq!(list.ids(), vec!["a", "b"]);
        assert!(list.contains("b"));
        assert!(!list.contains("c"));
    }

    #[test]
    fn filter_wire_values() {
        assert_eq!(PetFilter::All.as_str(), "");
        assert_eq!(PetFilter::MyPets.as_str(), "my_pets");
        assert_eq!(PetFilter::Other("nope".to_string()).as_str(), "nope");
    }

    #[test]
    fn auth_key_debug_hides_token() {
        let key = AuthKey::new("secret-token");
        assert!(!format!("{key:?}").contains("secret-token"));
        assert_eq!(format!("{:?}", AuthKey::empty()), "AuthKey(<empty>)");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("images/cat1.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("dog.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("notes.txt")), "application/octet-stream");
    }

    #[test]
    fn photo_from_missing_path_is_photo_error() {
        let err = PhotoUpload::from_path(Path::new("does/not/exist.jpg")).unwrap_err();
        assert!(matches!(err, PetFriendsError::Photo { .. }));
    }
}
