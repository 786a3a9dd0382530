//! Stateless HTTP request builder and response decoder for the PetFriends
//! API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Every operation has a `build_*` method that produces an
//! `HttpRequest`; all responses go through the single `parse_response`,
//! because the service's contract is "status plus whatever body it sent"
//! for every endpoint. The caller executes the round-trip in between.

use url::Url;

use crate::form::{self, MultipartForm};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::ApiResponse;
use crate::types::{AuthKey, NewPet, PetFilter, PhotoUpload};

const AUTH_HEADER: &str = "auth_key";
const PHOTO_FIELD: &str = "pet_photo";

/// Synchronous, stateless request builder for the PetFriends API.
#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/key` with the credentials as headers.
    pub fn build_get_api_key(&self, email: &str, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/key", self.base_url),
            query: Vec::new(),
            headers: vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ],
            body: None,
        }
    }

    /// `GET /api/pets?filter=...`. The filter is always sent, even when empty.
    pub fn build_list_pets(&self, auth_key: &AuthKey, filter: &PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/pets", self.base_url),
            query: vec![("filter".to_string(), filter.as_str().to_string())],
            headers: auth_headers(auth_key),
            body: None,
        }
    }

    /// `POST /api/pets` as multipart, with the photo as the `pet_photo` file.
    pub fn build_add_new_pet(
        &self,
        auth_key: &AuthKey,
        pet: &NewPet,
        photo: &PhotoUpload,
    ) -> HttpRequest {
        self.build_add_new_pet_with(MultipartForm::new(), auth_key, pet, photo)
    }

    pub(crate) fn build_add_new_pet_with(
        &self,
        form: MultipartForm,
        auth_key: &AuthKey,
        pet: &NewPet,
        photo: &PhotoUpload,
    ) -> HttpRequest {
        let form = pet
            .form_fields()
            .into_iter()
            .fold(form, |form, (name, value)| form.text(name, value))
            .file(PHOTO_FIELD, &photo.file_name, &photo.content_type, &photo.bytes);
        let url = format!("{}/api/pets", self.base_url);
        self.multipart(HttpMethod::Post, url, auth_key, form)
    }

    /// `POST /api/create_pet_simple` as a url-encoded form.
    pub fn build_create_pet_simple(&self, auth_key: &AuthKey, pet: &NewPet) -> HttpRequest {
        let url = format!("{}/api/create_pet_simple", self.base_url);
        self.urlencoded(HttpMethod::Post, url, auth_key, pet)
    }

    /// `POST /api/pets/set_photo/{pet_id}` as multipart.
    pub fn build_set_pet_photo(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        photo: &PhotoUpload,
    ) -> HttpRequest {
        let form = MultipartForm::new().file(
            PHOTO_FIELD,
            &photo.file_name,
            &photo.content_type,
            &photo.bytes,
        );
        self.multipart(
            HttpMethod::Post,
            self.url_with_segments(&["api", "pets", "set_photo", pet_id]),
            auth_key,
            form,
        )
    }

    /// `PUT /api/pets/{pet_id}` as a url-encoded form.
    pub fn build_update_pet_info(&self, auth_key: &AuthKey, pet_id: &str, pet: &NewPet) -> HttpRequest {
        let url = self.url_with_segments(&["api", "pets", pet_id]);
        self.urlencoded(HttpMethod::Put, url, auth_key, pet)
    }

    /// `DELETE /api/pets/{pet_id}`.
    pub fn build_delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url_with_segments(&["api", "pets", pet_id]),
            query: Vec::new(),
            headers: auth_headers(auth_key),
            body: None,
        }
    }

    /// Decode any PetFriends response. Never fails: non-2xx statuses and
    /// non-JSON bodies are part of the result.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResponse {
        ApiResponse::from_http(response)
    }

    /// `base_url` followed by `segments`, each percent-encoded so that an id
    /// containing `/`, `?` or `#` stays one segment.
    fn url_with_segments(&self, segments: &[&str]) -> String {
        match Url::parse(&self.base_url) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                url.into()
            }
            // Not a URL at all; the transport reports it when sending.
            Err(_) => format!("{}/{}", self.base_url, segments.join("/")),
        }
    }

    fn urlencoded(&self, method: HttpMethod, url: String, auth_key: &AuthKey, pet: &NewPet) -> HttpRequest {
        let mut headers = auth_headers(auth_key);
        headers.push(("content-type".to_string(), form::URLENCODED.to_string()));
        HttpRequest {
            method,
            path: url,
            query: Vec::new(),
            headers,
            body: Some(form::urlencoded(pet.form_fields())),
        }
    }

    fn multipart(
        &self,
        method: HttpMethod,
        url: String,
        auth_key: &AuthKey,
        form: MultipartForm,
    ) -> HttpRequest {
        let mut headers = auth_headers(auth_key);
        headers.push(("content-type".to_string(), form.content_type()));
        HttpRequest {
            method,
            path: url,
            query: Vec::new(),
            headers,
            body: Some(form.finish()),
        }
    }
}

fn auth_headers(auth_key: &AuthKey) -> Vec<(String, String)> {
    if auth_key.is_empty() {
        return Vec::new();
    }
    vec![(AUTH_HEADER.to_string(), auth_key.as_str().to_string())]
}
