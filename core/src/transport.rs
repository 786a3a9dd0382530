//! Blocking executor for `PetFriendsClient` requests.
//!
//! # Design
//! `PetFriends` pairs the stateless builder with a `ureq` agent configured
//! so that 4xx/5xx responses come back as data rather than `Err`. Only
//! transport failures and local file errors surface as `PetFriendsError`.
//! No retries and no timeouts beyond ureq's defaults.

use std::path::Path;

use log::debug;

use crate::client::PetFriendsClient;
use crate::error::PetFriendsError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::ApiResponse;
use crate::types::{AuthKey, NewPet, PetFilter, PhotoUpload};

// Unfiltered pet lists embed every photo as base64.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// PetFriends API client that performs real HTTP round-trips.
pub struct PetFriends {
    client: PetFriendsClient,
    agent: ureq::Agent,
}

impl PetFriends {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            client: PetFriendsClient::new(base_url),
            agent,
        }
    }

    pub fn client(&self) -> &PetFriendsClient {
        &self.client
    }

    /// Authenticate. On success the body carries `key`.
    pub fn get_api_key(&self, email: &str, password: &str) -> Result<ApiResponse, PetFriendsError> {
        self.execute(self.client.build_get_api_key(email, password))
    }

    pub fn list_pets(&self, auth_key: &AuthKey, filter: &PetFilter) -> Result<ApiResponse, PetFriendsError> {
        self.execute(self.client.build_list_pets(auth_key, filter))
    }

    /// Create a pet with a photo read from `photo_path`.
    pub fn add_new_pet(
        &self,
        auth_key: &AuthKey,
        pet: &NewPet,
        photo_path: &Path,
    ) -> Result<ApiResponse, PetFriendsError> {
        let photo = PhotoUpload::from_path(photo_path)?;
        self.execute(self.client.build_add_new_pet(auth_key, pet, &photo))
    }

    pub fn create_pet_simple(&self, auth_key: &AuthKey, pet: &NewPet) -> Result<ApiResponse, PetFriendsError> {
        self.execute(self.client.build_create_pet_simple(auth_key, pet))
    }

    pub fn set_pet_photo(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        photo_path: &Path,
    ) -> Result<ApiResponse, PetFriendsError> {
        let photo = PhotoUpload::from_path(photo_path)?;
        self.execute(self.client.build_set_pet_photo(auth_key, pet_id, &photo))
    }

    pub fn update_pet_info(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        pet: &NewPet,
    ) -> Result<ApiResponse, PetFriendsError> {
        self.execute(self.client.build_update_pet_info(auth_key, pet_id, pet))
    }

    pub fn delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> Result<ApiResponse, PetFriendsError> {
        self.execute(self.client.build_delete_pet(auth_key, pet_id))
    }

    /// Run one request and decode whatever came back.
    pub fn execute(&self, req: HttpRequest) -> Result<ApiResponse, PetFriendsError> {
        let method = req.method;
        let path = req.path.clone();
        let response = self.send(req)?;
        debug!("{} {path} -> {}", method.as_str(), response.status);
        Ok(self.client.parse_response(response))
    }

    fn send(&self, req: HttpRequest) -> Result<HttpResponse, PetFriendsError> {
        let HttpRequest {
            method,
            path,
            query,
            headers,
            body,
        } = req;

        let mut response = match method {
            HttpMethod::Get => decorate(self.agent.get(&path), &query, &headers).call()?,
            HttpMethod::Delete => decorate(self.agent.delete(&path), &query, &headers).call()?,
            HttpMethod::Post => {
                let builder = decorate(self.agent.post(&path), &query, &headers);
                match body {
                    Some(body) => builder.send(&body[..])?,
                    None => builder.send_empty()?,
                }
            }
            HttpMethod::Put => {
                let builder = decorate(self.agent.put(&path), &query, &headers);
                match body {
                    Some(body) => builder.send(&body[..])?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // Error pages are not always UTF-8; the status must survive either way.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn decorate<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(String, String)],
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in query {
        builder = builder.query(name, value);
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
