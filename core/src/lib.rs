//! Client core for the PetFriends pet-management API.
//!
//! # Overview
//! Builds `HttpRequest` values and decodes `HttpResponse` values without
//! touching the network (host-does-IO pattern), plus a blocking `PetFriends`
//! facade that executes them over `ureq`. Every operation returns the status
//! code and the body as sent; 4xx/5xx are results, not errors.
//!
//! # Design
//! - `PetFriendsClient` is stateless; it holds only `base_url`.
//! - Each operation has a `build_*` method; every response goes through
//!   `parse_response`, which tags the body as JSON or raw text.
//! - DTOs are defined independently from the mock-server crate; the
//!   scenario suite catches schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use client::PetFriendsClient;
pub use config::Settings;
pub use error::PetFriendsError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{ApiResponse, ResponseBody};
pub use transport::PetFriends;
pub use types::{ApiKey, AuthKey, NewPet, Pet, PetFilter, PetList, PhotoUpload};
