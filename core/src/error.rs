//! Error types for the PetFriends client.
//!
//! # Design
//! Non-2xx statuses are never errors here: they come back as ordinary
//! `ApiResponse` values. `PetFriendsError` covers only the failures that
//! abort a scenario: the transport gave up, a local file could not be read,
//! the configuration is incomplete, or a body was not the shape the caller
//! asked for.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetFriendsError {
    /// Connecting, sending, or reading the response failed.
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// The photo to upload could not be read from disk.
    #[error("failed to read photo {}: {source}", path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Structured data was requested from a response that carried raw text.
    #[error("HTTP {status} returned an unstructured body: {body}")]
    UnstructuredBody { status: u16, body: String },

    /// A JSON body did not deserialize into the requested type.
    #[error("response body did not match the expected shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required setting is absent from the environment.
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),
}
