//! Blocking PetFriends client: one method per endpoint.
//!
//! Each call builds a request with `PetFriendsClient`, sends exactly one
//! request through the `Transport`, and returns the normalized
//! `ApiResponse`. Non-200 statuses are returned, never raised.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::PetFriendsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiResponse, AuthKey, PetFields, Photo};

#[derive(Debug, Clone, Default)]
pub struct PetFriends<T = UreqTransport> {
    client: PetFriendsClient,
    transport: T,
}

impl PetFriends<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_url)
    }
}

impl<T: Transport> PetFriends<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: PetFriendsClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &PetFriendsClient {
        &self.client
    }

    /// Request an auth key for the given account.
    pub fn get_token(&self, email: &str, password: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_token(email, password))
    }

    /// `get_token` followed by `AuthKey::from_response`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<AuthKey, ApiError> {
        let response = self.get_token(email, password)?;
        AuthKey::from_response(&response).inspect_err(|_| {
            warn!(status = response.status, "auth key request rejected");
        })
    }

    /// List pets; `filter` is `""` for all pets or `MY_PETS` for the caller's own.
    pub fn get_pet_list(&self, auth: &AuthKey, filter: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_pet_list(auth, filter))
    }

    /// Create a pet and upload its photo in one multipart request.
    ///
    /// Fails with `ApiError::Io` before anything is sent if the photo cannot
    /// be read.
    pub fn add_new_pet(
        &self,
        auth: &AuthKey,
        name: impl Into<Value>,
        animal_type: impl Into<Value>,
        age: impl Into<Value>,
        pet_photo: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(pet_photo)?;
        let fields = PetFields::new(name, animal_type, age);
        self.send(self.client.build_add_new_pet(auth, &fields, &photo))
    }

    pub fn add_new_pet_no_photo(
        &self,
        auth: &AuthKey,
        name: impl Into<Value>,
        animal_type: impl Into<Value>,
        age: impl Into<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let fields = PetFields::new(name, animal_type, age);
        self.send(self.client.build_add_new_pet_no_photo(auth, &fields)?)
    }

    /// Replace the photo of an existing pet.
    pub fn add_photo_pet(
        &self,
        auth: &AuthKey,
        pet_id: &str,
        pet_photo: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(pet_photo)?;
        self.send(self.client.build_add_photo_pet(auth, pet_id, &photo))
    }

    pub fn update_info_pet(
        &self,
        auth: &AuthKey,
        pet_id: &str,
        name: impl Into<Value>,
        animal_type: impl Into<Value>,
        age: impl Into<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let fields = PetFields::new(name, animal_type, age);
        self.send(self.client.build_update_info_pet(auth, pet_id, &fields))
    }

    /// Delete a pet. A successful delete usually carries an empty text body.
    pub fn delete_pet(&self, auth: &AuthKey, pet_id: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_delete_pet(auth, pet_id))
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(
            status = response.status,
            content_type = response.content_type(),
            "received response"
        );
        self.client.parse_response(response)
    }
}
