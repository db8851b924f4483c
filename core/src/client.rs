//! Stateless HTTP request builder and response parser for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each endpoint has a `build_*` method that produces an
//! `HttpRequest`; every response goes through the single `parse_response`
//! rule, so the `(status, body)` contract is identical for all endpoints.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::{encode_component, form_urlencode, Multipart};
use crate::types::{ApiBody, ApiResponse, AuthKey, PetFields, Photo};

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

/// Filter value selecting only the caller's own pets.
pub const MY_PETS: &str = "my_pets";

const ACCEPT_JSON: (&str, &str) = ("accept", "application/json");

/// Request builder for the PetFriends REST API.
#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl Default for PetFriendsClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
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

    /// `GET /api/key` with the credentials in the `email` / `password` headers.
    pub fn build_get_token(&self, email: &str, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/key", self.base_url),
            headers: vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
                header(ACCEPT_JSON),
            ],
            body: None,
        }
    }

    /// `GET /api/pets?filter=...`. The filter is sent verbatim, including `""`.
    pub fn build_get_pet_list(&self, auth: &AuthKey, filter: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/pets?{}", self.base_url, form_urlencode(&[("filter", filter)])),
            headers: auth_headers(auth),
            body: None,
        }
    }

    /// Multipart `POST /api/pets` with the pet fields and a `pet_photo` file part.
    pub fn build_add_new_pet(&self, auth: &AuthKey, fields: &PetFields, photo: &Photo) -> HttpRequest {
        let mut form = Multipart::new();
        for (name, value) in fields.form_pairs() {
            form.text(name, &value);
        }
        form.file("pet_photo", photo);
        self.multipart_request(auth, format!("{}/api/pets", self.base_url), form)
    }

    /// JSON `POST /api/create_pet_simple`.
    pub fn build_add_new_pet_no_photo(&self, auth: &AuthKey, fields: &PetFields) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(fields)?;
        let mut headers = auth_headers(auth);
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/api/create_pet_simple", self.base_url),
            headers,
            body: Some(body),
        })
    }

    /// Multipart `POST /api/pets/set_photo/{pet_id}` carrying only the photo.
    pub fn build_add_photo_pet(&self, auth: &AuthKey, pet_id: &str, photo: &Photo) -> HttpRequest {
        let mut form = Multipart::new();
        form.file("pet_photo", photo);
        let url = format!("{}/api/pets/set_photo/{}", self.base_url, encode_component(pet_id));
        self.multipart_request(auth, url, form)
    }

    /// Form-encoded `PUT /api/pets/{pet_id}`. `null` fields are left out.
    pub fn build_update_info_pet(&self, auth: &AuthKey, pet_id: &str, fields: &PetFields) -> HttpRequest {
        let mut headers = auth_headers(auth);
        headers.push((
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        HttpRequest {
            method: HttpMethod::Put,
            url: self.pet_url(pet_id),
            headers,
            body: Some(form_urlencode(&fields.form_pairs()).into_bytes()),
        }
    }

    pub fn build_delete_pet(&self, auth: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.pet_url(pet_id),
            headers: auth_headers(auth),
            body: None,
        }
    }

    /// Normalize any response into `(status, body)`.
    ///
    /// The body is parsed as JSON only when the status is 200 and the
    /// declared content type contains `application/json`; otherwise the raw
    /// text is kept. A 200 JSON response that fails to parse is an error.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        let body = if response.status == 200 && response.content_type().contains("application/json") {
            let value: Value = serde_json::from_str(&response.body)
                .map_err(|e| ApiError::Deserialization(e.to_string()))?;
            ApiBody::Json(value)
        } else {
            ApiBody::Text(response.body)
        };
        Ok(ApiResponse {
            status: response.status,
            body,
        })
    }

    fn pet_url(&self, pet_id: &str) -> String {
        format!("{}/api/pets/{}", self.base_url, encode_component(pet_id))
    }

    fn multipart_request(&self, auth: &AuthKey, url: String, form: Multipart) -> HttpRequest {
        let (content_type, body) = form.finish();
        let mut headers = auth_headers(auth);
        headers.push(("content-type".to_string(), content_type));
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers,
            body: Some(body),
        }
    }
}

fn header((name, value): (&str, &str)) -> (String, String) {
    (name.to_string(), value.to_string())
}

fn auth_headers(auth: &AuthKey) -> Vec<(String, String)> {
    vec![header(ACCEPT_JSON), ("auth_key".to_string(), auth.key.clone())]
}
