//! Blocking API client for the PetFriends pet-management service.
//!
//! # Overview
//! `PetFriendsClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). `PetFriends`
//! wraps it with a `Transport` and exposes one blocking method per endpoint.
//!
//! # Design
//! - Every operation returns an `ApiResponse` (`status`, `body`). The body is
//!   parsed JSON only for a 200 response declared as `application/json`;
//!   otherwise it is the raw text. HTTP errors are never `Err`.
//! - `AuthKey` is checked once, where it is obtained, and then passed as an
//!   opaque header value.
//! - Pet fields are passed through unvalidated; the server decides.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod settings;
pub mod transport;
pub mod types;

pub use api::PetFriends;
pub use client::{PetFriendsClient, DEFAULT_BASE_URL, MY_PETS};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use settings::Settings;
pub use transport::{Transport, UreqTransport};
pub use types::{ApiBody, ApiResponse, AuthKey, Pet, PetFields, PetList, Photo};
