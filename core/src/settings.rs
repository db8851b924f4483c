//! Injected configuration: service URL, account credentials and media paths.

use std::env;
use std::path::PathBuf;

use dotenv::dotenv;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ApiError;

pub const BASE_URL_VAR: &str = "PETFRIENDS_BASE_URL";
pub const EMAIL_VAR: &str = "PETFRIENDS_EMAIL";
pub const PASSWORD_VAR: &str = "PETFRIENDS_PASSWORD";
pub const MEDIA_DIR_VAR: &str = "PETFRIENDS_MEDIA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub media_dir: PathBuf,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ApiError::Config(format!("{name} environment variable must be set")))
        };
        Ok(Self {
            base_url: lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            email: required(EMAIL_VAR)?,
            password: required(PASSWORD_VAR)?,
            media_dir: lookup(MEDIA_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
        })
    }

    /// Path of a media file inside `media_dir`.
    pub fn photo(&self, file_name: &str) -> PathBuf {
        self.media_dir.join(file_name)
    }
}
