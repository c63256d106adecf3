//! Farmer and produce registry client
//!
//! Thin HTTP adapter over the Agrikart backend. Every failure is classified
//! into a [`RegistryError`] so the dialogue can decide between retrying and
//! re-prompting.

mod error;

pub use error::RegistryError;

use crate::runtime::FarmerRegistry;
use crate::state_machine::{AuthToken, ListingRequest, Registration};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    #[serde(default)]
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: Option<String>,
}

/// HTTP client for the registry backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into a classified error
    async fn ensure_success(response: Response) -> Result<Response, RegistryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RegistryError::from_status(status, &body))
    }
}

#[async_trait]
impl FarmerRegistry for BackendClient {
    async fn farmer_exists(&self, phone: &str) -> Result<bool, RegistryError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/farmer/check/{phone}/")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let body: ExistsResponse = Self::ensure_success(response).await?.json().await?;
        Ok(body.exists)
    }

    async fn register(&self, registration: &Registration) -> Result<(), RegistryError> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/signup/farmer/"))
            .json(&json!({
                "name": registration.name,
                "phone": registration.phone,
                "address": registration.address,
                "state": registration.region,
                "pincode": registration.pincode,
                "password": registration.password,
            }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn login(&self, phone: &str, password: &str) -> Result<AuthToken, RegistryError> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/token/"))
            .json(&json!({ "phone": phone, "password": password }))
            .send()
            .await?;
        let body: TokenResponse = Self::ensure_success(response).await?.json().await?;
        body.access
            .filter(|t| !t.is_empty())
            .map(AuthToken::new)
            .ok_or_else(|| RegistryError::malformed("token response has no access token"))
    }

    async fn submit_listing(
        &self,
        token: &AuthToken,
        listing: &ListingRequest,
    ) -> Result<(), RegistryError> {
        let response = self
            .http
            .post(self.url("/api/v1/produce/"))
            .bearer_auth(token.expose())
            .json(&json!({
                "name": listing.crop_name,
                "price": listing.price_per_kg,
                "quantity": listing.quantity_kg,
                "category": listing.category,
            }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
