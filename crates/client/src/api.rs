//! Catalog API access.
//!
//! [`CatalogApi`] mirrors the server's `/api` endpoints one method per call.
//! [`HttpCatalogApi`] is the `reqwest` implementation; tests substitute an
//! in-process fake.

use std::time::Duration;

use async_trait::async_trait;
use jewelcase_core::catalog::{CatalogItem, CatalogItemInput, NewCatalogItem};
use jewelcase_core::types::DbId;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a successful image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Path to put in an item's `image` field (`./images/<filename>`).
    pub file_path: String,
    pub filename: String,
    pub originalname: String,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    count: usize,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Calls the admin panel and storefront make against the catalog server.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/jewelry`
    async fn list(&self) -> Result<Vec<CatalogItem>, ClientError>;

    /// `POST /api/jewelry`; the server assigns the id.
    async fn create(&self, item: &NewCatalogItem) -> Result<CatalogItem, ClientError>;

    /// `PUT /api/jewelry/{id}`
    async fn update(&self, id: DbId, item: &NewCatalogItem) -> Result<CatalogItem, ClientError>;

    /// `DELETE /api/jewelry/{id}`; returns the removed item.
    async fn delete(&self, id: DbId) -> Result<CatalogItem, ClientError>;

    /// `POST /api/save`; returns the number of stored items.
    async fn save_all(&self, items: &[CatalogItemInput]) -> Result<usize, ClientError>;

    /// `POST /api/upload`
    async fn upload_image(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ClientError>;

    /// `DELETE /api/images?path=...`
    async fn delete_image(&self, path: &str) -> Result<(), ClientError>;

    /// `POST /api/login`
    async fn login(&self, username: &str, password: &str) -> Result<(), ClientError>;
}

/// [`CatalogApi`] over HTTP.
#[derive(Clone)]
pub struct HttpCatalogApi {
    client: Client,
    /// Server origin without a trailing slash, e.g. `http://localhost:3000`.
    base_url: String,
}

impl HttpCatalogApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }
}

/// Turn a non-success response into [`ClientError::Status`], using the
/// server's `{"error": ...}` message when there is one.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check_status(response).await?.json().await?)
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list(&self) -> Result<Vec<CatalogItem>, ClientError> {
        let response = self.client.get(self.url("/jewelry")).send().await?;
        read_json(response).await
    }

    async fn create(&self, item: &NewCatalogItem) -> Result<CatalogItem, ClientError> {
        let response = self
            .client
            .post(self.url("/jewelry"))
            .json(item)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update(&self, id: DbId, item: &NewCatalogItem) -> Result<CatalogItem, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/jewelry/{id}")))
            .json(item)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete(&self, id: DbId) -> Result<CatalogItem, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/jewelry/{id}")))
            .send()
            .await?;
        read_json(response).await
    }

    async fn save_all(&self, items: &[CatalogItemInput]) -> Result<usize, ClientError> {
        let response = self
            .client
            .post(self.url("/save"))
            .json(items)
            .send()
            .await?;
        let saved: SaveResponse = read_json(response).await?;
        Ok(saved.count)
    }

    async fn upload_image(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ClientError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_image(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url("/images"))
            .query(&[("path", path)])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
