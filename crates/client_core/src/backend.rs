use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{product_path, DeleteProductResponse, PRODUCTS_PATH},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientSettings;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend rejected request to {url} with status {status}")]
    Rejected {
        url: String,
        status: u16,
        code: ErrorCode,
        detail: Option<String>,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    /// Human-readable explanation supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// The REST collaborator the inventory controller talks to.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;
    async fn create_product(&self, product: &Product) -> Result<Product, BackendError>;
    async fn update_product(
        &self,
        id: ProductId,
        product: &Product,
    ) -> Result<Product, BackendError>;
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;
}

pub struct HttpInventoryBackend {
    http: Client,
    base_url: Url,
}

impl HttpInventoryBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| BackendError::Transport {
            url: settings.api_base_url.clone(),
            source,
        })?;
        Self::with_client(http, &settings.api_base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, BackendError> {
        // Url::join replaces the last segment unless the base ends with '/'.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|source| BackendError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|source| BackendError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Any body that is not the documented error shape degrades to "no detail".
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiError>(&body)
            .ok()
            .and_then(|err| err.message().map(str::to_string));
        warn!(
            "backend rejected {url}: status={} detail={detail:?}",
            status.as_u16()
        );
        Err(BackendError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            code: ErrorCode::from_status(status.as_u16()),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, BackendError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| BackendError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl InventoryBackend for HttpInventoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        let response = self.send(&url, self.http.get(url.clone())).await?;
        let products: Vec<Product> = Self::decode(&url, response).await?;
        debug!("listed {} products from {url}", products.len());
        Ok(products)
    }

    async fn create_product(&self, product: &Product) -> Result<Product, BackendError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        let response = self
            .send(&url, self.http.post(url.clone()).json(product))
            .await?;
        Self::decode(&url, response).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &Product,
    ) -> Result<Product, BackendError> {
        let url = self.endpoint(&product_path(id))?;
        let response = self
            .send(&url, self.http.put(url.clone()).json(product))
            .await?;
        Self::decode(&url, response).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let url = self.endpoint(&product_path(id))?;
        let response = self.send(&url, self.http.delete(url.clone())).await?;
        // Any 2xx is a completed delete; the `{message}` body is informational only.
        let bytes = response.bytes().await.unwrap_or_default();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("deleted product {id}");
            return Ok(());
        }
        match serde_json::from_slice::<DeleteProductResponse>(&bytes) {
            Ok(body) => debug!("deleted product {id}: {}", body.message),
            Err(err) => debug!("deleted product {id}; unrecognised response body: {err}"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
