use std::time::Duration;

use reqwest::Response;
use stockroom_core::{Item, ItemId, NewItem, RemoteClient};
use tracing::{debug, instrument};

use crate::error::HttpError;
use crate::wire::{DraftBody, ItemBody, RemoteItem};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the remote `/items` collection.
///
/// Requests fail after the configured timeout; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    items_url: String,
}

impl HttpRemote {
    /// Creates a client for the collection under `base_url` with the default timeout.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, HttpError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            http,
            items_url: format!("{}/items", base_url.as_ref().trim_end_matches('/')),
        })
    }

    /// URL of the collection resource.
    pub fn items_url(&self) -> &str {
        &self.items_url
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/{}", self.items_url, id)
    }

    /// Returns true if the remote answers at all, whatever the status.
    pub async fn ping(&self) -> bool {
        self.http.get(&self.items_url).send().await.is_ok()
    }

    async fn decode(response: Response) -> Result<Item, HttpError> {
        let item: RemoteItem = check(response)
            .await?
            .json()
            .await
            .map_err(HttpError::Decode)?;
        Ok(item.into())
    }
}

/// Turns a non-2xx response into `HttpError::Status`.
async fn check(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        message
    };

    Err(HttpError::Status {
        status: status.as_u16(),
        message,
    })
}

impl RemoteClient for HttpRemote {
    type Error = HttpError;

    #[instrument(skip(self), fields(url = %self.items_url))]
    async fn fetch_all(&self) -> Result<Vec<Item>, Self::Error> {
        let response = self
            .http
            .get(&self.items_url)
            .send()
            .await
            .map_err(HttpError::Unreachable)?;

        let items: Vec<RemoteItem> = check(response)
            .await?
            .json()
            .await
            .map_err(HttpError::Decode)?;

        debug!(count = items.len(), "fetched remote items");
        Ok(items.into_iter().map(Item::from).collect())
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn create(&self, item: &NewItem) -> Result<Item, Self::Error> {
        let response = self
            .http
            .post(&self.items_url)
            .json(&DraftBody::from(item))
            .send()
            .await
            .map_err(HttpError::Unreachable)?;

        let created = Self::decode(response).await?;
        debug!(id = created.id, "remote assigned id");
        Ok(created)
    }

    #[instrument(skip(self, item), fields(id = item.id))]
    async fn update(&self, item: &Item) -> Result<Item, Self::Error> {
        let response = self
            .http
            .put(self.item_url(item.id))
            .json(&ItemBody::from(item))
            .send()
            .await
            .map_err(HttpError::Unreachable)?;

        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: ItemId) -> Result<bool, Self::Error> {
        let response = self
            .http
            .get(self.item_url(id))
            .send()
            .await
            .map_err(HttpError::Unreachable)?;

        let found = response.status().is_success();
        debug!(found, status = response.status().as_u16(), "existence probe");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ItemId) -> Result<(), Self::Error> {
        let response = self
            .http
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(HttpError::Unreachable)?;

        check(response).await?;
        Ok(())
    }
}
