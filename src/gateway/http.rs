//! HTTP client for the catalog cart endpoints.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, Request, RequestBuilder, Response};
use tracing::{debug, instrument};

use crate::{
    cart::{CartLineId, checkout::StatusUpdate},
    gateway::{CartGateway, CartPage, CartQuery, Envelope, GatewayError},
    storage::{KeyValueStore, TOKEN_KEY},
};

/// [`CartGateway`] backed by the catalog REST API.
///
/// Every request carries `Authorization: Bearer <token>` when a token is present in the store.
#[derive(Debug)]
pub struct HttpCartGateway<S> {
    base_url: String,
    http: Client,
    store: Arc<S>,
}

impl<S: KeyValueStore> HttpCartGateway<S> {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<S>,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http,
            store,
        })
    }

    /// The API root every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);

        match self.store.get(TOKEN_KEY).await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => {
                debug!("no auth token stored; sending unauthenticated request");

                Ok(builder)
            }
        }
    }

    pub(crate) async fn search_request(&self, query: &CartQuery) -> Result<Request, GatewayError> {
        Ok(self
            .authorized(Method::POST, "/cart/search")
            .await?
            .json(query)
            .build()?)
    }

    pub(crate) async fn update_status_request(
        &self,
        update: &StatusUpdate,
    ) -> Result<Request, GatewayError> {
        Ok(self
            .authorized(Method::PUT, "/cart/update-status")
            .await?
            .json(update)
            .build()?)
    }

    pub(crate) async fn delete_request(&self, id: &CartLineId) -> Result<Request, GatewayError> {
        Ok(self
            .authorized(Method::DELETE, &format!("/cart/{id}"))
            .await?
            .build()?)
    }

    async fn send(&self, request: Request, action: &str) -> Result<Response, GatewayError> {
        let response = self.http.execute(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "{action} request failed with status {status}: {text}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl<S: KeyValueStore> CartGateway for HttpCartGateway<S> {
    #[instrument(skip(self), fields(page = query.page_info.page_num))]
    async fn fetch_cart_lines(&self, query: &CartQuery) -> Result<CartPage, GatewayError> {
        let request = self.search_request(query).await?;
        let response = self.send(request, "cart search").await?;
        let envelope: Envelope<CartPage> = response.json().await?;

        debug!(
            records = envelope.data.page_data.len(),
            "fetched cart lines"
        );

        Ok(envelope.data)
    }

    #[instrument(skip_all, fields(status = %update.status, lines = update.len()))]
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), GatewayError> {
        let request = self.update_status_request(update).await?;

        self.send(request, "status update").await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_cart_line(&self, id: &CartLineId) -> Result<(), GatewayError> {
        let request = self.delete_request(id).await?;

        self.send(request, "cart line delete").await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        cart::{CartLineStatus, checkout::CheckoutEntry},
        storage::{MemoryStore, MockKeyValueStore, StorageError},
    };

    use super::*;

    fn gateway(store: MemoryStore) -> Result<HttpCartGateway<MemoryStore>, GatewayError> {
        HttpCartGateway::new(
            "http://catalog.test/api/",
            Duration::from_secs(10),
            Arc::new(store),
        )
    }

    fn json_body(request: &Request) -> Result<Value, serde_json::Error> {
        let bytes = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .unwrap_or_default();

        serde_json::from_slice(bytes)
    }

    #[tokio::test]
    async fn search_request_posts_query_with_bearer_token() -> TestResult {
        let gateway = gateway(MemoryStore::with_entries([(TOKEN_KEY, "secret")]))?;

        let request = gateway.search_request(&CartQuery::active(10)).await?;

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "http://catalog.test/api/cart/search");
        assert_eq!(
            request
                .headers()
                .get(AUTHORIZATION)
                .map(|value| value.to_str())
                .transpose()?,
            Some("Bearer secret")
        );
        assert_eq!(
            json_body(&request)?,
            json!({
                "searchCondition": { "product_id": "", "status": "new", "is_deleted": false },
                "pageInfo": { "pageNum": 1, "pageSize": 10 },
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_token_sends_no_authorization_header() -> TestResult {
        let gateway = gateway(MemoryStore::new())?;

        let request = gateway.search_request(&CartQuery::active(5)).await?;

        assert!(request.headers().get(AUTHORIZATION).is_none());

        Ok(())
    }

    #[tokio::test]
    async fn update_status_request_puts_batch() -> TestResult {
        let gateway = gateway(MemoryStore::with_entries([(TOKEN_KEY, "secret")]))?;
        let update = StatusUpdate {
            status: CartLineStatus::WaitingPaid,
            items: vec![CheckoutEntry {
                cart_line_id: CartLineId::new("a"),
                cart_no: "CN-1".to_string(),
            }],
        };

        let request = gateway.update_status_request(&update).await?;

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(
            request.url().as_str(),
            "http://catalog.test/api/cart/update-status"
        );
        assert_eq!(
            json_body(&request)?,
            json!({ "status": "waiting_paid", "items": [{ "_id": "a", "cart_no": "CN-1" }] })
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_request_targets_line_id() -> TestResult {
        let gateway = gateway(MemoryStore::new())?;

        let request = gateway.delete_request(&CartLineId::new("line-7")).await?;

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.url().as_str(), "http://catalog.test/api/cart/line-7");

        Ok(())
    }

    #[tokio::test]
    async fn token_read_failure_surfaces_as_storage_error() -> TestResult {
        let mut store = MockKeyValueStore::new();

        store
            .expect_get()
            .withf(|key| key == TOKEN_KEY)
            .returning(|key| Err(StorageError::InvalidKey(key.to_string())));

        let gateway = HttpCartGateway::new(
            "http://catalog.test/api",
            Duration::from_secs(1),
            Arc::new(store),
        )?;

        let result = gateway.search_request(&CartQuery::active(10)).await;

        assert!(matches!(result, Err(GatewayError::Storage(_))));

        Ok(())
    }
}
