//! reqwest implementation of [`StorefrontApi`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{StorefrontApi, endpoints};
use crate::error::Result;
use crate::models::{ApiConfig, ListingsRequest, PaymentRequest};
use crate::utils::http::{create_client, endpoint, read_json};

/// HTTP backend talking to the real storefront API.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Create a backend from API settings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = create_client(config)?;
        Self::with_client(client, &config.base_url)
    }

    /// Create a backend with a pre-built client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    async fn get(&self, label: &str, segments: &[&str], token: Option<&str>) -> Result<Value> {
        let url = endpoint(&self.base_url, segments)?;
        log::debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read_json(label, request.send().await?).await
    }

    async fn post<B: serde::Serialize + ?Sized + Sync>(
        &self,
        label: &str,
        segments: &[&str],
        token: Option<&str>,
        body: &B,
    ) -> Result<Value> {
        let url = endpoint(&self.base_url, segments)?;
        log::debug!("POST {}", url);
        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read_json(label, request.send().await?).await
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn categories(&self) -> Result<Value> {
        self.get(endpoints::CATEGORIES, &["categories"], None).await
    }

    async fn listings(&self, request: &ListingsRequest) -> Result<Value> {
        self.post(endpoints::LISTINGS, &["listings"], None, request).await
    }

    async fn search(&self, keyword: &str) -> Result<Value> {
        let mut url = endpoint(&self.base_url, &["search"])?;
        url.query_pairs_mut().append_pair("keyword", keyword);
        log::debug!("GET {}", url);
        read_json(endpoints::SEARCH, self.client.get(url).send().await?).await
    }

    async fn address(&self, token: &str, user_id: &str) -> Result<Value> {
        self.get(endpoints::ADDRESS, &["users", user_id, "address"], Some(token))
            .await
    }

    async fn create_payment(&self, token: &str, request: &PaymentRequest) -> Result<Value> {
        self.post(
            endpoints::CREATE_PAYMENT,
            &["payments", "create-payment"],
            Some(token),
            request,
        )
        .await
    }

    async fn confirm_payment(&self, token: &str, reference: &str) -> Result<Value> {
        self.post(
            endpoints::CONFIRM_PAYMENT,
            &["payments", "success", reference],
            Some(token),
            &serde_json::json!({}),
        )
        .await
    }

    async fn user_orders(&self, token: &str, user_id: &str) -> Result<Value> {
        self.get(endpoints::USER_ORDERS, &["orders", "user", user_id], Some(token))
            .await
    }

    async fn order(&self, token: &str, order_id: &str) -> Result<Value> {
        self.get(endpoints::ORDER, &["orders", order_id], Some(token))
            .await
    }
}
