// src/services/account.rs

//! Authenticated account calls: address, payments and orders.
//!
//! The bearer token is issued elsewhere and handed to [`Session`]. A 401 from
//! any call here expires the session; the caller is expected to send the user
//! back to the login view.

use std::future::Future;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{StorefrontApi, endpoints};
use crate::error::{AppError, Result};
use crate::models::{Address, Order, PaymentConfirmation, PaymentRequest, PaymentSession};
use crate::services::notify::{Notification, Notifier};

/// Token and user the session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

/// Authentication state for the current visitor.
#[derive(Debug, Default)]
pub struct Session {
    credentials: RwLock<Option<Credentials>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_in(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token, user_id);
        session
    }

    pub fn login(&self, token: impl Into<String>, user_id: impl Into<String>) {
        let credentials = Credentials {
            token: token.into(),
            user_id: user_id.into(),
        };
        match self.credentials.write() {
            Ok(mut slot) => *slot = Some(credentials),
            Err(poisoned) => *poisoned.into_inner() = Some(credentials),
        }
    }

    pub fn logout(&self) {
        match self.credentials.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match self.credentials.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }
}

/// Pick the payload under the first present key, else the payload itself.
fn unwrap_envelope<'a>(payload: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .filter_map(|k| payload.get(*k))
        .find(|v| !v.is_null())
        .unwrap_or(payload)
}

fn decode<T: DeserializeOwned>(endpoint: &str, payload: &Value, keys: &[&str]) -> Result<T> {
    serde_json::from_value(unwrap_envelope(payload, keys).clone())
        .map_err(|e| AppError::malformed(endpoint, e))
}

/// Service for authenticated account operations.
#[derive(Clone)]
pub struct AccountClient {
    api: Arc<dyn StorefrontApi>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl AccountClient {
    pub fn new(api: Arc<dyn StorefrontApi>, session: Arc<Session>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Run an authenticated call, expiring the session on 401.
    async fn authorized<F, Fut>(&self, context: &str, call: F) -> Result<Value>
    where
        F: FnOnce(Credentials) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let credentials = self
            .session
            .credentials()
            .ok_or_else(|| AppError::unauthorized("not logged in"))?;

        match call(credentials).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_unauthorized() => {
                log::warn!("{}: session expired ({})", context, e);
                self.session.logout();
                self.notifier.notify(Notification::error(e.user_message()));
                Err(AppError::unauthorized("session expired"))
            }
            Err(e) => {
                log::warn!("{}: {}", context, e);
                self.notifier
                    .notify(Notification::error(format!("{}. {}", context, e.user_message())));
                Err(e)
            }
        }
    }

    /// Saved shipping address, `None` if the user has not stored one.
    pub async fn address(&self) -> Result<Option<Address>> {
        let api = &self.api;
        let payload = self
            .authorized("Could not load your address", |c| async move {
                match api.address(&c.token, &c.user_id).await {
                    Err(AppError::Status { status: 404, .. }) => Ok(Value::Null),
                    other => other,
                }
            })
            .await?;

        match unwrap_envelope(&payload, &["address", "data"]) {
            Value::Null => Ok(None),
            address => decode(endpoints::ADDRESS, address, &[]).map(Some),
        }
    }

    /// Start a payment with the upstream provider.
    pub async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentSession> {
        let api = &self.api;
        let payload = self
            .authorized("Could not start payment", |c| async move {
                api.create_payment(&c.token, request).await
            })
            .await?;
        let session: PaymentSession = decode(endpoints::CREATE_PAYMENT, &payload, &["payment", "data"])?;
        if session.reference.trim().is_empty() {
            return Err(AppError::malformed(endpoints::CREATE_PAYMENT, "missing payment reference"));
        }
        Ok(session)
    }

    /// Tell the upstream the provider reported success for `reference`.
    pub async fn confirm_payment(&self, reference: &str) -> Result<PaymentConfirmation> {
        let api = &self.api;
        let payload = self
            .authorized("Could not confirm payment", |c| async move {
                api.confirm_payment(&c.token, reference).await
            })
            .await?;
        decode(endpoints::CONFIRM_PAYMENT, &payload, &[])
    }

    /// Orders placed by the logged-in user, newest first.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let api = &self.api;
        let payload = self
            .authorized("Could not load your orders", |c| async move {
                api.user_orders(&c.token, &c.user_id).await
            })
            .await?;
        let mut orders: Vec<Order> = decode(endpoints::USER_ORDERS, &payload, &["orders", "data"])?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// A single order for tracking.
    pub async fn order(&self, order_id: &str) -> Result<Order> {
        let api = &self.api;
        let payload = self
            .authorized("Could not load this order", |c| async move {
                api.order(&c.token, order_id).await
            })
            .await?;
        decode(endpoints::ORDER, &payload, &["order", "data"])
    }
}
