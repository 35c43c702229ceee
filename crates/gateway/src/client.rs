//! HTTP implementation of the [`Gateway`] contract.
//!
//! Async client using `reqwest`. Every request carries
//! `Authorization: TgAuth <init-data>` when the host provides init data.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tribute_protocol::constants::{DEFAULT_BASE_URL, endpoints};
use tribute_protocol::messages::{
    AddBotRequest, AddBotResponse, CheckChannelRequest, CheckChannelResponse,
    CreateSubscribeRequest, CreateUserResponse, ErrorResponse, MessageResponse,
    PublishSubscriptionRequest, PublishSubscriptionResponse, SetUpPayoutsRequest,
    UploadVerifiedPassportRequest,
};
use tribute_protocol::{Channel, DashboardSnapshot};

use crate::gateway::{Gateway, GatewayFuture};
use crate::host::{HostCapability, auth_header_value};
use crate::GatewayError;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway client for the creator backend.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    host: Arc<dyn HostCapability>,
}

impl HttpGateway {
    /// Creates a client against the production base URL.
    pub fn new(host: Arc<dyn HostCapability>) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GatewayError::network)?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            host,
        })
    }

    /// Points the client at another backend (staging, local mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and returns the raw status and body.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, Vec<u8>), GatewayError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self.http.request(method.clone(), &url);

        match auth_header_value(self.host.as_ref()) {
            Some(value) => {
                let value =
                    HeaderValue::from_str(&value).map_err(|_| GatewayError::InvalidAuthHeader)?;
                builder = builder.header(AUTHORIZATION, value);
            }
            None => debug!(endpoint, "no host init data, sending unauthenticated request"),
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, endpoint, "gateway request");
        let resp = builder.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "gateway request failed");
            GatewayError::network(e)
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(GatewayError::network)?;
        debug!(endpoint, status = status.as_u16(), len = bytes.len(), "gateway response");
        Ok((status, bytes.to_vec()))
    }

    /// Sends a request and decodes a JSON success body into `T`.
    async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, GatewayError> {
        let (status, bytes) = self.send(method, endpoint, body).await?;
        check_status(endpoint, status, &bytes)?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Maps non-2xx responses onto the error taxonomy.
///
/// A 404 from the dashboard endpoint means "not onboarded" and becomes
/// [`GatewayError::NotFound`]; every other non-2xx is a server error carrying
/// the server's text when the body has one.
fn check_status(endpoint: &str, status: StatusCode, body: &[u8]) -> Result<(), GatewayError> {
    if status.is_success() {
        return Ok(());
    }

    if status == StatusCode::NOT_FOUND && endpoint == endpoints::DASHBOARD {
        debug!("dashboard not found, identity needs onboarding");
        return Err(GatewayError::NotFound);
    }

    Err(GatewayError::Server {
        status: status.as_u16(),
        message: server_message(status, body),
    })
}

/// Extracts `error` (or `message`) from a JSON error body, falling back to a
/// status-derived message.
fn server_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.text().map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "HTTP error! status: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        })
}

impl Gateway for HttpGateway {
    fn health_check(&self) -> GatewayFuture<'_, serde_json::Value> {
        Box::pin(async move {
            let (status, bytes) = self.send::<()>(Method::GET, endpoints::HEALTH, None).await?;
            check_status(endpoints::HEALTH, status, &bytes)?;
            // Plain-text health bodies are reported as a JSON string.
            Ok(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        })
    }

    fn get_dashboard(&self) -> GatewayFuture<'_, DashboardSnapshot> {
        Box::pin(async move {
            self.request::<(), _>(Method::GET, endpoints::DASHBOARD, None)
                .await
        })
    }

    fn create_user(&self) -> GatewayFuture<'_, CreateUserResponse> {
        Box::pin(async move {
            self.request::<(), _>(Method::POST, endpoints::CREATE_USER, None)
                .await
        })
    }

    fn add_bot(&self, channel_username: &str) -> GatewayFuture<'_, AddBotResponse> {
        let req = AddBotRequest {
            channel_username: channel_username.to_string(),
        };
        Box::pin(async move {
            self.request(Method::POST, endpoints::ADD_BOT, Some(&req))
                .await
        })
    }

    fn list_channels(&self) -> GatewayFuture<'_, Vec<Channel>> {
        Box::pin(async move {
            self.request::<(), _>(Method::GET, endpoints::CHANNEL_LIST, None)
                .await
        })
    }

    fn check_channel(&self, channel_id: &str) -> GatewayFuture<'_, CheckChannelResponse> {
        let req = CheckChannelRequest {
            channel_id: channel_id.to_string(),
        };
        Box::pin(async move {
            self.request(Method::POST, endpoints::CHECK_CHANNEL, Some(&req))
                .await
        })
    }

    fn publish_subscription(
        &self,
        request: &PublishSubscriptionRequest,
    ) -> GatewayFuture<'_, PublishSubscriptionResponse> {
        let req = request.clone();
        Box::pin(async move {
            self.request(Method::POST, endpoints::PUBLISH_SUBSCRIPTION, Some(&req))
                .await
        })
    }

    fn create_subscribe(
        &self,
        request: &CreateSubscribeRequest,
    ) -> GatewayFuture<'_, MessageResponse> {
        let req = request.clone();
        Box::pin(async move {
            self.request(Method::POST, endpoints::CREATE_SUBSCRIBE, Some(&req))
                .await
        })
    }

    fn set_up_payouts(&self, request: &SetUpPayoutsRequest) -> GatewayFuture<'_, MessageResponse> {
        let req = request.clone();
        Box::pin(async move {
            self.request(Method::POST, endpoints::SET_UP_PAYOUTS, Some(&req))
                .await
        })
    }

    fn upload_verified_passport(
        &self,
        request: &UploadVerifiedPassportRequest,
    ) -> GatewayFuture<'_, MessageResponse> {
        let req = request.clone();
        Box::pin(async move {
            self.request(Method::POST, endpoints::UPLOAD_VERIFIED_PASSPORT, Some(&req))
                .await
        })
    }
}
