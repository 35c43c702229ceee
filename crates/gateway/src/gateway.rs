//! The gateway contract consumed by the use-case layer and the linking
//! coordinator.

use std::future::Future;
use std::pin::Pin;

use tribute_protocol::messages::{
    AddBotResponse, CheckChannelResponse, CreateSubscribeRequest, CreateUserResponse,
    MessageResponse, PublishSubscriptionRequest, PublishSubscriptionResponse,
    SetUpPayoutsRequest, UploadVerifiedPassportRequest,
};
use tribute_protocol::{Channel, DashboardSnapshot};

use crate::GatewayError;

/// Boxed future returned by every gateway call.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Abstract connection to the creator backend.
///
/// [`HttpGateway`](crate::HttpGateway) implements it over HTTP; tests supply
/// scripted implementations.
pub trait Gateway: Send + Sync {
    fn health_check(&self) -> GatewayFuture<'_, serde_json::Value>;

    /// Fails with [`GatewayError::NotFound`] when the identity is not onboarded.
    fn get_dashboard(&self) -> GatewayFuture<'_, DashboardSnapshot>;

    fn create_user(&self) -> GatewayFuture<'_, CreateUserResponse>;

    fn add_bot(&self, channel_username: &str) -> GatewayFuture<'_, AddBotResponse>;

    fn list_channels(&self) -> GatewayFuture<'_, Vec<Channel>>;

    fn check_channel(&self, channel_id: &str) -> GatewayFuture<'_, CheckChannelResponse>;

    fn publish_subscription(
        &self,
        request: &PublishSubscriptionRequest,
    ) -> GatewayFuture<'_, PublishSubscriptionResponse>;

    fn create_subscribe(&self, request: &CreateSubscribeRequest)
    -> GatewayFuture<'_, MessageResponse>;

    fn set_up_payouts(&self, request: &SetUpPayoutsRequest) -> GatewayFuture<'_, MessageResponse>;

    fn upload_verified_passport(
        &self,
        request: &UploadVerifiedPassportRequest,
    ) -> GatewayFuture<'_, MessageResponse>;
}
