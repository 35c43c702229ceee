//! Creator use cases over an abstract [`Gateway`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, info, warn};

use tribute_gateway::{Gateway, GatewayError};
use tribute_protocol::messages::{
    AddBotResponse, CheckChannelResponse, CreateSubscribeRequest, CreateUserResponse,
    MessageResponse, PublishSubscriptionRequest, PublishSubscriptionResponse,
    SetUpPayoutsRequest, UploadVerifiedPassportRequest,
};
use tribute_protocol::{Channel, DashboardSnapshot};
use tribute_rules::identity::{self, IdentityFacts};
use tribute_rules::{RuleError, payout, validate_channel_username};

use crate::UseCaseError;

/// Outcome of fetching the dashboard.
///
/// "Not onboarded" is an expected answer, not a failure, so it gets its own
/// variant instead of hiding inside the error.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardFetch {
    Ready(DashboardSnapshot),
    NotFound,
    Failed(GatewayError),
}

/// Entry point for every creator operation.
#[derive(Clone)]
pub struct CreatorUseCases {
    gateway: Arc<dyn Gateway>,
}

impl CreatorUseCases {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub async fn get_dashboard(&self) -> DashboardFetch {
        match self.gateway.get_dashboard().await {
            Ok(snapshot) => DashboardFetch::Ready(snapshot),
            Err(GatewayError::NotFound) => DashboardFetch::NotFound,
            Err(e) => {
                warn!(error = %e, "dashboard fetch failed");
                DashboardFetch::Failed(e)
            }
        }
    }

    /// Creates the backend user for the current identity.
    pub async fn onboard(&self) -> Result<CreateUserResponse, UseCaseError> {
        let resp = self.gateway.create_user().await?;
        info!(user_id = resp.user.id, created = resp.created, "user onboarded");
        Ok(resp)
    }

    /// Asks the backend to add the agent to `channel_username`.
    ///
    /// The handle is validated locally first; an invalid handle never
    /// reaches the gateway.
    pub async fn add_agent_to_channel(
        &self,
        channel_username: &str,
    ) -> Result<AddBotResponse, UseCaseError> {
        let handle = channel_username.trim();
        validate_channel_username(handle)?;
        let resp = self.gateway.add_bot(handle).await?;
        info!(channel = handle, "agent add requested");
        Ok(resp)
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>, UseCaseError> {
        Ok(self.gateway.list_channels().await?)
    }

    /// Asks the backend to verify ownership of a listed channel.
    pub async fn check_channel(&self, channel_id: &str) -> Result<CheckChannelResponse, UseCaseError> {
        let resp = self.gateway.check_channel(channel_id).await?;
        debug!(channel_id, status = ?resp.status, "channel checked");
        Ok(resp)
    }

    /// Publishes the creator's subscription offer.
    ///
    /// Requires a verified identity without a published subscription and a
    /// positive price.
    pub async fn publish_subscription(
        &self,
        identity: &(impl IdentityFacts + Sync),
        request: &PublishSubscriptionRequest,
    ) -> Result<PublishSubscriptionResponse, UseCaseError> {
        identity::check_can_publish_subscription(identity)?;
        check_price(request.price)?;
        let resp = self.gateway.publish_subscription(request).await?;
        info!(subscription = %resp.subscription.id, "subscription published");
        Ok(resp)
    }

    pub async fn create_subscribe(
        &self,
        user_id: i64,
        price: f64,
    ) -> Result<MessageResponse, UseCaseError> {
        check_price(price)?;
        let req = CreateSubscribeRequest { user_id, price };
        Ok(self.gateway.create_subscribe(&req).await?)
    }

    /// Registers a payout card.
    ///
    /// The card number is normalized (whitespace stripped) before sending.
    /// Payouts need a verified identity with positive earnings.
    pub async fn set_up_payouts(
        &self,
        identity: &(impl IdentityFacts + Sync),
        mut request: SetUpPayoutsRequest,
    ) -> Result<MessageResponse, UseCaseError> {
        request.card_number = payout::validate_card_number(&request.card_number)?;
        identity::check_can_set_up_payouts(identity)?;
        let resp = self.gateway.set_up_payouts(&request).await?;
        info!("payout card registered");
        Ok(resp)
    }

    /// Uploads a selfie and a passport scan for identity verification.
    pub async fn upload_verified_passport(
        &self,
        user_photo: &[u8],
        user_passport: &[u8],
        access_token: &str,
    ) -> Result<MessageResponse, UseCaseError> {
        if user_photo.is_empty() {
            return Err(RuleError::EmptyDocument("user photo").into());
        }
        if user_passport.is_empty() {
            return Err(RuleError::EmptyDocument("passport").into());
        }

        let req = UploadVerifiedPassportRequest {
            user_photo: BASE64.encode(user_photo),
            user_passport: BASE64.encode(user_passport),
            access_token: access_token.to_string(),
        };
        let resp = self.gateway.upload_verified_passport(&req).await?;
        info!(
            photo_bytes = user_photo.len(),
            passport_bytes = user_passport.len(),
            "verification documents uploaded"
        );
        Ok(resp)
    }

    pub async fn health(&self) -> Result<serde_json::Value, UseCaseError> {
        Ok(self.gateway.health_check().await?)
    }
}

fn check_price(price: f64) -> Result<(), RuleError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(RuleError::InvalidPrice)
    }
}
