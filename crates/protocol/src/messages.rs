use serde::{Deserialize, Serialize};

use crate::types::{Channel, Subscription, UserRecord};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Asks the backend to attach the agent to a channel by handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBotRequest {
    #[serde(rename = "channel-username")]
    pub channel_username: String,
}

/// Asks the backend to re-derive ownership of a listed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckChannelRequest {
    pub channel_id: String,
}

/// Publishes a paid subscription offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishSubscriptionRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "button-text")]
    pub button_text: String,
    pub access_token: String,
}

/// Subscribes a user to a creator at the given price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubscribeRequest {
    pub user_id: i64,
    pub price: f64,
}

/// Registers a payout card.
///
/// Only the card number is mandatory; the remaining fields are sent when
/// the caller has them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetUpPayoutsRequest {
    #[serde(rename = "card-number")]
    pub card_number: String,
    #[serde(rename = "card-date", default, skip_serializing_if = "Option::is_none")]
    pub card_date: Option<String>,
    #[serde(rename = "card-cvv", default, skip_serializing_if = "Option::is_none")]
    pub card_cvv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Identity documents for verification, base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadVerifiedPassportRequest {
    #[serde(rename = "user-photo")]
    pub user_photo: String,
    #[serde(rename = "user-passport")]
    pub user_passport: String,
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response to `POST /create-user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    #[serde(default)]
    pub message: String,
    pub user: UserRecord,
    #[serde(default)]
    pub created: bool,
}

/// Response to `POST /add-bot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddBotResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

/// Response to `POST /check-channel`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckChannelResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
}

/// Response to `POST /publish-subscription`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishSubscriptionResponse {
    #[serde(default)]
    pub message: String,
    pub subscription: Subscription,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body sent with non-2xx responses.
///
/// Most endpoints use `error`; some send `message` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// The user-facing text, preferring `error` over `message`.
    pub fn text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
