use serde::{Deserialize, Deserializer, Serialize};

/// Read model returned by `GET /dashboard` for an onboarded identity.
///
/// Received wholesale and never patched locally; a newer snapshot replaces
/// the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(rename = "earn", default)]
    pub earnings: f64,
    #[serde(rename = "is-verified", default)]
    pub is_verified: bool,
    #[serde(rename = "is-sub-published", default)]
    pub is_subscription_published: bool,
    #[serde(rename = "channels-and-groups", default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(rename = "payments-history", default)]
    pub payment_history: Vec<Payment>,
}

/// A channel or group the agent has been added to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "channel_username", default)]
    pub handle: String,
    #[serde(rename = "is_verified", default)]
    pub verified: bool,
}

/// A published paid subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

/// One entry of the payment history.
///
/// Older backends omit `amount`; aggregations treat it as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub created_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Payment {
    /// Amount of this payment, zero when the backend did not report one.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }
}

/// Identity record returned by `POST /create-user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub earned: f64,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub is_sub_published: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// Accepts ids serialized either as JSON strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
