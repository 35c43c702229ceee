/// Production gateway base URL.
pub const DEFAULT_BASE_URL: &str = "https://gateway.statgram.org/api/v1";

/// Scheme used in the `Authorization` header, followed by the host init data.
pub const AUTH_SCHEME: &str = "TgAuth";

/// Backend endpoints, relative to the base URL.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const DASHBOARD: &str = "/dashboard";
    pub const CREATE_USER: &str = "/create-user";
    pub const ADD_BOT: &str = "/add-bot";
    pub const CHANNEL_LIST: &str = "/channel-list";
    pub const CHECK_CHANNEL: &str = "/check-channel";
    pub const PUBLISH_SUBSCRIPTION: &str = "/publish-subscription";
    pub const CREATE_SUBSCRIBE: &str = "/create-subscribe";
    pub const SET_UP_PAYOUTS: &str = "/set-up-payouts";
    pub const UPLOAD_VERIFIED_PASSPORT: &str = "/upload-verified-passport";
}
