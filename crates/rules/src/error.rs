//! Local validation and domain-rule failures.

/// Errors raised by business rules before any network call is made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("channel username is required")]
    MissingHandle,

    #[error("channel username must start with @")]
    MissingAtPrefix,

    #[error("channel username too short")]
    HandleTooShort,

    #[error("channel username too long")]
    HandleTooLong,

    #[error("channel username contains invalid characters")]
    HandleInvalidCharacters,

    #[error("identity must be verified first")]
    NotVerified,

    #[error("a subscription is already published")]
    SubscriptionAlreadyPublished,

    #[error("payouts require a verified identity with earnings")]
    PayoutsUnavailable,

    #[error("minimum payout amount is {minimum}")]
    PayoutBelowMinimum { minimum: f64 },

    #[error("maximum payout amount is {maximum}")]
    PayoutAboveMaximum { maximum: f64 },

    #[error("payout amount cannot exceed earned amount")]
    PayoutExceedsEarnings,

    #[error("card number must contain 16 digits")]
    InvalidCardNumber,

    #[error("price must be greater than zero")]
    InvalidPrice,

    #[error("document image is empty: {0}")]
    EmptyDocument(&'static str),

    #[error("amount cannot be negative")]
    NegativeAmount,

    #[error("factor cannot be negative")]
    NegativeFactor,

    #[error("factor must be a finite number")]
    InvalidFactor,

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("invalid money format: {0}")]
    InvalidMoneyFormat(String),
}
