//! Payout bounds, fees and card checks.

use crate::RuleError;

/// Smallest payout a creator can request, in currency units.
pub const MIN_PAYOUT: f64 = 10.0;

/// Largest single payout, in currency units.
pub const MAX_PAYOUT: f64 = 10_000.0;

/// Fee withheld from every payout (2.5 %).
pub const PAYOUT_FEE_RATE: f64 = 0.025;

/// Digits in a payout card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

pub fn fee(amount: f64) -> f64 {
    amount * PAYOUT_FEE_RATE
}

pub fn net_amount(amount: f64) -> f64 {
    amount - fee(amount)
}

/// True when the earned balance sits within the payout bounds.
pub fn can_request_payout(earned: f64) -> bool {
    (MIN_PAYOUT..=MAX_PAYOUT).contains(&earned)
}

/// Checks a payout request against the bounds and the earned balance.
pub fn validate_request(amount: f64, earned: f64) -> Result<(), RuleError> {
    if amount < MIN_PAYOUT {
        return Err(RuleError::PayoutBelowMinimum {
            minimum: MIN_PAYOUT,
        });
    }
    if amount > MAX_PAYOUT {
        return Err(RuleError::PayoutAboveMaximum {
            maximum: MAX_PAYOUT,
        });
    }
    if amount > earned {
        return Err(RuleError::PayoutExceedsEarnings);
    }
    Ok(())
}

pub fn is_valid_request(amount: f64, earned: f64) -> bool {
    validate_request(amount, earned).is_ok()
}

/// Breakdown of a valid payout request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutQuote {
    pub amount: f64,
    pub fee: f64,
    pub net: f64,
}

/// Validates the request and returns the fee breakdown.
pub fn quote(amount: f64, earned: f64) -> Result<PayoutQuote, RuleError> {
    validate_request(amount, earned)?;
    Ok(PayoutQuote {
        amount,
        fee: fee(amount),
        net: net_amount(amount),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutFrequency {
    Weekly,
    Monthly,
}

/// When and how payouts are processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutSchedule {
    pub frequency: PayoutFrequency,
    pub min_amount: f64,
    pub processing_days: u32,
}

impl Default for PayoutSchedule {
    fn default() -> Self {
        Self {
            frequency: PayoutFrequency::Weekly,
            min_amount: MIN_PAYOUT,
            processing_days: 3,
        }
    }
}

/// Strips whitespace from user-entered card numbers (`"4242 4242 ..."`).
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Normalizes and checks that the card number is exactly 16 digits.
pub fn validate_card_number(raw: &str) -> Result<String, RuleError> {
    let card = normalize_card_number(raw);
    if card.len() != CARD_NUMBER_DIGITS || !card.chars().all(|c| c.is_ascii_digit()) {
        return Err(RuleError::InvalidCardNumber);
    }
    Ok(card)
}
