//! Non-negative money amounts tagged with a currency.

use std::fmt;
use std::str::FromStr;

use crate::RuleError;

/// Currencies the backend settles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Rub,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Rub => "RUB",
        }
    }
}

impl FromStr for Currency {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "RUB" => Ok(Currency::Rub),
            _ => Err(RuleError::UnsupportedCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A non-negative amount in a single currency.
///
/// Arithmetic never produces a negative amount and never mixes currencies;
/// both are reported as [`RuleError`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money {
    amount: f64,
    currency: Currency,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Result<Self, RuleError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(RuleError::NegativeAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Convenience constructor for USD amounts.
    pub fn usd(amount: f64) -> Result<Self, RuleError> {
        Self::new(amount, Currency::Usd)
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0.0,
            currency,
        }
    }

    /// Parses loosely formatted input such as `"$1,250.50"`.
    ///
    /// Everything except digits, `.` and `-` is discarded before parsing.
    pub fn parse(value: &str, currency: Currency) -> Result<Self, RuleError> {
        let cleaned: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        let amount: f64 = cleaned
            .parse()
            .map_err(|_| RuleError::InvalidMoneyFormat(value.to_string()))?;
        Self::new(amount, currency)
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, RuleError> {
        self.same_currency(other)?;
        Money::new(self.amount + other.amount, self.currency)
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, RuleError> {
        self.same_currency(other)?;
        Money::new(self.amount - other.amount, self.currency)
    }

    pub fn multiply(&self, factor: f64) -> Result<Money, RuleError> {
        if !factor.is_finite() {
            return Err(RuleError::InvalidFactor);
        }
        if factor < 0.0 {
            return Err(RuleError::NegativeFactor);
        }
        Money::new(self.amount * factor, self.currency)
    }

    pub fn is_greater_than(&self, other: &Money) -> Result<bool, RuleError> {
        self.same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    pub fn is_less_than(&self, other: &Money) -> Result<bool, RuleError> {
        self.same_currency(other)?;
        Ok(self.amount < other.amount)
    }

    fn same_currency(&self, other: &Money) -> Result<(), RuleError> {
        if self.currency != other.currency {
            return Err(RuleError::CurrencyMismatch {
                left: self.currency.code().into(),
                right: other.currency.code().into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}
