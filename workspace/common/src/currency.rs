use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Currencies the platform settles payouts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Czk,
    Eur,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnsupportedCurrency(pub String);

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Czk => "CZK",
            Currency::Eur => "EUR",
        }
    }

    /// Symbol used when formatting for humans.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Czk => "Kč",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CZK" => Ok(Currency::Czk),
            "EUR" => Ok(Currency::Eur),
            other => Err(UnsupportedCurrency(other.to_string())),
        }
    }
}

/// Locales the formatters understand. The platform's partner-facing
/// communication is Czech; English exists for admin tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Cs,
    En,
}
