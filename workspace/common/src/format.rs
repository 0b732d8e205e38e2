//! Locale-aware money formatting.
//!
//! Partner notification emails quote amounts in Czech conventions:
//! thousands separated by a non-breaking space, a decimal comma, and the
//! currency symbol suffixed ("1 500 Kč"). The English variant is used by
//! internal tooling and sticks to an ISO-code prefix ("CZK 1,500").

use crate::currency::{Currency, Locale};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Czech typography wants a non-breaking space between digit groups and
/// before the currency symbol.
const NBSP: char = '\u{a0}';

/// A monetary value with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Amount {
    #[schema(value_type = String)]
    pub value: Decimal,
    pub currency: Currency,
}

impl Amount {
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }
}

/// Formats an amount for the given locale.
///
/// A fraction of zero is dropped entirely, non-zero fractions are shown
/// with two decimal places (amounts are rounded to cents first).
pub fn format_amount(amount: &Amount, locale: Locale) -> String {
    let negative = amount.value.is_sign_negative() && !amount.value.is_zero();
    let rounded = amount.value.abs().round_dp(2);

    let rendered = format!("{:.2}", rounded);
    let (int_digits, fraction) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), "00"));

    let (group_separator, decimal_separator) = match locale {
        Locale::Cs => (NBSP, ','),
        Locale::En => (',', '.'),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(int_digits, group_separator));
    if fraction != "00" {
        out.push(decimal_separator);
        out.push_str(fraction);
    }

    match locale {
        Locale::Cs => format!("{out}{NBSP}{}", amount.currency.symbol()),
        Locale::En => format!("{} {out}", amount.currency.code()),
    }
}

/// Inserts `separator` between groups of three digits, counted from the
/// right. `digits` must contain ASCII digits only.
fn group_digits(digits: &str, separator: char) -> String {
    let count = digits.len();
    let mut out = String::with_capacity(count + count / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
